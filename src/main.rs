// src/main.rs

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use std::env;
use std::path::{Path, PathBuf};
use tracing::{Level, info, warn};

use routescout::enrich::FallbackChain;
use routescout::generate::SpecGenerator;
use routescout::{
    Config, Ecosystem, Route, RouteDiscoveryEngine, detect_ecosystem, init, locate_scan_root,
};

/// CLI 引数定義
#[derive(Parser, Debug)]
#[command(
    name = "routescout",
    version,
    about = "Discovers the routes of a React or Vue project and generates Playwright smoke tests"
)]
struct Cli {
    /// 設定ファイル (省略時: ./routescout.toml があれば使用)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// 標準エラーへのログを増やす (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Playwright のブラウザをインストールし playwright.config.ts を書き出す
    Init {
        /// 設定ファイルの書き出しのみ行う
        #[arg(long)]
        skip_install: bool,
    },

    /// ソースディレクトリ配下のルートを一覧表示する
    Scan {
        #[arg(value_name = "DIR")]
        dir: PathBuf,

        /// テンプレート (Vue) プロジェクトとして走査する
        #[arg(long)]
        vue: bool,

        /// JSON のみ出力する
        #[arg(long)]
        json: bool,
    },

    /// 見つかったルートごとに Playwright のテストを 1 つ生成する
    Gen {
        /// 設定済みプロバイダーに追加のアサーションを問い合わせる
        #[arg(long)]
        ai: bool,

        #[arg(long, value_name = "DIR", default_value = "src")]
        dir: PathBuf,

        /// 判定せずテンプレート (Vue) プロジェクトとして走査する
        #[arg(long)]
        vue: bool,
    },
}

fn main() -> Result<()> {
    // 1) CLI 引数をパースし、標準エラーへのログを初期化
    let cli = Cli::parse();
    init_logging(cli.verbose);

    // 2) 設定を読み込む (--config 指定がなければカレントの routescout.toml)
    let cwd = env::current_dir().context("Failed to read the working directory")?;
    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::load_from_dir(&cwd)?,
    };

    // 3) サブコマンドを実行
    match cli.command {
        Command::Init { skip_install } => run_init(&cwd, skip_install),
        Command::Scan { dir, vue, json } => run_scan(&config, &dir, vue, json),
        Command::Gen { ai, dir, vue } => run_gen(&config, &cwd, &dir, ai, vue),
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn run_init(cwd: &Path, skip_install: bool) -> Result<()> {
    if !skip_install {
        println!("Installing Playwright browsers...");
        init::install_browsers()?;
    }
    if init::scaffold_config(cwd)? {
        println!("Wrote {}", init::PLAYWRIGHT_CONFIG_FILE);
        println!("Initialization complete. Run `routescout scan src` next.");
    } else {
        println!("{} already exists, skipping", init::PLAYWRIGHT_CONFIG_FILE);
    }
    Ok(())
}

fn run_scan(config: &Config, dir: &Path, vue: bool, json: bool) -> Result<()> {
    let root = locate_scan_root(dir)?;
    let ecosystem = if vue { Ecosystem::Template } else { Ecosystem::Tree };
    let routes = RouteDiscoveryEngine::new(config).discover(&root, ecosystem);

    if json {
        println!("{}", serde_json::to_string_pretty(&routes)?);
        return Ok(());
    }

    println!("Found routes:");
    if routes.is_empty() {
        println!("  (no routes found)");
    }
    for route in &routes {
        println!("  • {}", describe(route));
    }
    Ok(())
}

fn run_gen(config: &Config, cwd: &Path, dir: &Path, ai: bool, vue: bool) -> Result<()> {
    // 1) ルートを収集 (--vue がなければエコシステムを自動判定)
    let root = locate_scan_root(&cwd.join(dir))?;
    let ecosystem = if vue {
        Ecosystem::Template
    } else {
        detect_ecosystem(&root, &config.template)
    };
    info!("generating specs for {ecosystem:?} project at {}", root.display());
    let routes = RouteDiscoveryEngine::new(config).discover(&root, ecosystem);

    // 2) --ai 指定時のみプロバイダーチェーンを組み立てる
    let chain = ai.then(|| FallbackChain::from_config(&config.enrich));
    if chain.as_ref().is_some_and(FallbackChain::is_empty) {
        warn!("--ai given but no [[enrich.providers]] are configured");
    }

    // 3) ルートごとにテストファイルを書き出す
    let generator = SpecGenerator::from_config(cwd, &config.generate);
    let written = generator.write_all(&routes, chain.as_ref())?;
    for path in &written {
        println!("Created {}", path.display());
    }
    println!(
        "Generated {} test(s) in {}",
        written.len(),
        generator.tests_dir().display()
    );
    Ok(())
}

/// 一覧表示用の 1 行
/// 例: `/about (component: <About />) [tags: public]`
fn describe(route: &Route) -> String {
    let mut line = route.path.clone();
    if let Some(component) = &route.component {
        line.push_str(&format!(" (component: {component})"));
    }
    if !route.tags.is_empty() {
        line.push_str(&format!(" [tags: {}]", route.tags.join(", ")));
    }
    line
}
