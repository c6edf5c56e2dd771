// src/engine.rs
use path_absolutize::Absolutize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::{DirEntry, WalkDir};

use crate::config::{Config, ScanConfig, TemplateConfig};
use crate::error::ScanError;
use crate::facts::SourceFile;
use crate::model::{Pass, Route, RouteStore};
use crate::resolver::ImportPathResolver;
use crate::shapes::{RouteShape, ScanContext};
use crate::template::{config_routes, is_dynamic, markup_routes};

/// プロジェクトのフロントエンドの系統
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ecosystem {
    /// JSX/TSX のルートツリー (React)
    Tree,
    /// 単一ファイルコンポーネントとルーター設定ディレクトリ (Vue)
    Template,
}

pub struct RouteDiscoveryEngine {
    scan: ScanConfig,
    template: TemplateConfig,
}

impl RouteDiscoveryEngine {
    pub fn new(config: &Config) -> Self {
        RouteDiscoveryEngine {
            scan: config.scan.clone(),
            template: config.template.clone(),
        }
    }

    /// `root` 配下の全ルート。
    /// 読めない、またはパースできないファイルはログに出してスキップするので失敗しない
    pub fn discover(&self, root: &Path, ecosystem: Ecosystem) -> Vec<Route> {
        let store = match ecosystem {
            Ecosystem::Tree => self.scan_tree(root),
            Ecosystem::Template => self.scan_template(root),
        };
        info!("{} route(s) discovered under {}", store.len(), root.display());
        store.into_routes()
    }

    pub fn scan_tree(&self, root: &Path) -> RouteStore {
        let resolver = ImportPathResolver::new(root, &self.scan);
        let ctx = ScanContext {
            config: &self.scan,
            resolver: &resolver,
        };

        // 1) 対象拡張子のファイルを順に読み、形状ごとのパスを集める
        let mut passes = Vec::new();
        for path in source_files(root, &self.scan.extensions, &self.scan.exclude_dirs) {
            let file = match SourceFile::load(&path) {
                Ok(file) => file,
                Err(err) => {
                    warn!("{err}");
                    continue;
                }
            };
            passes.extend(file_passes(&file, &ctx));
        }

        // 2) ファイル順・形状順に畳み込む (同じパスは後勝ち)
        RouteStore::from_passes(passes)
    }

    /// 全コンポーネントのリンク先、続いてルーターディレクトリの
    /// `path` プロパティ。パラメーターだけのパスは捨てる
    pub fn scan_template(&self, root: &Path) -> RouteStore {
        let markup_ext = [self.template.markup_extension.clone()];
        let mut passes = Vec::new();

        // 1) コンポーネントの <template> からリンク先を集める
        for path in source_files(root, &markup_ext, &self.scan.exclude_dirs) {
            match fs::read_to_string(&path) {
                Ok(markup) => passes.push(Pass::new("template-markup", markup_routes(&markup))),
                Err(err) => warn!("failed to read {}: {err}", path.display()),
            }
        }

        // 2) ルーターディレクトリがあれば設定モジュールの path を集める
        let router_dir = root.join(&self.template.router_dir);
        if router_dir.is_dir() {
            let files = source_files(
                &router_dir,
                &self.template.config_extensions,
                &self.scan.exclude_dirs,
            );
            for path in files {
                let routes = fs::read_to_string(&path)
                    .map_err(|err| format!("failed to read {}: {err}", path.display()))
                    .and_then(|code| config_routes(&path, &code).map_err(|err| err.to_string()));
                match routes {
                    Ok(routes) => passes.push(Pass::new("router-config", routes)),
                    Err(message) => warn!("{message}"),
                }
            }
        } else {
            debug!("no router directory at {}", router_dir.display());
        }

        // 3) 畳み込んでから `:id` のようなパスを除く
        let mut store = RouteStore::from_passes(passes);
        store.retain(|route| !is_dynamic(&route.path));
        store
    }
}

/// 形状ごとに 1 パス (TREE_ORDER 順)
fn file_passes(file: &SourceFile, ctx: &ScanContext) -> Vec<Pass> {
    RouteShape::TREE_ORDER
        .into_iter()
        .map(|shape| Pass::new(shape.label(), shape.extract(file, ctx)))
        .filter(|pass| !pass.routes.is_empty())
        .collect()
}

/// `root` 配下で `extensions` のいずれかを持つファイル (ファイル名順)。
/// 隠しエントリと除外ディレクトリには入らない
fn source_files(root: &Path, extensions: &[String], exclude_dirs: &[String]) -> Vec<PathBuf> {
    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_skipped(e, exclude_dirs))
        .filter_map(|e| match e {
            Ok(entry) => Some(entry),
            Err(err) => {
                warn!("{err}");
                None
            }
        })
        .filter(|e| e.file_type().is_file() && has_extension(e.path(), extensions))
        .map(DirEntry::into_path)
        .collect()
}

fn is_skipped(entry: &DirEntry, exclude_dirs: &[String]) -> bool {
    let Some(name) = entry.file_name().to_str() else {
        return false;
    };
    name.starts_with('.')
        || (entry.file_type().is_dir() && exclude_dirs.iter().any(|d| d == name))
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| extensions.iter().any(|known| known == ext))
}

/// `path` の絶対パス (既存のディレクトリでなければエラー)
pub fn locate_scan_root(path: &Path) -> Result<PathBuf, ScanError> {
    let absolute = match path.absolutize() { // 絶対化できなければそのまま
        Ok(abs) => abs.to_path_buf(),
        Err(_) => path.to_path_buf(),
    };
    if absolute.is_dir() {
        Ok(absolute)
    } else {
        Err(ScanError::RootNotFound(absolute))
    }
}

/// `root` 直下にルーターディレクトリがあればテンプレートプロジェクト
pub fn detect_ecosystem(root: &Path, template: &TemplateConfig) -> Ecosystem {
    if root.join(&template.router_dir).is_dir() {
        Ecosystem::Template
    } else {
        Ecosystem::Tree
    }
}
