// src/config.rs
// 走査対象プロジェクトに置く任意の routescout.toml

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::generate::SlugStyle;

pub const DEFAULT_CONFIG_FILE: &str = "routescout.toml";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub scan: ScanConfig,

    #[serde(default)]
    pub template: TemplateConfig,

    /// `[gen]` セクション
    #[serde(default, rename = "gen")]
    pub generate: GenConfig,

    #[serde(default)]
    pub enrich: EnrichConfig,
}

/// ツリー系 (React) の走査オプション
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// 走査対象とし、解決済みとみなす拡張子
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// 走査時にスキップするディレクトリ名
    #[serde(default = "default_exclude_dirs")]
    pub exclude_dirs: Vec<String>,

    /// 配列宣言を常にルート表として読むファイル名
    #[serde(default = "default_routes_file_names")]
    pub routes_file_names: Vec<String>,

    /// 配列宣言をルート表とみなす要素型
    #[serde(default = "default_route_object_types")]
    pub route_object_types: Vec<String>,

    /// インポート元ではなくプロジェクトルートから解決するプレフィックス
    #[serde(default = "default_source_root_prefix")]
    pub source_root_prefix: String,

    /// 拡張子のないインポート指定子に付ける拡張子
    #[serde(default = "default_extension")]
    pub default_extension: String,
}

/// テンプレート系 (Vue) の走査オプション
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateConfig {
    /// ルーター設定を置くディレクトリ (走査ルートからの相対)
    #[serde(default = "default_router_dir")]
    pub router_dir: String,

    /// 単一ファイルコンポーネントの拡張子 (例: "vue")
    #[serde(default = "default_markup_extension")]
    pub markup_extension: String,

    /// ルーター設定モジュールの拡張子
    #[serde(default = "default_config_extensions")]
    pub config_extensions: Vec<String>,
}

/// テスト生成オプション
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenConfig {
    /// テストの出力先 (カレントディレクトリからの相対)
    #[serde(default = "default_tests_dir")]
    pub tests_dir: String,

    /// 表示確認に使う要素のセレクター
    #[serde(default = "default_root_selector")]
    pub root_selector: String,

    /// ルートパスをファイル名にするときの区切り
    #[serde(default)]
    pub slug_style: SlugStyle,
}

/// `--ai` 指定時のアサーション追加オプション
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct EnrichConfig {
    /// 先頭から順に試し、最初に応答したプロバイダーを採用
    #[serde(default)]
    pub providers: Vec<ProviderConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// ログに出すプロバイダー名
    pub name: String,

    /// プログラムと引数。プロンプトは標準入力で渡す
    pub command: Vec<String>,

    /// プロバイダー実行に必要な環境変数
    #[serde(default)]
    pub api_key_env: Option<String>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        ScanConfig {
            extensions: default_extensions(),
            exclude_dirs: default_exclude_dirs(),
            routes_file_names: default_routes_file_names(),
            route_object_types: default_route_object_types(),
            source_root_prefix: default_source_root_prefix(),
            default_extension: default_extension(),
        }
    }
}

impl Default for TemplateConfig {
    fn default() -> Self {
        TemplateConfig {
            router_dir: default_router_dir(),
            markup_extension: default_markup_extension(),
            config_extensions: default_config_extensions(),
        }
    }
}

impl Default for GenConfig {
    fn default() -> Self {
        GenConfig {
            tests_dir: default_tests_dir(),
            root_selector: default_root_selector(),
            slug_style: SlugStyle::default(),
        }
    }
}

// デフォルト値
fn default_extensions() -> Vec<String> {
    ["js", "jsx", "ts", "tsx"].map(String::from).to_vec()
}

fn default_exclude_dirs() -> Vec<String> {
    vec!["node_modules".to_string()]
}

fn default_routes_file_names() -> Vec<String> {
    ["routes.tsx", "routes.ts", "routes.jsx", "routes.js"]
        .map(String::from)
        .to_vec()
}

fn default_route_object_types() -> Vec<String> {
    vec!["RouteObject".to_string(), "RoutesObject".to_string()]
}

fn default_source_root_prefix() -> String {
    "src/".to_string()
}

fn default_extension() -> String {
    "tsx".to_string()
}

fn default_router_dir() -> String {
    "router".to_string()
}

fn default_markup_extension() -> String {
    "vue".to_string()
}

fn default_config_extensions() -> Vec<String> {
    vec!["js".to_string(), "ts".to_string()]
}

fn default_tests_dir() -> String {
    "tests".to_string()
}

fn default_root_selector() -> String {
    "body".to_string()
}

impl Config {
    /// TOML ファイルから設定を読み込む
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_toml(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// `dir` に `routescout.toml` があれば読み込み、なければデフォルト
    pub fn load_from_dir<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let path = dir.as_ref().join(DEFAULT_CONFIG_FILE);
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }
}
