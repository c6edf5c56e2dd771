// src/lib.rs
//! フロントエンドプロジェクトのルート探索と、
//! 見つかったルートからの Playwright スモークテスト生成。

pub mod brackets;
pub mod children;
pub mod config;
pub mod engine;
pub mod enrich;
pub mod error;
pub mod facts;
pub mod generate;
pub mod init;
pub mod model;
pub mod parser;
pub mod patterns;
pub mod resolver;
pub mod shapes;
pub mod tags;
pub mod template;
pub mod text;

pub use config::Config;
pub use engine::{Ecosystem, RouteDiscoveryEngine, detect_ecosystem, locate_scan_root};
pub use model::{Route, RouteStore};
