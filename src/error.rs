// src/error.rs
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// 1 ファイルからソースファクトを作れなかったときのエラー
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },
}

/// 走査開始前に CLI へ返すエラー
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("path not found: {}", .0.display())]
    RootNotFound(PathBuf),
}

/// 単一のアサーションプロバイダーの失敗。フォールバックチェーン内で吸収される
#[derive(Debug, Error)]
pub enum EnrichError {
    #[error("provider {provider} is disabled: {reason}")]
    Disabled { provider: String, reason: String },

    #[error("provider {provider} command failed: {source}")]
    Command {
        provider: String,
        #[source]
        source: io::Error,
    },
}
