// src/resolver.rs
use path_absolutize::Absolutize;
use std::ffi::OsString;
use std::path::{Component, Path, PathBuf};

use crate::config::ScanConfig;

/// インポート指定子を走査対象プロジェクト内の候補ファイルへ対応付ける
///
/// パス操作のみでファイルシステムには触れない。
/// どの候補が実在するかは呼び出し側で確認する。
/// 追跡するのは相対指定子とソースルートのプレフィックス (`src/...`) のみで、
/// パッケージのインポートは対象外
#[derive(Debug, Clone)]
pub struct ImportPathResolver {
    /// 走査ルート (インポート元に `src` の祖先がないときに使う)
    project_root: PathBuf,
    /// 例: "src/"
    source_root_prefix: String,
    /// 拡張子のない候補に付ける拡張子 (例: "tsx")
    default_extension: String,
    /// 指定子が既に持っていてよい拡張子
    extensions: Vec<String>,
}

impl ImportPathResolver {
    pub fn new(project_root: impl Into<PathBuf>, config: &ScanConfig) -> Self {
        ImportPathResolver {
            project_root: project_root.into(),
            source_root_prefix: config.source_root_prefix.clone(),
            default_extension: config.default_extension.clone(),
            extensions: config.extensions.clone(),
        }
    }

    /// `importer` から `specifier` をインポートしたときの第一候補
    ///
    /// - importer: インポート文を含むファイル
    /// - specifier: `from` に書かれた文字列
    ///
    /// 戻り値: 追跡対象外の指定子なら None
    pub fn resolve(&self, importer: &Path, specifier: &str) -> Option<PathBuf> {
        let base = self.base_path(importer, specifier)?;
        if self.has_source_extension(&base) {
            Some(base)
        } else {
            Some(with_appended_extension(&base, &self.default_extension))
        }
    }

    /// 第一候補に続けて、他の拡張子とディレクトリの index ファイルを
    /// 探索順に並べたもの
    pub fn candidates(&self, importer: &Path, specifier: &str) -> Vec<PathBuf> {
        let Some(base) = self.base_path(importer, specifier) else {
            return Vec::new();
        };
        if self.has_source_extension(&base) {
            return vec![base];
        }

        // 1) デフォルト拡張子を先頭に、重複なしで拡張子を並べる
        let mut extensions = vec![self.default_extension.as_str()];
        for ext in &self.extensions {
            if !extensions.contains(&ext.as_str()) {
                extensions.push(ext);
            }
        }

        // 2) `base.ext` の後に `base/index.ext` を続ける
        let mut candidates: Vec<PathBuf> = extensions
            .iter()
            .map(|ext| with_appended_extension(&base, ext))
            .collect();
        candidates.extend(extensions.iter().map(|ext| base.join(format!("index.{ext}"))));
        candidates
    }

    fn base_path(&self, importer: &Path, specifier: &str) -> Option<PathBuf> {
        // 相対指定子はインポート元のディレクトリから、`src/...` は src の親から
        let joined = if specifier.starts_with('.') {
            importer.parent()?.join(specifier)
        } else if let Some(rest) = specifier.strip_prefix(self.source_root_prefix.as_str()) {
            let src_dir = self.source_root_prefix.trim_end_matches('/');
            self.source_root_parent(importer, src_dir)
                .join(src_dir)
                .join(rest)
        } else {
            return None; // パッケージのインポートは追わない
        };
        Some(normalize(&joined))
    }

    /// インポート元の最も外側の `src` 祖先を含むディレクトリ。
    /// 見つからなければプロジェクトルート
    fn source_root_parent(&self, importer: &Path, src_dir: &str) -> PathBuf {
        let mut parent = None;
        let mut current = PathBuf::new();
        for component in importer.components() {
            if matches!(component, Component::Normal(name) if name == src_dir) {
                parent = Some(current.clone());
                break;
            }
            current.push(component);
        }
        parent.unwrap_or_else(|| self.project_root.clone())
    }

    fn has_source_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|known| known == ext))
    }
}

/// 拡張子を置き換えずに付け足す
/// 例: `routes.config` + `tsx` → `routes.config.tsx`
fn with_appended_extension(path: &Path, ext: &str) -> PathBuf {
    let mut name: OsString = path.as_os_str().to_owned();
    name.push(".");
    name.push(ext);
    PathBuf::from(name)
}

fn normalize(path: &Path) -> PathBuf {
    match path.absolutize() {
        Ok(abs) => abs.to_path_buf(),
        Err(_) => path.to_path_buf(),
    }
}
