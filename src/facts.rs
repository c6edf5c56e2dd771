// src/facts.rs
//! 1 ファイル内のルート関連宣言を、解析バックエンドに依存しない形で表す。
//! 構文バックエンド (`parser`) は SWC のモジュールから、
//! テキストバックエンド (`text`) はパースできないファイルに対して
//! パターンカタログから埋める。

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::SourceError;
use crate::model::Route;
use crate::patterns::catalog;
use crate::tags::extract_tags_at;
use crate::{parser, text};
use regex::Regex;

/// ルート配列の中で見つかった `{ path: "..." }` オブジェクト
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteObject {
    /// 前後の空白を除いた `path` の値
    pub path: String,
    /// ファイル内での開き波括弧のバイトオフセット
    pub offset: usize,
    /// `children: [...]` から 1 件以上取れたときだけ Some
    pub children: Option<Vec<RouteObject>>,
}

impl RouteObject {
    /// ルートを組み立てる。タグはこのオブジェクトを含むファイルの
    /// テキスト `code` から読む
    pub fn to_route(&self, code: &str) -> Route {
        Route::new(self.path.clone())
            .with_tags(extract_tags_at(code, self.offset))
            .with_children(
                self.children
                    .as_ref()
                    .map(|children| children.iter().map(|c| c.to_route(code)).collect()),
            )
    }
}

/// 名前に束縛された、または default export された配列リテラル
#[derive(Debug, Clone, Default)]
pub struct ArrayDecl {
    /// `export default [...]` のときは None
    pub name: Option<String>,
    /// `export const` / `export { name }` で export されている
    pub exported: bool,
    /// `export default` されている
    pub default_export: bool,
    /// `: T[]` / `: Array<T>` から取った要素型
    pub type_name: Option<String>,
    /// 要素のうちルートオブジェクトであるもの (宣言順)
    pub objects: Vec<RouteObject>,
}

impl ArrayDecl {
    pub fn is_local(&self) -> bool {
        !self.exported && !self.default_export
    }
}

/// インラインの `<Route path="...">` 要素
#[derive(Debug, Clone)]
pub struct RouteElement {
    pub path: String,
    /// `element` / `component` 属性の中身
    pub component: Option<String>,
    /// `<Route` の `<` のバイトオフセット
    pub offset: usize,
}

/// `import { imported as local }` の 1 束縛
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportBinding {
    pub imported: String,
    pub local: String,
}

#[derive(Debug, Clone, Default)]
pub struct ImportFact {
    /// `from` に書かれた文字列
    pub specifier: String,
    /// default 束縛のローカル名
    pub default: Option<String>,
    pub named: Vec<ImportBinding>,
}

impl ImportFact {
    /// `local` の取り込み方: default 束縛なら `Some(None)`、
    /// 名前付きなら `Some(Some(name))`
    pub fn binding_of(&self, local: &str) -> Option<Option<&str>> {
        if self.default.as_deref() == Some(local) {
            return Some(None);
        }
        self.named
            .iter()
            .find(|b| b.local == local)
            .map(|b| Some(b.imported.as_str()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouterBuilder {
    Hash,
    Browser,
    Memory,
    FromElements,
}

impl RouterBuilder {
    pub const ALL: [RouterBuilder; 4] = [
        RouterBuilder::Hash,
        RouterBuilder::Browser,
        RouterBuilder::Memory,
        RouterBuilder::FromElements,
    ];

    pub fn from_callee(name: &str) -> Option<Self> {
        match name {
            "createHashRouter" => Some(RouterBuilder::Hash),
            "createBrowserRouter" => Some(RouterBuilder::Browser),
            "createMemoryRouter" => Some(RouterBuilder::Memory),
            "createRoutesFromElements" => Some(RouterBuilder::FromElements),
            _ => None,
        }
    }

    pub fn pattern(self) -> &'static Regex {
        let catalog = catalog();
        match self {
            RouterBuilder::Hash => &catalog.hash_router,
            RouterBuilder::Browser => &catalog.browser_router,
            RouterBuilder::Memory => &catalog.memory_router,
            RouterBuilder::FromElements => &catalog.routes_from_elements,
        }
    }
}

/// ルータープロバイダーのルートの出どころ
#[derive(Debug, Clone)]
pub enum ArrayRef {
    Named(String),
    Inline(Vec<RouteObject>),
}

/// `<RouterProvider router={createXRouter(ref)}>` とその変種
#[derive(Debug, Clone)]
pub struct ProviderUsage {
    /// "RouterProvider" か "RoutingProvider"
    pub provider: String,
    /// RoutingProvider が配列を直接受け取るときは None
    pub builder: Option<RouterBuilder>,
    pub routes: ArrayRef,
}

/// ファクトをどちらのバックエンドで集めたか
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Syntax,
    Text,
}

/// 1 ファイル分のソースファクト
#[derive(Debug, Clone)]
pub struct FileFacts {
    pub backend: Backend,
    pub arrays: Vec<ArrayDecl>,
    pub elements: Vec<RouteElement>,
    pub imports: Vec<ImportFact>,
    pub providers: Vec<ProviderUsage>,
}

impl FileFacts {
    pub fn empty(backend: Backend) -> Self {
        FileFacts {
            backend,
            arrays: Vec::new(),
            elements: Vec::new(),
            imports: Vec::new(),
            providers: Vec::new(),
        }
    }

    /// 構文木からファクトを集める。
    /// パースに失敗したらテキストパターンで代替する
    pub fn collect(path: &Path, code: &str) -> Self {
        match parser::collect_facts(path, code) {
            Ok(facts) => facts,
            Err(err) => {
                debug!("{err}; falling back to text patterns");
                text::collect_facts(code)
            }
        }
    }

    /// `export { .. }` / `export default name` に挙がった
    /// 名前付き宣言を export 済みにする
    pub(crate) fn apply_exports(&mut self, listed: &[String], defaults: &[String]) {
        for decl in &mut self.arrays {
            let Some(name) = decl.name.as_deref() else {
                continue;
            };
            if listed.iter().any(|n| n == name) {
                decl.exported = true;
            }
            if defaults.iter().any(|n| n == name) {
                decl.default_export = true;
            }
        }
    }

    pub fn array_named(&self, name: &str) -> Option<&ArrayDecl> {
        self.arrays.iter().find(|a| a.name.as_deref() == Some(name))
    }
}

const BOM: char = '\u{feff}';

/// ディスクから読んだファイルとそのファクト
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: PathBuf,
    pub code: String,
    pub facts: FileFacts,
}

impl SourceFile {
    pub fn load(path: &Path) -> Result<Self, SourceError> {
        let code = fs::read_to_string(path).map_err(|source| SourceError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_code(path, code))
    }

    /// 先頭の BOM は取り除く。
    /// 構文木のオフセットと `code` の位置を一致させるため
    pub fn from_code(path: &Path, code: String) -> Self {
        let code = if code.starts_with(BOM) {
            code[BOM.len_utf8()..].to_string()
        } else {
            code
        };
        let facts = FileFacts::collect(path, &code);
        SourceFile {
            path: path.to_path_buf(),
            code,
            facts,
        }
    }

    pub fn file_name(&self) -> Option<&str> {
        self.path.file_name().and_then(|n| n.to_str())
    }

    pub fn routes_from(&self, objects: &[RouteObject]) -> Vec<Route> {
        objects.iter().map(|o| o.to_route(&self.code)).collect()
    }
}
