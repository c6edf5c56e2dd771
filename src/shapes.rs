// src/shapes.rs
//! ツリー系のルート宣言の形。各形状は 1 ファイルのソースファクトを読み、
//! ルートを宣言順に返す。エンジンは `RouteShape::TREE_ORDER` の順に実行し、
//! 結果を畳み込む。

use std::path::Path;

use tracing::debug;

use crate::config::ScanConfig;
use crate::facts::{ArrayDecl, ArrayRef, SourceFile};
use crate::model::Route;
use crate::resolver::ImportPathResolver;
use crate::tags::extract_tags_at;

/// 1 回の走査中にすべての形状で共有する読み取り専用の状態
pub struct ScanContext<'a> {
    pub config: &'a ScanConfig,
    pub resolver: &'a ImportPathResolver,
}

impl ScanContext<'_> {
    /// インポート先のファイルを読む。
    /// パッケージ、存在しないファイル、読めないファイルはいずれも None
    pub fn load_import(&self, importer: &Path, specifier: &str) -> Option<SourceFile> {
        // 1) 候補が 1 つもなければ追跡対象外の指定子
        let candidates = self.resolver.candidates(importer, specifier);
        if candidates.is_empty() {
            return None;
        }
        // 2) 探索順で最初に実在するファイルを読む
        let Some(path) = candidates.iter().find(|c| c.is_file()) else {
            if let Some(primary) = self.resolver.resolve(importer, specifier) {
                debug!(
                    "import {specifier} from {}: no file at {} or its alternatives",
                    importer.display(),
                    primary.display()
                );
            }
            return None;
        };
        match SourceFile::load(path) {
            Ok(file) => Some(file),
            Err(err) => {
                debug!("skipping import {specifier}: {err}");
                None
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteShape {
    /// `export const x = [..]` / `export default [..]` / `export { x }`
    ExportedArray,
    /// このファイルがインポートしているファイルの export 済み配列
    ImportedArray,
    /// `<Route path="..." element={..} />`
    InlineElement,
    /// export されていない配列宣言
    LocalConstant,
    /// ルート型の付いた配列。型付きが 1 つもなければ名前付き配列すべて
    TypedObjectTree,
    /// ルータービルダー経由でルータープロバイダーに渡された配列
    RouterProvider,
    /// `routes.tsx` などのファイルにある名前付き配列すべて
    RoutesFile,
}

impl RouteShape {
    /// 実行順。同じパスが衝突したら後の形状が勝つ
    pub const TREE_ORDER: [RouteShape; 7] = [
        RouteShape::ExportedArray,
        RouteShape::ImportedArray,
        RouteShape::InlineElement,
        RouteShape::LocalConstant,
        RouteShape::TypedObjectTree,
        RouteShape::RouterProvider,
        RouteShape::RoutesFile,
    ];

    pub fn label(self) -> &'static str {
        match self {
            RouteShape::ExportedArray => "exported-array",
            RouteShape::ImportedArray => "imported-array",
            RouteShape::InlineElement => "inline-element",
            RouteShape::LocalConstant => "local-constant",
            RouteShape::TypedObjectTree => "typed-object-tree",
            RouteShape::RouterProvider => "router-provider",
            RouteShape::RoutesFile => "routes-file",
        }
    }

    pub fn extract(self, file: &SourceFile, ctx: &ScanContext) -> Vec<Route> {
        let routes = match self {
            RouteShape::ExportedArray => {
                arrays_routes(file, |a| a.exported || a.default_export)
            }
            RouteShape::ImportedArray => imported_arrays(file, ctx),
            RouteShape::InlineElement => inline_elements(file),
            RouteShape::LocalConstant => {
                arrays_routes(file, |a| a.is_local() && a.name.is_some())
            }
            RouteShape::TypedObjectTree => typed_object_tree(file, ctx.config),
            RouteShape::RouterProvider => router_providers(file, ctx),
            RouteShape::RoutesFile => routes_file(file, ctx.config),
        };
        if !routes.is_empty() {
            debug!(
                "{}: {} route(s) in {}",
                self.label(),
                routes.len(),
                file.path.display()
            );
        }
        routes
    }
}

fn arrays_routes<F>(file: &SourceFile, keep: F) -> Vec<Route>
where
    F: Fn(&ArrayDecl) -> bool,
{
    file.facts
        .arrays
        .iter()
        .filter(|decl| keep(decl))
        .flat_map(|decl| file.routes_from(&decl.objects))
        .collect()
}

fn imported_arrays(file: &SourceFile, ctx: &ScanContext) -> Vec<Route> {
    let mut routes = Vec::new();
    let imports = &file.facts.imports;

    // 1) 名前付きインポート: インポート先の export 済み配列
    for import in imports.iter().filter(|i| !i.named.is_empty()) {
        if let Some(target) = ctx.load_import(&file.path, &import.specifier) {
            routes.extend(arrays_routes(&target, |a| a.exported));
        }
    }
    // 2) default インポート: インポート先の `export default [..]`
    for import in imports.iter().filter(|i| i.default.is_some()) {
        if let Some(target) = ctx.load_import(&file.path, &import.specifier) {
            routes.extend(arrays_routes(&target, |a| a.default_export));
        }
    }
    routes
}

fn inline_elements(file: &SourceFile) -> Vec<Route> {
    file.facts
        .elements
        .iter()
        .map(|element| {
            Route::new(element.path.clone())
                .with_component(element.component.clone())
                .with_tags(extract_tags_at(&file.code, element.offset))
        })
        .collect()
}

fn typed_object_tree(file: &SourceFile, config: &ScanConfig) -> Vec<Route> {
    let is_typed = |decl: &ArrayDecl| {
        decl.type_name
            .as_ref()
            .is_some_and(|t| config.route_object_types.contains(t))
    };
    // 型付きの配列が 1 つでもあればそれだけを読む
    if file.facts.arrays.iter().any(is_typed) {
        arrays_routes(file, is_typed)
    } else {
        arrays_routes(file, |a| a.name.is_some())
    }
}

fn routes_file(file: &SourceFile, config: &ScanConfig) -> Vec<Route> {
    let is_routes_file = file
        .file_name()
        .is_some_and(|name| config.routes_file_names.iter().any(|n| n == name));
    if !is_routes_file {
        return Vec::new();
    }
    arrays_routes(file, |a| a.name.is_some())
}

fn router_providers(file: &SourceFile, ctx: &ScanContext) -> Vec<Route> {
    let mut routes = Vec::new();
    for usage in &file.facts.providers {
        debug!(
            "<{}> in {} uses {:?}",
            usage.provider,
            file.path.display(),
            usage.builder
        );
        // インライン配列はその場で、識別子は宣言かインポート先を辿る
        match &usage.routes {
            ArrayRef::Inline(objects) => routes.extend(file.routes_from(objects)),
            ArrayRef::Named(name) => routes.extend(referenced_array(file, name, ctx)),
        }
    }
    routes
}

/// `name` が指す配列のルート。
/// 同一ファイルの宣言を優先し、次に `name` を export しているインポート先
fn referenced_array(file: &SourceFile, name: &str, ctx: &ScanContext) -> Vec<Route> {
    if let Some(decl) = file.facts.array_named(name) {
        return file.routes_from(&decl.objects);
    }

    for import in &file.facts.imports {
        // `name` を束縛していないインポートは飛ばす
        let Some(binding) = import.binding_of(name) else {
            continue;
        };
        let Some(target) = ctx.load_import(&file.path, &import.specifier) else {
            continue;
        };
        let decl = match binding {
            Some(imported) => target
                .facts
                .arrays
                .iter()
                .find(|a| a.exported && a.name.as_deref() == Some(imported)),
            None => target.facts.arrays.iter().find(|a| a.default_export),
        };
        if let Some(decl) = decl {
            return target.routes_from(&decl.objects);
        }
    }

    debug!("no route array named {name} for {}", file.path.display());
    Vec::new()
}
