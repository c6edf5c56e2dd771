// src/parser.rs
use std::collections::HashMap;
use std::path::Path;

use swc_common::{sync::Lrc, BytePos, FileName, SourceMap, Span, Spanned};
use swc_ecma_ast::*;
use swc_ecma_parser::{lexer::Lexer, EsConfig, Parser as SwcParser, StringInput, Syntax, TsConfig};
use swc_ecma_visit::{Visit, VisitWith};
use tracing::debug;

use crate::error::SourceError;
use crate::facts::{
    ArrayDecl, ArrayRef, Backend, FileFacts, ImportBinding, ImportFact, ProviderUsage,
    RouteElement, RouteObject, RouterBuilder,
};

/// SWC のモジュールを辿り、ルート探索に必要な宣言
/// (ルート配列、インラインの `<Route>` 要素、インポート、
/// ルータープロバイダー) を記録する Visitor
struct FactVisitor<'a> {
    /// 訪問中のファイルのテキスト (span からコンポーネントのソースを切り出す)
    code: &'a str,
    /// SourceMap 上でのファイル先頭の位置
    start: BytePos,
    /// `export const` の宣言を訪問している間だけ true
    exporting: bool,
    facts: FileFacts,
    /// `export { .. }` に挙がった名前
    listed_exports: Vec<String>,
    /// `export default name` で export された名前
    default_exports: Vec<String>,
    /// `const router = createXRouter(..)` の束縛
    builder_bindings: HashMap<String, (RouterBuilder, Option<ArrayRef>)>,
    /// 属性が単なる識別子のプロバイダー: (provider, attribute, identifier)
    provider_refs: Vec<(String, &'static str, String)>,
}

impl<'a> FactVisitor<'a> {
    fn new(code: &'a str, start: BytePos) -> Self {
        FactVisitor {
            code,
            start,
            exporting: false,
            facts: FileFacts::empty(Backend::Syntax),
            listed_exports: Vec::new(),
            default_exports: Vec::new(),
            builder_bindings: HashMap::new(),
            provider_refs: Vec::new(),
        }
    }

    fn offset(&self, pos: BytePos) -> usize {
        pos.0.saturating_sub(self.start.0) as usize
    }

    fn source_text(&self, span: Span) -> Option<&'a str> {
        self.code.get(self.offset(span.lo)..self.offset(span.hi))
    }

    /// 配列要素のうちルートオブジェクトであるもの。
    /// path のないレイアウトオブジェクトは children を引き上げる
    fn route_objects(&self, elems: &[Option<ExprOrSpread>]) -> Vec<RouteObject> {
        let mut objects = Vec::new();
        for elem in elems.iter().flatten() {
            if elem.spread.is_some() {
                continue; // `...others` は展開先が分からないので無視
            }
            if let Expr::Object(obj) = unwrap_expr(&elem.expr) {
                self.route_object(obj, &mut objects);
            }
        }
        objects
    }

    fn route_object(&self, obj: &ObjectLit, out: &mut Vec<RouteObject>) {
        let mut path: Option<String> = None;
        let mut children: Option<Vec<RouteObject>> = None;

        // 1) `path` と `children` プロパティを探す
        for prop in &obj.props {
            let PropOrSpread::Prop(prop) = prop else {
                continue;
            };
            let Prop::KeyValue(KeyValueProp { key, value }) = &**prop else {
                continue;
            };
            match prop_key(key).as_deref() {
                Some("path") => path = string_value(value),
                Some("children") => {
                    if let Expr::Array(arr) = unwrap_expr(value) {
                        children = Some(self.route_objects(&arr.elems));
                    }
                }
                _ => {}
            }
        }

        // 2) path があればルート、なければ children をこの位置に展開
        let children = children.filter(|c| !c.is_empty());
        match path.as_deref().map(str::trim).filter(|p| !p.is_empty()) {
            Some(path) => out.push(RouteObject {
                path: path.to_string(),
                offset: self.offset(obj.span.lo),
                children,
            }),
            None => out.extend(children.unwrap_or_default()),
        }
    }

    /// `createXRouter(arg)` の引数が識別子かインライン配列なら
    /// それをルートの出どころとして返す
    fn builder_call(&self, expr: &Expr) -> Option<(RouterBuilder, Option<ArrayRef>)> {
        let Expr::Call(call) = unwrap_expr(expr) else {
            return None;
        };
        let Callee::Expr(callee) = &call.callee else {
            return None;
        };
        let Expr::Ident(callee) = &**callee else {
            return None;
        };
        let builder = RouterBuilder::from_callee(&callee.sym)?;
        let routes = call
            .args
            .first()
            .filter(|arg| arg.spread.is_none())
            .and_then(|arg| match unwrap_expr(&arg.expr) {
                Expr::Ident(id) => Some(ArrayRef::Named(id.sym.to_string())),
                Expr::Array(arr) => Some(ArrayRef::Inline(self.route_objects(&arr.elems))),
                _ => None,
            });
        Some((builder, routes))
    }

    fn route_element(&mut self, n: &JSXOpeningElement) {
        let path = jsx_attr(n, "path").and_then(attr_string);
        let Some(path) = path.as_deref().map(str::trim).filter(|p| !p.is_empty()) else {
            return;
        };
        let component = ["element", "component"]
            .into_iter()
            .find_map(|name| jsx_attr(n, name))
            .and_then(|value| self.render_target(value));

        self.facts.elements.push(RouteElement {
            path: path.to_string(),
            component,
            offset: self.offset(n.span.lo),
        });
    }

    fn render_target(&self, value: &JSXAttrValue) -> Option<String> {
        let text = match value {
            JSXAttrValue::Lit(Lit::Str(s)) => Some(s.value.to_string()),
            JSXAttrValue::JSXExprContainer(JSXExprContainer {
                expr: JSXExpr::Expr(expr),
                ..
            }) => self.source_text(expr.span()).map(String::from),
            _ => None,
        }?;
        let text = text.trim();
        (!text.is_empty()).then(|| text.to_string())
    }

    fn provider_element(&mut self, provider: &str, n: &JSXOpeningElement) {
        for attr in ["router", "routes"] {
            let Some(JSXAttrValue::JSXExprContainer(JSXExprContainer {
                expr: JSXExpr::Expr(expr),
                ..
            })) = jsx_attr(n, attr)
            else {
                continue;
            };
            let expr = unwrap_expr(expr);

            // 1) router={createXRouter(..)} のようにビルダーを直接呼んでいる
            if let Some((builder, routes)) = self.builder_call(expr) {
                if let Some(routes) = routes {
                    self.facts.providers.push(ProviderUsage {
                        provider: provider.to_string(),
                        builder: Some(builder),
                        routes,
                    });
                }
                continue;
            }
            // 2) 識別子は finish() でビルダー束縛と照合する
            match expr {
                Expr::Ident(id) => {
                    self.provider_refs
                        .push((provider.to_string(), attr, id.sym.to_string()));
                }
                Expr::Array(arr) if attr == "routes" => {
                    let objects = self.route_objects(&arr.elems);
                    self.facts.providers.push(ProviderUsage {
                        provider: provider.to_string(),
                        builder: None,
                        routes: ArrayRef::Inline(objects),
                    });
                }
                _ => {}
            }
        }
    }

    fn finish(mut self) -> FileFacts {
        // 1) プロバイダーの識別子をビルダー束縛か配列名として解決
        for (provider, attr, ident) in std::mem::take(&mut self.provider_refs) {
            match self.builder_bindings.get(&ident) {
                Some((builder, Some(routes))) => self.facts.providers.push(ProviderUsage {
                    provider,
                    builder: Some(*builder),
                    routes: routes.clone(),
                }),
                Some((_, None)) => {}
                None if attr == "routes" => self.facts.providers.push(ProviderUsage {
                    provider,
                    builder: None,
                    routes: ArrayRef::Named(ident),
                }),
                None => debug!("provider {provider} uses {ident}, not a local router"),
            }
        }
        // 2) export リストに挙がった宣言へ印を付ける
        self.facts
            .apply_exports(&self.listed_exports, &self.default_exports);
        self.facts
    }
}

impl Visit for FactVisitor<'_> {
    fn visit_export_decl(&mut self, n: &ExportDecl) {
        self.exporting = matches!(n.decl, Decl::Var(_));
        n.visit_children_with(self);
        self.exporting = false;
    }

    /// `const`/`let`/`var` で束縛された配列リテラル (深さは問わない)
    fn visit_var_decl(&mut self, n: &VarDecl) {
        let exported = std::mem::take(&mut self.exporting);

        for declarator in &n.decls {
            let Pat::Ident(BindingIdent { id, type_ann }) = &declarator.name else {
                continue;
            };
            let Some(init) = &declarator.init else {
                continue;
            };
            if let Expr::Array(arr) = unwrap_expr(init) {
                // 型注釈、なければ `as` / `satisfies` から要素型を取る
                let type_name = type_ann
                    .as_deref()
                    .and_then(|ann| array_element_type(&ann.type_ann))
                    .or_else(|| asserted_element_type(init));
                let objects = self.route_objects(&arr.elems);
                self.facts.arrays.push(ArrayDecl {
                    name: Some(id.sym.to_string()),
                    exported,
                    default_export: false,
                    type_name,
                    objects,
                });
            }
        }

        n.visit_children_with(self);
    }

    fn visit_var_declarator(&mut self, n: &VarDeclarator) {
        if let (Pat::Ident(BindingIdent { id, .. }), Some(init)) = (&n.name, &n.init) {
            if let Some(binding) = self.builder_call(init) {
                self.builder_bindings.insert(id.sym.to_string(), binding);
            }
        }
        n.visit_children_with(self);
    }

    fn visit_export_default_expr(&mut self, n: &ExportDefaultExpr) {
        match unwrap_expr(&n.expr) {
            Expr::Array(arr) => {
                let objects = self.route_objects(&arr.elems);
                self.facts.arrays.push(ArrayDecl {
                    name: None,
                    default_export: true,
                    objects,
                    ..Default::default()
                });
            }
            Expr::Ident(id) => self.default_exports.push(id.sym.to_string()),
            _ => {}
        }
        n.visit_children_with(self);
    }

    fn visit_named_export(&mut self, n: &NamedExport) {
        if n.src.is_none() {
            for spec in &n.specifiers {
                let ExportSpecifier::Named(ExportNamedSpecifier {
                    orig: ModuleExportName::Ident(orig),
                    exported,
                    ..
                }) = spec
                else {
                    continue;
                };
                let as_default = matches!(
                    exported,
                    Some(ModuleExportName::Ident(e)) if &*e.sym == "default"
                );
                if as_default {
                    self.default_exports.push(orig.sym.to_string());
                } else {
                    self.listed_exports.push(orig.sym.to_string());
                }
            }
        }
        n.visit_children_with(self);
    }

    fn visit_import_decl(&mut self, n: &ImportDecl) {
        if n.type_only {
            return; // `import type` は値を持ち込まない
        }
        let mut fact = ImportFact {
            specifier: n.src.value.to_string(),
            ..Default::default()
        };
        for spec in &n.specifiers {
            match spec {
                ImportSpecifier::Default(default) => {
                    fact.default = Some(default.local.sym.to_string());
                }
                ImportSpecifier::Named(named) if !named.is_type_only => {
                    let local = named.local.sym.to_string();
                    let imported = match &named.imported {
                        Some(ModuleExportName::Ident(i)) => i.sym.to_string(),
                        Some(ModuleExportName::Str(s)) => s.value.to_string(),
                        None => local.clone(),
                    };
                    fact.named.push(ImportBinding { imported, local });
                }
                _ => {}
            }
        }
        if fact.default.is_some() || !fact.named.is_empty() {
            self.facts.imports.push(fact);
        }
    }

    fn visit_jsx_opening_element(&mut self, n: &JSXOpeningElement) {
        if let JSXElementName::Ident(name) = &n.name {
            match &*name.sym {
                "Route" => self.route_element(n),
                provider @ ("RouterProvider" | "RoutingProvider") => {
                    self.provider_element(provider, n)
                }
                _ => {}
            }
        }
        n.visit_children_with(self);
    }
}

/// 文字列値の `path` プロパティをすべて集める (深さは問わない)
struct PathPropertyVisitor {
    paths: Vec<String>,
}

impl Visit for PathPropertyVisitor {
    fn visit_key_value_prop(&mut self, n: &KeyValueProp) {
        if prop_key(&n.key).as_deref() == Some("path") {
            if let Expr::Lit(Lit::Str(s)) = &*n.value {
                self.paths.push(s.value.to_string());
            }
        }
        n.visit_children_with(self);
    }
}

fn unwrap_expr(mut expr: &Expr) -> &Expr {
    loop {
        expr = match expr {
            Expr::Paren(ParenExpr { expr, .. })
            | Expr::TsAs(TsAsExpr { expr, .. })
            | Expr::TsSatisfies(TsSatisfiesExpr { expr, .. })
            | Expr::TsConstAssertion(TsConstAssertion { expr, .. })
            | Expr::TsNonNull(TsNonNullExpr { expr, .. }) => &**expr,
            _ => return expr,
        };
    }
}

fn prop_key(key: &PropName) -> Option<String> {
    match key {
        PropName::Ident(ident) => Some(ident.sym.to_string()),
        PropName::Str(s) => Some(s.value.to_string()),
        _ => None,
    }
}

fn string_value(expr: &Expr) -> Option<String> {
    match unwrap_expr(expr) {
        Expr::Lit(Lit::Str(s)) => Some(s.value.to_string()),
        Expr::Tpl(tpl) if tpl.exprs.is_empty() => tpl.quasis.first().map(|q| q.raw.to_string()),
        _ => None,
    }
}

fn jsx_attr<'n>(n: &'n JSXOpeningElement, name: &str) -> Option<&'n JSXAttrValue> {
    n.attrs.iter().find_map(|attr| match attr {
        JSXAttrOrSpread::JSXAttr(JSXAttr {
            name: JSXAttrName::Ident(ident),
            value,
            ..
        }) if &*ident.sym == name => value.as_ref(),
        _ => None,
    })
}

fn attr_string(value: &JSXAttrValue) -> Option<String> {
    match value {
        JSXAttrValue::Lit(Lit::Str(s)) => Some(s.value.to_string()),
        JSXAttrValue::JSXExprContainer(JSXExprContainer {
            expr: JSXExpr::Expr(expr),
            ..
        }) => string_value(expr),
        _ => None,
    }
}

/// `T[]` / `Array<T>` から `T` を取り出す
fn array_element_type(ty: &TsType) -> Option<String> {
    match ty {
        TsType::TsArrayType(arr) => type_ref_name(&arr.elem_type),
        TsType::TsTypeRef(r) if entity_name(&r.type_name).as_deref() == Some("Array") => {
            type_ref_name(r.type_params.as_ref()?.params.first()?)
        }
        _ => None,
    }
}

/// `[...] satisfies T[]` / `[...] as T[]` から要素型を取り出す
fn asserted_element_type(expr: &Expr) -> Option<String> {
    match expr {
        Expr::TsSatisfies(e) => array_element_type(&e.type_ann),
        Expr::TsAs(e) => array_element_type(&e.type_ann),
        Expr::Paren(e) => asserted_element_type(&e.expr),
        _ => None,
    }
}

fn type_ref_name(ty: &TsType) -> Option<String> {
    match ty {
        TsType::TsTypeRef(r) => entity_name(&r.type_name),
        _ => None,
    }
}

fn entity_name(name: &TsEntityName) -> Option<String> {
    match name {
        TsEntityName::Ident(ident) => Some(ident.sym.to_string()),
        TsEntityName::TsQualifiedName(q) => Some(q.right.sym.to_string()),
    }
}

/// `.ts`/`.tsx` は TypeScript (JSX は `.tsx` のみ)、
/// それ以外は JSX 付きの ECMAScript として構文を選ぶ
pub fn syntax_for(path: &Path) -> Syntax {
    match path.extension().and_then(|e| e.to_str()) {
        Some("ts" | "mts" | "cts") => Syntax::Typescript(TsConfig {
            tsx: false,
            decorators: true,
            ..Default::default()
        }),
        Some("tsx") => Syntax::Typescript(TsConfig {
            tsx: true,
            decorators: true,
            ..Default::default()
        }),
        _ => Syntax::Es(EsConfig {
            jsx: true,
            ..Default::default()
        }),
    }
}

pub fn parse_module(path: &Path, code: &str) -> Result<(Module, BytePos), SourceError> {
    let cm: Lrc<SourceMap> = Default::default();
    let fm = cm.new_source_file(FileName::Real(path.to_path_buf()), code.to_string());

    let lexer = Lexer::new(
        syntax_for(path),
        Default::default(), // es version
        StringInput::from(&*fm),
        None,
    );
    let mut parser = SwcParser::new_from(lexer);

    let module = parser.parse_module().map_err(|e| SourceError::Parse {
        path: path.to_path_buf(),
        message: format!("{:?}", e.kind()),
    })?;

    Ok((module, fm.start_pos))
}

/// 1 ファイルの構文木からソースファクトを作る
///
/// - path: 構文選択とエラーメッセージに使うパス
/// - code: ファイルの中身
///
/// 戻り値: パースに失敗したら `SourceError::Parse`
pub fn collect_facts(path: &Path, code: &str) -> Result<FileFacts, SourceError> {
    let (module, start) = parse_module(path, code)?;

    let mut visitor = FactVisitor::new(code, start);
    visitor.visit_module(&module);
    let facts = visitor.finish();

    debug!(
        "{}: {} arrays, {} route elements, {} imports, {} providers",
        path.display(),
        facts.arrays.len(),
        facts.elements.len(),
        facts.imports.len(),
        facts.providers.len()
    );
    Ok(facts)
}

/// ルーター設定モジュール内の `path` プロパティの文字列値をすべて返す
pub fn collect_path_properties(path: &Path, code: &str) -> Result<Vec<String>, SourceError> {
    let (module, _) = parse_module(path, code)?;
    let mut visitor = PathPropertyVisitor { paths: Vec::new() };
    visitor.visit_module(&module);
    Ok(visitor.paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn facts(name: &str, code: &str) -> FileFacts {
        collect_facts(&PathBuf::from(name), code).unwrap()
    }

    #[test]
    fn exported_and_local_arrays_are_told_apart() {
        let facts = facts(
            "routes.tsx",
            r#"
export const publicRoutes: RouteObject[] = [{ path: "/" }];
const privateRoutes = [{ path: "/admin" }];
const extra = [{ path: "/extra" }];
export { extra };
"#,
        );
        assert_eq!(facts.backend, Backend::Syntax);
        let public = facts.array_named("publicRoutes").unwrap();
        assert!(public.exported);
        assert_eq!(public.type_name.as_deref(), Some("RouteObject"));
        assert!(facts.array_named("privateRoutes").unwrap().is_local());
        assert!(facts.array_named("extra").unwrap().exported);
    }

    #[test]
    fn nested_function_arrays_are_not_exported() {
        let facts = facts(
            "App.tsx",
            "export const build = () => { const inner = [{ path: '/in' }]; return inner; };",
        );
        assert!(facts.array_named("inner").unwrap().is_local());
    }

    #[test]
    fn route_element_component_is_source_text() {
        let facts = facts(
            "App.jsx",
            r#"const App = () => <Routes><Route path="/about" element={<About />} /></Routes>;"#,
        );
        assert_eq!(facts.elements.len(), 1);
        assert_eq!(facts.elements[0].path, "/about");
        assert_eq!(facts.elements[0].component.as_deref(), Some("<About />"));
    }

    #[test]
    fn provider_through_router_binding() {
        let facts = facts(
            "main.tsx",
            r#"
import { routes } from "./routes";
const router = createBrowserRouter(routes);
export default function Root() { return <RouterProvider router={router} />; }
"#,
        );
        assert_eq!(facts.providers.len(), 1);
        assert_eq!(facts.providers[0].builder, Some(RouterBuilder::Browser));
        assert!(matches!(&facts.providers[0].routes, ArrayRef::Named(n) if n == "routes"));
        assert_eq!(facts.imports[0].binding_of("routes"), Some(Some("routes")));
    }

    #[test]
    fn type_only_imports_are_ignored() {
        let facts = facts(
            "a.ts",
            "import type { RouteObject } from 'react-router-dom';\nimport x from './x';",
        );
        assert_eq!(facts.imports.len(), 1);
        assert_eq!(facts.imports[0].default.as_deref(), Some("x"));
    }

    #[test]
    fn path_properties_are_collected_at_any_depth() {
        let paths = collect_path_properties(
            &PathBuf::from("router/index.js"),
            "export default createRouter({ routes: [{ path: '/', children: [{ 'path': 'nested' }] }, { path: dynamic }] })",
        )
        .unwrap();
        assert_eq!(paths, vec!["/", "nested"]);
    }

    #[test]
    fn syntax_errors_are_reported() {
        let err = collect_facts(&PathBuf::from("bad.ts"), "const = [").unwrap_err();
        assert!(matches!(err, SourceError::Parse { .. }));
    }
}
