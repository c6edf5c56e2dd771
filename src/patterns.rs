// src/patterns.rs
//! 認識するルート宣言の形ごとの名前付きテキストパターン。
//!
//! 構文バックエンドはほとんど使わず、テキストバックエンド、
//! タグ抽出、テンプレートのマークアップ走査で使う。
//! どれも一度だけコンパイルし、読み取り専用で共有する。

use once_cell::sync::Lazy;
use regex::Regex;

const IDENT: &str = r"[A-Za-z_$][\w$]*";

pub struct PatternCatalog {
    /// インラインルート要素の開始 `<Route`
    pub route_element: Regex,
    /// `path="..."`, `path='...'` or `path={"..."}`; groups `dq`, `sq`, `ex`
    pub path_attribute: Regex,
    /// 描画対象 `element={`
    pub element_attribute: Regex,
    /// 描画対象 `component={`
    pub component_attribute: Regex,
    /// `[export] const NAME[: TYPE[] | Array<TYPE>] = [`;
    /// groups `export`, `name`, `type`, `generic`
    pub array_declaration: Regex,
    /// `export default [`
    pub export_default_array: Regex,
    /// `export default NAME`; group `name`
    pub export_default_identifier: Regex,
    /// `export { a, b as c }`; groups `names`, `from`
    pub export_list: Regex,
    /// `import CLAUSE from 'SOURCE'`; groups `clause`, `source`
    pub import_declaration: Regex,
    /// インポート句内の `{ a, b as c }`; group `names`
    pub import_named: Regex,
    /// インポート句先頭の default 束縛; group `name`
    pub import_default: Regex,
    /// `@tags a, b`; group `tags`
    pub tag_marker: Regex,
    /// `children: [`
    pub children_block: Regex,
    /// `<RouterProvider` / `<RoutingProvider`; group `provider`
    pub router_provider: Regex,
    /// `router={` / `routes={`; group `attr`
    pub provider_attribute: Regex,
    pub hash_router: Regex,
    pub browser_router: Regex,
    pub memory_router: Regex,
    pub routes_from_elements: Regex,
    /// 先頭の識別子; group `name`
    pub identifier: Regex,
    /// `<router-link to="...">` / `<RouterLink to='...'>`; groups `dq`, `sq`
    pub router_link: Regex,
    /// `<template ...>` or `</template>`; group `close`
    pub template_tag: Regex,
    /// `<script>..</script>` / `<style>..</style>` / `<!-- .. -->` ブロック
    pub opaque_block: Regex,
}

impl PatternCatalog {
    fn new() -> Self {
        PatternCatalog {
            route_element: compile(r"<\s*Route\b"),
            path_attribute: compile(
                r#"\bpath\s*=\s*(?:"(?P<dq>[^"]*)"|'(?P<sq>[^']*)'|\{\s*["'`](?P<ex>[^"'`]*)["'`]\s*\})"#,
            ),
            element_attribute: compile(r"\belement\s*=\s*\{"),
            component_attribute: compile(r"\bcomponent\s*=\s*\{"),
            array_declaration: compile(&format!(
                r"(?P<export>\bexport\s+)?\b(?:const|let|var)\s+(?P<name>{IDENT})\s*(?::\s*(?:(?P<type>{IDENT}(?:\.{IDENT})*)\s*\[\s*\]|Array\s*<\s*(?P<generic>{IDENT}(?:\.{IDENT})*)\s*>)\s*)?=\s*\["
            )),
            export_default_array: compile(r"\bexport\s+default\s+\["),
            export_default_identifier: compile(&format!(
                r"(?m)\bexport\s+default\s+(?P<name>{IDENT})\s*;?\s*$"
            )),
            export_list: compile(r"\bexport\s*\{(?P<names>[^}]*)\}(?P<from>\s*from\b)?"),
            import_declaration: compile(
                r#"(?m)^\s*import\s+(?P<clause>[^'";]*?)\s*from\s*['"](?P<source>[^'"]+)['"]"#,
            ),
            import_named: compile(r"\{(?P<names>[^}]*)\}"),
            import_default: compile(&format!(r"^\s*(?P<name>{IDENT})\s*(?:,|$)")),
            tag_marker: compile(r"@tags\s+(?P<tags>.+)"),
            children_block: compile(r"\bchildren\s*:\s*\["),
            router_provider: compile(r"<\s*(?P<provider>RouterProvider|RoutingProvider)\b"),
            provider_attribute: compile(r"\b(?P<attr>router|routes)\s*=\s*\{"),
            hash_router: compile(r"\bcreateHashRouter\s*\("),
            browser_router: compile(r"\bcreateBrowserRouter\s*\("),
            memory_router: compile(r"\bcreateMemoryRouter\s*\("),
            routes_from_elements: compile(r"\bcreateRoutesFromElements\s*\("),
            identifier: compile(&format!(r"^\s*(?P<name>{IDENT})")),
            router_link: compile(
                r#"<(?:router-link|RouterLink)\b[^>]*?\sto\s*=\s*(?:"(?P<dq>[^"]+)"|'(?P<sq>[^']+)')"#,
            ),
            template_tag: compile(r"<(?P<close>/)?template\b[^>]*>"),
            opaque_block: compile(
                r"(?s)<script\b[^>]*>.*?</script\s*>|<style\b[^>]*>.*?</style\s*>|<!--.*?-->",
            ),
        }
    }

    /// フィールド名でパターンを引く
    pub fn lookup(&self, name: &str) -> Option<&Regex> {
        let regex = match name {
            "route_element" => &self.route_element,
            "path_attribute" => &self.path_attribute,
            "element_attribute" => &self.element_attribute,
            "component_attribute" => &self.component_attribute,
            "array_declaration" => &self.array_declaration,
            "export_default_array" => &self.export_default_array,
            "export_default_identifier" => &self.export_default_identifier,
            "export_list" => &self.export_list,
            "import_declaration" => &self.import_declaration,
            "import_named" => &self.import_named,
            "import_default" => &self.import_default,
            "tag_marker" => &self.tag_marker,
            "children_block" => &self.children_block,
            "router_provider" => &self.router_provider,
            "provider_attribute" => &self.provider_attribute,
            "hash_router" => &self.hash_router,
            "browser_router" => &self.browser_router,
            "memory_router" => &self.memory_router,
            "routes_from_elements" => &self.routes_from_elements,
            "identifier" => &self.identifier,
            "router_link" => &self.router_link,
            "template_tag" => &self.template_tag,
            "opaque_block" => &self.opaque_block,
            _ => return None,
        };
        Some(regex)
    }
}

// パターンはリテラルで、下のテストでコンパイルを確認している
fn compile(pattern: &str) -> Regex {
    match Regex::new(pattern) {
        Ok(regex) => regex,
        Err(err) => panic!("invalid catalog pattern {pattern:?}: {err}"),
    }
}

static CATALOG: Lazy<PatternCatalog> = Lazy::new(PatternCatalog::new);

pub fn catalog() -> &'static PatternCatalog {
    &CATALOG
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_entry_is_reachable_by_name() {
        for name in [
            "route_element",
            "path_attribute",
            "element_attribute",
            "component_attribute",
            "array_declaration",
            "export_default_array",
            "export_default_identifier",
            "export_list",
            "import_declaration",
            "import_named",
            "import_default",
            "tag_marker",
            "children_block",
            "router_provider",
            "provider_attribute",
            "hash_router",
            "browser_router",
            "memory_router",
            "routes_from_elements",
            "identifier",
            "router_link",
            "template_tag",
            "opaque_block",
        ] {
            assert!(catalog().lookup(name).is_some(), "{name}");
        }
        assert!(catalog().lookup("nope").is_none());
    }

    #[test]
    fn array_declaration_captures_export_and_type() {
        let caps = catalog()
            .array_declaration
            .captures("export const appRoutes: RouteObject[] = [")
            .unwrap();
        assert!(caps.name("export").is_some());
        assert_eq!(&caps["name"], "appRoutes");
        assert_eq!(&caps["type"], "RouteObject");

        let caps = catalog()
            .array_declaration
            .captures("let routes: Array<RoutesObject> = [")
            .unwrap();
        assert!(caps.name("export").is_none());
        assert_eq!(&caps["generic"], "RoutesObject");

        assert!(catalog().array_declaration.captures("const routes = {").is_none());
    }

    #[test]
    fn route_element_does_not_match_routes_container() {
        assert!(catalog().route_element.is_match(r#"<Route path="/a" />"#));
        assert!(!catalog().route_element.is_match("<Routes>"));
    }

    #[test]
    fn import_declaration_spans_multiline_clauses() {
        let src = "import {\n  appRoutes,\n  other as alias\n} from './routes';";
        let caps = catalog().import_declaration.captures(src).unwrap();
        assert_eq!(&caps["source"], "./routes");
        let named = catalog().import_named.captures(&caps["clause"]).unwrap();
        assert!(named["names"].contains("other as alias"));
    }

    #[test]
    fn router_link_ignores_bound_targets() {
        let link = catalog();
        assert!(link.router_link.is_match(r#"<router-link class="x" to="/about">"#));
        assert!(!link.router_link.is_match(r#"<router-link :to="{ name: 'x' }">"#));
    }
}
