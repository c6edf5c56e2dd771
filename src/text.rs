// src/text.rs
//! 構文バックエンドが扱えないファイル (断片的なソース、未対応の構文) 向けに、
//! テキストパターンだけでソースファクトを作る。

use std::ops::Range;

use regex::Regex;

use crate::brackets::{jsx_tag_end, matching_close};
use crate::children::array_objects;
use crate::facts::{
    ArrayDecl, ArrayRef, Backend, FileFacts, ImportBinding, ImportFact, ProviderUsage,
    RouteElement, RouterBuilder,
};
use crate::patterns::catalog;

/// 1 ファイルのテキストからソースファクトを作る (構文バックエンドと同じ形)
pub fn collect_facts(code: &str) -> FileFacts {
    let mut facts = FileFacts::empty(Backend::Text);
    facts.arrays = array_decls(code);
    let (listed, defaults) = export_names(code);
    facts.apply_exports(&listed, &defaults);
    facts.elements = route_elements(code);
    facts.imports = imports(code);
    facts.providers = providers(code);
    facts
}

fn array_decls(code: &str) -> Vec<ArrayDecl> {
    let catalog = catalog();
    let mut arrays = Vec::new();

    // 1) `const NAME = [` 形式の宣言
    for caps in catalog.array_declaration.captures_iter(code) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        let open = whole.end() - 1; // マッチ末尾の `[`
        let Some(close) = matching_close(code, open) else {
            continue;
        };
        // `Routes.RouteObject[]` のような修飾名は最後の要素だけを見る
        let type_name = caps
            .name("type")
            .or_else(|| caps.name("generic"))
            .and_then(|m| m.as_str().rsplit('.').next())
            .map(String::from);
        arrays.push(ArrayDecl {
            name: Some(caps["name"].to_string()),
            exported: caps.name("export").is_some(),
            default_export: false,
            type_name,
            objects: array_objects(code, open, close),
        });
    }

    // 2) `export default [` 形式の宣言
    for m in catalog.export_default_array.find_iter(code) {
        let open = m.end() - 1;
        let Some(close) = matching_close(code, open) else {
            continue;
        };
        arrays.push(ArrayDecl {
            name: None,
            default_export: true,
            objects: array_objects(code, open, close),
            ..Default::default()
        });
    }
    arrays
}

/// `export { .. }` と `export default name` で export された名前
fn export_names(code: &str) -> (Vec<String>, Vec<String>) {
    let catalog = catalog();
    let mut listed = Vec::new();
    let mut defaults = Vec::new();

    for caps in catalog.export_list.captures_iter(code) {
        if caps.name("from").is_some() {
            continue;
        }
        for binding in parse_bindings(&caps["names"]) {
            if binding.local == "default" {
                defaults.push(binding.imported);
            } else {
                listed.push(binding.imported);
            }
        }
    }
    for caps in catalog.export_default_identifier.captures_iter(code) {
        defaults.push(caps["name"].to_string());
    }
    (listed, defaults)
}

/// 名前付きインポートの束縛を取り出す
/// 例: `a, b as c, type D` → `a` と `b`→`c`
fn parse_bindings(names: &str) -> Vec<ImportBinding> {
    names
        .split(',')
        .filter_map(|item| {
            let parts: Vec<&str> = item.split_whitespace().collect();
            match parts.as_slice() {
                [name] => Some((*name, *name)),
                [imported, "as", local] if *imported != "type" => Some((*imported, *local)),
                _ => None,
            }
        })
        .map(|(imported, local)| ImportBinding {
            imported: imported.to_string(),
            local: local.to_string(),
        })
        .collect()
}

fn route_elements(code: &str) -> Vec<RouteElement> {
    let catalog = catalog();
    let mut elements = Vec::new();

    for m in catalog.route_element.find_iter(code) {
        let start = m.start();
        let Some(end) = jsx_tag_end(code, start) else {
            continue;
        };
        let tag = &code[start..=end];
        let Some(caps) = catalog.path_attribute.captures(tag) else {
            continue;
        };
        let path = ["dq", "sq", "ex"]
            .into_iter()
            .find_map(|group| caps.name(group))
            .map(|m| m.as_str().trim())
            .filter(|path| !path.is_empty());
        let Some(path) = path else {
            continue;
        };
        elements.push(RouteElement {
            path: path.to_string(),
            component: render_target(tag),
            offset: start,
        });
    }
    elements
}

fn render_target(tag: &str) -> Option<String> {
    let catalog = catalog();
    for pattern in [&catalog.element_attribute, &catalog.component_attribute] {
        let Some(m) = pattern.find(tag) else {
            continue;
        };
        let open = m.end() - 1;
        let Some(close) = matching_close(tag, open) else {
            continue;
        };
        let inner = tag[open + 1..close].trim();
        if !inner.is_empty() {
            return Some(inner.to_string());
        }
    }
    None
}

fn imports(code: &str) -> Vec<ImportFact> {
    let catalog = catalog();
    let mut imports = Vec::new();

    for caps in catalog.import_declaration.captures_iter(code) {
        let clause = caps["clause"].trim();
        // `import type ...` は値を持ち込まない
        if clause.strip_prefix("type").is_some_and(|rest| {
            rest.starts_with(|c: char| c.is_whitespace() || c == '{')
        }) {
            continue;
        }
        let fact = ImportFact {
            specifier: caps["source"].to_string(),
            default: catalog
                .import_default
                .captures(clause)
                .map(|c| c["name"].to_string()),
            named: catalog
                .import_named
                .captures(clause)
                .map(|c| parse_bindings(&c["names"]))
                .unwrap_or_default(),
        };
        if fact.default.is_some() || !fact.named.is_empty() {
            imports.push(fact);
        }
    }
    imports
}

fn providers(code: &str) -> Vec<ProviderUsage> {
    let catalog = catalog();
    let mut usages = Vec::new();

    for caps in catalog.router_provider.captures_iter(code) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        let start = whole.start();
        let Some(end) = jsx_tag_end(code, start) else {
            continue;
        };
        let Some(attr) = catalog.provider_attribute.captures(&code[start..=end]) else {
            continue;
        };
        let Some(attr_match) = attr.get(0) else {
            continue;
        };
        let open = start + attr_match.end() - 1;
        let Some(close) = matching_close(code, open) else {
            continue;
        };
        let usage = provider_usage(code, &caps["provider"], &attr["attr"], open + 1..close);
        usages.extend(usage);
    }
    usages
}

fn provider_usage(
    code: &str,
    provider: &str,
    attr: &str,
    content: Range<usize>,
) -> Option<ProviderUsage> {
    // 1) 属性内でビルダーを直接呼んでいる
    if let Some((builder, open)) = find_builder(code, content.clone()) {
        return Some(ProviderUsage {
            provider: provider.to_string(),
            builder: Some(builder),
            routes: builder_argument(code, open)?,
        });
    }

    // 2) 属性が識別子だけなら、ビルダー束縛か配列名として扱う
    let ident = catalog().identifier.captures(&code[content.clone()])?["name"].to_string();
    if code[content].trim() != ident {
        return None;
    }
    if let Some((builder, open)) = builder_binding(code, &ident) {
        return Some(ProviderUsage {
            provider: provider.to_string(),
            builder: Some(builder),
            routes: builder_argument(code, open)?,
        });
    }
    (attr == "routes").then(|| ProviderUsage {
        provider: provider.to_string(),
        builder: None,
        routes: ArrayRef::Named(ident),
    })
}

/// `range` 内で最初のルータービルダー呼び出しと、その `(` の位置
fn find_builder(code: &str, range: Range<usize>) -> Option<(RouterBuilder, usize)> {
    let haystack = &code[range.clone()];
    RouterBuilder::ALL
        .into_iter()
        .filter_map(|builder| builder.pattern().find(haystack).map(|m| (builder, m)))
        .min_by_key(|(_, m)| m.start())
        .map(|(builder, m)| (builder, range.start + m.end() - 1))
}

/// ファイル内の `const ident = createXRouter(` を探す
fn builder_binding(code: &str, ident: &str) -> Option<(RouterBuilder, usize)> {
    let binding = Regex::new(&format!(
        r"\b(?:const|let|var)\s+{}\s*(?::[^=]*)?=\s*",
        regex::escape(ident)
    ))
    .ok()?;
    binding.find_iter(code).find_map(|m| {
        RouterBuilder::ALL.into_iter().find_map(|builder| {
            let call = builder.pattern().find_at(code, m.end())?;
            (call.start() == m.end()).then(|| (builder, call.end() - 1))
        })
    })
}

/// `(` が `open` にあるビルダー呼び出しのルート引数
fn builder_argument(code: &str, open: usize) -> Option<ArrayRef> {
    let close = matching_close(code, open)?;
    let args = &code[open + 1..close];
    let arg_start = open + 1 + (args.len() - args.trim_start().len());

    if code.as_bytes().get(arg_start) == Some(&b'[') {
        let array_close = matching_close(code, arg_start)?;
        return Some(ArrayRef::Inline(array_objects(code, arg_start, array_close)));
    }
    let ident = catalog().identifier.captures(args)?["name"].to_string();
    let rest = args.trim_start()[ident.len()..].trim_start();
    (rest.is_empty() || rest.starts_with(',')).then_some(ArrayRef::Named(ident))
}
