// src/template.rs
//! テンプレート系 (Vue): 単一ファイルコンポーネントの
//! `<router-link>` の遷移先と、ルーター設定モジュールの `path` プロパティ。

use std::ops::Range;
use std::path::Path;

use crate::error::SourceError;
use crate::model::Route;
use crate::parser::collect_path_properties;
use crate::patterns::catalog;

/// トップレベルの `<template>` ブロックの中身 (入れ子の template を含む)。
/// `<script>` / `<style>` / コメント内のタグと、
/// 対応する開きタグのない閉じタグは数えない
pub fn template_section(markup: &str) -> Option<&str> {
    let catalog = catalog();
    let opaque: Vec<Range<usize>> = catalog
        .opaque_block
        .find_iter(markup)
        .map(|m| m.range())
        .collect();

    let mut depth = 0usize;
    let mut content_start = None;

    for caps in catalog.template_tag.captures_iter(markup) {
        let Some(tag) = caps.get(0) else {
            continue;
        };
        if opaque.iter().any(|block| block.contains(&tag.start())) {
            continue;
        }
        if caps.name("close").is_some() {
            if depth == 0 {
                continue;
            }
            depth -= 1;
            if depth == 0 {
                return content_start.map(|start| &markup[start..tag.start()]);
            }
        } else if !tag.as_str().ends_with("/>") {
            if depth == 0 {
                content_start = Some(tag.end());
            }
            depth += 1;
        }
    }
    None
}

/// コンポーネントのテンプレート内にあるリンクの `to` (リテラルのみ)
pub fn markup_routes(markup: &str) -> Vec<Route> {
    let Some(template) = template_section(markup) else {
        return Vec::new();
    };
    catalog()
        .router_link
        .captures_iter(template)
        .filter_map(|caps| caps.name("dq").or_else(|| caps.name("sq")))
        .map(|target| Route::new(target.as_str()))
        .collect()
}

/// ルーターモジュール内の文字列 `path` プロパティごとのルート
pub fn config_routes(path: &Path, code: &str) -> Result<Vec<Route>, SourceError> {
    Ok(collect_path_properties(path, code)?
        .into_iter()
        .map(Route::new)
        .collect())
}

/// パラメーターそのもののパス (`:id`) は遷移先にならない
pub fn is_dynamic(path: &str) -> bool {
    path.starts_with(':')
}
