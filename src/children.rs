// src/children.rs
//! ルートオブジェクトと入れ子の `children: [...]` ブロックを
//! ソーステキストから直接読む。

use std::ops::Range;

use crate::brackets::{matching_close, object_property, split_top_level, string_literal};
use crate::facts::RouteObject;
use crate::patterns::catalog;

/// `open`..=`close` の配列要素のうちルートオブジェクトであるもの。
/// path を持たず children だけを持つオブジェクト (レイアウトルート) は
/// その位置に子を展開する
pub fn array_objects(code: &str, open: usize, close: usize) -> Vec<RouteObject> {
    let mut objects = Vec::new();
    for item in split_top_level(code, open, close) {
        if code.as_bytes()[item.start] == b'{' {
            collect_object(code, item.start, &mut objects);
        }
    }
    objects
}

fn collect_object(code: &str, open: usize, out: &mut Vec<RouteObject>) {
    let Some(close) = matching_close(code, open) else {
        return;
    };
    let object = open..close + 1;
    let path = object_property(code, object.clone(), "path")
        .and_then(|value| string_literal(&code[value]))
        .map(str::trim)
        .filter(|path| !path.is_empty());
    let children = child_objects(code, object);

    match path {
        Some(path) => out.push(RouteObject {
            path: path.to_string(),
            offset: open,
            children,
        }),
        None => out.extend(children.unwrap_or_default()),
    }
}

/// `object` の `children` 配列にあるルートオブジェクト。
/// ブロックがない、括弧が閉じていない、ルートがない場合は None
pub fn child_objects(code: &str, object: Range<usize>) -> Option<Vec<RouteObject>> {
    if !catalog().children_block.is_match(&code[object.clone()]) {
        return None;
    }
    let value = object_property(code, object, "children")?;
    if code.as_bytes()[value.start] != b'[' {
        return None;
    }
    let close = matching_close(code, value.start)?;
    let children = array_objects(code, value.start, close);
    (!children.is_empty()).then_some(children)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Route;

    fn object_span(code: &str, needle: &str) -> Range<usize> {
        let open = code.find(needle).unwrap();
        open..matching_close(code, open).unwrap() + 1
    }

    #[test]
    fn nested_children_keep_order_and_depth() {
        let code = "const routes = [
  { path: '/app', children: [
    // @tags dash
    { path: '/app/dash', children: [ { path: 'stats' } ] },
    { path: '/app/settings' },
  ] }
];";
        let children: Vec<Route> = child_objects(code, object_span(code, "{ path: '/app'"))
            .unwrap()
            .iter()
            .map(|c| c.to_route(code))
            .collect();
        let paths: Vec<&str> = children.iter().map(|c| c.path.as_str()).collect();
        assert_eq!(paths, vec!["/app/dash", "/app/settings"]);
        assert_eq!(children[0].tags, vec!["dash"]);
        let grand = children[0].children.as_ref().unwrap();
        assert_eq!(grand[0].path, "stats");
        assert!(children[1].children.is_none());
    }

    #[test]
    fn no_children_block_is_absent() {
        let code = "{ path: '/a', element: <A/> }";
        assert!(child_objects(code, 0..code.len()).is_none());
    }

    #[test]
    fn unbalanced_children_block_is_absent() {
        let code = "{ path: '/a', children: [ { path: '/b' ) }";
        assert!(child_objects(code, 0..code.len()).is_none());
    }

    #[test]
    fn layout_children_are_hoisted() {
        let code = "[ { element: <Layout/>, children: [ { path: '/x' }, { index: true } ] } ]";
        let close = matching_close(code, 0).unwrap();
        let objects = array_objects(code, 0, close);
        assert_eq!(objects.len(), 1);
        assert_eq!(objects[0].path, "/x");
    }
}
