// src/model.rs
use indexmap::IndexMap;
use serde::Serialize;
use tracing::trace;

/// 走査したプロジェクトで見つかった 1 つのルート情報を保持する構造体
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Route {
    /// ソースに書かれたままのルートパス (例: "/", "/users/:id", "*")
    pub path: String,

    /// 描画されるコンポーネントのテキスト表現 (例: "<About />")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component: Option<String>,

    /// 宣言の直上にある `// @tags` コメントの値
    pub tags: Vec<String>,

    /// 子ルート。children ブロックから 1 件以上取れたときだけ Some
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<Route>>,
}

impl Route {
    pub fn new(path: impl Into<String>) -> Self {
        Route {
            path: path.into(),
            component: None,
            tags: Vec::new(),
            children: None,
        }
    }

    pub fn with_component(mut self, component: Option<String>) -> Self {
        self.component = component;
        self
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    pub fn with_children(mut self, children: Option<Vec<Route>>) -> Self {
        self.children = children;
        self
    }
}

/// 1 ファイルに対して 1 つの形状パーサーが返したルート列 (宣言順)
#[derive(Debug, Clone)]
pub struct Pass {
    pub label: &'static str,
    pub routes: Vec<Route>,
}

impl Pass {
    pub fn new(label: &'static str, routes: Vec<Route>) -> Self {
        Pass { label, routes }
    }
}

/// パスをキーにしたルート集合。
/// 既存パスへの後からの書き込みはエントリを置き換えるが、
/// 並び順は最初に挿入された位置のまま
#[derive(Debug, Default, Clone)]
pub struct RouteStore {
    routes: IndexMap<String, Route>,
}

impl RouteStore {
    /// パス列を順に畳み込んで 1 つのストアにする (後勝ち)
    pub fn from_passes<I>(passes: I) -> Self
    where
        I: IntoIterator<Item = Pass>,
    {
        passes.into_iter().fold(RouteStore::default(), |mut store, pass| {
            trace!("{}: folding {} route(s)", pass.label, pass.routes.len());
            store.extend(pass.routes);
            store
        })
    }

    pub fn insert(&mut self, route: Route) {
        if route.path.is_empty() {
            return;
        }
        // IndexMap::insert は既存キーの位置を保ったまま値だけ置き換える
        self.routes.insert(route.path.clone(), route);
    }

    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&Route) -> bool,
    {
        self.routes.retain(|_, route| keep(route));
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn into_routes(self) -> Vec<Route> {
        self.routes.into_values().collect()
    }
}

impl Extend<Route> for RouteStore {
    fn extend<T: IntoIterator<Item = Route>>(&mut self, iter: T) {
        for route in iter {
            self.insert(route);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn later_pass_replaces_earlier_entry_in_place() {
        let first = Pass::new(
            "exported",
            vec![
                Route::new("/").with_tags(vec!["a".into()]),
                Route::new("/about"),
            ],
        );
        let second = Pass::new("local", vec![Route::new("/").with_tags(vec!["b".into()])]);

        let routes = RouteStore::from_passes([first, second]).into_routes();

        assert_eq!(routes.len(), 2);
        assert_eq!(routes[0].path, "/");
        assert_eq!(routes[0].tags, vec!["b".to_string()]);
        assert_eq!(routes[1].path, "/about");
    }

    #[test]
    fn empty_paths_are_never_stored() {
        let mut store = RouteStore::default();
        store.insert(Route::new(""));
        assert!(store.is_empty());
    }

    #[test]
    fn serializes_optional_fields_only_when_present() {
        let json = serde_json::to_value(Route::new("/a")).unwrap();
        assert_eq!(json, serde_json::json!({ "path": "/a", "tags": [] }));

        let nested = Route::new("/app")
            .with_component(Some("<App />".into()))
            .with_children(Some(vec![Route::new("dash")]));
        let json = serde_json::to_value(nested).unwrap();
        assert_eq!(json["component"], "<App />");
        assert_eq!(json["children"][0]["path"], "dash");
    }
}
