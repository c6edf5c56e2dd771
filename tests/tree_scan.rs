use pretty_assertions::assert_eq;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

use routescout::config::ScanConfig;
use routescout::facts::{Backend, SourceFile};
use routescout::resolver::ImportPathResolver;
use routescout::shapes::{RouteShape, ScanContext};
use routescout::{Config, Ecosystem, Route, RouteDiscoveryEngine};

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn scan(root: &Path) -> Vec<Route> {
    RouteDiscoveryEngine::new(&Config::default()).discover(root, Ecosystem::Tree)
}

fn paths(routes: &[Route]) -> Vec<&str> {
    routes.iter().map(|r| r.path.as_str()).collect()
}

#[test]
fn tagged_route_table_end_to_end() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "App.jsx",
        "const appRoutes = [
  // @tags public,main
  { path: '/', element: <Home/> },
  { path: '/about', element: <About/> }
];
",
    );

    let routes = scan(dir.path());
    assert_eq!(
        routes,
        vec![
            Route::new("/").with_tags(vec!["public".to_string(), "main".to_string()]),
            Route::new("/about"),
        ]
    );
}

#[test]
fn byte_order_mark_keeps_tags_on_their_route() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "App.jsx",
        "\u{feff}const appRoutes = [
  // @tags public,main
  { path: '/', element: <Home/> },
  { path: '/about', element: <About/> }
];
",
    );

    assert_eq!(
        scan(dir.path()),
        vec![
            Route::new("/").with_tags(vec!["public".to_string(), "main".to_string()]),
            Route::new("/about"),
        ]
    );
}

#[test]
fn inline_route_element() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "App.tsx",
        r#"import { Routes, Route } from "react-router-dom";

export function App() {
  return (
    <Routes>
      <Route path="/about" element={<About />} />
    </Routes>
  );
}
"#,
    );

    let routes = scan(dir.path());
    assert_eq!(paths(&routes), vec!["/about"]);
    assert_eq!(routes[0].component.as_deref(), Some("<About />"));
}

#[test]
fn later_pass_wins_on_path_collision() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "App.tsx",
        r#"const routes = [
  // @tags late
  { path: '/shared' },
];

export function App() {
  return (
    <Routes>
      <Route path="/shared" element={<Shared />} />
    </Routes>
  );
}
"#,
    );

    let routes = scan(dir.path());
    assert_eq!(routes, vec![Route::new("/shared").with_tags(vec!["late".to_string()])]);
}

#[test]
fn nested_children_stay_under_their_parent() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "routes.ts",
        "const routes = [
  { path: '/app', children: [ { path: '/app/dash' }, { path: '/app/settings' } ] }
];
",
    );

    let routes = scan(dir.path());
    assert_eq!(paths(&routes), vec!["/app"]);
    let children = routes[0].children.as_ref().unwrap();
    assert_eq!(paths(children), vec!["/app/dash", "/app/settings"]);
}

#[test]
fn broken_import_contributes_nothing() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "main.tsx",
        "import { appRoutes } from './does/not/exist';
import { createBrowserRouter, RouterProvider } from 'react-router-dom';

const router = createBrowserRouter(appRoutes);
root.render(<RouterProvider router={router} />);
",
    );

    assert!(scan(dir.path()).is_empty());
}

#[test]
fn exported_arrays_are_followed_across_one_import() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "src/routing/app.ts",
        "export const appRoutes = [{ path: '/home' }];\nexport default [{ path: '/fallback' }];\n",
    );
    write(
        dir.path(),
        "src/App.tsx",
        "import fallback, { appRoutes } from './routing/app';\n",
    );

    let config = ScanConfig::default();
    let resolver = ImportPathResolver::new(dir.path(), &config);
    let ctx = ScanContext {
        config: &config,
        resolver: &resolver,
    };
    let app = SourceFile::load(&dir.path().join("src/App.tsx")).unwrap();
    let routes = RouteShape::ImportedArray.extract(&app, &ctx);
    assert_eq!(paths(&routes), vec!["/home", "/fallback"]);
}

#[test]
fn router_builder_prefers_local_array() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "routes.ts", "export const appRoutes = [{ path: '/imported' }];\n");
    write(
        dir.path(),
        "main.tsx",
        "import { appRoutes as unused } from './routes';
const appRoutes = [{ path: '/local' }];
const router = createHashRouter(appRoutes);
root.render(<RouterProvider router={router} />);
",
    );

    let config = ScanConfig::default();
    let resolver = ImportPathResolver::new(dir.path(), &config);
    let ctx = ScanContext {
        config: &config,
        resolver: &resolver,
    };
    let main = SourceFile::load(&dir.path().join("main.tsx")).unwrap();
    assert_eq!(
        paths(&RouteShape::RouterProvider.extract(&main, &ctx)),
        vec!["/local"]
    );
}

#[test]
fn router_builder_follows_only_the_binding_import() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "admin.ts", "export const adminRoutes = [{ path: '/admin' }];\n");
    write(dir.path(), "app.ts", "export const appRoutes = [{ path: '/home' }];\n");
    write(
        dir.path(),
        "main.tsx",
        "import { adminRoutes } from './admin';
import { appRoutes } from './app';

root.render(<RouterProvider router={createBrowserRouter(appRoutes)} />);
",
    );

    let config = ScanConfig::default();
    let resolver = ImportPathResolver::new(dir.path(), &config);
    let ctx = ScanContext {
        config: &config,
        resolver: &resolver,
    };
    let main = SourceFile::load(&dir.path().join("main.tsx")).unwrap();
    assert_eq!(
        paths(&RouteShape::RouterProvider.extract(&main, &ctx)),
        vec!["/home"]
    );
}

#[test]
fn unparsable_file_falls_back_to_text_patterns() {
    let dir = TempDir::new().unwrap();
    let code = "const routes = [
  // @tags legacy
  { path: '/a' },
  { path: '/b' },
];

export function Broken( {
";
    write(dir.path(), "Broken.tsx", code);

    let file = SourceFile::from_code(&dir.path().join("Broken.tsx"), code.to_string());
    assert_eq!(file.facts.backend, Backend::Text);

    let routes = scan(dir.path());
    assert_eq!(
        routes,
        vec![
            Route::new("/a").with_tags(vec!["legacy".to_string()]),
            Route::new("/b"),
        ]
    );
}

#[test]
fn node_modules_are_not_scanned() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "node_modules/lib/routes.js",
        "export const routes = [{ path: '/vendor' }];\n",
    );
    write(dir.path(), "routes.js", "export const routes = [{ path: '/mine' }];\n");

    assert_eq!(paths(&scan(dir.path())), vec!["/mine"]);
}

const TYPED_AND_PLAIN: &str = "import type { RouteObject } from 'react-router-dom';

export const typedRoutes: RouteObject[] = [
  // @tags typed
  { path: '/x' },
];

const plainRoutes = [
  // @tags plain
  { path: '/x' },
  { path: '/plain-only' },
];
";

#[test]
fn typed_arrays_are_preferred_by_the_object_tree_shape() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "App.tsx", TYPED_AND_PLAIN);

    let config = ScanConfig::default();
    let resolver = ImportPathResolver::new(dir.path(), &config);
    let ctx = ScanContext {
        config: &config,
        resolver: &resolver,
    };
    let app = SourceFile::load(&dir.path().join("App.tsx")).unwrap();
    assert_eq!(
        RouteShape::TypedObjectTree.extract(&app, &ctx),
        vec![Route::new("/x").with_tags(vec!["typed".to_string()])]
    );
    assert!(RouteShape::RoutesFile.extract(&app, &ctx).is_empty());

    let routes = scan(dir.path());
    assert_eq!(paths(&routes), vec!["/x", "/plain-only"]);
    assert_eq!(routes[0].tags, vec!["typed"]);
}

#[test]
fn routes_file_runs_last_and_rereads_every_array() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "routes.tsx", TYPED_AND_PLAIN);

    let routes = scan(dir.path());
    assert_eq!(paths(&routes), vec!["/x", "/plain-only"]);
    assert_eq!(routes[0].tags, vec!["plain"]);
}
