// src/generate.rs
//! Playwright のスモークテストを、見つかったルートごとに 1 ファイル生成する。

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::config::GenConfig;
use crate::enrich::FallbackChain;
use crate::model::Route;

/// ルートパスをファイル名にするときの区切り文字
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlugStyle {
    /// `/about/team` → `about_team`
    #[default]
    Underscore,
    /// `/about/team` → `about-team`
    Dash,
}

impl SlugStyle {
    fn separator(self) -> &'static str {
        match self {
            SlugStyle::Underscore => "_",
            SlugStyle::Dash => "-",
        }
    }
}

pub fn slugify(path: &str, style: SlugStyle) -> String {
    if path == "/" {
        return "home".to_string();
    }
    let trimmed = path.strip_prefix('/').unwrap_or(path);
    trimmed.replace('/', style.separator())
}

pub fn render_spec(path: &str, root_selector: &str, extra: &[String]) -> String {
    format!(
        r#"import {{ test, expect }} from "@playwright/test";

test("{path} renders", async ({{ page }}) => {{
  await page.goto("{path}");
  await expect(page.locator("{root_selector}")).toBeVisible();
  {extra}
}});
"#,
        extra = extra.join("\n  ")
    )
}

/// プロバイダーへ渡す問い合わせ内容 (パスと、分かれば描画対象)
fn enrich_subject(route: &Route) -> String {
    match &route.component {
        Some(component) => format!("// route {}\n{component}", route.path),
        None => route.path.clone(),
    }
}

pub struct SpecGenerator {
    tests_dir: PathBuf,
    root_selector: String,
    slug_style: SlugStyle,
}

impl SpecGenerator {
    /// `tests_dir` は絶対パスでなければ `base` から解決する
    pub fn from_config(base: &Path, config: &GenConfig) -> Self {
        SpecGenerator {
            tests_dir: base.join(&config.tests_dir),
            root_selector: config.root_selector.clone(),
            slug_style: config.slug_style,
        }
    }

    pub fn tests_dir(&self) -> &Path {
        &self.tests_dir
    }

    /// トップレベルのルートごとに `<slug>.spec.ts` を書き出し、
    /// 書き出したパスをルート順に返す
    pub fn write_all(
        &self,
        routes: &[Route],
        enricher: Option<&FallbackChain>,
    ) -> Result<Vec<PathBuf>> {
        fs::create_dir_all(&self.tests_dir).with_context(|| {
            format!("Failed to create tests directory: {}", self.tests_dir.display())
        })?;

        let mut written = Vec::with_capacity(routes.len());
        for route in routes {
            let extra = enricher
                .map(|chain| chain.enrich(&enrich_subject(route)))
                .unwrap_or_default();
            let spec_path = self
                .tests_dir
                .join(format!("{}.spec.ts", slugify(&route.path, self.slug_style)));
            let content = render_spec(&route.path, &self.root_selector, &extra);
            fs::write(&spec_path, content)
                .with_context(|| format!("Failed to write {}", spec_path.display()))?;
            info!("created {}", spec_path.display());
            written.push(spec_path);
        }
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn slugs() {
        assert_eq!(slugify("/", SlugStyle::Underscore), "home");
        assert_eq!(slugify("/about/team", SlugStyle::Underscore), "about_team");
        assert_eq!(slugify("/about/team", SlugStyle::Dash), "about-team");
        assert_eq!(slugify("settings", SlugStyle::Dash), "settings");
    }

    #[test]
    fn spec_without_extra_lines() {
        let expected = concat!(
            "import { test, expect } from \"@playwright/test\";\n",
            "\n",
            "test(\"/about renders\", async ({ page }) => {\n",
            "  await page.goto(\"/about\");\n",
            "  await expect(page.locator(\"body\")).toBeVisible();\n",
            "  \n",
            "});\n",
        );
        assert_eq!(render_spec("/about", "body", &[]), expected);
    }

    #[test]
    fn extra_lines_are_indented() {
        let extra = vec![
            "await expect(page).toHaveTitle(/Home/);".to_string(),
            "await page.click('a');".to_string(),
        ];
        let spec = render_spec("/", "#app", &extra);
        assert!(spec.contains(
            "  await expect(page).toHaveTitle(/Home/);\n  await page.click('a');\n});"
        ));
        assert!(spec.contains(r##"page.locator("#app")"##));
    }

    #[test]
    fn subject_carries_component_when_known() {
        let route = Route::new("/").with_component(Some("<Home />".to_string()));
        assert_eq!(enrich_subject(&route), "// route /\n<Home />");
        assert_eq!(enrich_subject(&Route::new("/a")), "/a");
    }
}
