use pretty_assertions::assert_eq;
use std::fs;

use routescout::Route;
use routescout::config::GenConfig;
use routescout::enrich::{AssertionProvider, FallbackChain};
use routescout::error::EnrichError;
use routescout::generate::{SlugStyle, SpecGenerator};

struct Fixed(&'static str);

impl AssertionProvider for Fixed {
    fn name(&self) -> &str {
        "fixed"
    }

    fn assertions(&self, _subject: &str) -> Result<Vec<String>, EnrichError> {
        Ok(vec![self.0.to_string()])
    }
}

struct Offline;

impl AssertionProvider for Offline {
    fn name(&self) -> &str {
        "offline"
    }

    fn assertions(&self, _subject: &str) -> Result<Vec<String>, EnrichError> {
        Err(EnrichError::Disabled {
            provider: "offline".to_string(),
            reason: "no key".to_string(),
        })
    }
}

#[test]
fn one_spec_per_route_in_route_order() {
    let dir = tempfile::tempdir().unwrap();
    let generator = SpecGenerator::from_config(dir.path(), &GenConfig::default());
    let routes = vec![Route::new("/"), Route::new("/about/team")];

    let written = generator.write_all(&routes, None).unwrap();
    let names: Vec<String> = written
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["home.spec.ts", "about_team.spec.ts"]);

    let home = fs::read_to_string(dir.path().join("tests/home.spec.ts")).unwrap();
    assert!(home.contains(r#"await page.goto("/");"#));
    assert!(home.contains(r#"page.locator("body")"#));
}

#[test]
fn enrichment_falls_back_to_next_provider() {
    let dir = tempfile::tempdir().unwrap();
    let config = GenConfig {
        tests_dir: "e2e".to_string(),
        root_selector: "#app".to_string(),
        slug_style: SlugStyle::Dash,
    };
    let generator = SpecGenerator::from_config(dir.path(), &config);
    let chain = FallbackChain::new(vec![
        Box::new(Offline),
        Box::new(Fixed("await expect(page).toHaveURL(/team/);")),
    ]);

    generator
        .write_all(&[Route::new("/about/team")], Some(&chain))
        .unwrap();

    let spec = fs::read_to_string(dir.path().join("e2e/about-team.spec.ts")).unwrap();
    assert!(spec.contains("  await expect(page).toHaveURL(/team/);\n});"));
    assert!(spec.contains(r##"page.locator("#app")"##));
}
