// src/init.rs
use anyhow::{Context, Result};
use duct::cmd;
use std::fs;
use std::path::Path;

pub const PLAYWRIGHT_CONFIG_FILE: &str = "playwright.config.ts";

pub const PLAYWRIGHT_CONFIG: &str = r#"import { defineConfig } from "@playwright/test";

export default defineConfig({
  testDir: "./tests",
  timeout: 30_000,
  retries: 0,
  use: {
    headless: true,
    viewport: { width: 1280, height: 720 },
    actionTimeout: 5_000,
    ignoreHTTPSErrors: true,
  },
});
"#;

/// `npx playwright install` を実行する (出力はそのまま端末へ)
pub fn install_browsers() -> Result<()> {
    cmd!("npx", "playwright", "install")
        .run()
        .context("Failed to install Playwright browsers")?;
    Ok(())
}

/// `dir` に `playwright.config.ts` がなければ書き出す。
/// 戻り値: 書き出したら true
pub fn scaffold_config(dir: &Path) -> Result<bool> {
    let path = dir.join(PLAYWRIGHT_CONFIG_FILE);
    if path.exists() {
        return Ok(false);
    }
    fs::write(&path, PLAYWRIGHT_CONFIG)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(true)
}
