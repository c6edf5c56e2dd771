// src/enrich.rs
//! 外部プロバイダーが提案する追加の Playwright アサーション。

use std::env;

use duct::cmd;
use tracing::{debug, warn};

use crate::config::{EnrichConfig, ProviderConfig};
use crate::error::EnrichError;

pub trait AssertionProvider {
    fn name(&self) -> &str;

    /// `subject` に対するアサーション行 (いずれも `await` で始まる)
    fn assertions(&self, subject: &str) -> Result<Vec<String>, EnrichError>;
}

/// 応答があるまで順に試すプロバイダー列
#[derive(Default)]
pub struct FallbackChain {
    providers: Vec<Box<dyn AssertionProvider>>,
}

impl FallbackChain {
    pub fn new(providers: Vec<Box<dyn AssertionProvider>>) -> Self {
        FallbackChain { providers }
    }

    pub fn from_config(config: &EnrichConfig) -> Self {
        let providers = config
            .providers
            .iter()
            .map(|p| Box::new(CommandProvider::from_config(p)) as Box<dyn AssertionProvider>)
            .collect();
        Self::new(providers)
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// 最初に成功した応答を返す (空でも採用)。
    /// 失敗したら次のプロバイダーへ進み、全滅なら空
    pub fn enrich(&self, subject: &str) -> Vec<String> {
        for provider in &self.providers {
            match provider.assertions(subject) {
                Ok(lines) => {
                    debug!("{} returned {} assertion(s)", provider.name(), lines.len());
                    return lines;
                }
                Err(err) => warn!("{err}; trying next provider"),
            }
        }
        Vec::new()
    }
}

/// プロンプトを標準入力に渡してコマンドを実行し、標準出力からアサーションを読む
#[derive(Debug, Clone)]
pub struct CommandProvider {
    name: String,
    program: String,
    args: Vec<String>,
    api_key_env: Option<String>,
}

impl CommandProvider {
    pub fn from_config(config: &ProviderConfig) -> Self {
        let (program, args) = match config.command.split_first() {
            Some((program, args)) => (program.clone(), args.to_vec()),
            None => (String::new(), Vec::new()),
        };
        CommandProvider {
            name: config.name.clone(),
            program,
            args,
            api_key_env: config.api_key_env.clone(),
        }
    }

    fn check_enabled(&self) -> Result<(), EnrichError> {
        if self.program.is_empty() {
            return Err(self.disabled("no command configured".to_string()));
        }
        if let Some(var) = &self.api_key_env {
            if env::var_os(var).is_none_or(|v| v.is_empty()) {
                return Err(self.disabled(format!("{var} not set")));
            }
        }
        Ok(())
    }

    fn disabled(&self, reason: String) -> EnrichError {
        EnrichError::Disabled {
            provider: self.name.clone(),
            reason,
        }
    }
}

impl AssertionProvider for CommandProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn assertions(&self, subject: &str) -> Result<Vec<String>, EnrichError> {
        self.check_enabled()?;
        let output = cmd(&self.program, &self.args)
            .stdin_bytes(prompt_for(subject))
            .stderr_null()
            .read()
            .map_err(|source| EnrichError::Command {
                provider: self.name.clone(),
                source,
            })?;
        Ok(assertion_lines(&output))
    }
}

pub fn prompt_for(subject: &str) -> String {
    format!(
        "Here is a React/Vue component.\n\
         Return 2 Playwright assertion lines that would verify it works.\n\
         Only code, no prose:\n\n{subject}"
    )
}

/// `output` のうち `await` で始まる行 (前後の空白は除去)
pub fn assertion_lines(output: &str) -> Vec<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| line.starts_with("await"))
        .map(String::from)
        .collect()
}
