//! Loading engine configuration (completion endpoint, timeouts, storage,
//! prompt overrides) from TOML.
//!
//! Every field has a default, so an empty file or no file at all is valid.
//! Secrets never live here: the API key comes from `DIVINATION_API_KEY`.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use tracing::{error, info};

use crate::error::DivinationError;

#[derive(Clone, Debug, Deserialize, Default)]
pub struct EngineConfig {
  #[serde(default)]
  pub completion: CompletionConfig,
  #[serde(default)]
  pub timeouts: TimeoutConfig,
  #[serde(default)]
  pub storage: StorageConfig,
  #[serde(default)]
  pub prompts: PromptConfig,
}

/// OpenAI-compatible chat endpoint. Defaults target DeepSeek.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct CompletionConfig {
  pub base_url: String,
  pub model: String,
  pub temperature: f32,
  pub max_tokens: u32,
  pub system_prompt: String,
}

impl Default for CompletionConfig {
  fn default() -> Self {
    Self {
      base_url: "https://api.deepseek.com/v1".into(),
      model: "deepseek-chat".into(),
      temperature: 0.7,
      max_tokens: 2000,
      system_prompt: "你是一位精通中西方各类占卜术的命理分析师。请严格按照用户要求的【标题】格式输出，内容具体、积极、理性。".into(),
    }
  }
}

/// Per-method overrides of the built-in timeout profile, in seconds.
#[derive(Clone, Debug, Deserialize, Default)]
#[serde(default)]
pub struct TimeoutConfig {
  pub default_secs: Option<u64>,
  pub per_method: HashMap<String, u64>,
}

impl TimeoutConfig {
  /// Explicit override for `method`, else the configured default, else `builtin`.
  pub fn resolve(&self, method: &str, builtin: Duration) -> Duration {
    self
      .per_method
      .get(method)
      .copied()
      .or(self.default_secs)
      .map(Duration::from_secs)
      .unwrap_or(builtin)
  }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
  pub results_dir: PathBuf,
  /// Keep results in process memory only.
  pub in_memory: bool,
}

impl Default for StorageConfig {
  fn default() -> Self {
    Self { results_dir: PathBuf::from("data/results"), in_memory: false }
  }
}

/// Per-method prompt templates. `{field}` placeholders are filled from the
/// request inputs, plus `{method}` with the method's display name.
#[derive(Clone, Debug, Deserialize, Default)]
#[serde(default)]
pub struct PromptConfig {
  pub templates: HashMap<String, String>,
}

pub fn parse_config(raw: &str) -> Result<EngineConfig, DivinationError> {
  toml::from_str::<EngineConfig>(raw).map_err(|e| DivinationError::Config { message: e.to_string() })
}

/// Attempt to load `EngineConfig` from DIVINATION_CONFIG_PATH. On any parsing/IO error, returns None.
pub fn load_config_from_env() -> Option<EngineConfig> {
  let path = std::env::var("DIVINATION_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match parse_config(&s) {
      Ok(cfg) => {
        info!(target: "divination", %path, "Loaded engine config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "divination", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "divination", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn empty_file_is_all_defaults() {
    let cfg = parse_config("").unwrap();
    assert_eq!(cfg.completion.model, "deepseek-chat");
    assert_eq!(cfg.completion.max_tokens, 2000);
    assert_eq!(cfg.storage.results_dir, PathBuf::from("data/results"));
    assert!(cfg.prompts.templates.is_empty());
  }

  #[test]
  fn partial_sections_keep_other_defaults() {
    let cfg = parse_config(
      r#"
      [completion]
      model = "deepseek-reasoner"

      [timeouts]
      per_method = { tarot = 30 }

      [prompts.templates]
      dream = "请解梦：{dreamContent}"
      "#,
    )
    .unwrap();
    assert_eq!(cfg.completion.model, "deepseek-reasoner");
    assert_eq!(cfg.completion.base_url, "https://api.deepseek.com/v1");
    assert_eq!(cfg.timeouts.resolve("tarot", Duration::from_secs(80)), Duration::from_secs(30));
    assert_eq!(cfg.timeouts.resolve("bazi", Duration::from_secs(120)), Duration::from_secs(120));
    assert_eq!(cfg.prompts.templates["dream"], "请解梦：{dreamContent}");
  }

  #[test]
  fn bad_toml_is_a_config_error() {
    assert!(matches!(parse_config("[completion"), Err(DivinationError::Config { .. })));
  }
}
