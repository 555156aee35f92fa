//! External completion client.
//!
//! We only call chat.completions on an OpenAI-compatible endpoint (DeepSeek by
//! default) and take the plain text of the first choice. Calls are instrumented
//! and log model names, latencies, and response sizes (not contents).
//!
//! NOTE: We never log the API key.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument};

use crate::config::CompletionConfig;
use crate::error::DivinationError;
use crate::util::trunc_for_log;

/// Anything that turns a prompt into free text.
#[async_trait]
pub trait Completion: Send + Sync {
  async fn complete(&self, prompt: &str) -> Result<String, DivinationError>;
}

/// Upper bound for a single HTTP exchange; per-method limits are applied by the caller.
const CLIENT_TIMEOUT: Duration = Duration::from_secs(150);

#[derive(Clone)]
pub struct ChatClient {
  client: reqwest::Client,
  api_key: String,
  config: CompletionConfig,
}

impl ChatClient {
  pub fn new(api_key: String, config: CompletionConfig) -> Result<Self, DivinationError> {
    let client = reqwest::Client::builder()
      .timeout(CLIENT_TIMEOUT)
      .build()
      .map_err(|e| DivinationError::Config { message: format!("http client: {e}") })?;
    Ok(Self { client, api_key, config })
  }

  /// Construct the client if we find DIVINATION_API_KEY; otherwise return None.
  pub fn from_env(config: &CompletionConfig) -> Option<Self> {
    let api_key = std::env::var("DIVINATION_API_KEY").ok().filter(|k| !k.trim().is_empty())?;
    match Self::new(api_key, config.clone()) {
      Ok(c) => Some(c),
      Err(e) => {
        error!(target: "divination", error = %e, "Failed to build completion client");
        None
      }
    }
  }

  pub fn model(&self) -> &str {
    &self.config.model
  }
}

#[async_trait]
impl Completion for ChatClient {
  #[instrument(level = "info", skip(self, prompt), fields(model = %self.config.model, prompt_len = prompt.len()))]
  async fn complete(&self, prompt: &str) -> Result<String, DivinationError> {
    let url = format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'));
    let req = ChatCompletionRequest {
      model: self.config.model.clone(),
      messages: vec![
        ChatMessageReq { role: "system".into(), content: self.config.system_prompt.clone() },
        ChatMessageReq { role: "user".into(), content: prompt.into() },
      ],
      temperature: self.config.temperature,
      max_tokens: Some(self.config.max_tokens),
    };

    let start = Instant::now();
    let res = self
      .client
      .post(&url)
      .header(USER_AGENT, "divination-backend/0.1")
      .header(CONTENT_TYPE, "application/json")
      .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
      .json(&req)
      .send()
      .await
      .map_err(|e| DivinationError::external(e.to_string()))?;

    if !res.status().is_success() {
      let status = res.status();
      let body = res.text().await.unwrap_or_default();
      let msg = extract_api_error(&body).unwrap_or_else(|| trunc_for_log(&body, 200));
      error!(target: "divination", %status, elapsed = ?start.elapsed(), "Completion endpoint returned an error");
      return Err(DivinationError::external(format!("HTTP {status}: {msg}")));
    }

    let body: ChatCompletionResponse = res.json().await.map_err(|e| DivinationError::external(e.to_string()))?;
    if let Some(usage) = &body.usage {
      info!(prompt_tokens = ?usage.prompt_tokens, completion_tokens = ?usage.completion_tokens, total_tokens = ?usage.total_tokens, "Completion usage");
    }
    let text = body
      .choices
      .into_iter()
      .next()
      .and_then(|c| c.message.content)
      .unwrap_or_default()
      .trim()
      .to_string();
    info!(elapsed = ?start.elapsed(), chars = text.chars().count(), "Completion received");
    Ok(text)
  }
}

// --- Chat DTOs ---

#[derive(Serialize)]
struct ChatCompletionRequest {
  model: String,
  messages: Vec<ChatMessageReq>,
  temperature: f32,
  #[serde(skip_serializing_if = "Option::is_none")]
  max_tokens: Option<u32>,
}
#[derive(Serialize)]
struct ChatMessageReq { role: String, content: String }

#[derive(Deserialize)]
struct ChatCompletionResponse {
  choices: Vec<ChatChoice>,
  #[serde(default)] usage: Option<Usage>,
}
#[derive(Deserialize)]
struct ChatChoice { message: ChatMessageResp }
#[derive(Deserialize)]
struct ChatMessageResp { content: Option<String> }
#[derive(Deserialize)]
struct Usage {
  #[serde(default)] prompt_tokens: Option<u32>,
  #[serde(default)] completion_tokens: Option<u32>,
  #[serde(default)] total_tokens: Option<u32>,
}

/// Try to extract a clean error message from an OpenAI-style error body.
fn extract_api_error(body: &str) -> Option<String> {
  #[derive(Deserialize)]
  struct EWrap { error: EObj }
  #[derive(Deserialize)]
  struct EObj { message: String }
  serde_json::from_str::<EWrap>(body).ok().map(|w| w.error.message)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn error_body_message_is_extracted() {
    let body = r#"{"error":{"message":"Invalid API key","type":"auth"}}"#;
    assert_eq!(extract_api_error(body).as_deref(), Some("Invalid API key"));
    assert_eq!(extract_api_error("<html>bad gateway</html>"), None);
  }

  #[test]
  fn request_omits_absent_max_tokens() {
    let req = ChatCompletionRequest {
      model: "deepseek-chat".into(),
      messages: vec![ChatMessageReq { role: "user".into(), content: "hi".into() }],
      temperature: 0.7,
      max_tokens: None,
    };
    let v = serde_json::to_value(&req).unwrap();
    assert!(v.get("max_tokens").is_none());
    assert_eq!(v["messages"][0]["role"], "user");
  }

  #[test]
  fn response_without_content_is_empty_text() {
    let r: ChatCompletionResponse = serde_json::from_str(r#"{"choices":[{"message":{"content":null}}]}"#).unwrap();
    assert!(r.choices[0].message.content.is_none());
    assert!(r.usage.is_none());
  }
}
