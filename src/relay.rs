//! Completion relay — the single network hop to the hosted completion service.
//!
//! Defines the [`CompletionRelay`] trait and concrete implementations:
//! - **[`DisabledRelay`]** — returns errors; used when no provider is configured.
//! - **[`OpenAiRelay`]** — calls the OpenAI chat completions API.
//!
//! Each call is independent and stateless: no caching, no batching, no retry.
//! A failed call is terminal for that request; the caller surfaces a generic
//! failure message and returns to an idle, re-submittable state.

use anyhow::{bail, Result};
use async_trait::async_trait;
use std::time::Duration;

use crate::config::CompletionConfig;

/// Fallback text returned when the upstream service produces an empty result.
/// An empty completion is treated as success, not an error.
pub const NO_RESPONSE: &str = "No response";

const OPENAI_API_BASE: &str = "https://api.openai.com/v1";

/// Errors a relay call can fail with.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    /// The hosted service errored or the network call failed.
    #[error("upstream completion failed: {0}")]
    Upstream(String),
    /// No completion provider is configured.
    #[error("completion provider is disabled")]
    Disabled,
}

/// Trait for completion backends.
///
/// `complete` must never be called with an empty query — the session
/// controller guards that upstream.
#[async_trait]
pub trait CompletionRelay: Send + Sync {
    /// Returns the model identifier (e.g. `"gpt-3.5-turbo"`).
    fn model_name(&self) -> &str;

    /// Send `query` to the hosted completion service and return the
    /// generated text, or [`NO_RESPONSE`] if the service returned an
    /// empty result.
    async fn complete(&self, query: &str) -> Result<String, RelayError>;
}

// ============ Disabled Relay ============

/// A no-op relay that always fails.
///
/// Used when `completion.provider = "disabled"` in the configuration.
pub struct DisabledRelay;

#[async_trait]
impl CompletionRelay for DisabledRelay {
    fn model_name(&self) -> &str {
        "disabled"
    }

    async fn complete(&self, _query: &str) -> Result<String, RelayError> {
        Err(RelayError::Disabled)
    }
}

// ============ OpenAI Relay ============

/// Relay backed by the OpenAI chat completions API.
///
/// Sends the query as a single user message with a fixed system instruction
/// and the configured sampling temperature. Requires the `OPENAI_API_KEY`
/// environment variable. The HTTP client carries a bounded timeout so a
/// hanging upstream cannot leave the session awaiting forever.
pub struct OpenAiRelay {
    model: String,
    temperature: f64,
    system_prompt: String,
    api_base: String,
    api_key: String,
    client: reqwest::Client,
}

impl OpenAiRelay {
    /// Create a new OpenAI relay from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if `OPENAI_API_KEY` is not in the environment or
    /// the HTTP client cannot be built.
    pub fn new(config: &CompletionConfig) -> Result<Self> {
        let api_key = match std::env::var("OPENAI_API_KEY") {
            Ok(key) => key,
            Err(_) => bail!("OPENAI_API_KEY environment variable not set"),
        };

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            model: config.model.clone(),
            temperature: config.temperature,
            system_prompt: config.system_prompt.clone(),
            api_base: config
                .api_base
                .clone()
                .unwrap_or_else(|| OPENAI_API_BASE.to_string()),
            api_key,
            client,
        })
    }
}

#[async_trait]
impl CompletionRelay for OpenAiRelay {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn complete(&self, query: &str) -> Result<String, RelayError> {
        let body = serde_json::json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": self.system_prompt },
                { "role": "user", "content": query }
            ],
            "temperature": self.temperature,
        });

        let response = self
            .client
            .post(format!("{}/chat/completions", self.api_base))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| RelayError::Upstream(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            return Err(RelayError::Upstream(format!(
                "OpenAI API error {}: {}",
                status, body_text
            )));
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| RelayError::Upstream(e.to_string()))?;

        Ok(extract_content(&json))
    }
}

/// Pull the generated text out of a chat completions response.
///
/// Missing or empty `choices[0].message.content` degrades to the
/// [`NO_RESPONSE`] fallback rather than an error.
fn extract_content(json: &serde_json::Value) -> String {
    json.get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(|c| c.as_str())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .unwrap_or_else(|| NO_RESPONSE.to_string())
}

/// Create the appropriate [`CompletionRelay`] based on configuration.
///
/// # Errors
///
/// Returns an error for unknown provider names or if the OpenAI relay
/// cannot be initialized (missing API key).
pub fn create_relay(config: &CompletionConfig) -> Result<Box<dyn CompletionRelay>> {
    match config.provider.as_str() {
        "disabled" => Ok(Box::new(DisabledRelay)),
        "openai" => Ok(Box::new(OpenAiRelay::new(config)?)),
        other => bail!("Unknown completion provider: {}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_content_normal_response() {
        let json = serde_json::json!({
            "choices": [
                { "message": { "role": "assistant", "content": "Hello there." } }
            ]
        });
        assert_eq!(extract_content(&json), "Hello there.");
    }

    #[test]
    fn extract_content_empty_string_falls_back() {
        let json = serde_json::json!({
            "choices": [
                { "message": { "role": "assistant", "content": "" } }
            ]
        });
        assert_eq!(extract_content(&json), NO_RESPONSE);
    }

    #[test]
    fn extract_content_missing_choices_falls_back() {
        let json = serde_json::json!({ "id": "cmpl-123" });
        assert_eq!(extract_content(&json), NO_RESPONSE);
    }

    #[test]
    fn extract_content_null_content_falls_back() {
        let json = serde_json::json!({
            "choices": [
                { "message": { "role": "assistant", "content": null } }
            ]
        });
        assert_eq!(extract_content(&json), NO_RESPONSE);
    }

    #[tokio::test]
    async fn disabled_relay_always_errors() {
        let relay = DisabledRelay;
        let err = relay.complete("hello").await.unwrap_err();
        assert!(matches!(err, RelayError::Disabled));
    }

    #[tokio::test]
    async fn openai_relay_unreachable_is_upstream_error() {
        std::env::set_var("OPENAI_API_KEY", "test-key");
        let config = CompletionConfig {
            api_base: Some("http://127.0.0.1:1".to_string()),
            timeout_secs: 2,
            ..CompletionConfig::default()
        };
        let relay = OpenAiRelay::new(&config).unwrap();
        let err = relay.complete("hello").await.unwrap_err();
        assert!(matches!(err, RelayError::Upstream(_)));
    }
}
