//! Anthropic Messages API client.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use tracing::{debug, warn};

use super::GenerativeBackend;
use crate::error::ConciergeError;

const DEFAULT_MODEL: &str = "claude-3-5-sonnet-20241022";
const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Generative backend speaking the Anthropic Messages API.
pub struct AnthropicBackend {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
}

impl AnthropicBackend {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key,
            model: DEFAULT_MODEL.to_string(),
        }
    }

    /// Reads `ANTHROPIC_API_KEY` and `ANTHROPIC_MODEL`. A missing key is not
    /// an error at construction time; requests will report it.
    pub fn from_env() -> Self {
        let mut backend = Self::new(std::env::var("ANTHROPIC_API_KEY").ok());
        if let Ok(model) = std::env::var("ANTHROPIC_MODEL") {
            backend.model = model;
        }
        backend
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl GenerativeBackend for AnthropicBackend {
    async fn complete(
        &self,
        system: &str,
        user: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<String, ConciergeError> {
        let Some(ref key) = self.api_key else {
            return Err(ConciergeError::BackendUnavailable(
                "missing API credential".to_string(),
            ));
        };

        let mut body = json!({
            "model": self.model,
            "max_tokens": max_tokens,
            "temperature": temperature,
            "messages": [{ "role": "user", "content": user }],
        });
        if !system.is_empty() {
            body["system"] = json!(system);
        }

        debug!("Backend request - model={}, max_tokens={}", self.model, max_tokens);

        let response = self
            .client
            .post(format!("{}/v1/messages", self.base_url.trim_end_matches('/')))
            .header("x-api-key", key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|e| ConciergeError::BackendUnavailable(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            warn!("Backend returned non-success status: {}", status);
            return Err(ConciergeError::BackendUnavailable(format!(
                "status {status}"
            )));
        }

        let payload: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ConciergeError::BackendUnavailable(e.to_string()))?;

        let content = payload["content"][0]["text"].as_str().unwrap_or_default();
        Ok(content.to_string())
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}
