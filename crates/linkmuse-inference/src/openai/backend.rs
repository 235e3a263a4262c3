//! OpenAI-compatible backend implementation.

use std::time::Instant;

use async_trait::async_trait;
use rand::Rng;
use reqwest::Client;
use tracing::{debug, info};

use linkmuse_core::{Error, PromptBackend, PromptRequest, Result};

use super::types::*;
use crate::error::from_status;
use crate::provider::{build_client, AuthScheme, ProviderConfig};

/// Backend for providers speaking the chat completions envelope.
pub struct OpenAICompatBackend {
    client: Client,
    config: ProviderConfig,
}

impl OpenAICompatBackend {
    /// Create a backend for the given provider configuration.
    pub fn new(config: ProviderConfig) -> Result<Self> {
        let client = build_client(config.timeout)?;

        info!(
            provider = %config.kind,
            url = %config.base_url,
            model = %config.model,
            "Initializing chat completions backend"
        );

        Ok(Self { client, config })
    }

    /// Get the current configuration.
    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    /// Build the POST with authentication and provider-specific headers.
    fn build_request(&self, api_key: &str) -> reqwest::RequestBuilder {
        let mut req = self.client.post(&self.config.base_url);

        req = match self.config.kind.auth_scheme() {
            AuthScheme::Bearer => req.header("Authorization", format!("Bearer {}", api_key)),
            AuthScheme::ApiKeyHeader => req.header("x-api-key", api_key),
        };

        if self.config.kind.sends_request_id() {
            req = req.header("X-Request-Id", generate_request_id());
        }

        req.header("Content-Type", "application/json")
    }
}

/// Request id of the form `<unix-seconds>-<13 base36 chars>`.
pub fn generate_request_id() -> String {
    const ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    let mut rng = rand::thread_rng();
    let suffix: String = (0..13)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect();
    format!("{}-{}", chrono::Utc::now().timestamp(), suffix)
}

#[async_trait]
impl PromptBackend for OpenAICompatBackend {
    async fn complete(&self, request: &PromptRequest) -> Result<String> {
        let api_key = self.config.require_credential()?;
        let provider = self.config.kind.id();

        debug!(
            subsystem = "inference",
            component = "chat_completions",
            op = "complete",
            provider,
            model = %self.config.model,
            prompt_len = request.prompt.len(),
            "Sending chat completion"
        );

        let body = ChatCompletionRequest {
            model: self.config.model.clone(),
            messages: vec![ChatMessage::user(request.prompt.clone())],
            temperature: Some(request.temperature.unwrap_or(self.config.temperature)),
            max_tokens: Some(request.max_tokens.unwrap_or(self.config.max_tokens)),
        };

        let start = Instant::now();
        let response = self
            .build_request(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Request(format!("{} request failed: {}", provider, e)))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(from_status(provider, status.as_u16(), &text));
        }

        let result: ChatCompletionResponse = response.json().await.map_err(|e| {
            Error::Inference(format!("{} returned an unreadable response: {}", provider, e))
        })?;

        let content = result
            .first_content()
            .ok_or_else(|| Error::Inference(format!("{} returned no completion text", provider)))?
            .to_string();

        debug!(
            provider,
            response_len = content.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Chat completion finished"
        );
        Ok(content)
    }

    fn provider_id(&self) -> &str {
        self.config.kind.id()
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::ProviderKind;

    #[test]
    fn test_backend_creation() {
        let config = ProviderConfig::new(ProviderKind::OpenAI).with_api_key("k");
        let backend = OpenAICompatBackend::new(config).unwrap();
        assert_eq!(backend.config().base_url, linkmuse_core::defaults::OPENAI_URL);
        assert_eq!(backend.provider_id(), "openai");
    }

    #[test]
    fn test_model_name_accessor() {
        let config = ProviderConfig::new(ProviderKind::SiliconFlow).with_model("THUDM/glm-4-9b-chat");
        let backend = OpenAICompatBackend::new(config).unwrap();
        assert_eq!(backend.model_name(), "THUDM/glm-4-9b-chat");
    }

    #[test]
    fn test_request_id_format() {
        let id = generate_request_id();
        let (ts, suffix) = id.split_once('-').unwrap();
        assert!(ts.parse::<i64>().unwrap() > 1_600_000_000);
        assert_eq!(suffix.len(), 13);
        assert!(suffix.chars().all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
    }

    #[tokio::test]
    async fn test_missing_credential_fails_before_io() {
        let config = ProviderConfig::new(ProviderKind::Volc).with_base_url("http://127.0.0.1:9");
        let backend = OpenAICompatBackend::new(config).unwrap();
        let err = backend.send_prompt("hi").await.unwrap_err();
        assert!(err.is_config());
    }
}
