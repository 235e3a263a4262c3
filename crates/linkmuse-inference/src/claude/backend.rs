//! Claude backend implementation.

use std::time::Instant;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info};

use linkmuse_core::{defaults, Error, PromptBackend, PromptRequest, Result};

use super::types::*;
use crate::error::from_status;
use crate::provider::{build_client, ProviderConfig};

/// Backend for the Claude messages API.
pub struct ClaudeBackend {
    client: Client,
    config: ProviderConfig,
}

impl ClaudeBackend {
    /// Create a backend for the given provider configuration.
    pub fn new(config: ProviderConfig) -> Result<Self> {
        let client = build_client(config.timeout)?;

        info!(
            provider = %config.kind,
            url = %config.base_url,
            model = %config.model,
            "Initializing messages backend"
        );

        Ok(Self { client, config })
    }

    /// Get the current configuration.
    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }
}

#[async_trait]
impl PromptBackend for ClaudeBackend {
    async fn complete(&self, request: &PromptRequest) -> Result<String> {
        let api_key = self.config.require_credential()?;
        let provider = self.config.kind.id();

        debug!(
            subsystem = "inference",
            component = "messages",
            op = "complete",
            provider,
            model = %self.config.model,
            prompt_len = request.prompt.len(),
            "Sending messages request"
        );

        let body = MessagesRequest {
            model: self.config.model.clone(),
            messages: vec![Message {
                role: "user".to_string(),
                content: request.prompt.clone(),
            }],
            max_tokens: request.max_tokens.unwrap_or(self.config.max_tokens),
            temperature: Some(request.temperature.unwrap_or(self.config.temperature)),
        };

        let start = Instant::now();
        let response = self
            .client
            .post(&self.config.base_url)
            .header("x-api-key", api_key)
            .header("anthropic-version", defaults::ANTHROPIC_VERSION)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Request(format!("{} request failed: {}", provider, e)))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(from_status(provider, status.as_u16(), &text));
        }

        let result: MessagesResponse = response.json().await.map_err(|e| {
            Error::Inference(format!("{} returned an unreadable response: {}", provider, e))
        })?;

        let content = result
            .first_text()
            .ok_or_else(|| Error::Inference(format!("{} returned no text content", provider)))?
            .to_string();

        debug!(
            provider,
            response_len = content.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Messages request finished"
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
