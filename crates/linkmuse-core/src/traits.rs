//! Core traits for linkmuse abstractions.
//!
//! These traits define the seams between the provider backends, the relevance
//! analyzer, the discovery engine, and the host's document storage, enabling
//! pluggable implementations and testability.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::{Document, RelevanceResult};

// =============================================================================
// INFERENCE TRAITS
// =============================================================================

/// A single-turn chat prompt with optional sampling overrides.
///
/// `None` fields fall back to the backend's configured values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptRequest {
    pub prompt: String,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

impl PromptRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            temperature: None,
            max_tokens: None,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

/// Backend that sends a chat prompt to an LLM provider and returns the text.
#[async_trait]
pub trait PromptBackend: Send + Sync {
    /// Send a request and return the single completion text.
    async fn complete(&self, request: &PromptRequest) -> Result<String>;

    /// Send a prompt with the backend's default sampling settings.
    async fn send_prompt(&self, prompt: &str) -> Result<String> {
        self.complete(&PromptRequest::new(prompt)).await
    }

    /// Provider identifier (e.g. "openai").
    fn provider_id(&self) -> &str;

    /// Model identifier sent with each request.
    fn model_name(&self) -> &str;
}

/// Pairwise relevance judgement between two notes.
#[async_trait]
pub trait RelevanceAnalysis: Send + Sync {
    /// Score how related note 2 is to note 1.
    ///
    /// Parse failures degrade to a zero score; only upstream provider
    /// failures are returned as errors.
    async fn analyze_relevance(
        &self,
        title1: &str,
        title2: &str,
        content1: &str,
        content2: &str,
    ) -> Result<RelevanceResult>;
}

// =============================================================================
// STORAGE TRAITS
// =============================================================================

/// Read-only access to the host's note storage.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// List every note in the corpus with its content loaded.
    async fn list_all(&self) -> Result<Vec<Document>>;

    /// Load a single note by path.
    async fn read(&self, path: &str) -> Result<Document>;
}
