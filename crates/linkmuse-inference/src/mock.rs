//! Mock prompt backend for deterministic testing.
//!
//! Records every call and answers from fixed or substring-mapped responses,
//! with optional simulated latency and failures.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use linkmuse_inference::mock::MockPromptBackend;
//!
//! #[tokio::test]
//! async fn test_with_mock_backend() {
//!     let backend = MockPromptBackend::new()
//!         .with_response_containing("Tokio", r#"{"explanation":"x","relevanceScore":0.8}"#)
//!         .with_fixed_response("{}");
//!
//!     let reply = backend.send_prompt("... Tokio ...").await.unwrap();
//!     assert_eq!(backend.call_count(), 1);
//! }
//! ```

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use linkmuse_core::{Error, PromptBackend, PromptRequest, Result};

/// Mock prompt backend for testing.
#[derive(Clone)]
pub struct MockPromptBackend {
    config: Arc<MockConfig>,
    call_log: Arc<Mutex<Vec<MockCall>>>,
}

#[derive(Debug, Clone)]
struct MockConfig {
    /// Checked in insertion order; first needle found in the prompt wins.
    mapped_responses: Vec<(String, String)>,
    default_response: String,
    /// Prompts containing one of these fail with a request error.
    failing_needles: Vec<String>,
    config_error: Option<String>,
    latency_ms: u64,
    failure_rate: f64,
}

/// One recorded call.
#[derive(Debug, Clone)]
pub struct MockCall {
    pub prompt: String,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub timestamp: std::time::Instant,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            mapped_responses: Vec::new(),
            default_response: "Mock response".to_string(),
            failing_needles: Vec::new(),
            config_error: None,
            latency_ms: 0,
            failure_rate: 0.0,
        }
    }
}

impl MockPromptBackend {
    /// Create a new mock backend with default configuration.
    pub fn new() -> Self {
        Self {
            config: Arc::new(MockConfig::default()),
            call_log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Set the response for prompts that match no mapping.
    pub fn with_fixed_response(mut self, response: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.config).default_response = response.into();
        self
    }

    /// Answer `response` to any prompt containing `needle`.
    pub fn with_response_containing(
        mut self,
        needle: impl Into<String>,
        response: impl Into<String>,
    ) -> Self {
        Arc::make_mut(&mut self.config)
            .mapped_responses
            .push((needle.into(), response.into()));
        self
    }

    /// Fail with a request error for any prompt containing `needle`.
    pub fn with_failure_containing(mut self, needle: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.config)
            .failing_needles
            .push(needle.into());
        self
    }

    /// Fail every call with a configuration error.
    pub fn with_config_error(mut self, message: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.config).config_error = Some(message.into());
        self
    }

    /// Set simulated latency for all calls.
    pub fn with_latency_ms(mut self, latency_ms: u64) -> Self {
        Arc::make_mut(&mut self.config).latency_ms = latency_ms;
        self
    }

    /// Set failure rate (0.0 - 1.0) for testing error handling.
    pub fn with_failure_rate(mut self, rate: f64) -> Self {
        Arc::make_mut(&mut self.config).failure_rate = rate.clamp(0.0, 1.0);
        self
    }

    /// Get all logged calls for assertion.
    pub fn get_calls(&self) -> Vec<MockCall> {
        self.call_log.lock().unwrap().clone()
    }

    /// Number of calls received.
    pub fn call_count(&self) -> usize {
        self.call_log.lock().unwrap().len()
    }

    /// Clear the call log.
    pub fn clear_calls(&self) {
        self.call_log.lock().unwrap().clear()
    }

    fn log_call(&self, request: &PromptRequest) {
        self.call_log.lock().unwrap().push(MockCall {
            prompt: request.prompt.clone(),
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            timestamp: std::time::Instant::now(),
        });
    }

    fn should_fail(&self) -> bool {
        use rand::Rng;
        if self.config.failure_rate > 0.0 {
            rand::thread_rng().gen::<f64>() < self.config.failure_rate
        } else {
            false
        }
    }
}

impl Default for MockPromptBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PromptBackend for MockPromptBackend {
    async fn complete(&self, request: &PromptRequest) -> Result<String> {
        self.log_call(request);

        if self.config.latency_ms > 0 {
            tokio::time::sleep(std::time::Duration::from_millis(self.config.latency_ms)).await;
        }

        if let Some(ref message) = self.config.config_error {
            return Err(Error::Config(message.clone()));
        }

        if self.should_fail()
            || self
                .config
                .failing_needles
                .iter()
                .any(|needle| request.prompt.contains(needle.as_str()))
        {
            return Err(Error::Request("Simulated failure for testing".to_string()));
        }

        let response = self
            .config
            .mapped_responses
            .iter()
            .find(|(needle, _)| request.prompt.contains(needle.as_str()))
            .map(|(_, response)| response.clone())
            .unwrap_or_else(|| self.config.default_response.clone());
        Ok(response)
    }

    fn provider_id(&self) -> &str {
        "mock"
    }

    fn model_name(&self) -> &str {
        "mock-model"
    }
}
