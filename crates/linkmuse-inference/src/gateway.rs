//! Provider gateway: one `send_prompt` over every configured provider.
//!
//! The gateway owns a snapshot of the [`ProviderRegistry`] taken at
//! construction, so two gateways with different configurations can run side
//! by side. Each call resolves the active provider, fails fast on a
//! configuration problem, and otherwise issues exactly one request. There is
//! no retry and no fallback to another provider.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use linkmuse_core::{defaults, Error, PromptBackend, PromptRequest, Result};

use crate::provider::{build_backend, ProviderKind, ProviderRegistry};

/// Uniform prompt dispatch over the configured providers.
pub struct ProviderGateway {
    registry: ProviderRegistry,
    backends: HashMap<ProviderKind, Arc<dyn PromptBackend>>,
}

impl ProviderGateway {
    /// Build a gateway with one backend per registered provider.
    pub fn new(registry: ProviderRegistry) -> Result<Self> {
        let mut backends: HashMap<ProviderKind, Arc<dyn PromptBackend>> = HashMap::new();
        for config in registry.providers() {
            let backend = build_backend(config.clone())?;
            backends.insert(config.kind, Arc::from(backend));
        }
        Ok(Self { registry, backends })
    }

    /// Replace the backend used for `kind` (host-provided transport, tests).
    ///
    /// The registry still decides whether `kind` is active and credentialed.
    pub fn with_backend(mut self, kind: ProviderKind, backend: Arc<dyn PromptBackend>) -> Self {
        self.backends.insert(kind, backend);
        self
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    fn active_backend(&self) -> Result<&Arc<dyn PromptBackend>> {
        let config = self.registry.active()?;
        self.backends.get(&config.kind).ok_or_else(|| {
            Error::Config(format!("No backend registered for provider '{}'", config.kind))
        })
    }

    /// Check that the active provider answers a minimal prompt.
    ///
    /// Configuration errors are returned; transport and API failures are
    /// logged and reported as `Ok(false)`.
    pub async fn test_connection(&self) -> Result<bool> {
        let backend = self.active_backend()?;
        let request =
            PromptRequest::new(defaults::TEST_PROMPT).with_max_tokens(defaults::TEST_MAX_TOKENS);

        match backend.complete(&request).await {
            Ok(_) => {
                debug!(provider = backend.provider_id(), "Connection test passed");
                Ok(true)
            }
            Err(e) if e.is_config() => Err(e),
            Err(e) => {
                warn!(provider = backend.provider_id(), error = %e, "Connection test failed");
                Ok(false)
            }
        }
    }
}

#[async_trait]
impl PromptBackend for ProviderGateway {
    async fn complete(&self, request: &PromptRequest) -> Result<String> {
        let backend = self.active_backend()?;
        backend.complete(request).await.map_err(|e| {
            warn!(
                subsystem = "inference",
                component = "gateway",
                provider = backend.provider_id(),
                error = %e,
                "LLM request failed"
            );
            e
        })
    }

    fn provider_id(&self) -> &str {
        self.registry.default_provider()
    }

    fn model_name(&self) -> &str {
        self.registry
            .active()
            .map(|config| config.model.as_str())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockPromptBackend;
    use crate::provider::ProviderConfig;

    fn registry(active: &str) -> ProviderRegistry {
        ProviderRegistry::new(active)
            .with_provider(ProviderConfig::new(ProviderKind::OpenAI).with_api_key("sk-openai"))
            .with_provider(ProviderConfig::new(ProviderKind::Claude))
            .with_provider(ProviderConfig::new(ProviderKind::SiliconFlow).with_api_key("sk-sf"))
    }

    #[tokio::test]
    async fn test_dispatches_to_active_provider() {
        let openai = MockPromptBackend::new().with_fixed_response("from openai");
        let silicon = MockPromptBackend::new().with_fixed_response("from siliconflow");
        let gateway = ProviderGateway::new(registry("siliconflow"))
            .unwrap()
            .with_backend(ProviderKind::OpenAI, Arc::new(openai.clone()))
            .with_backend(ProviderKind::SiliconFlow, Arc::new(silicon.clone()));

        assert_eq!(gateway.send_prompt("hi").await.unwrap(), "from siliconflow");
        assert_eq!(silicon.call_count(), 1);
        assert_eq!(openai.call_count(), 0);
    }

    #[tokio::test]
    async fn test_missing_credential_never_reaches_backend() {
        let claude = MockPromptBackend::new();
        let openai = MockPromptBackend::new();
        let gateway = ProviderGateway::new(registry("claude"))
            .unwrap()
            .with_backend(ProviderKind::Claude, Arc::new(claude.clone()))
            .with_backend(ProviderKind::OpenAI, Arc::new(openai.clone()));

        let err = gateway.send_prompt("hi").await.unwrap_err();
        assert!(err.is_config());
        assert_eq!(claude.call_count(), 0);
        assert_eq!(openai.call_count(), 0, "must not fall back to another provider");
    }

    #[tokio::test]
    async fn test_unknown_provider_is_config_error() {
        let gateway = ProviderGateway::new(registry("gemini")).unwrap();
        let err = gateway.send_prompt("hi").await.unwrap_err();
        assert!(err.is_config());
        assert_eq!(gateway.provider_id(), "gemini");
        assert_eq!(gateway.model_name(), "");
    }

    #[tokio::test]
    async fn test_transport_error_propagates_unmodified() {
        let failing = MockPromptBackend::new().with_failure_rate(1.0);
        let gateway = ProviderGateway::new(registry("openai"))
            .unwrap()
            .with_backend(ProviderKind::OpenAI, Arc::new(failing.clone()));

        let err = gateway.send_prompt("hi").await.unwrap_err();
        assert!(matches!(err, Error::Request(_)));
        assert_eq!(failing.call_count(), 1, "no retry");
    }

    #[tokio::test]
    async fn test_connection_success_uses_small_request() {
        let openai = MockPromptBackend::new().with_fixed_response("Hi");
        let gateway = ProviderGateway::new(registry("openai"))
            .unwrap()
            .with_backend(ProviderKind::OpenAI, Arc::new(openai.clone()));

        assert!(gateway.test_connection().await.unwrap());
        let calls = openai.get_calls();
        assert_eq!(calls[0].prompt, defaults::TEST_PROMPT);
        assert_eq!(calls[0].max_tokens, Some(defaults::TEST_MAX_TOKENS));
    }

    #[tokio::test]
    async fn test_connection_failure_is_false() {
        let failing = MockPromptBackend::new().with_failure_rate(1.0);
        let gateway = ProviderGateway::new(registry("openai"))
            .unwrap()
            .with_backend(ProviderKind::OpenAI, Arc::new(failing));
        assert!(!gateway.test_connection().await.unwrap());
    }

    #[tokio::test]
    async fn test_connection_missing_credential_is_error() {
        let gateway = ProviderGateway::new(registry("claude")).unwrap();
        assert!(gateway.test_connection().await.unwrap_err().is_config());
    }

    #[test]
    fn test_model_name_of_active_provider() {
        let gateway = ProviderGateway::new(registry("openai")).unwrap();
        assert_eq!(gateway.model_name(), linkmuse_core::defaults::OPENAI_MODEL);
    }
}
