//! LLM provider catalogue and registry.
//!
//! Every supported provider is one [`ProviderKind`] variant carrying its
//! endpoint, auth scheme, wire format, and environment variable names. The
//! [`ProviderRegistry`] holds one [`ProviderConfig`] per provider plus the
//! identifier of the active one:
//!
//! ```text
//! "openai"       → chat completions, Authorization: Bearer
//! "claude"       → messages API,     x-api-key
//! "siliconflow"  → chat completions, Authorization: Bearer
//! "volc"         → chat completions, Authorization: Bearer + X-Request-Id
//! ```
//!
//! Resolving the active provider fails fast with a configuration error when
//! the identifier is unknown or its credential is absent. It never falls back
//! to another provider.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use linkmuse_core::{defaults, Error, PromptBackend, Result};

// ---------------------------------------------------------------------------
// Wire format and auth
// ---------------------------------------------------------------------------

/// Request/response envelope spoken by a provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireFormat {
    /// `choices[0].message.content`
    ChatCompletions,
    /// `content[0].text`
    Messages,
}

/// How the credential is attached to a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthScheme {
    /// `Authorization: Bearer <key>`
    Bearer,
    /// `x-api-key: <key>`
    ApiKeyHeader,
}

// ---------------------------------------------------------------------------
// Provider kind
// ---------------------------------------------------------------------------

/// Supported LLM providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    OpenAI,
    Claude,
    SiliconFlow,
    Volc,
}

impl ProviderKind {
    /// Every provider, in registration order.
    pub const ALL: [ProviderKind; 4] = [
        ProviderKind::OpenAI,
        ProviderKind::Claude,
        ProviderKind::SiliconFlow,
        ProviderKind::Volc,
    ];

    /// Identifier used in configuration.
    pub fn id(&self) -> &'static str {
        match self {
            Self::OpenAI => "openai",
            Self::Claude => "claude",
            Self::SiliconFlow => "siliconflow",
            Self::Volc => "volc",
        }
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            Self::OpenAI => defaults::OPENAI_URL,
            Self::Claude => defaults::CLAUDE_URL,
            Self::SiliconFlow => defaults::SILICONFLOW_URL,
            Self::Volc => defaults::VOLC_URL,
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            Self::OpenAI => defaults::OPENAI_MODEL,
            Self::Claude => defaults::CLAUDE_MODEL,
            Self::SiliconFlow => defaults::SILICONFLOW_MODEL,
            Self::Volc => defaults::VOLC_MODEL,
        }
    }

    pub fn wire_format(&self) -> WireFormat {
        match self {
            Self::Claude => WireFormat::Messages,
            Self::OpenAI | Self::SiliconFlow | Self::Volc => WireFormat::ChatCompletions,
        }
    }

    pub fn auth_scheme(&self) -> AuthScheme {
        match self {
            Self::Claude => AuthScheme::ApiKeyHeader,
            Self::OpenAI | Self::SiliconFlow | Self::Volc => AuthScheme::Bearer,
        }
    }

    /// Volcengine Ark expects a caller-generated `X-Request-Id`.
    pub fn sends_request_id(&self) -> bool {
        matches!(self, Self::Volc)
    }

    /// Environment variable holding the credential.
    pub fn api_key_env(&self) -> &'static str {
        match self {
            Self::OpenAI => "OPENAI_API_KEY",
            Self::Claude => "ANTHROPIC_API_KEY",
            Self::SiliconFlow => "SILICONFLOW_API_KEY",
            Self::Volc => "VOLC_API_KEY",
        }
    }

    /// Prefix for `<PREFIX>_MODEL` and `<PREFIX>_BASE_URL` overrides.
    pub fn env_prefix(&self) -> &'static str {
        match self {
            Self::OpenAI => "OPENAI",
            Self::Claude => "CLAUDE",
            Self::SiliconFlow => "SILICONFLOW",
            Self::Volc => "VOLC",
        }
    }
}

impl FromStr for ProviderKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.id() == wanted)
            .ok_or_else(|| Error::Config(format!("Unsupported LLM provider: {}", s)))
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

// ---------------------------------------------------------------------------
// Provider configuration
// ---------------------------------------------------------------------------

/// Resolved configuration for one provider.
#[derive(Clone)]
pub struct ProviderConfig {
    pub kind: ProviderKind,
    /// Full endpoint URL the prompt is POSTed to.
    pub base_url: String,
    pub model: String,
    /// Credential. `None` or empty means "not configured".
    pub api_key: Option<String>,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Per-request deadline.
    pub timeout: Duration,
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("kind", &self.kind)
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl ProviderConfig {
    /// Defaults for `kind` with no credential.
    pub fn new(kind: ProviderKind) -> Self {
        Self {
            kind,
            base_url: kind.default_base_url().to_string(),
            model: kind.default_model().to_string(),
            api_key: None,
            temperature: defaults::TEMPERATURE,
            max_tokens: defaults::MAX_TOKENS,
            timeout: Duration::from_secs(defaults::REQUEST_TIMEOUT_SECS),
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The credential, if one is configured and non-blank.
    pub fn credential(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }

    /// The credential, or a configuration error naming the provider.
    pub fn require_credential(&self) -> Result<&str> {
        self.credential().ok_or_else(|| {
            Error::Config(format!(
                "No API key configured for provider '{}' (set {})",
                self.kind,
                self.kind.api_key_env()
            ))
        })
    }
}

/// Build the HTTP client for a provider with its per-request deadline.
pub fn build_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))
}

// ---------------------------------------------------------------------------
// Backend factory
// ---------------------------------------------------------------------------

type BackendFactory = fn(ProviderConfig) -> Result<Box<dyn PromptBackend>>;

fn chat_completions_factory(config: ProviderConfig) -> Result<Box<dyn PromptBackend>> {
    Ok(Box::new(crate::openai::OpenAICompatBackend::new(config)?))
}

fn messages_factory(config: ProviderConfig) -> Result<Box<dyn PromptBackend>> {
    Ok(Box::new(crate::claude::ClaudeBackend::new(config)?))
}

/// Backend constructor for each wire format.
const FACTORIES: [(WireFormat, BackendFactory); 2] = [
    (WireFormat::ChatCompletions, chat_completions_factory),
    (WireFormat::Messages, messages_factory),
];

/// Construct the backend for a provider configuration.
pub fn build_backend(config: ProviderConfig) -> Result<Box<dyn PromptBackend>> {
    let wire = config.kind.wire_format();
    let factory = FACTORIES
        .iter()
        .find(|(format, _)| *format == wire)
        .map(|(_, factory)| *factory)
        .ok_or_else(|| Error::Config(format!("No backend for provider '{}'", config.kind)))?;
    factory(config)
}

// ---------------------------------------------------------------------------
// Provider registry
// ---------------------------------------------------------------------------

/// Registry of configured providers and the active provider identifier.
#[derive(Debug, Clone)]
pub struct ProviderRegistry {
    providers: HashMap<ProviderKind, ProviderConfig>,
    default_provider: String,
}

impl ProviderRegistry {
    /// Create an empty registry whose active provider is `default_provider`.
    pub fn new(default_provider: impl Into<String>) -> Self {
        Self {
            providers: HashMap::new(),
            default_provider: default_provider.into(),
        }
    }

    /// Register (or replace) a provider.
    pub fn register(&mut self, config: ProviderConfig) {
        info!(
            provider = %config.kind,
            base_url = %config.base_url,
            model = %config.model,
            has_credential = config.credential().is_some(),
            "Registering LLM provider"
        );
        self.providers.insert(config.kind, config);
    }

    /// Builder-style [`register`](Self::register).
    pub fn with_provider(mut self, config: ProviderConfig) -> Self {
        self.register(config);
        self
    }

    /// The active provider identifier as configured (may be invalid).
    pub fn default_provider(&self) -> &str {
        &self.default_provider
    }

    pub fn get(&self, kind: ProviderKind) -> Option<&ProviderConfig> {
        self.providers.get(&kind)
    }

    /// Registered providers, in [`ProviderKind::ALL`] order.
    pub fn providers(&self) -> impl Iterator<Item = &ProviderConfig> {
        ProviderKind::ALL
            .into_iter()
            .filter_map(|kind| self.providers.get(&kind))
    }

    /// Resolve the active provider.
    ///
    /// Errors (all [`Error::Config`]): unknown identifier, provider not
    /// registered, credential missing.
    pub fn active(&self) -> Result<&ProviderConfig> {
        let kind: ProviderKind = self.default_provider.parse()?;
        let config = self.providers.get(&kind).ok_or_else(|| {
            Error::Config(format!("Provider '{}' is not configured", kind))
        })?;
        config.require_credential()?;
        debug!(provider = %kind, model = %config.model, "Resolved active provider");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_ids_round_trip() {
        for kind in ProviderKind::ALL {
            assert_eq!(kind.id().parse::<ProviderKind>().unwrap(), kind);
        }
        assert_eq!("  OpenAI ".parse::<ProviderKind>().unwrap(), ProviderKind::OpenAI);
    }

    #[test]
    fn test_unknown_provider_is_config_error() {
        let err = "gemini".parse::<ProviderKind>().unwrap_err();
        assert!(err.is_config());
        assert!(err.to_string().contains("gemini"));
    }

    #[test]
    fn test_wire_and_auth_shapes() {
        assert_eq!(ProviderKind::Claude.wire_format(), WireFormat::Messages);
        assert_eq!(ProviderKind::Claude.auth_scheme(), AuthScheme::ApiKeyHeader);
        for kind in [ProviderKind::OpenAI, ProviderKind::SiliconFlow, ProviderKind::Volc] {
            assert_eq!(kind.wire_format(), WireFormat::ChatCompletions);
            assert_eq!(kind.auth_scheme(), AuthScheme::Bearer);
        }
        assert!(ProviderKind::Volc.sends_request_id());
        assert!(!ProviderKind::SiliconFlow.sends_request_id());
    }

    #[test]
    fn test_every_wire_format_has_a_factory() {
        for kind in ProviderKind::ALL {
            let config = ProviderConfig::new(kind).with_api_key("k");
            let backend = build_backend(config).unwrap();
            assert_eq!(backend.provider_id(), kind.id());
            assert_eq!(backend.model_name(), kind.default_model());
        }
    }

    #[test]
    fn test_provider_config_defaults() {
        let config = ProviderConfig::new(ProviderKind::SiliconFlow);
        assert_eq!(config.base_url, defaults::SILICONFLOW_URL);
        assert_eq!(config.model, defaults::SILICONFLOW_MODEL);
        assert!(config.credential().is_none());
        assert_eq!(config.max_tokens, defaults::MAX_TOKENS);
    }

    #[test]
    fn test_blank_credential_is_missing() {
        let config = ProviderConfig::new(ProviderKind::OpenAI).with_api_key("   ");
        assert!(config.credential().is_none());
        let err = config.require_credential().unwrap_err();
        assert!(err.is_config());
        assert!(err.to_string().contains("OPENAI_API_KEY"));
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let config = ProviderConfig::new(ProviderKind::Volc).with_api_key("secret-123");
        let dbg = format!("{:?}", config);
        assert!(!dbg.contains("secret-123"));
        assert!(dbg.contains("<redacted>"));
    }

    #[test]
    fn test_registry_active_resolves() {
        let registry = ProviderRegistry::new("volc")
            .with_provider(ProviderConfig::new(ProviderKind::Volc).with_api_key("k"));
        let active = registry.active().unwrap();
        assert_eq!(active.kind, ProviderKind::Volc);
    }

    #[test]
    fn test_registry_active_missing_credential() {
        let registry = ProviderRegistry::new("claude")
            .with_provider(ProviderConfig::new(ProviderKind::Claude))
            .with_provider(ProviderConfig::new(ProviderKind::OpenAI).with_api_key("k"));
        let err = registry.active().unwrap_err();
        assert!(err.is_config());
        assert!(err.to_string().contains("claude"));
    }

    #[test]
    fn test_registry_active_unknown_provider() {
        let registry = ProviderRegistry::new("mystery")
            .with_provider(ProviderConfig::new(ProviderKind::OpenAI).with_api_key("k"));
        assert!(registry.active().unwrap_err().is_config());
    }

    #[test]
    fn test_registry_active_unregistered_provider() {
        let registry = ProviderRegistry::new("openai");
        let err = registry.active().unwrap_err();
        assert!(err.to_string().contains("not configured"));
    }

    #[test]
    fn test_registry_providers_in_stable_order() {
        let registry = ProviderRegistry::new("openai")
            .with_provider(ProviderConfig::new(ProviderKind::Volc))
            .with_provider(ProviderConfig::new(ProviderKind::OpenAI));
        let kinds: Vec<_> = registry.providers().map(|p| p.kind).collect();
        assert_eq!(kinds, vec![ProviderKind::OpenAI, ProviderKind::Volc]);
    }
}
