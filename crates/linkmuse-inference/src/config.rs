//! LinkMuse configuration.
//!
//! Configuration can be loaded from:
//! - a TOML file (`LINKMUSE_CONFIG`, default `./linkmuse.toml`)
//! - environment variables, which override file values
//!
//! `${VAR}` placeholders in the file are substituted from the environment
//! before parsing.
//!
//! # Example
//!
//! ```rust,no_run
//! use linkmuse_inference::config::LinkMuseConfig;
//!
//! let config = LinkMuseConfig::load().expect("Failed to load config");
//! let registry = config.registry();
//! let budget = config.budget();
//! ```

use std::collections::BTreeMap;
use std::env;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use linkmuse_core::{defaults, AnalysisBudget};

use crate::provider::{ProviderConfig, ProviderKind, ProviderRegistry};

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Invalid provider: {0}")]
    InvalidProvider(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

impl From<ConfigError> for linkmuse_core::Error {
    fn from(e: ConfigError) -> Self {
        linkmuse_core::Error::Config(e.to_string())
    }
}

/// Optional per-provider overrides. Unset fields keep the provider defaults.
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    pub api_key: Option<String>,
    pub model: Option<String>,
    /// Full endpoint URL.
    pub base_url: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub timeout_seconds: Option<u64>,
}

impl fmt::Debug for ProviderSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderSettings")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("timeout_seconds", &self.timeout_seconds)
            .finish()
    }
}

impl ProviderSettings {
    /// Resolve these settings on top of the defaults for `kind`.
    pub fn resolve(&self, kind: ProviderKind) -> ProviderConfig {
        let mut config = ProviderConfig::new(kind);
        if let Some(ref key) = self.api_key {
            config = config.with_api_key(key.clone());
        }
        if let Some(ref model) = self.model {
            config = config.with_model(model.clone());
        }
        if let Some(ref url) = self.base_url {
            config = config.with_base_url(url.clone());
        }
        if let Some(temperature) = self.temperature {
            config.temperature = temperature;
        }
        if let Some(max_tokens) = self.max_tokens {
            config.max_tokens = max_tokens;
        }
        if let Some(secs) = self.timeout_seconds {
            config = config.with_timeout(Duration::from_secs(secs));
        }
        config
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkMuseConfig {
    /// Identifier of the active provider.
    pub default_provider: String,
    pub max_notes_to_analyze: usize,
    pub max_links_to_generate: usize,
    /// Characters of each note body embedded in a relevance prompt.
    pub content_truncation: usize,
    /// Candidates scored at once during discovery.
    pub concurrency: usize,
    /// Keyed by provider identifier.
    pub providers: BTreeMap<String, ProviderSettings>,
}

impl Default for LinkMuseConfig {
    fn default() -> Self {
        Self {
            default_provider: defaults::DEFAULT_PROVIDER.to_string(),
            max_notes_to_analyze: defaults::MAX_NOTES_TO_ANALYZE,
            max_links_to_generate: defaults::MAX_LINKS_TO_GENERATE,
            content_truncation: defaults::CONTENT_TRUNCATION,
            concurrency: defaults::DISCOVERY_CONCURRENCY,
            providers: BTreeMap::new(),
        }
    }
}

impl LinkMuseConfig {
    /// Path of the config file: `LINKMUSE_CONFIG` or `./linkmuse.toml`.
    pub fn default_config_path() -> PathBuf {
        env::var("LINKMUSE_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("linkmuse.toml"))
    }

    /// Load from the default path if it exists, then apply env overrides.
    pub fn load() -> ConfigResult<Self> {
        let path = Self::default_config_path();

        let mut config = if path.exists() {
            info!(path = %path.display(), "Loading linkmuse config");
            Self::from_file(&path)?
        } else {
            debug!(
                path = %path.display(),
                "Config file not found, using defaults and environment variables"
            );
            Self::default()
        };

        config.apply_overrides(|key| env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Load from an explicit file, then apply env overrides.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        info!(path = %path.display(), "Loading linkmuse config");
        let mut config = Self::from_file(path)?;
        config.apply_overrides(|key| env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let content = Self::substitute_env_vars(&content);
        Self::from_toml_str(&content)
    }

    /// Parse and validate TOML text.
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults overridden by environment variables only.
    pub fn from_env() -> ConfigResult<Self> {
        let mut config = Self::default();
        config.apply_overrides(|key| env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from `lookup` (normally the process environment).
    pub fn apply_overrides<F>(&mut self, lookup: F) -> ConfigResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(provider) = lookup("LINKMUSE_PROVIDER") {
            self.default_provider = provider.trim().to_string();
        }
        if let Some(v) = lookup("LINKMUSE_MAX_NOTES") {
            self.max_notes_to_analyze = parse_number("LINKMUSE_MAX_NOTES", &v)?;
        }
        if let Some(v) = lookup("LINKMUSE_MAX_LINKS") {
            self.max_links_to_generate = parse_number("LINKMUSE_MAX_LINKS", &v)?;
        }
        if let Some(v) = lookup("LINKMUSE_TRUNCATION") {
            self.content_truncation = parse_number("LINKMUSE_TRUNCATION", &v)?;
        }
        if let Some(v) = lookup("LINKMUSE_CONCURRENCY") {
            self.concurrency = parse_number("LINKMUSE_CONCURRENCY", &v)?;
        }

        for kind in ProviderKind::ALL {
            let key = lookup(kind.api_key_env());
            let model = lookup(&format!("{}_MODEL", kind.env_prefix()));
            let base_url = lookup(&format!("{}_BASE_URL", kind.env_prefix()));
            if key.is_none() && model.is_none() && base_url.is_none() {
                continue;
            }

            let settings = self.providers.entry(kind.id().to_string()).or_default();
            if key.is_some() {
                settings.api_key = key;
            }
            if model.is_some() {
                settings.model = model;
            }
            if base_url.is_some() {
                settings.base_url = base_url;
            }
        }

        Ok(())
    }

    /// Validate the configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        self.default_provider
            .parse::<ProviderKind>()
            .map_err(|_| ConfigError::InvalidProvider(self.default_provider.clone()))?;

        for (name, value) in [
            ("max_notes_to_analyze", self.max_notes_to_analyze),
            ("max_links_to_generate", self.max_links_to_generate),
            ("content_truncation", self.content_truncation),
            ("concurrency", self.concurrency),
        ] {
            if value == 0 {
                return Err(ConfigError::Validation(format!("{} must be at least 1", name)));
            }
        }

        for (id, settings) in &self.providers {
            id.parse::<ProviderKind>()
                .map_err(|_| ConfigError::InvalidProvider(id.clone()))?;

            if let Some(ref url) = settings.base_url {
                if !url.starts_with("http://") && !url.starts_with("https://") {
                    return Err(ConfigError::Validation(format!(
                        "{} base_url must start with http:// or https://",
                        id
                    )));
                }
            }
            if settings.timeout_seconds == Some(0) {
                return Err(ConfigError::Validation(format!(
                    "{} timeout_seconds must be at least 1",
                    id
                )));
            }
        }

        Ok(())
    }

    /// Analysis budget for discovery runs.
    pub fn budget(&self) -> AnalysisBudget {
        AnalysisBudget::new(self.max_notes_to_analyze, self.max_links_to_generate)
    }

    /// Provider registry with every known provider registered.
    ///
    /// Providers absent from `[providers]` get their defaults and no
    /// credential, so selecting one fails at dispatch time.
    pub fn registry(&self) -> ProviderRegistry {
        let mut registry = ProviderRegistry::new(self.default_provider.clone());
        for kind in ProviderKind::ALL {
            let config = self
                .providers
                .get(kind.id())
                .map(|settings| settings.resolve(kind))
                .unwrap_or_else(|| ProviderConfig::new(kind));
            registry.register(config);
        }
        registry
    }

    /// Substitute `${VAR}` placeholders with environment values.
    ///
    /// Unset variables are left as-is.
    fn substitute_env_vars(content: &str) -> String {
        static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
        let re = PLACEHOLDER
            .get_or_init(|| Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").expect("valid regex"));
        re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .to_string()
    }
}

fn parse_number(key: &str, value: &str) -> ConfigResult<usize> {
    value.trim().parse().map_err(|_| {
        ConfigError::Validation(format!(
            "{} must be a positive integer, got '{}'",
            key, value
        ))
    })
}
