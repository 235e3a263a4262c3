//! # linkmuse-inference
//!
//! LLM provider gateway and relevance analysis for linkmuse.
//!
//! This crate provides:
//! - Provider catalogue and registry (OpenAI, Claude, SiliconFlow, Volcengine)
//! - Chat completions backend for OpenAI-shaped APIs
//! - Messages backend for the Claude API
//! - Provider gateway with connection testing
//! - Configuration loading from TOML and environment
//! - Relevance analysis with a tiered response parser
//!
//! # Feature Flags
//!
//! - `mock`: expose [`mock::MockPromptBackend`] to other crates' tests
//!
//! # Example
//!
//! ```rust,no_run
//! use linkmuse_core::RelevanceAnalysis;
//! use linkmuse_inference::{LinkMuseConfig, ProviderGateway, RelevanceAnalyzer};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = LinkMuseConfig::load().unwrap();
//!     let gateway = ProviderGateway::new(config.registry()).unwrap();
//!     let analyzer = RelevanceAnalyzer::new(gateway);
//!     let result = analyzer
//!         .analyze_relevance("Tokio", "async-std", "...", "...")
//!         .await
//!         .unwrap();
//!     println!("{}: {}", result.relevance_score, result.explanation);
//! }
//! ```

pub mod claude;
pub mod config;
pub mod error;
pub mod gateway;
pub mod openai;
pub mod provider;
pub mod relevance;

// Mock prompt backend for testing
#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use claude::ClaudeBackend;
pub use config::{ConfigError, LinkMuseConfig, ProviderSettings};
pub use error::ProviderErrorCode;
pub use gateway::ProviderGateway;
pub use openai::OpenAICompatBackend;
pub use provider::{build_backend, ProviderConfig, ProviderKind, ProviderRegistry};
pub use relevance::{parse_relevance_response, ParseStrategy, RelevanceAnalyzer, PARSE_CHAIN};

// Re-export core types for convenience
pub use linkmuse_core::{PromptBackend, PromptRequest, RelevanceAnalysis, RelevanceResult};
