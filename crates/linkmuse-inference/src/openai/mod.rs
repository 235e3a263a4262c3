//! OpenAI-compatible chat completions backend.
//!
//! Serves every provider that speaks the chat completions envelope with
//! bearer authentication:
//!
//! - OpenAI cloud API
//! - SiliconFlow
//! - Volcengine Ark (adds an `X-Request-Id` header)
//!
//! # Example
//!
//! ```rust,no_run
//! use linkmuse_core::PromptBackend;
//! use linkmuse_inference::openai::OpenAICompatBackend;
//! use linkmuse_inference::{ProviderConfig, ProviderKind};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = ProviderConfig::new(ProviderKind::SiliconFlow).with_api_key("sk-...");
//!     let backend = OpenAICompatBackend::new(config).unwrap();
//!     let reply = backend.send_prompt("Hello").await.unwrap();
//!     println!("{}", reply);
//! }
//! ```

mod backend;
mod types;

pub use backend::{generate_request_id, OpenAICompatBackend};
pub use types::*;
