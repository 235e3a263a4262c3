//! # linkmuse-core
//!
//! Core types, traits, and abstractions for linkmuse.
//!
//! This crate provides the shared data model (documents, relevance results,
//! potential links, analysis budgets), the error type, centralized defaults,
//! and the async traits that the inference and discovery crates plug into.

pub mod defaults;
pub mod error;
pub mod links;
pub mod models;
pub mod traits;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use links::extract_wiki_links;
pub use models::*;
pub use traits::*;
