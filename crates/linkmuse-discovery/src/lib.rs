//! # linkmuse-discovery
//!
//! Finds unlinked notes related to a focal note.
//!
//! This crate provides:
//! - [`LinkDiscovery`]: filter, sample, score, rank, truncate
//! - [`sampler`]: uniform sampling without replacement
//! - [`report`]: markdown rendering of suggestions
//! - [`Vault`]: a [`DocumentSource`](linkmuse_core::DocumentSource) over a
//!   directory of markdown files

pub mod engine;
pub mod report;
pub mod sampler;
pub mod vault;

pub use engine::{candidate_pool, LinkDiscovery};
pub use report::{append_report, render_link, render_report, REPORT_HEADING};
pub use sampler::{sample, sample_with_rng};
pub use vault::Vault;
