//! Claude messages API backend.
//!
//! Authenticates with `x-api-key` and reads the completion from the first
//! text block of `content[]`.

mod backend;
mod types;

pub use backend::ClaudeBackend;
pub use types::*;
