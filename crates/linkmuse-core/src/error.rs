//! Error types for linkmuse.

use thiserror::Error;

/// Result type alias using linkmuse's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for linkmuse operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error (missing credential, unknown provider, bad value)
    #[error("Configuration error: {0}")]
    Config(String),

    /// HTTP/network request failed before a response arrived
    #[error("Request error: {0}")]
    Request(String),

    /// Provider returned an error status or an unusable response
    #[error("Inference error: {0}")]
    Inference(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// File I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether this error means no call can succeed until configuration changes.
    ///
    /// Discovery aborts the whole run on these and skips the candidate on
    /// everything else.
    pub fn is_config(&self) -> bool {
        matches!(self, Error::Config(_))
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Request(e.to_string())
    }
}
