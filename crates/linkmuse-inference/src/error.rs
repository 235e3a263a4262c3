//! Provider error handling shared by every backend.

use linkmuse_core::Error;
use serde::Deserialize;

/// Provider error codes derived from HTTP status and error type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderErrorCode {
    /// Invalid authentication credentials.
    AuthenticationError,
    /// Rate limit exceeded.
    RateLimitExceeded,
    /// Model not found or not available.
    ModelNotFound,
    /// Request too large.
    ContextLengthExceeded,
    /// Server error.
    ServerError,
    /// Unknown error.
    Unknown,
}

impl ProviderErrorCode {
    /// Determine error code from HTTP status and error type.
    pub fn from_response(status: u16, error_type: &str) -> Self {
        match (status, error_type) {
            (401, _) | (403, _) | (_, "authentication_error") => Self::AuthenticationError,
            (429, _) | (_, "rate_limit_error") => Self::RateLimitExceeded,
            (404, _) | (_, "model_not_found") | (_, "not_found_error") => Self::ModelNotFound,
            (400, _) if error_type.contains("context_length") => Self::ContextLengthExceeded,
            (500..=599, _) => Self::ServerError,
            _ => Self::Unknown,
        }
    }
}

/// Convert a provider error to a linkmuse Error.
///
/// Every non-2xx response is an inference error, including rejected
/// credentials. Only a missing credential or an unknown provider is a
/// configuration error, and those are caught before any request is sent.
pub fn to_linkmuse_error(code: ProviderErrorCode, provider: &str, message: &str) -> Error {
    match code {
        ProviderErrorCode::AuthenticationError => {
            Error::Inference(format!("{} authentication failed: {}", provider, message))
        }
        ProviderErrorCode::ModelNotFound => {
            Error::Inference(format!("{} model not found: {}", provider, message))
        }
        ProviderErrorCode::RateLimitExceeded => {
            Error::Inference(format!("{} rate limit exceeded: {}", provider, message))
        }
        ProviderErrorCode::ContextLengthExceeded => {
            Error::Inference(format!("{} context too long: {}", provider, message))
        }
        ProviderErrorCode::ServerError => {
            Error::Inference(format!("{} server error: {}", provider, message))
        }
        ProviderErrorCode::Unknown => Error::Inference(format!("{}: {}", provider, message)),
    }
}

/// Error envelope. OpenAI-shaped and Claude-shaped APIs both nest
/// `message` and `type` under `error`.
#[derive(Debug, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiError,
}

/// Detailed error information.
#[derive(Debug, Deserialize)]
pub struct ApiError {
    #[serde(default)]
    pub message: String,
    #[serde(rename = "type", default)]
    pub error_type: String,
    #[serde(default)]
    pub code: Option<serde_json::Value>,
}

/// Build an error from a non-2xx status and its raw body.
pub fn from_status(provider: &str, status: u16, body: &str) -> Error {
    let (message, error_type) = match serde_json::from_str::<ApiErrorResponse>(body) {
        Ok(parsed) => {
            let error_type = if parsed.error.error_type.is_empty() {
                parsed
                    .error
                    .code
                    .as_ref()
                    .and_then(|c| c.as_str())
                    .unwrap_or_default()
                    .to_string()
            } else {
                parsed.error.error_type
            };
            (parsed.error.message, error_type)
        }
        Err(_) => (body.chars().take(200).collect::<String>(), String::new()),
    };
    let code = ProviderErrorCode::from_response(status, &error_type);
    to_linkmuse_error(code, provider, &format!("HTTP {} {}", status, message.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_from_401() {
        let code = ProviderErrorCode::from_response(401, "invalid_api_key");
        assert_eq!(code, ProviderErrorCode::AuthenticationError);
    }

    #[test]
    fn test_error_code_from_429() {
        let code = ProviderErrorCode::from_response(429, "rate_limit_exceeded");
        assert_eq!(code, ProviderErrorCode::RateLimitExceeded);
    }

    #[test]
    fn test_error_code_from_claude_types() {
        assert_eq!(
            ProviderErrorCode::from_response(400, "authentication_error"),
            ProviderErrorCode::AuthenticationError
        );
        assert_eq!(
            ProviderErrorCode::from_response(400, "not_found_error"),
            ProviderErrorCode::ModelNotFound
        );
    }

    #[test]
    fn test_error_code_from_context_length() {
        let code = ProviderErrorCode::from_response(400, "context_length_exceeded");
        assert_eq!(code, ProviderErrorCode::ContextLengthExceeded);
    }

    #[test]
    fn test_error_code_from_502() {
        let code = ProviderErrorCode::from_response(502, "bad_gateway");
        assert_eq!(code, ProviderErrorCode::ServerError);
    }

    #[test]
    fn test_error_code_from_unknown() {
        let code = ProviderErrorCode::from_response(418, "im_a_teapot");
        assert_eq!(code, ProviderErrorCode::Unknown);
    }

    #[test]
    fn test_auth_maps_to_inference_error() {
        let err = to_linkmuse_error(ProviderErrorCode::AuthenticationError, "openai", "bad key");
        assert!(!err.is_config());
        assert!(matches!(err, Error::Inference(_)));
        assert!(err.to_string().contains("authentication failed"));
    }

    #[test]
    fn test_model_not_found_maps_to_inference_error() {
        let err = from_status("volc", 404, "no such model");
        assert!(!err.is_config());
        assert!(err.to_string().contains("model not found"));
        assert!(err.to_string().contains("404"));
    }

    #[test]
    fn test_server_error_is_not_config() {
        let err = to_linkmuse_error(ProviderErrorCode::ServerError, "volc", "boom");
        assert!(!err.is_config());
        assert!(matches!(err, Error::Inference(_)));
    }

    #[test]
    fn test_from_status_parses_openai_body() {
        let body = r#"{"error":{"message":"Invalid API key","type":"invalid_request_error","code":"invalid_api_key"}}"#;
        let err = from_status("openai", 401, body);
        assert!(matches!(err, Error::Inference(_)));
        assert!(err.to_string().contains("authentication failed"));
        assert!(err.to_string().contains("Invalid API key"));
    }

    #[test]
    fn test_from_status_parses_claude_body() {
        let body = r#"{"type":"error","error":{"type":"overloaded_error","message":"Overloaded"}}"#;
        let err = from_status("claude", 529, body);
        assert!(err.to_string().contains("Overloaded"));
        assert!(!err.is_config());
    }

    #[test]
    fn test_from_status_with_plain_body() {
        let err = from_status("siliconflow", 503, "upstream unavailable");
        assert!(err.to_string().contains("upstream unavailable"));
        assert!(err.to_string().contains("503"));
    }
}
