//! REST error taxonomy.

use thiserror::Error;

/// Result type alias for REST operations.
pub type RestResult<T> = Result<T, RestError>;

/// Errors that can occur while talking to the platform REST API.
#[derive(Debug, Error)]
pub enum RestError {
    /// HTTP transport failure (connect, timeout, TLS, ...).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The service returned an error response.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Platform error code from the response body, if present.
        code: Option<i64>,
        /// Human-readable message.
        message: String,
        /// Whether the request can be retried.
        retryable: bool,
    },

    /// Configuration was rejected.
    #[error("invalid configuration: {message}")]
    InvalidConfig {
        /// What was wrong.
        message: String,
    },
}

impl RestError {
    /// Whether this error is worth retrying.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http(e) => {
                e.is_timeout()
                    || e.is_connect()
                    || e.status().is_some_and(|s| {
                        s == reqwest::StatusCode::TOO_MANY_REQUESTS || s.is_server_error()
                    })
            }
            Self::Api { retryable, .. } => *retryable,
            Self::Json(_) | Self::InvalidConfig { .. } => false,
        }
    }

    /// Error category string for logging.
    pub fn category(&self) -> &str {
        match self {
            Self::Http(_) => "network",
            Self::Json(_) => "parse",
            Self::Api { .. } => "api",
            Self::InvalidConfig { .. } => "config",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api(status: u16, retryable: bool) -> RestError {
        RestError::Api {
            status,
            code: Some(1000),
            message: "nope".into(),
            retryable,
        }
    }

    #[test]
    fn api_retryable_flag_respected() {
        assert!(api(503, true).is_retryable());
        assert!(!api(400, false).is_retryable());
    }

    #[test]
    fn json_and_config_never_retryable() {
        let json_err: RestError = serde_json::from_str::<i32>("x").unwrap_err().into();
        assert!(!json_err.is_retryable());
        assert!(
            !RestError::InvalidConfig {
                message: "bad".into()
            }
            .is_retryable()
        );
    }

    #[test]
    fn categories() {
        assert_eq!(api(500, true).category(), "api");
        let json_err: RestError = serde_json::from_str::<i32>("x").unwrap_err().into();
        assert_eq!(json_err.category(), "parse");
    }

    #[test]
    fn api_display_includes_status_and_message() {
        let err = api(404, false);
        let text = err.to_string();
        assert!(text.contains("404"));
        assert!(text.contains("nope"));
    }
}
