//! Error types for the API client

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for API operations
pub type ApiResult<T> = Result<T, ApiError>;

/// API client errors
#[derive(Error, Debug)]
pub enum ApiError {
    /// Connection refused or the host could not be reached
    #[error("Backend unavailable at {url}: {message}")]
    ConnectionUnavailable {
        /// URL that was requested
        url: String,
        /// Transport error description
        message: String,
    },

    /// Endpoint or resource does not exist (HTTP 404)
    #[error("Not found: {url}")]
    NotFound {
        /// URL that was requested
        url: String,
        /// Message from the backend, if any
        message: Option<String>,
    },

    /// Backend rejected the request (4xx other than 401 and 404)
    #[error("Request rejected ({status}): {}", .message.as_deref().unwrap_or("no message"))]
    ValidationRejected {
        /// HTTP status code
        status: u16,
        /// Message from the backend, if any
        message: Option<String>,
    },

    /// Session is missing or expired (HTTP 401)
    #[error("Unauthorized - sign in again")]
    Unauthorized,

    /// Backend failed (5xx)
    #[error("Server error ({status}): {message}")]
    ServerError {
        /// HTTP status code
        status: u16,
        /// Message from the backend or the canonical reason
        message: String,
    },

    /// Request timeout
    #[error("Request timeout after {0:?}")]
    Timeout(Duration),

    /// Caller passed input that violates an operation's constraints
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Token store could not be read or written
    #[error("Token store error: {0}")]
    TokenStore(#[from] notebook_core::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Any other transport failure
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),
}

/// Failure classes shared by errors and failed envelopes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// Backend unreachable
    ConnectionUnavailable,
    /// Endpoint or resource missing
    NotFound,
    /// Backend rejected the request
    ValidationRejected,
    /// Session invalid
    Unauthorized,
    /// Backend failure
    ServerError,
    /// Request timed out
    Timeout,
    /// Caller input invalid
    InvalidInput,
    /// Client-side failure (config, token store, decoding, transport)
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ConnectionUnavailable => "connection_unavailable",
            Self::NotFound => "not_found",
            Self::ValidationRejected => "validation_rejected",
            Self::Unauthorized => "unauthorized",
            Self::ServerError => "server_error",
            Self::Timeout => "timeout",
            Self::InvalidInput => "invalid_input",
            Self::Internal => "internal",
        };
        f.write_str(name)
    }
}

impl ApiError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Classify a non-success HTTP status
    pub fn from_status(status: u16, url: impl Into<String>, message: Option<String>) -> Self {
        match status {
            401 => Self::Unauthorized,
            404 => Self::NotFound {
                url: url.into(),
                message,
            },
            400..=499 => Self::ValidationRejected { status, message },
            _ => Self::ServerError {
                status,
                message: message.unwrap_or_else(|| {
                    reqwest::StatusCode::from_u16(status)
                        .ok()
                        .and_then(|s| s.canonical_reason())
                        .unwrap_or("Unknown error")
                        .to_string()
                }),
            },
        }
    }

    /// Classify a transport failure
    pub fn from_transport(err: reqwest::Error, url: impl Into<String>, timeout: Duration) -> Self {
        if err.is_timeout() {
            Self::Timeout(timeout)
        } else if err.is_connect() {
            Self::ConnectionUnavailable {
                url: url.into(),
                message: err.to_string(),
            }
        } else {
            Self::Request(err)
        }
    }

    /// Failure class of this error
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ConnectionUnavailable { .. } => ErrorKind::ConnectionUnavailable,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::ValidationRejected { .. } => ErrorKind::ValidationRejected,
            Self::Unauthorized => ErrorKind::Unauthorized,
            Self::ServerError { .. } => ErrorKind::ServerError,
            Self::Timeout(_) => ErrorKind::Timeout,
            Self::InvalidInput(_) => ErrorKind::InvalidInput,
            Self::Config(_) | Self::TokenStore(_) | Self::Json(_) | Self::Request(_) => {
                ErrorKind::Internal
            }
        }
    }

    /// Backend unreachable or endpoint not implemented yet
    #[must_use]
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::ConnectionUnavailable | ErrorKind::NotFound
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        assert_eq!(
            ApiError::from_status(401, "u", None).kind(),
            ErrorKind::Unauthorized
        );
        assert_eq!(
            ApiError::from_status(404, "u", None).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            ApiError::from_status(422, "u", Some("name taken".into())).kind(),
            ErrorKind::ValidationRejected
        );
        assert_eq!(
            ApiError::from_status(503, "u", None).kind(),
            ErrorKind::ServerError
        );
    }

    #[test]
    fn test_server_error_default_message() {
        let err = ApiError::from_status(500, "http://x/api", None);
        assert!(matches!(
            &err,
            ApiError::ServerError { message, .. } if message == "Internal Server Error"
        ));
    }

    #[test]
    fn test_unavailable() {
        let not_found = ApiError::from_status(404, "http://x/api/categories", None);
        assert!(not_found.is_unavailable());

        let rejected = ApiError::from_status(400, "http://x/api/categories", None);
        assert!(!rejected.is_unavailable());
        assert!(rejected.to_string().contains("no message"));
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(ErrorKind::ConnectionUnavailable.to_string(), "connection_unavailable");
        assert_eq!(ErrorKind::Timeout.to_string(), "timeout");
    }
}
