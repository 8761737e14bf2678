//! Uniform result envelope and the failure policy shared by resource modules
//!
//! Every resource operation returns `Envelope<T>`. [`normalize`] is the one
//! place that decides, per failure class, whether an outcome becomes a failed
//! envelope, a mock fallback or a hard error.

use crate::error::{ApiError, ApiResult, ErrorKind};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{error, warn};

/// `{success, data, message}` wrapper around every API result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope<T> {
    /// Whether the operation succeeded
    pub success: bool,
    /// Payload on success
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Human-readable outcome
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Backend error code, if the backend sent one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    /// Failure class for failed envelopes built on the client
    #[serde(skip)]
    pub kind: Option<ErrorKind>,
}

impl<T> Envelope<T> {
    /// Successful envelope with data
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            error_code: None,
            kind: None,
        }
    }

    /// Successful envelope without data
    #[must_use]
    pub fn empty() -> Self {
        Self {
            success: true,
            data: None,
            message: None,
            error_code: None,
            kind: None,
        }
    }

    /// Failed envelope
    pub fn failure(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.into()),
            error_code: None,
            kind: Some(kind),
        }
    }

    /// Set the message
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Convert to the tagged result form
    pub fn into_result(self) -> Result<Option<T>, Failure> {
        if self.success {
            Ok(self.data)
        } else {
            Err(Failure {
                kind: self.kind.unwrap_or(ErrorKind::ValidationRejected),
                message: self.message.unwrap_or_default(),
            })
        }
    }
}

/// Failure half of [`Envelope::into_result`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Failure {
    /// Failure class
    pub kind: ErrorKind,
    /// Actionable message
    pub message: String,
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message, self.kind)
    }
}

impl std::error::Error for Failure {}

/// Whether an operation only reads or also mutates backend state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Idempotent read; eligible for mock fallback
    Read,
    /// Mutation; never fabricated
    Write,
}

/// Static description of a resource operation
#[derive(Debug, Clone, Copy)]
pub struct Operation {
    /// Name used in logs
    pub name: &'static str,
    /// Read or write
    pub access: Access,
    /// Message attached to successful envelopes without one
    pub success_message: &'static str,
    /// Message used when a failure carries none
    pub failure_message: &'static str,
}

impl Operation {
    /// Describe a read operation
    #[must_use]
    pub const fn read(
        name: &'static str,
        success_message: &'static str,
        failure_message: &'static str,
    ) -> Self {
        Self {
            name,
            access: Access::Read,
            success_message,
            failure_message,
        }
    }

    /// Describe a write operation
    #[must_use]
    pub const fn write(
        name: &'static str,
        success_message: &'static str,
        failure_message: &'static str,
    ) -> Self {
        Self {
            name,
            access: Access::Write,
            success_message,
            failure_message,
        }
    }
}

/// What a resource module should do with an outcome
#[derive(Debug)]
pub enum Resolution<T> {
    /// Final answer for the caller
    Done(ApiResult<Envelope<T>>),
    /// Substitute mock data
    Fallback,
}

/// Apply the failure policy to an operation outcome
///
/// - success: passed through, with a default message
/// - backend `success: false` or 4xx rejection: failed envelope with the
///   backend message or the operation default
/// - unreachable backend or 404: mock fallback for reads when enabled,
///   otherwise a failed "unavailable" envelope
/// - 401, 5xx, timeout and client-side failures: hard error
pub fn normalize<T>(
    op: &Operation,
    outcome: ApiResult<Envelope<T>>,
    mock_fallback: bool,
) -> Resolution<T> {
    match outcome {
        Ok(envelope) if envelope.success => {
            let envelope = if envelope.message.is_none() {
                envelope.with_message(op.success_message)
            } else {
                envelope
            };
            Resolution::Done(Ok(envelope))
        }
        Ok(envelope) => {
            let message = envelope
                .message
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| op.failure_message.to_string());
            warn!(operation = op.name, message = %message, "Backend reported failure");
            let mut failed = Envelope::failure(ErrorKind::ValidationRejected, message);
            failed.error_code = envelope.error_code;
            Resolution::Done(Ok(failed))
        }
        Err(e) if e.is_unavailable() => {
            if op.access == Access::Read && mock_fallback {
                warn!(operation = op.name, error = %e, "Backend unavailable, serving mock data");
                return Resolution::Fallback;
            }
            warn!(operation = op.name, error = %e, "Backend unavailable");
            Resolution::Done(Ok(Envelope::failure(
                e.kind(),
                format!("{}: backend unavailable ({e})", op.failure_message),
            )))
        }
        Err(ApiError::ValidationRejected { status, message }) => {
            let message = message.unwrap_or_else(|| op.failure_message.to_string());
            warn!(operation = op.name, status, message = %message, "Request rejected");
            Resolution::Done(Ok(Envelope::failure(ErrorKind::ValidationRejected, message)))
        }
        Err(e) => {
            error!(operation = op.name, kind = %e.kind(), error = %e, "Operation failed");
            Resolution::Done(Err(e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    const READ: Operation = Operation::read("get_things", "Loaded", "Failed to load");
    const WRITE: Operation = Operation::write("create_thing", "Created", "Failed to create");

    fn refused() -> ApiError {
        ApiError::ConnectionUnavailable {
            url: "http://localhost:1/api/things".into(),
            message: "connection refused".into(),
        }
    }

    fn done<T: fmt::Debug>(resolution: Resolution<T>) -> ApiResult<Envelope<T>> {
        match resolution {
            Resolution::Done(result) => result,
            Resolution::Fallback => panic!("unexpected fallback"),
        }
    }

    #[test]
    fn test_success_gets_default_message() {
        let env = done(normalize(&READ, Ok(Envelope::ok(1)), true)).unwrap();
        assert_eq!(env.message.as_deref(), Some("Loaded"));
        assert_eq!(env.into_result().unwrap(), Some(1));
    }

    #[test]
    fn test_read_unavailable_falls_back() {
        assert!(matches!(
            normalize::<i32>(&READ, Err(refused()), true),
            Resolution::Fallback
        ));
        assert!(matches!(
            normalize::<i32>(&READ, Err(ApiError::from_status(404, "u", None)), true),
            Resolution::Fallback
        ));
    }

    #[test]
    fn test_read_unavailable_without_mock() {
        let env = done(normalize::<i32>(&READ, Err(refused()), false)).unwrap();
        assert!(!env.success);
        assert_eq!(env.kind, Some(ErrorKind::ConnectionUnavailable));
    }

    #[test]
    fn test_write_never_falls_back() {
        let env = done(normalize::<i32>(&WRITE, Err(refused()), true)).unwrap();
        assert!(!env.success);
        assert!(env.message.as_deref().unwrap().starts_with("Failed to create"));

        let failure = env.into_result().unwrap_err();
        assert_eq!(failure.kind, ErrorKind::ConnectionUnavailable);
        assert!(!failure.message.is_empty());
    }

    #[test]
    fn test_rejection_uses_backend_message() {
        let err = ApiError::from_status(400, "u", Some("name already exists".into()));
        let env = done(normalize::<i32>(&WRITE, Err(err), true)).unwrap();
        assert_eq!(env.message.as_deref(), Some("name already exists"));

        let err = ApiError::from_status(422, "u", None);
        let env = done(normalize::<i32>(&WRITE, Err(err), true)).unwrap();
        assert_eq!(env.message.as_deref(), Some("Failed to create"));
    }

    #[test]
    fn test_backend_failure_body() {
        let body = Envelope::<i32> {
            success: false,
            data: None,
            message: None,
            error_code: Some("DUPLICATE".into()),
            kind: None,
        };
        let env = done(normalize(&WRITE, Ok(body), true)).unwrap();
        assert!(!env.success);
        assert_eq!(env.message.as_deref(), Some("Failed to create"));
        assert_eq!(env.error_code.as_deref(), Some("DUPLICATE"));
    }

    #[test]
    fn test_hard_failures_propagate() {
        for err in [
            ApiError::from_status(500, "u", None),
            ApiError::Unauthorized,
            ApiError::Timeout(Duration::from_secs(10)),
        ] {
            let kind = err.kind();
            let result = done(normalize::<i32>(&READ, Err(err), true));
            assert_eq!(result.unwrap_err().kind(), kind);
        }
    }

    #[test]
    fn test_envelope_serialization_shape() {
        let json = serde_json::to_value(Envelope::ok(vec![1, 2]).with_message("ok")).unwrap();
        assert_eq!(json, serde_json::json!({"success": true, "data": [1, 2], "message": "ok"}));

        let json = serde_json::to_value(Envelope::<()>::failure(ErrorKind::NotFound, "gone")).unwrap();
        assert_eq!(json, serde_json::json!({"success": false, "message": "gone"}));
    }
}
