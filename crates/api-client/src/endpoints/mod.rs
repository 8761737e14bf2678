//! Resource API modules
//!
//! One module per backend resource. Every operation returns
//! `ApiResult<Envelope<T>>` after passing its outcome through
//! [`normalize`](crate::envelope::normalize).
//!
//! | Module | Backend paths |
//! |--------|---------------|
//! | `categories` | `/categories`, `/questions/by-category`, `/questions/batch-delete` |
//! | `recognition` | `/recognition/images`, `/upload/question-segment`, `/upload/save-questions` |
//! | `test_paper` | `/test-paper/generate`, `/test-paper/generate-answers` |

pub mod categories;
pub mod recognition;
pub mod test_paper;

pub use categories::CategoriesApi;
pub use recognition::RecognitionApi;
pub use test_paper::TestPaperApi;

use crate::auth::AuthContext;
use crate::client::Transport;
use crate::envelope::{Envelope, Operation, Resolution, normalize};
use crate::error::{ApiError, ApiResult, ErrorKind};
use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use std::future::Future;
use tracing::debug;

/// Send a request and decode the body into an envelope
pub(crate) async fn fetch<T: DeserializeOwned>(
    transport: &Transport,
    builder: RequestBuilder,
    auth: &AuthContext,
) -> ApiResult<Envelope<T>> {
    transport.send(builder, auth).await?.envelope()
}

/// Send a request whose response payload is irrelevant
///
/// A 2xx with a body that is not JSON still counts as success.
pub(crate) async fn acknowledge(
    transport: &Transport,
    builder: RequestBuilder,
    auth: &AuthContext,
) -> ApiResult<Envelope<()>> {
    let raw = transport.send(builder, auth).await?;
    let envelope = match raw.envelope::<serde_json::Value>() {
        Ok(envelope) => envelope,
        Err(e) => {
            debug!(error = %e, "Ignoring undecodable acknowledgement body");
            Envelope::empty()
        }
    };
    Ok(Envelope {
        success: envelope.success,
        data: None,
        message: envelope.message,
        error_code: envelope.error_code,
        kind: envelope.kind,
    })
}

/// Resolve a read outcome, substituting mock data when the policy says so
pub(crate) async fn read<T, F, Fut>(
    op: &Operation,
    outcome: ApiResult<Envelope<T>>,
    mock_fallback: bool,
    mock: F,
) -> ApiResult<Envelope<T>>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = T>,
{
    match normalize(op, outcome, mock_fallback) {
        Resolution::Done(result) => result,
        Resolution::Fallback => Ok(Envelope::ok(mock().await).with_message(op.success_message)),
    }
}

/// Resolve a write outcome; writes are never substituted
pub(crate) fn write<T>(op: &Operation, outcome: ApiResult<Envelope<T>>) -> ApiResult<Envelope<T>> {
    match normalize(op, outcome, false) {
        Resolution::Done(result) => result,
        Resolution::Fallback => Ok(Envelope::failure(
            ErrorKind::ConnectionUnavailable,
            format!("{}: backend unavailable", op.failure_message),
        )),
    }
}

/// Check an identifier used as a path segment
pub(crate) fn require_id<'a>(what: &str, id: &'a str) -> ApiResult<&'a str> {
    let id = id.trim();
    if id.is_empty() {
        return Err(ApiError::invalid_input(format!("{what} cannot be empty")));
    }
    if id.contains(['/', '?', '#']) {
        return Err(ApiError::invalid_input(format!(
            "{what} \"{id}\" contains reserved characters"
        )));
    }
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    const OP: Operation = Operation::read("get_numbers", "Loaded numbers", "Failed to load numbers");

    #[tokio::test]
    async fn test_read_fallback_uses_mock() {
        let outcome = Err(ApiError::from_status(404, "http://x/numbers", None));
        let env = read(&OP, outcome, true, || async { vec![1, 2, 3] }).await.unwrap();
        assert!(env.success);
        assert_eq!(env.data, Some(vec![1, 2, 3]));
        assert_eq!(env.message.as_deref(), Some("Loaded numbers"));
    }

    #[tokio::test]
    async fn test_read_success_skips_mock() {
        let env = read(&OP, Ok(Envelope::ok(vec![9])), true, || async { Vec::new() })
            .await
            .unwrap();
        assert_eq!(env.data, Some(vec![9]));
    }

    #[test]
    fn test_write_unavailable_fails_softly() {
        let outcome: ApiResult<Envelope<()>> = Err(ApiError::ConnectionUnavailable {
            url: "http://x".into(),
            message: "refused".into(),
        });
        let env = write(&OP, outcome).unwrap();
        assert!(!env.success);
        assert!(!env.message.unwrap_or_default().is_empty());
    }

    #[test]
    fn test_require_id() {
        assert_eq!(require_id("category id", " 7 ").unwrap(), "7");
        assert!(require_id("category id", "").is_err());
        assert!(require_id("category id", "1/2").is_err());
    }
}
