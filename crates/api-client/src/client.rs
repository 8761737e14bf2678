//! Transport clients and the top-level notebook client

use crate::auth::AuthContext;
use crate::config::ClientConfig;
use crate::endpoints::{CategoriesApi, RecognitionApi, TestPaperApi};
use crate::envelope::Envelope;
use crate::error::{ApiError, ApiResult};
use crate::middleware::{InterceptorPipeline, X_REQUEST_ID};
use crate::mock::MockBackend;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue, USER_AGENT};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{Span, debug, field, instrument, warn};

const CLIENT_USER_AGENT: &str = concat!("notebook-api-client/", env!("CARGO_PKG_VERSION"));

/// Which workload a transport serves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    /// JSON calls with the regular timeout
    Default,
    /// Multipart uploads with the long timeout; content type set per request
    Upload,
}

/// A 2xx response handed to resource modules untouched
#[derive(Debug, Clone)]
pub struct RawResponse {
    /// HTTP status
    pub status: StatusCode,
    /// Response headers
    pub headers: HeaderMap,
    /// Response body
    pub body: Vec<u8>,
}

impl RawResponse {
    /// Decode the body into an envelope
    ///
    /// Bodies that already carry a boolean `success` are read as envelopes;
    /// anything else is treated as bare data. An empty body is a successful
    /// envelope without data.
    pub fn envelope<T: DeserializeOwned>(&self) -> ApiResult<Envelope<T>> {
        if self.body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Envelope::empty());
        }

        let value: serde_json::Value = serde_json::from_slice(&self.body)?;
        if value.get("success").is_some_and(serde_json::Value::is_boolean) {
            Ok(serde_json::from_value(value)?)
        } else {
            Ok(Envelope::ok(serde_json::from_value(value)?))
        }
    }
}

/// Configured HTTP client bound to a base URL, timeout and interceptors
#[derive(Clone)]
pub struct Transport {
    inner: Client,
    base_url: Arc<str>,
    timeout: Duration,
    kind: TransportKind,
    pipeline: InterceptorPipeline,
}

impl Transport {
    /// Build a transport of the given kind
    pub fn new(
        kind: TransportKind,
        base_url: &str,
        timeout: Duration,
        pipeline: InterceptorPipeline,
    ) -> ApiResult<Self> {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(USER_AGENT, HeaderValue::from_static(CLIENT_USER_AGENT));
        default_headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if kind == TransportKind::Default {
            default_headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }

        let inner = Client::builder()
            .timeout(timeout)
            .default_headers(default_headers)
            .build()
            .map_err(ApiError::Request)?;

        Ok(Self {
            inner,
            base_url: Arc::from(base_url.trim_end_matches('/')),
            timeout,
            kind,
            pipeline,
        })
    }

    /// Kind of this transport
    #[must_use]
    pub fn kind(&self) -> TransportKind {
        self.kind
    }

    /// Timeout applied to every call
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Absolute URL for a relative path
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Start a request against a relative path
    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.inner.request(method, self.url(path))
    }

    /// Run the interceptors, send the request and classify the outcome
    #[instrument(
        skip(self, builder, auth),
        fields(request_id = field::Empty, method = field::Empty, url = field::Empty)
    )]
    pub async fn send(&self, builder: RequestBuilder, auth: &AuthContext) -> ApiResult<RawResponse> {
        let mut request = builder.build()?;
        let url = request.url().to_string();

        if let Err(e) = self.pipeline.before_request(&mut request, auth) {
            warn!(url = %url, error = %e, "Request rejected by interceptor");
            return Err(e);
        }

        let span = Span::current();
        span.record("method", request.method().as_str());
        span.record("url", url.as_str());
        if let Some(id) = request.headers().get(X_REQUEST_ID).and_then(|v| v.to_str().ok()) {
            span.record("request_id", id);
        }

        let start = Instant::now();
        let response = match self.inner.execute(request).await {
            Ok(response) => response,
            Err(e) => {
                let err = ApiError::from_transport(e, &url, self.timeout);
                debug!(error = %err, elapsed_ms = start.elapsed().as_millis(), "Request failed");
                self.pipeline.on_error(&err, auth);
                return Err(err);
            }
        };

        let status = response.status();
        let headers = response.headers().clone();
        let body = match response.bytes().await {
            Ok(bytes) => bytes.to_vec(),
            Err(e) => {
                let err = ApiError::from_transport(e, &url, self.timeout);
                self.pipeline.on_error(&err, auth);
                return Err(err);
            }
        };

        debug!(
            status = status.as_u16(),
            elapsed_ms = start.elapsed().as_millis(),
            bytes = body.len(),
            "Response received"
        );

        if status.is_success() {
            let raw = RawResponse {
                status,
                headers,
                body,
            };
            self.pipeline.on_response(&raw, auth);
            Ok(raw)
        } else {
            let err = ApiError::from_status(status.as_u16(), &url, extract_message(&body));
            self.pipeline.on_error(&err, auth);
            Err(err)
        }
    }
}

/// Pull a human-readable message out of an error body
fn extract_message(body: &[u8]) -> Option<String> {
    let value: serde_json::Value = serde_json::from_slice(body).ok()?;
    ["message", "error"]
        .iter()
        .find_map(|key| value.get(key).and_then(serde_json::Value::as_str))
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(String::from)
}

/// Mistake notebook API client
///
/// Holds one transport per workload and the mock generators used for read
/// fallback. Resource modules are obtained per [`AuthContext`].
#[derive(Clone)]
pub struct NotebookClient {
    config: Arc<ClientConfig>,
    default: Transport,
    upload: Transport,
    mock: MockBackend,
}

impl NotebookClient {
    /// Create a new client with configuration from environment
    pub fn new() -> ApiResult<Self> {
        Self::with_config(ClientConfig::from_env()?)
    }

    /// Create a new client with the standard interceptor pipeline
    pub fn with_config(config: ClientConfig) -> ApiResult<Self> {
        Self::with_pipeline(config, InterceptorPipeline::standard())
    }

    /// Create a new client with a custom interceptor pipeline
    pub fn with_pipeline(config: ClientConfig, pipeline: InterceptorPipeline) -> ApiResult<Self> {
        config.validate()?;

        let default = Transport::new(
            TransportKind::Default,
            &config.base_url,
            config.timeout,
            pipeline.clone(),
        )?;
        let upload = Transport::new(
            TransportKind::Upload,
            &config.base_url,
            config.upload_timeout,
            pipeline,
        )?;
        let mock = MockBackend::new(config.mock_latency);

        debug!(
            base_url = %config.base_url,
            environment = ?config.environment,
            mock_fallback = config.mock_fallback,
            "Notebook client ready"
        );

        Ok(Self {
            config: Arc::new(config),
            default,
            upload,
            mock,
        })
    }

    /// Get the current configuration
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Get the base URL
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Transport for JSON calls
    #[must_use]
    pub fn transport(&self) -> &Transport {
        &self.default
    }

    /// Transport for uploads
    #[must_use]
    pub fn upload_transport(&self) -> &Transport {
        &self.upload
    }

    pub(crate) fn mock(&self) -> &MockBackend {
        &self.mock
    }

    // -------------------------------------------------------------------------
    // Resource module accessors
    // -------------------------------------------------------------------------

    /// Access category endpoints
    #[must_use]
    pub fn categories(&self, auth: &AuthContext) -> CategoriesApi {
        CategoriesApi::new(self.clone(), auth.clone())
    }

    /// Access recognition and upload endpoints
    #[must_use]
    pub fn recognition(&self, auth: &AuthContext) -> RecognitionApi {
        RecognitionApi::new(self.clone(), auth.clone())
    }

    /// Access test paper export endpoints
    #[must_use]
    pub fn test_papers(&self, auth: &AuthContext) -> TestPaperApi {
        TestPaperApi::new(self.clone(), auth.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Item {
        id: i64,
    }

    fn raw(body: &str) -> RawResponse {
        RawResponse {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body: body.as_bytes().to_vec(),
        }
    }

    #[test]
    fn test_url_joining() {
        let transport = Transport::new(
            TransportKind::Default,
            "http://localhost:8080/api/",
            Duration::from_secs(10),
            InterceptorPipeline::new(),
        )
        .unwrap();

        assert_eq!(transport.url("/categories"), "http://localhost:8080/api/categories");
        assert_eq!(transport.url("categories/stats"), "http://localhost:8080/api/categories/stats");
    }

    #[test]
    fn test_envelope_from_backend_body() {
        let env: Envelope<Item> =
            raw(r#"{"success":true,"message":"ok","data":{"id":3},"errorCode":null}"#)
                .envelope()
                .unwrap();
        assert!(env.success);
        assert_eq!(env.data, Some(Item { id: 3 }));
        assert_eq!(env.message.as_deref(), Some("ok"));
    }

    #[test]
    fn test_envelope_from_bare_body() {
        let env: Envelope<Vec<Item>> = raw(r#"[{"id":1},{"id":2}]"#).envelope().unwrap();
        assert!(env.success);
        assert_eq!(env.data.unwrap().len(), 2);
    }

    #[test]
    fn test_envelope_from_empty_body() {
        let env: Envelope<()> = raw("").envelope().unwrap();
        assert!(env.success);
        assert!(env.data.is_none());
    }

    #[test]
    fn test_extract_message() {
        assert_eq!(
            extract_message(br#"{"success":false,"message":"name taken"}"#).as_deref(),
            Some("name taken")
        );
        assert_eq!(extract_message(br#"{"error":"Bad Request"}"#).as_deref(), Some("Bad Request"));
        assert_eq!(extract_message(b"<html>oops</html>"), None);
        assert_eq!(extract_message(br#"{"message":"  "}"#), None);
    }

    #[test]
    fn test_client_creation() {
        let client = NotebookClient::with_config(ClientConfig::development()).unwrap();
        assert_eq!(client.transport().timeout(), Duration::from_secs(10));
        assert_eq!(client.upload_transport().timeout(), Duration::from_secs(300));
        assert_eq!(client.upload_transport().kind(), TransportKind::Upload);
    }

    #[test]
    fn test_client_rejects_invalid_config() {
        let result = NotebookClient::with_config(ClientConfig::default().with_base_url("ftp://x"));
        assert!(matches!(result, Err(ApiError::Config(_))));
    }
}
