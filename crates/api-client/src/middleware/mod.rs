//! Interceptor pipeline for request/response processing
//!
//! Request interceptors run in order on every outgoing request and may reject
//! it with an error. Response interceptors observe every 2xx response and every
//! classified failure; they never turn a failure into a success.

mod auth;
mod correlation;

pub use auth::{BearerAuth, SessionGuard};
pub use correlation::{RequestId, X_REQUEST_ID};

use crate::auth::AuthContext;
use crate::client::RawResponse;
use crate::error::{ApiError, ApiResult};
use reqwest::Request;
use std::sync::Arc;

/// Stage applied to every outgoing request
pub trait RequestInterceptor: Send + Sync {
    /// Mutate the request; an error rejects the operation
    fn before_request(&self, request: &mut Request, auth: &AuthContext) -> ApiResult<()>;
}

/// Stage applied to every response
pub trait ResponseInterceptor: Send + Sync {
    /// Called with every 2xx response
    fn on_response(&self, _response: &RawResponse, _auth: &AuthContext) {}

    /// Called with every classified failure before it propagates
    fn on_error(&self, _error: &ApiError, _auth: &AuthContext) {}
}

/// Ordered request and response interceptors
#[derive(Clone, Default)]
pub struct InterceptorPipeline {
    request: Vec<Arc<dyn RequestInterceptor>>,
    response: Vec<Arc<dyn ResponseInterceptor>>,
}

impl InterceptorPipeline {
    /// Empty pipeline
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Correlation id, bearer token and session guard
    #[must_use]
    pub fn standard() -> Self {
        Self::new()
            .with_request(RequestId)
            .with_request(BearerAuth)
            .with_response(SessionGuard)
    }

    /// Append a request interceptor
    #[must_use]
    pub fn with_request(mut self, interceptor: impl RequestInterceptor + 'static) -> Self {
        self.request.push(Arc::new(interceptor));
        self
    }

    /// Append a response interceptor
    #[must_use]
    pub fn with_response(mut self, interceptor: impl ResponseInterceptor + 'static) -> Self {
        self.response.push(Arc::new(interceptor));
        self
    }

    pub(crate) fn before_request(&self, request: &mut Request, auth: &AuthContext) -> ApiResult<()> {
        for interceptor in &self.request {
            interceptor.before_request(request, auth)?;
        }
        Ok(())
    }

    pub(crate) fn on_response(&self, response: &RawResponse, auth: &AuthContext) {
        for interceptor in &self.response {
            interceptor.on_response(response, auth);
        }
    }

    pub(crate) fn on_error(&self, error: &ApiError, auth: &AuthContext) {
        for interceptor in &self.response {
            interceptor.on_error(error, auth);
        }
    }
}
