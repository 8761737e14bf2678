//! Request correlation ids

use super::RequestInterceptor;
use crate::auth::AuthContext;
use crate::error::ApiResult;
use reqwest::Request;
use reqwest::header::HeaderValue;
use uuid::Uuid;

/// Request correlation ID header
pub const X_REQUEST_ID: &str = "X-Request-ID";

/// Tags each request with a fresh `X-Request-ID`
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestId;

impl RequestInterceptor for RequestId {
    fn before_request(&self, request: &mut Request, _auth: &AuthContext) -> ApiResult<()> {
        if request.headers().contains_key(X_REQUEST_ID) {
            return Ok(());
        }

        let id = Uuid::new_v4().to_string();
        if let Ok(value) = HeaderValue::from_str(&id) {
            request.headers_mut().insert(X_REQUEST_ID, value);
        }
        Ok(())
    }
}
