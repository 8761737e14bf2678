//! Bearer token injection and session invalidation

use super::{RequestInterceptor, ResponseInterceptor};
use crate::auth::AuthContext;
use crate::error::{ApiError, ApiResult};
use reqwest::Request;
use reqwest::header::{AUTHORIZATION, HeaderValue};
use tracing::{info, warn};

/// Attaches `Authorization: Bearer <token>` when the context holds a token
#[derive(Debug, Clone, Copy, Default)]
pub struct BearerAuth;

impl RequestInterceptor for BearerAuth {
    fn before_request(&self, request: &mut Request, auth: &AuthContext) -> ApiResult<()> {
        let Some(token) = auth.token()? else {
            return Ok(());
        };

        let value = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|_| ApiError::invalid_input("auth token contains characters not allowed in headers"))?;
        request.headers_mut().insert(AUTHORIZATION, value);
        Ok(())
    }
}

/// Clears the token when the backend answers 401
///
/// Redirecting to a sign-in screen is the caller's job.
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionGuard;

impl ResponseInterceptor for SessionGuard {
    fn on_error(&self, error: &ApiError, auth: &AuthContext) {
        if !matches!(error, ApiError::Unauthorized) {
            return;
        }

        match auth.clear() {
            Ok(()) => info!("Session rejected by backend, cleared stored token"),
            Err(e) => warn!(error = %e, "Session rejected by backend, failed to clear token"),
        }
    }
}
