//! HTTP middleware for extension-gate
//!
//! This module provides the authentication middleware that fronts every
//! protected route, plus request/response logging.

use axum::{
    extract::{Request, State},
    http::{HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use std::time::Instant;

use crate::auth::{AuthGate, AuthHeaders};
use crate::error::AuthError;

/// Credential transport headers
pub const HEADER_TOKEN: &str = "x-extension-token";
pub const HEADER_EXTENSION_ID: &str = "x-extension-id";
pub const HEADER_EXTENSION_VERSION: &str = "x-extension-version";
pub const HEADER_FINGERPRINT: &str = "x-extension-fingerprint";
pub const HEADER_REQUEST_ID: &str = "x-request-id";

/// Trust markers set on the forwarded request after admission
pub const HEADER_VALIDATED_ID: &str = "x-validated-extension-id";
pub const HEADER_SESSION_VALID: &str = "x-session-valid";

/// Paths that skip authentication entirely
const AUTH_SKIP_PATHS: &[&str] = &["/health", "/", "/api/auth/register"];

/// Validated identity marker inserted into request extensions on admission
#[derive(Clone, Debug)]
pub struct ValidatedExtension(pub String);

/// Authentication middleware function
///
/// Every rejection short-circuits here; handlers behind this middleware only
/// ever see admitted requests carrying a [`ValidatedExtension`] extension and
/// the trust-marker headers.
pub async fn auth_middleware(
    State(gate): State<Arc<AuthGate>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthRejection> {
    let path = request.uri().path();

    // The bypass list is matched exactly; the registration endpoint
    // authenticates itself via the body/header consistency check
    if AUTH_SKIP_PATHS.contains(&path) {
        return Ok(next.run(request).await);
    }

    let headers = extract_auth_headers(&request);
    let endpoint = path.to_string();
    let method = request.method().to_string();

    let extension_id = gate
        .authenticate(&headers, &endpoint, &method)
        .map_err(AuthRejection::from_error)?;

    // Annotate the forwarded request for downstream handlers
    if let Ok(value) = HeaderValue::from_str(&extension_id) {
        request.headers_mut().insert(HEADER_VALIDATED_ID, value);
    }
    request
        .headers_mut()
        .insert(HEADER_SESSION_VALID, HeaderValue::from_static("true"));
    request
        .extensions_mut()
        .insert(ValidatedExtension(extension_id));

    Ok(next.run(request).await)
}

/// Pull the credential headers off a request; absent headers become empty
pub fn extract_auth_headers(request: &Request) -> AuthHeaders {
    let header = |name: &str| {
        request
            .headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string()
    };

    AuthHeaders {
        token: header(HEADER_TOKEN),
        extension_id: header(HEADER_EXTENSION_ID),
        extension_version: header(HEADER_EXTENSION_VERSION),
        fingerprint: header(HEADER_FINGERPRINT),
        request_id: header(HEADER_REQUEST_ID),
    }
}

/// Authentication error response
///
/// Plain status plus a short text body; internals are never exposed.
pub struct AuthRejection {
    status: StatusCode,
    message: &'static str,
}

impl AuthRejection {
    pub fn from_error(error: AuthError) -> Self {
        match error {
            AuthError::MissingCredentials => Self {
                status: StatusCode::UNAUTHORIZED,
                message: "Missing authentication headers",
            },
            AuthError::InvalidToken => Self {
                status: StatusCode::UNAUTHORIZED,
                message: "Invalid token",
            },
            AuthError::NotRegistered => Self {
                status: StatusCode::UNAUTHORIZED,
                message: "Extension not registered or inactive",
            },
            AuthError::RateLimited => Self {
                status: StatusCode::TOO_MANY_REQUESTS,
                message: "Rate limit exceeded",
            },
            AuthError::IdentityMismatch => Self {
                status: StatusCode::BAD_REQUEST,
                message: "Extension ID mismatch",
            },
            AuthError::RegistryFull => Self {
                status: StatusCode::SERVICE_UNAVAILABLE,
                message: "Maximum extensions reached",
            },
        }
    }

    pub(crate) fn with_status(status: StatusCode, message: &'static str) -> Self {
        Self { status, message }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        (self.status, self.message).into_response()
    }
}

/// Logging middleware function
///
/// Logs method, path, status, and elapsed time for every request.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let uri = request.uri().clone();

    let response = next.run(request).await;

    let elapsed = start.elapsed();
    let status = response.status();

    tracing::info!(
        method = %method,
        path = %uri.path(),
        status = %status.as_u16(),
        duration_ms = %elapsed.as_millis(),
        "Request completed"
    );

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    // Test 1: Error-to-status mapping covers the whole taxonomy
    #[test]
    fn test_rejection_status_mapping() {
        let cases = [
            (AuthError::MissingCredentials, StatusCode::UNAUTHORIZED),
            (AuthError::InvalidToken, StatusCode::UNAUTHORIZED),
            (AuthError::NotRegistered, StatusCode::UNAUTHORIZED),
            (AuthError::RateLimited, StatusCode::TOO_MANY_REQUESTS),
            (AuthError::IdentityMismatch, StatusCode::BAD_REQUEST),
            (AuthError::RegistryFull, StatusCode::SERVICE_UNAVAILABLE),
        ];
        for (error, status) in cases {
            assert_eq!(AuthRejection::from_error(error).status(), status);
        }
    }

    // Test 2: Skip list is matched exactly, not by prefix
    #[test]
    fn test_auth_skip_paths() {
        assert!(AUTH_SKIP_PATHS.contains(&"/health"));
        assert!(AUTH_SKIP_PATHS.contains(&"/"));
        assert!(AUTH_SKIP_PATHS.contains(&"/api/auth/register"));
        assert!(!AUTH_SKIP_PATHS.contains(&"/api/auth/validate"));
    }

    // Test 3: Header extraction tolerates absent headers
    #[test]
    fn test_extract_auth_headers_absent() {
        let request = Request::builder().uri("/api/x").body(axum::body::Body::empty()).unwrap();
        let headers = extract_auth_headers(&request);
        assert!(headers.token.is_empty());
        assert!(headers.extension_id.is_empty());
    }

    // Test 4: Header extraction reads all five credential headers
    #[test]
    fn test_extract_auth_headers_present() {
        let request = Request::builder()
            .uri("/api/x")
            .header(HEADER_TOKEN, "tok")
            .header(HEADER_EXTENSION_ID, "ext-A")
            .header(HEADER_EXTENSION_VERSION, "1.2.3")
            .header(HEADER_FINGERPRINT, "fp1")
            .header(HEADER_REQUEST_ID, "req-9")
            .body(axum::body::Body::empty())
            .unwrap();

        let headers = extract_auth_headers(&request);
        assert_eq!(headers.token, "tok");
        assert_eq!(headers.extension_id, "ext-A");
        assert_eq!(headers.extension_version, "1.2.3");
        assert_eq!(headers.fingerprint, "fp1");
        assert_eq!(headers.request_id, "req-9");
    }
}
