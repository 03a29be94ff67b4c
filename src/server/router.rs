//! HTTP router for extension-gate
//!
//! Defines the axum router: the open health and registration endpoints and
//! the gated validation/statistics endpoints. Business endpoints mounted
//! behind the same middleware receive admitted requests with a
//! [`ValidatedExtension`](super::middleware::ValidatedExtension) marker.

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware,
    response::Json,
    routing::{get, post},
    Extension, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::auth::AuthGate;
use crate::models::RegisterRequest;

use super::middleware::{
    auth_middleware, extract_auth_headers, logging_middleware, AuthRejection, ValidatedExtension,
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Authentication gate
    pub gate: Arc<AuthGate>,
}

/// Build the application router with the gate middleware applied
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/auth/register", post(register_handler))
        .route("/api/auth/validate", get(validate_handler))
        .route("/api/auth/stats", get(stats_handler))
        .layer(middleware::from_fn_with_state(
            Arc::clone(&state.gate),
            auth_middleware,
        ))
        .layer(middleware::from_fn(logging_middleware))
        .with_state(state)
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub timestamp: String,
}

/// Registration success response
#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub success: bool,
    pub message: String,
    #[serde(rename = "extensionId")]
    pub extension_id: String,
    pub timestamp: i64,
}

/// Session validation response
#[derive(Debug, Serialize, Deserialize)]
pub struct ValidateResponse {
    pub valid: bool,
    #[serde(rename = "extensionId")]
    pub extension_id: String,
    #[serde(rename = "registerTime")]
    pub register_time: i64,
    #[serde(rename = "lastActivity")]
    pub last_activity: i64,
    #[serde(rename = "requestCount")]
    pub request_count: i64,
}

/// Session statistics response
#[derive(Debug, Serialize, Deserialize)]
pub struct StatsResponse {
    #[serde(rename = "extensionId")]
    pub extension_id: String,
    #[serde(rename = "extensionVersion")]
    pub extension_version: String,
    #[serde(rename = "registerTime")]
    pub register_time: i64,
    #[serde(rename = "lastActivity")]
    pub last_activity: i64,
    #[serde(rename = "requestCount")]
    pub request_count: i64,
    pub uptime: i64,
    #[serde(rename = "isActive")]
    pub is_active: bool,
    pub fingerprint: String,
}

async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: "extension-gate".to_string(),
        timestamp: state.gate.now().to_rfc3339(),
    })
}

/// Register an extension session
///
/// Open endpoint; the identity claimed in the headers must match the one in
/// the body, which is the only check registration itself performs.
async fn register_handler(
    State(state): State<AppState>,
    request: Request,
) -> Result<Json<RegisterResponse>, AuthRejection> {
    let headers = extract_auth_headers(&request);

    let body = axum::body::to_bytes(request.into_body(), 64 * 1024)
        .await
        .map_err(|_| AuthRejection::bad_request("Invalid request body"))?;
    let register: RegisterRequest = serde_json::from_slice(&body)
        .map_err(|_| AuthRejection::bad_request("Invalid request body"))?;

    state
        .gate
        .register(
            &headers.extension_id,
            &headers.extension_version,
            &headers.token,
            register,
        )
        .map_err(AuthRejection::from_error)?;

    Ok(Json(RegisterResponse {
        success: true,
        message: "Extension registered successfully".to_string(),
        extension_id: headers.extension_id,
        timestamp: state.gate.now().timestamp(),
    }))
}

/// Report the session state for the validated caller
async fn validate_handler(
    State(state): State<AppState>,
    validated: Option<Extension<ValidatedExtension>>,
) -> Result<Json<ValidateResponse>, StatusCode> {
    let Some(Extension(ValidatedExtension(extension_id))) = validated else {
        return Err(StatusCode::UNAUTHORIZED);
    };

    let session = state
        .gate
        .session(&extension_id)
        .ok_or(StatusCode::UNAUTHORIZED)?;

    Ok(Json(ValidateResponse {
        valid: true,
        extension_id,
        register_time: session.register_time.timestamp(),
        last_activity: session.last_activity.timestamp(),
        request_count: session.request_count,
    }))
}

/// Full session snapshot for the validated caller
async fn stats_handler(
    State(state): State<AppState>,
    validated: Option<Extension<ValidatedExtension>>,
) -> Result<Json<StatsResponse>, StatusCode> {
    let Some(Extension(ValidatedExtension(extension_id))) = validated else {
        return Err(StatusCode::UNAUTHORIZED);
    };

    let session = state
        .gate
        .session(&extension_id)
        .ok_or(StatusCode::NOT_FOUND)?;

    Ok(Json(StatsResponse {
        extension_id: session.identity.extension_id.clone(),
        extension_version: session.identity.extension_version.clone(),
        register_time: session.register_time.timestamp(),
        last_activity: session.last_activity.timestamp(),
        request_count: session.request_count,
        uptime: session.uptime_secs(state.gate.now()),
        is_active: session.is_active,
        fingerprint: session.identity.fingerprint.clone(),
    }))
}

impl AuthRejection {
    fn bad_request(message: &'static str) -> Self {
        Self::with_status(StatusCode::BAD_REQUEST, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::GateConfig;
    use crate::clock::SystemClock;

    fn test_state() -> AppState {
        AppState {
            gate: Arc::new(AuthGate::new(GateConfig::default(), Arc::new(SystemClock))),
        }
    }

    // Test 1: Router builds with all routes
    #[test]
    fn test_build_router() {
        let _router = build_router(test_state());
    }

    // Test 2: Response bodies use the client's wire field names
    #[test]
    fn test_response_wire_field_names() {
        let response = ValidateResponse {
            valid: true,
            extension_id: "ext-A".to_string(),
            register_time: 1,
            last_activity: 2,
            request_count: 3,
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["extensionId"], "ext-A");
        assert_eq!(json["registerTime"], 1);
        assert_eq!(json["lastActivity"], 2);
        assert_eq!(json["requestCount"], 3);

        let stats = StatsResponse {
            extension_id: "ext-A".to_string(),
            extension_version: "1.0.0".to_string(),
            register_time: 1,
            last_activity: 2,
            request_count: 3,
            uptime: 4,
            is_active: true,
            fingerprint: "fp".to_string(),
        };
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["extensionVersion"], "1.0.0");
        assert_eq!(json["isActive"], true);
        assert_eq!(json["uptime"], 4);
    }
}
