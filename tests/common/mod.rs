//! Common test utilities and helpers for integration tests

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use extension_gate::auth::{mint_token, AuthGate, GateConfig};
use extension_gate::clock::{Clock, ManualClock};
use extension_gate::models::ExtensionIdentity;
use extension_gate::server::{build_router, AppState};

/// A server spawned on an ephemeral port with a manually driven clock
pub struct TestServer {
    pub addr: SocketAddr,
    pub gate: Arc<AuthGate>,
    pub clock: Arc<ManualClock>,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

/// Spawn the gate behind a real axum server
pub async fn spawn_server(config: GateConfig) -> TestServer {
    let clock = Arc::new(ManualClock::from_system());
    let gate = Arc::new(AuthGate::new(config, Arc::clone(&clock) as Arc<dyn Clock>));
    let app = build_router(AppState {
        gate: Arc::clone(&gate),
    });

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestServer { addr, gate, clock }
}

/// A stock identity for tests
pub fn test_identity(extension_id: &str, fingerprint: &str) -> ExtensionIdentity {
    ExtensionIdentity {
        extension_id: extension_id.to_string(),
        extension_version: "1.0.0".to_string(),
        install_time: 1_700_000_000,
        fingerprint: fingerprint.to_string(),
        user_agent: "Mozilla/5.0 Chrome/xxx Safari/xxx".to_string(),
        timezone: "America/New_York".to_string(),
    }
}

/// Registration request body matching the client wire format
pub fn register_body(identity: &ExtensionIdentity, timestamp: i64) -> serde_json::Value {
    serde_json::json!({
        "identity": identity,
        "timestamp": timestamp,
    })
}

/// Register an extension over HTTP and return its token
pub async fn register_extension(server: &TestServer, extension_id: &str, fingerprint: &str) -> String {
    let identity = test_identity(extension_id, fingerprint);
    let token = mint_token(extension_id, fingerprint, server.clock.now());

    let response = reqwest::Client::new()
        .post(server.url("/api/auth/register"))
        .header("X-Extension-Token", &token)
        .header("X-Extension-ID", extension_id)
        .header("X-Extension-Version", "1.0.0")
        .json(&register_body(&identity, server.clock.now().timestamp()))
        .send()
        .await
        .expect("Registration request failed");
    assert_eq!(response.status(), 200, "Registration should succeed");

    token
}

/// Issue a gated request with the full credential header set
pub async fn gated_get(
    server: &TestServer,
    path: &str,
    token: &str,
    extension_id: &str,
    fingerprint: &str,
) -> reqwest::Response {
    reqwest::Client::new()
        .get(server.url(path))
        .header("X-Extension-Token", token)
        .header("X-Extension-ID", extension_id)
        .header("X-Extension-Version", "1.0.0")
        .header("X-Extension-Fingerprint", fingerprint)
        .header("X-Request-ID", "test-request-1")
        .send()
        .await
        .expect("Request failed")
}
