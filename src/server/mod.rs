//! HTTP server components for extension-gate
//!
//! This module provides the HTTP server infrastructure including:
//! - Router configuration and route handlers
//! - Authentication and logging middleware
//! - Server lifecycle management

pub mod middleware;
pub mod router;

pub use middleware::{AuthRejection, ValidatedExtension};
pub use router::{build_router, AppState, HealthResponse, RegisterResponse, StatsResponse, ValidateResponse};

use std::future::Future;
use std::net::SocketAddr;

use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;

use crate::config::ServerConfig;
use crate::error::ServerError;

/// HTTP server for extension-gate
///
/// Manages the axum server lifecycle: binding to the configured address,
/// applying middleware layers, and graceful shutdown handling.
pub struct Server {
    config: ServerConfig,
    state: AppState,
}

impl Server {
    /// Create a new server instance
    pub fn new(config: ServerConfig, state: AppState) -> Self {
        Self { config, state }
    }

    /// Get the configured bind address
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(
            self.config.host.parse().unwrap_or([0, 0, 0, 0].into()),
            self.config.port,
        )
    }

    /// Run the server until the shutdown future resolves
    pub async fn run(
        self,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> Result<(), ServerError> {
        let addr = self.bind_addr();
        let app = build_router(self.state);

        // The extension client calls from a browser context, so CORS must
        // admit the credential headers on cross-origin requests
        let app = app
            .layer(CorsLayer::permissive())
            .layer(tower_http::trace::TraceLayer::new_for_http())
            .layer(tower_http::compression::CompressionLayer::new());

        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::Bind(e.to_string()))?;

        tracing::info!("Server listening on {}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| ServerError::Serve(e.to_string()))?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }
}
