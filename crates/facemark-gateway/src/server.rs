// SPDX-FileCopyrightText: 2026 Facemark Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state for the gateway.

use std::sync::Arc;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;

use facemark_core::{AttendanceStore, FacemarkError, ImageStore, JobQueue, StudentStore};

use crate::auth::{IdentityConfig, identity_middleware};
use crate::handlers::{self, MAX_ENCODED_IMAGE_BYTES};

/// Shared state for axum request handlers.
///
/// All backing services are injected as trait objects; handlers never touch
/// a concrete store or client type.
#[derive(Clone)]
pub struct GatewayState {
    pub students: Arc<dyn StudentStore>,
    pub attendance: Arc<dyn AttendanceStore>,
    pub queue: Arc<dyn JobQueue>,
    pub images: Arc<dyn ImageStore>,
    pub auth: IdentityConfig,
    /// Name of the comparison job queue submissions are routed to.
    pub queue_name: String,
    /// Process start time for uptime reporting.
    pub start_time: std::time::Instant,
}

/// Gateway server configuration (mirrors GatewayConfig from facemark-config).
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host address to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
}

/// Builds the gateway router.
///
/// - GET  /health (public)
/// - POST /v1/attendance (identity-verified)
/// - GET  /v1/attendance/{tracking_id} (identity-verified)
/// - POST /v1/students/face (identity-verified)
pub fn build_router(state: GatewayState) -> Router {
    let auth_state = state.auth.clone();

    // Unauthenticated public routes (health for process supervisors).
    let public_routes = Router::new()
        .route("/health", get(handlers::get_public_health))
        .with_state(state.clone());

    // Routes requiring a verified identity. The body limit must clear the
    // 13 MiB encoded-payload ceiling so the handler's own size check is the
    // one that answers with 413.
    let api_routes = Router::new()
        .route("/v1/attendance", post(handlers::post_attendance))
        .route("/v1/attendance/{tracking_id}", get(handlers::get_attendance))
        .route("/v1/students/face", post(handlers::post_register_face))
        .layer(DefaultBodyLimit::max(MAX_ENCODED_IMAGE_BYTES + 1024 * 1024))
        .route_layer(axum_middleware::from_fn_with_state(
            auth_state,
            identity_middleware,
        ))
        .with_state(state);

    Router::new()
        .merge(public_routes)
        .merge(api_routes)
        .layer(CorsLayer::permissive())
}

/// Start the gateway HTTP server.
pub async fn start_server(config: &ServerConfig, state: GatewayState) -> Result<(), FacemarkError> {
    let app = build_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener =
        tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| FacemarkError::Gateway {
                message: format!("failed to bind gateway to {addr}: {e}"),
                source: Some(Box::new(e)),
            })?;

    tracing::info!("gateway server listening on {addr}");

    axum::serve(listener, app)
        .await
        .map_err(|e| FacemarkError::Gateway {
            message: format!("gateway server error: {e}"),
            source: Some(Box::new(e)),
        })?;

    Ok(())
}
