// SPDX-FileCopyrightText: 2026 Facemark Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP gateway for the Facemark attendance backend.
//!
//! The gateway fronts the asynchronous verification pipeline: it accepts
//! attendance submissions and face registrations, persists their artifacts,
//! and hands comparison jobs to the durable queue. The actual verification
//! outcome is observed asynchronously, via notification or the status poll
//! endpoint.

pub mod auth;
pub mod handlers;
pub mod server;

use async_trait::async_trait;
use tokio::sync::Mutex;

use facemark_core::{AdapterType, FacemarkError, HealthStatus, PluginAdapter};

pub use crate::auth::{IdentityClaims, IdentityConfig, sign_claims};
pub use crate::server::{GatewayState, ServerConfig, build_router, start_server};

/// The gateway as a managed adapter.
///
/// Runs the axum server as a background task; `shutdown` aborts it.
pub struct Gateway {
    config: ServerConfig,
    state: GatewayState,
    server_handle: Mutex<Option<tokio::task::JoinHandle<()>>>,
}

impl Gateway {
    /// Create a new gateway. The server does not run until [`Gateway::start`].
    pub fn new(config: ServerConfig, state: GatewayState) -> Self {
        Self {
            config,
            state,
            server_handle: Mutex::new(None),
        }
    }

    /// Starts the HTTP server as a background task.
    pub async fn start(&self) -> Result<(), FacemarkError> {
        let config = self.config.clone();
        let state = self.state.clone();

        let handle = tokio::spawn(async move {
            if let Err(e) = server::start_server(&config, state).await {
                tracing::error!("gateway server error: {e}");
            }
        });

        let mut server_handle = self.server_handle.lock().await;
        *server_handle = Some(handle);

        tracing::info!(
            host = self.config.host.as_str(),
            port = self.config.port,
            "gateway started"
        );
        Ok(())
    }
}

#[async_trait]
impl PluginAdapter for Gateway {
    fn name(&self) -> &str {
        "gateway"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Gateway
    }

    async fn health_check(&self) -> Result<HealthStatus, FacemarkError> {
        let handle = self.server_handle.lock().await;
        if handle.is_some() {
            Ok(HealthStatus::Healthy)
        } else {
            Ok(HealthStatus::Unhealthy("server not started".to_string()))
        }
    }

    async fn shutdown(&self) -> Result<(), FacemarkError> {
        let mut handle = self.server_handle.lock().await;
        if let Some(h) = handle.take() {
            h.abort();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use facemark_test_utils::TestHarness;

    async fn test_gateway() -> Gateway {
        let harness = TestHarness::new().await.unwrap();
        let state = GatewayState {
            students: harness.storage.clone(),
            attendance: harness.storage.clone(),
            queue: harness.storage.clone(),
            images: harness.images.clone(),
            auth: IdentityConfig {
                identity_secret: Some("secret".to_string()),
            },
            queue_name: "face-comparison".to_string(),
            start_time: std::time::Instant::now(),
        };
        Gateway::new(
            ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
            },
            state,
        )
    }

    #[tokio::test]
    async fn gateway_identity() {
        let gateway = test_gateway().await;
        assert_eq!(gateway.name(), "gateway");
        assert_eq!(gateway.adapter_type(), AdapterType::Gateway);
    }

    #[tokio::test]
    async fn gateway_health_check_before_start() {
        let gateway = test_gateway().await;
        match gateway.health_check().await.unwrap() {
            HealthStatus::Unhealthy(msg) => assert!(msg.contains("not started")),
            other => panic!("expected Unhealthy before start, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn gateway_start_and_shutdown() {
        let gateway = test_gateway().await;
        gateway.start().await.unwrap();
        assert_eq!(gateway.health_check().await.unwrap(), HealthStatus::Healthy);
        gateway.shutdown().await.unwrap();
    }
}
