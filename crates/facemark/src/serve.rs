// SPDX-FileCopyrightText: 2026 Facemark Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `facemark serve` command implementation.
//!
//! Starts the full backend: SQLite storage, object store and comparison
//! service clients, notification publisher, the HTTP gateway, and the
//! comparison worker loop. All adapters are constructed here and handed to
//! the gateway and worker as explicit dependencies. Supports graceful
//! shutdown via signal handler.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use facemark_compare::FaceCompareService;
use facemark_config::model::FacemarkConfig;
use facemark_core::{FacemarkError, PluginAdapter, StorageAdapter};
use facemark_gateway::{Gateway, GatewayState, IdentityConfig, ServerConfig};
use facemark_imagestore::ObjectStoreClient;
use facemark_notify::TopicPublisher;
use facemark_storage::SqliteStorage;
use facemark_worker::{JobProcessor, WorkerLoop};

/// Runs the `facemark serve` command.
pub async fn run_serve(config: FacemarkConfig) -> Result<(), FacemarkError> {
    init_tracing(&config.service.log_level);

    info!(service = config.service.name.as_str(), "starting facemark serve");

    // Fail-closed: refuse to start an unauthenticated gateway.
    if config.gateway.enabled && config.gateway.identity_secret.is_none() {
        return Err(FacemarkError::Config(
            "gateway enabled but no identity secret configured. \
             Set gateway.identity_secret or FACEMARK_GATEWAY_IDENTITY_SECRET."
                .to_string(),
        ));
    }

    // Initialize storage.
    let storage = {
        let storage = SqliteStorage::new(config.storage.clone())
            .with_queue_max_attempts(config.worker.max_attempts);
        storage.initialize().await?;
        Arc::new(storage)
    };

    // External service clients.
    let images = Arc::new(ObjectStoreClient::new(
        config.images.endpoint.clone(),
        config.images.bucket.clone(),
    )?);
    let comparator = Arc::new(FaceCompareService::new(
        config.comparison.endpoint.clone(),
        config.comparison.api_key.as_deref(),
        config.images.bucket.clone(),
    )?);
    let publisher = Arc::new(TopicPublisher::new(
        config.notification.topic_endpoint.clone(),
        config.comparison.similarity_threshold,
    )?);
    if config.notification.topic_endpoint.is_none() {
        info!("no notification topic configured, outcomes will not be published");
    }

    // Install signal handler.
    let cancel = install_signal_handler();

    // Start the gateway (if enabled).
    let gateway = if config.gateway.enabled {
        let state = GatewayState {
            students: storage.clone(),
            attendance: storage.clone(),
            queue: storage.clone(),
            images: images.clone(),
            auth: IdentityConfig {
                identity_secret: config.gateway.identity_secret.clone(),
            },
            queue_name: config.worker.queue_name.clone(),
            start_time: std::time::Instant::now(),
        };
        let gateway = Gateway::new(
            ServerConfig {
                host: config.gateway.host.clone(),
                port: config.gateway.port,
            },
            state,
        );
        gateway.start().await?;
        Some(gateway)
    } else {
        info!("gateway disabled by configuration");
        None
    };

    // Start the comparison worker loop.
    let processor = Arc::new(JobProcessor::new(
        storage.clone(),
        storage.clone(),
        comparator.clone(),
        publisher.clone(),
        config.comparison.similarity_threshold,
    ));
    let worker = WorkerLoop::new(storage.clone(), processor, config.worker.clone());
    let worker_cancel = cancel.clone();
    let worker_handle = tokio::spawn(async move {
        worker.run(worker_cancel).await;
    });

    // Wait for shutdown.
    if let Err(e) = worker_handle.await {
        error!(error = %e, "worker task ended abnormally");
    }

    if let Some(gateway) = gateway {
        gateway.shutdown().await?;
    }
    storage.shutdown().await?;

    info!("facemark serve shutdown complete");
    Ok(())
}

/// Installs a Ctrl-C handler that cancels the returned token.
fn install_signal_handler() -> CancellationToken {
    let token = CancellationToken::new();
    let handler_token = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("shutdown signal received");
            handler_token.cancel();
        }
    });
    token
}

/// Initializes the tracing subscriber with the given log level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("facemark={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
