// SPDX-FileCopyrightText: 2026 Facemark Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Facemark attendance backend.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup. Store names, endpoints, and thresholds are always
//! injected through this model, never hardcoded at the use site.

use serde::{Deserialize, Serialize};

/// Top-level Facemark configuration.
///
/// Loaded from TOML files following the XDG hierarchy, with environment
/// variable overrides. All sections are optional and default to sensible
/// values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FacemarkConfig {
    /// Service identity and logging settings.
    #[serde(default)]
    pub service: ServiceConfig,

    /// HTTP gateway settings.
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Face image object-store settings.
    #[serde(default)]
    pub images: ImagesConfig,

    /// Face comparison service settings.
    #[serde(default)]
    pub comparison: ComparisonConfig,

    /// Notification topic settings.
    #[serde(default)]
    pub notification: NotificationConfig,

    /// Comparison worker settings.
    #[serde(default)]
    pub worker: WorkerConfig,
}

/// Service identity and logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceConfig {
    /// Display name of the service.
    #[serde(default = "default_service_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: default_service_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_service_name() -> String {
    "facemark".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// HTTP gateway configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    /// Enable the HTTP gateway.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Shared secret verifying the externally-issued identity claims header.
    /// The gateway refuses to start without one (fail-closed).
    #[serde(default)]
    pub identity_secret: Option<String>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            host: default_host(),
            port: default_port(),
            identity_secret: None,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_true")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_true(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("facemark").join("facemark.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("facemark.db"))
        .to_string_lossy()
        .into_owned()
}

/// Face image object-store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ImagesConfig {
    /// Base URL of the S3-compatible object store.
    #[serde(default = "default_images_endpoint")]
    pub endpoint: String,

    /// Bucket holding reference and submitted face images.
    #[serde(default = "default_images_bucket")]
    pub bucket: String,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            endpoint: default_images_endpoint(),
            bucket: default_images_bucket(),
        }
    }
}

fn default_images_endpoint() -> String {
    "http://127.0.0.1:9000".to_string()
}

fn default_images_bucket() -> String {
    "facemark-faces".to_string()
}

/// Face comparison service configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ComparisonConfig {
    /// Base URL of the face comparison service.
    #[serde(default = "default_comparison_endpoint")]
    pub endpoint: String,

    /// API key sent as a bearer token. `None` sends no Authorization header.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Minimum similarity percentage for a face match.
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f64,
}

impl Default for ComparisonConfig {
    fn default() -> Self {
        Self {
            endpoint: default_comparison_endpoint(),
            api_key: None,
            similarity_threshold: default_similarity_threshold(),
        }
    }
}

fn default_comparison_endpoint() -> String {
    "http://127.0.0.1:9100".to_string()
}

fn default_similarity_threshold() -> f64 {
    80.0
}

/// Notification topic configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct NotificationConfig {
    /// HTTP endpoint notifications are published to. `None` disables
    /// publishing (the worker logs and continues).
    #[serde(default)]
    pub topic_endpoint: Option<String>,
}

/// Comparison worker configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct WorkerConfig {
    /// Name of the comparison job queue.
    #[serde(default = "default_queue_name")]
    pub queue_name: String,

    /// Maximum jobs claimed per poll cycle.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Seconds between poll cycles when the queue is empty.
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    /// Redeliveries before an entry is dead-lettered.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: i32,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            queue_name: default_queue_name(),
            batch_size: default_batch_size(),
            poll_interval_secs: default_poll_interval_secs(),
            max_attempts: default_max_attempts(),
        }
    }
}

fn default_queue_name() -> String {
    "face-comparison".to_string()
}

fn default_batch_size() -> usize {
    5
}

fn default_poll_interval_secs() -> u64 {
    2
}

fn default_max_attempts() -> i32 {
    3
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sensible() {
        let config = FacemarkConfig::default();
        assert_eq!(config.service.name, "facemark");
        assert_eq!(config.service.log_level, "info");
        assert_eq!(config.comparison.similarity_threshold, 80.0);
        assert_eq!(config.worker.queue_name, "face-comparison");
        assert_eq!(config.worker.batch_size, 5);
        assert_eq!(config.worker.max_attempts, 3);
        assert!(config.notification.topic_endpoint.is_none());
        assert!(config.gateway.identity_secret.is_none());
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let toml = r#"
            [comparison]
            similarity_treshold = 90.0
        "#;
        let result: Result<FacemarkConfig, _> = toml::from_str(toml);
        assert!(result.is_err(), "typoed key should be rejected");
    }
}
