// SPDX-FileCopyrightText: 2026 Facemark Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock notification publisher capturing published outcomes.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use facemark_core::{
    AdapterType, AttendanceStatus, FacemarkError, HealthStatus, NotificationPublisher,
    PluginAdapter,
};

/// One captured publish call.
#[derive(Debug, Clone, PartialEq)]
pub struct PublishedNotification {
    pub status: AttendanceStatus,
    pub similarity_score: Option<f64>,
    pub error_message: Option<String>,
}

/// A mock `NotificationPublisher` that records every publish.
pub struct MockPublisher {
    published: Arc<Mutex<Vec<PublishedNotification>>>,
    fail_publishes: AtomicBool,
}

impl MockPublisher {
    pub fn new() -> Self {
        Self {
            published: Arc::new(Mutex::new(Vec::new())),
            fail_publishes: AtomicBool::new(false),
        }
    }

    /// Make every subsequent publish fail, for best-effort-path tests.
    pub fn fail_publishes(&self, fail: bool) {
        self.fail_publishes.store(fail, Ordering::SeqCst);
    }

    /// All captured notifications.
    pub async fn published(&self) -> Vec<PublishedNotification> {
        self.published.lock().await.clone()
    }

    /// Count of captured notifications.
    pub async fn publish_count(&self) -> usize {
        self.published.lock().await.len()
    }
}

impl Default for MockPublisher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockPublisher {
    fn name(&self) -> &str {
        "mock-publisher"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Notification
    }

    async fn health_check(&self) -> Result<HealthStatus, FacemarkError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), FacemarkError> {
        Ok(())
    }
}

#[async_trait]
impl NotificationPublisher for MockPublisher {
    async fn publish(
        &self,
        status: AttendanceStatus,
        similarity_score: Option<f64>,
        error_message: Option<&str>,
    ) -> Result<(), FacemarkError> {
        if self.fail_publishes.load(Ordering::SeqCst) {
            return Err(FacemarkError::Notification {
                message: "simulated publish failure".to_string(),
                source: None,
            });
        }
        self.published.lock().await.push(PublishedNotification {
            status,
            similarity_score,
            error_message: error_message.map(str::to_string),
        });
        Ok(())
    }
}
