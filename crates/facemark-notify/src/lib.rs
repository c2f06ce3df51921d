// SPDX-FileCopyrightText: 2026 Facemark Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Verification-outcome notification publisher.
//!
//! Implements [`NotificationPublisher`] over an HTTP topic endpoint: the
//! composed subject and plaintext body are POSTed as JSON. When no endpoint
//! is configured, publishing is a logged no-op -- the worker treats
//! notification as best-effort either way.

pub mod message;

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{info, warn};

use facemark_core::{
    AdapterType, AttendanceStatus, FacemarkError, HealthStatus, NotificationPublisher,
    PluginAdapter,
};

use crate::message::compose;

#[derive(Debug, Serialize)]
struct PublishRequest<'a> {
    subject: &'a str,
    message: &'a str,
}

/// HTTP topic notification publisher.
pub struct TopicPublisher {
    client: reqwest::Client,
    topic_endpoint: Option<String>,
    similarity_threshold: f64,
}

impl TopicPublisher {
    /// Creates a publisher for the given topic endpoint.
    ///
    /// `topic_endpoint = None` disables publishing; `similarity_threshold`
    /// feeds the score line of failure notifications.
    pub fn new(
        topic_endpoint: Option<String>,
        similarity_threshold: f64,
    ) -> Result<Self, FacemarkError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| FacemarkError::Notification {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;
        Ok(Self {
            client,
            topic_endpoint,
            similarity_threshold,
        })
    }
}

#[async_trait]
impl PluginAdapter for TopicPublisher {
    fn name(&self) -> &str {
        "topic-publisher"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Notification
    }

    async fn health_check(&self) -> Result<HealthStatus, FacemarkError> {
        if self.topic_endpoint.is_some() {
            Ok(HealthStatus::Healthy)
        } else {
            Ok(HealthStatus::Degraded("no topic endpoint configured".into()))
        }
    }

    async fn shutdown(&self) -> Result<(), FacemarkError> {
        Ok(())
    }
}

#[async_trait]
impl NotificationPublisher for TopicPublisher {
    async fn publish(
        &self,
        status: AttendanceStatus,
        similarity_score: Option<f64>,
        error_message: Option<&str>,
    ) -> Result<(), FacemarkError> {
        let Some(endpoint) = &self.topic_endpoint else {
            warn!("no topic endpoint configured, skipping notification");
            return Ok(());
        };

        let notification = compose(
            status,
            similarity_score,
            error_message,
            self.similarity_threshold,
        );

        let response = self
            .client
            .post(endpoint)
            .json(&PublishRequest {
                subject: &notification.subject,
                message: &notification.body,
            })
            .send()
            .await
            .map_err(|e| FacemarkError::Notification {
                message: format!("publish failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        if !response.status().is_success() {
            return Err(FacemarkError::Notification {
                message: format!("topic endpoint returned {}", response.status()),
                source: None,
            });
        }

        info!(status = %status, "notification published");
        Ok(())
    }
}
