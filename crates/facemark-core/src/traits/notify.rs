// SPDX-FileCopyrightText: 2026 Facemark Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Notification publisher trait.

use async_trait::async_trait;

use crate::error::FacemarkError;
use crate::traits::adapter::PluginAdapter;
use crate::types::AttendanceStatus;

/// Publisher of verification-outcome notifications.
///
/// Publishing is best-effort from the worker's perspective: the verification
/// result is already durably persisted before `publish` is called, so a
/// publish failure is logged and never fails the job.
#[async_trait]
pub trait NotificationPublisher: PluginAdapter {
    /// Publishes a status-appropriate notification.
    async fn publish(
        &self,
        status: AttendanceStatus,
        similarity_score: Option<f64>,
        error_message: Option<&str>,
    ) -> Result<(), FacemarkError>;
}
