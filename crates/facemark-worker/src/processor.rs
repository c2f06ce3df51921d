// SPDX-FileCopyrightText: 2026 Facemark Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-job processing: validate, guard, compare, persist, notify.
//!
//! Each job is handled independently; the only classification that matters
//! to the queue is retryable vs. handled. A retryable failure escapes as
//! `Err` so the entry is redelivered. Everything else -- success, skip, and
//! non-retryable drop -- counts as handled and is acknowledged.

use std::sync::Arc;

use tracing::{error, info, warn};

use facemark_core::{
    AttendanceStatus, AttendanceStore, ComparisonJob, FaceComparator, FacemarkError,
    NotificationPublisher, QueueEntry, StudentStore,
};

/// How one job ended, for entries that do not need redelivery.
#[derive(Debug, Clone, PartialEq)]
pub enum JobOutcome {
    /// The comparison ran and the record reached a terminal state.
    Completed {
        tracking_id: String,
        status: AttendanceStatus,
        similarity_score: Option<f64>,
    },
    /// The record was already terminal; nothing was re-run.
    Skipped {
        tracking_id: String,
        status: AttendanceStatus,
    },
    /// Malformed message or data inconsistency; redelivery cannot fix it.
    Dropped { reason: String },
}

/// Result of processing one batch of queue entries.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    /// Entry ids whose processing failed with a retryable error; everything
    /// else is considered handled for the purpose of acknowledgment.
    pub failures: Vec<i64>,
    /// Count of handled entries (completed, skipped, or dropped).
    pub handled: usize,
}

/// Processes comparison jobs against the injected stores and services.
pub struct JobProcessor {
    students: Arc<dyn StudentStore>,
    attendance: Arc<dyn AttendanceStore>,
    comparator: Arc<dyn FaceComparator>,
    publisher: Arc<dyn NotificationPublisher>,
    similarity_threshold: f64,
}

impl JobProcessor {
    pub fn new(
        students: Arc<dyn StudentStore>,
        attendance: Arc<dyn AttendanceStore>,
        comparator: Arc<dyn FaceComparator>,
        publisher: Arc<dyn NotificationPublisher>,
        similarity_threshold: f64,
    ) -> Self {
        Self {
            students,
            attendance,
            comparator,
            publisher,
            similarity_threshold,
        }
    }

    /// Processes a batch of queue entries sequentially.
    ///
    /// Jobs are independent; nothing here precludes a bounded-pool parallel
    /// version, but one in-flight comparison per invocation keeps pressure on
    /// the external service predictable.
    pub async fn process_batch(&self, entries: &[QueueEntry]) -> BatchOutcome {
        let mut outcome = BatchOutcome::default();

        for entry in entries {
            match self.process_entry(entry).await {
                Ok(JobOutcome::Completed {
                    tracking_id,
                    status,
                    ..
                }) => {
                    info!(
                        entry_id = entry.id,
                        tracking_id = tracking_id.as_str(),
                        status = %status,
                        "job completed"
                    );
                    outcome.handled += 1;
                }
                Ok(JobOutcome::Skipped {
                    tracking_id,
                    status,
                }) => {
                    info!(
                        entry_id = entry.id,
                        tracking_id = tracking_id.as_str(),
                        status = %status,
                        "record already terminal, skipping"
                    );
                    outcome.handled += 1;
                }
                Ok(JobOutcome::Dropped { reason }) => {
                    // Distinguishable from success in the logs, but never
                    // redelivered: the condition cannot self-heal.
                    error!(
                        entry_id = entry.id,
                        reason = reason.as_str(),
                        "job dropped (non-retryable)"
                    );
                    outcome.handled += 1;
                }
                Err(e) => {
                    warn!(entry_id = entry.id, error = %e, "job failed (retryable)");
                    outcome.failures.push(entry.id);
                }
            }
        }

        info!(
            handled = outcome.handled,
            failed = outcome.failures.len(),
            "batch processing complete"
        );
        outcome
    }

    /// Processes a single queue entry.
    ///
    /// State machine: parse/validate -> idempotency guard -> profile fetch ->
    /// compare -> terminal record update -> best-effort notify. `Err` means
    /// retryable; non-retryable conditions come back as `JobOutcome::Dropped`.
    pub async fn process_entry(&self, entry: &QueueEntry) -> Result<JobOutcome, FacemarkError> {
        let job: ComparisonJob = match serde_json::from_str(&entry.payload) {
            Ok(job) => job,
            Err(e) => {
                return Ok(JobOutcome::Dropped {
                    reason: format!("malformed job payload: {e}"),
                });
            }
        };

        if job.tracking_id.is_empty()
            || job.user_id.is_empty()
            || job.face_s3_key.is_empty()
            || job.attendance_date.is_empty()
        {
            return Ok(JobOutcome::Dropped {
                reason: "job payload has empty required fields".to_string(),
            });
        }

        info!(
            tracking_id = job.tracking_id.as_str(),
            user_id = job.user_id.as_str(),
            "processing comparison job"
        );

        // Idempotency guard against at-least-once delivery. A read failure
        // here propagates as retryable rather than risking a duplicate
        // comparison against a record we could not see.
        if let Some(existing) = self
            .attendance
            .get_record(&job.user_id, &job.attendance_date)
            .await?
        {
            if existing.status.is_terminal() {
                return Ok(JobOutcome::Skipped {
                    tracking_id: job.tracking_id,
                    status: existing.status,
                });
            }
        }

        // Store unreachable propagates as retryable; a missing or
        // unregistered profile is a data inconsistency redelivery cannot fix.
        let student = self.students.get_student(&job.user_id).await?;
        let Some(student) = student else {
            return Ok(JobOutcome::Dropped {
                reason: format!("student profile not found for user {}", job.user_id),
            });
        };
        let reference_key = match (student.face_registered, student.face_s3_key.as_deref()) {
            (true, Some(key)) => key.to_string(),
            _ => {
                return Ok(JobOutcome::Dropped {
                    reason: format!("no registered face for user {}", job.user_id),
                });
            }
        };

        // Throttling and unclassified comparison errors propagate here, so
        // the record stays untouched and the queue redelivers.
        let result = self
            .comparator
            .compare(&reference_key, &job.face_s3_key, self.similarity_threshold)
            .await?;

        let status = if result.success {
            AttendanceStatus::Verified
        } else {
            AttendanceStatus::Failed
        };

        let record = self
            .attendance
            .finalize_record(
                &job.user_id,
                &job.attendance_date,
                status,
                result.similarity_score,
                result.error_message.as_deref(),
            )
            .await?;

        // The outcome is already durable; notification is best-effort.
        if let Err(e) = self
            .publisher
            .publish(
                record.status,
                record.similarity_score,
                record.error_message.as_deref(),
            )
            .await
        {
            error!(
                tracking_id = job.tracking_id.as_str(),
                error = %e,
                "notification publish failed"
            );
        }

        Ok(JobOutcome::Completed {
            tracking_id: job.tracking_id,
            status: record.status,
            similarity_score: record.similarity_score,
        })
    }
}
