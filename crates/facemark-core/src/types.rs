// SPDX-FileCopyrightText: 2026 Facemark Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types used across adapter traits and the Facemark pipeline.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::FacemarkError;

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the type of adapter behind a trait object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
pub enum AdapterType {
    Storage,
    ImageStore,
    Comparison,
    Notification,
    Gateway,
}

/// Verification state of an attendance record.
///
/// Transitions only `Processing -> {Verified, Failed}`; terminal states never
/// change again.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AttendanceStatus {
    Processing,
    Verified,
    Failed,
}

impl AttendanceStatus {
    /// True for `Verified` and `Failed` -- no further transition occurs.
    pub fn is_terminal(&self) -> bool {
        matches!(self, AttendanceStatus::Verified | AttendanceStatus::Failed)
    }
}

/// Non-retryable failure taxonomy reported by the comparison service adapter.
///
/// Throttling and unclassified service failures are deliberately absent: those
/// surface as [`FacemarkError::Comparison`] so the queue's redelivery applies.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ComparisonErrorCode {
    NoFaceDetected,
    SimilarityBelowThreshold,
    MultipleFacesDetected,
    InvalidParameter,
    ImageTooLarge,
    ImageNotFound,
    InvalidImageFormat,
}

/// One attendance verification attempt.
///
/// Keyed by `(user_id, attendance_date)` in the attendance store; a second
/// submission for the same key replaces the first by primary-key semantics.
/// `attendance_id` and `tracking_id` are assigned at creation for external
/// correlation and never change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub attendance_id: String,
    pub tracking_id: String,
    pub user_id: String,
    /// RFC 3339 timestamp captured at ingestion; the store's sort key.
    pub attendance_date: String,
    pub status: AttendanceStatus,
    pub similarity_score: Option<f64>,
    /// Object-store key of the submitted face image.
    pub face_s3_key: String,
    pub course_id: Option<String>,
    pub schedule_id: Option<String>,
    pub error_message: Option<String>,
    pub created_at: String,
    pub verified_at: Option<String>,
    pub updated_at: String,
}

/// Student profile as seen by the pipeline.
///
/// The pipeline reads `face_registered` and `face_s3_key`; the registration
/// endpoint is the only writer of those fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentProfile {
    pub user_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub face_registered: bool,
    /// Object-store key of the registered reference face image.
    pub face_s3_key: Option<String>,
    pub face_registered_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Queue payload for one face-comparison job.
///
/// Carries every field the worker needs so processing never has to re-resolve
/// the original submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonJob {
    pub tracking_id: String,
    pub user_id: String,
    pub face_s3_key: String,
    pub attendance_date: String,
    #[serde(default)]
    pub course_id: Option<String>,
    #[serde(default)]
    pub schedule_id: Option<String>,
}

/// Outcome of one face comparison, produced by the comparison service adapter.
///
/// `success == true` means exactly one face matched above threshold. A `false`
/// result is a legitimate terminal verification failure, not a worker error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult {
    pub success: bool,
    pub similarity_score: Option<f64>,
    pub error_message: Option<String>,
    pub error_code: Option<ComparisonErrorCode>,
}

impl ComparisonResult {
    /// A verified comparison with the match's similarity value.
    pub fn verified(similarity_score: f64) -> Self {
        Self {
            success: true,
            similarity_score: Some(similarity_score),
            error_message: None,
            error_code: None,
        }
    }

    /// A terminal comparison failure with its taxonomy code.
    pub fn failure(
        code: ComparisonErrorCode,
        message: impl Into<String>,
        similarity_score: Option<f64>,
    ) -> Self {
        Self {
            success: false,
            similarity_score,
            error_message: Some(message.into()),
            error_code: Some(code),
        }
    }
}

/// One entry in the durable job queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueEntry {
    pub id: i64,
    pub queue_name: String,
    pub payload: String,
    pub status: String,
    pub attempts: i32,
    pub max_attempts: i32,
    pub created_at: String,
    pub updated_at: String,
    pub locked_until: Option<String>,
}

/// Validates that a similarity score, when present, lies in `[0, 100]`.
pub fn validate_similarity_score(score: Option<f64>) -> Result<(), FacemarkError> {
    match score {
        Some(s) if !(0.0..=100.0).contains(&s) => Err(FacemarkError::Internal(format!(
            "similarity score {s} outside [0, 100]"
        ))),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn attendance_status_round_trips() {
        for status in [
            AttendanceStatus::Processing,
            AttendanceStatus::Verified,
            AttendanceStatus::Failed,
        ] {
            let s = status.to_string();
            assert_eq!(AttendanceStatus::from_str(&s).unwrap(), status);
        }
        assert_eq!(AttendanceStatus::Processing.to_string(), "processing");
    }

    #[test]
    fn terminal_states() {
        assert!(!AttendanceStatus::Processing.is_terminal());
        assert!(AttendanceStatus::Verified.is_terminal());
        assert!(AttendanceStatus::Failed.is_terminal());
    }

    #[test]
    fn error_code_serializes_screaming_snake() {
        let json = serde_json::to_string(&ComparisonErrorCode::NoFaceDetected).unwrap();
        assert_eq!(json, r#""NO_FACE_DETECTED""#);
        let json = serde_json::to_string(&ComparisonErrorCode::SimilarityBelowThreshold).unwrap();
        assert_eq!(json, r#""SIMILARITY_BELOW_THRESHOLD""#);
    }

    #[test]
    fn comparison_job_round_trips_without_optional_context() {
        let json = r#"{
            "tracking_id": "t-1",
            "user_id": "u-1",
            "face_s3_key": "faces/attendance/u-1/t-1.jpg",
            "attendance_date": "2026-03-02T09:15:00Z"
        }"#;
        let job: ComparisonJob = serde_json::from_str(json).unwrap();
        assert_eq!(job.tracking_id, "t-1");
        assert!(job.course_id.is_none());
        assert!(job.schedule_id.is_none());
    }

    #[test]
    fn comparison_job_rejects_missing_required_fields() {
        let json = r#"{"tracking_id": "t-1", "user_id": "u-1"}"#;
        assert!(serde_json::from_str::<ComparisonJob>(json).is_err());
    }

    #[test]
    fn comparison_result_constructors() {
        let ok = ComparisonResult::verified(97.4);
        assert!(ok.success);
        assert_eq!(ok.similarity_score, Some(97.4));
        assert!(ok.error_code.is_none());

        let bad = ComparisonResult::failure(
            ComparisonErrorCode::MultipleFacesDetected,
            "multiple faces",
            Some(91.0),
        );
        assert!(!bad.success);
        assert_eq!(
            bad.error_code,
            Some(ComparisonErrorCode::MultipleFacesDetected)
        );
        assert_eq!(bad.similarity_score, Some(91.0));
    }

    #[test]
    fn similarity_score_bounds() {
        assert!(validate_similarity_score(None).is_ok());
        assert!(validate_similarity_score(Some(0.0)).is_ok());
        assert!(validate_similarity_score(Some(100.0)).is_ok());
        assert!(validate_similarity_score(Some(-0.1)).is_err());
        assert!(validate_similarity_score(Some(100.5)).is_err());
    }
}
