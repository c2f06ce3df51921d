// SPDX-FileCopyrightText: 2026 Facemark Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage traits for the student and attendance stores.

use async_trait::async_trait;

use crate::error::FacemarkError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{AttendanceRecord, AttendanceStatus, StudentProfile};

/// Adapter for storage and persistence backends.
///
/// Storage adapters manage the lifecycle of database connections and back the
/// higher-level [`StudentStore`] and [`AttendanceStore`] traits.
#[async_trait]
pub trait StorageAdapter: PluginAdapter {
    /// Initializes the storage backend (migrations, connection, PRAGMAs).
    async fn initialize(&self) -> Result<(), FacemarkError>;

    /// Closes the storage backend, flushing pending writes.
    async fn close(&self) -> Result<(), FacemarkError>;
}

/// Read/write access to student profiles.
#[async_trait]
pub trait StudentStore: PluginAdapter {
    /// Fetches a student profile by user id. `Ok(None)` when absent.
    async fn get_student(&self, user_id: &str) -> Result<Option<StudentProfile>, FacemarkError>;

    /// Creates or replaces a student profile.
    async fn upsert_student(&self, profile: &StudentProfile) -> Result<(), FacemarkError>;

    /// Records a successful face registration on an existing profile.
    async fn mark_face_registered(
        &self,
        user_id: &str,
        face_s3_key: &str,
        registered_at: &str,
    ) -> Result<(), FacemarkError>;
}

/// Read/write access to attendance records.
#[async_trait]
pub trait AttendanceStore: PluginAdapter {
    /// Creates (or replaces, by primary-key semantics) the record for
    /// `(record.user_id, record.attendance_date)`.
    async fn create_record(&self, record: &AttendanceRecord) -> Result<(), FacemarkError>;

    /// Fetches the record for `(user_id, attendance_date)`. `Ok(None)` when absent.
    async fn get_record(
        &self,
        user_id: &str,
        attendance_date: &str,
    ) -> Result<Option<AttendanceRecord>, FacemarkError>;

    /// Fetches a record by its client-visible tracking id.
    async fn get_record_by_tracking_id(
        &self,
        tracking_id: &str,
    ) -> Result<Option<AttendanceRecord>, FacemarkError>;

    /// Moves a `processing` record to its terminal state, setting score,
    /// error message, and `verified_at`.
    ///
    /// A record already in a terminal state is left untouched and returned
    /// as-is: terminal writes never regress.
    async fn finalize_record(
        &self,
        user_id: &str,
        attendance_date: &str,
        status: AttendanceStatus,
        similarity_score: Option<f64>,
        error_message: Option<&str>,
    ) -> Result<AttendanceRecord, FacemarkError>;
}
