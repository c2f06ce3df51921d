// SPDX-FileCopyrightText: 2026 Facemark Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end pipeline testing.
//!
//! `TestHarness` assembles temp-SQLite storage plus mock comparator, image
//! store, and publisher -- the full set of dependencies the ingestion
//! handler and comparison worker take by injection.

use std::sync::Arc;

use facemark_config::model::StorageConfig;
use facemark_core::{
    AttendanceRecord, AttendanceStatus, ComparisonJob, FacemarkError, JobQueue, StorageAdapter,
    StudentProfile,
};
use facemark_storage::SqliteStorage;

use crate::mock_comparator::MockComparator;
use crate::mock_imagestore::MockImageStore;
use crate::mock_publisher::MockPublisher;

/// A complete test environment around temp-SQLite storage and mock services.
pub struct TestHarness {
    pub storage: Arc<SqliteStorage>,
    pub comparator: Arc<MockComparator>,
    pub images: Arc<MockImageStore>,
    pub publisher: Arc<MockPublisher>,
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    /// Creates the harness with an initialized temp database.
    pub async fn new() -> Result<Self, FacemarkError> {
        let temp_dir =
            tempfile::TempDir::new().map_err(|e| FacemarkError::Storage { source: e.into() })?;
        let db_path = temp_dir.path().join("test.db");

        let storage = SqliteStorage::new(StorageConfig {
            database_path: db_path.to_string_lossy().to_string(),
            wal_mode: true,
        });
        storage.initialize().await?;

        Ok(Self {
            storage: Arc::new(storage),
            comparator: Arc::new(MockComparator::new()),
            images: Arc::new(MockImageStore::new()),
            publisher: Arc::new(MockPublisher::new()),
            _temp_dir: temp_dir,
        })
    }

    /// Seeds a student profile, registered or not.
    pub async fn seed_student(
        &self,
        user_id: &str,
        face_registered: bool,
    ) -> Result<StudentProfile, FacemarkError> {
        use facemark_core::StudentStore;

        let now = chrono::Utc::now().to_rfc3339();
        let profile = StudentProfile {
            user_id: user_id.to_string(),
            first_name: "Test".to_string(),
            last_name: "Student".to_string(),
            email: format!("{user_id}@example.edu"),
            face_registered,
            face_s3_key: face_registered
                .then(|| format!("faces/registered/{user_id}/ref.jpg")),
            face_registered_at: face_registered.then(|| now.clone()),
            created_at: now.clone(),
            updated_at: now,
        };
        self.storage.upsert_student(&profile).await?;
        Ok(profile)
    }

    /// Seeds a processing attendance record plus its matching queued job,
    /// exactly as the ingestion handler would. Returns the job.
    pub async fn seed_submission(
        &self,
        user_id: &str,
        queue_name: &str,
    ) -> Result<ComparisonJob, FacemarkError> {
        use facemark_core::AttendanceStore;

        let tracking_id = uuid::Uuid::new_v4().to_string();
        let now = chrono::Utc::now().to_rfc3339();

        let record = AttendanceRecord {
            attendance_id: uuid::Uuid::new_v4().to_string(),
            tracking_id: tracking_id.clone(),
            user_id: user_id.to_string(),
            attendance_date: now.clone(),
            status: AttendanceStatus::Processing,
            similarity_score: None,
            face_s3_key: format!("faces/attendance/{user_id}/{tracking_id}.jpg"),
            course_id: None,
            schedule_id: None,
            error_message: None,
            created_at: now.clone(),
            verified_at: None,
            updated_at: now.clone(),
        };
        self.storage.create_record(&record).await?;

        let job = ComparisonJob {
            tracking_id,
            user_id: user_id.to_string(),
            face_s3_key: record.face_s3_key.clone(),
            attendance_date: now,
            course_id: None,
            schedule_id: None,
        };
        let payload = serde_json::to_string(&job)
            .map_err(|e| FacemarkError::Internal(format!("job serialization failed: {e}")))?;
        self.storage.enqueue(queue_name, &payload).await?;

        Ok(job)
    }
}
