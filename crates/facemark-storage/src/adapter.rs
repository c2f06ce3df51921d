// SPDX-FileCopyrightText: 2026 Facemark Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the storage traits.

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::debug;

use facemark_config::model::StorageConfig;
use facemark_core::{
    AdapterType, AttendanceRecord, AttendanceStatus, AttendanceStore, FacemarkError,
    HealthStatus, JobQueue, PluginAdapter, QueueEntry, StorageAdapter, StudentProfile,
    StudentStore,
};

use crate::database::Database;
use crate::queries;

/// SQLite-backed storage adapter.
///
/// Wraps a [`Database`] handle and delegates all query operations to the
/// typed query modules. The database is lazily initialized on the first
/// call to [`StorageAdapter::initialize`]. One `SqliteStorage` serves the
/// student store, the attendance store, and the job queue; everything goes
/// through the same single-writer connection.
pub struct SqliteStorage {
    config: StorageConfig,
    queue_max_attempts: i32,
    db: OnceCell<Database>,
}

impl SqliteStorage {
    /// Create a new SqliteStorage with the given configuration.
    ///
    /// The database connection is not opened until [`StorageAdapter::initialize`]
    /// is called.
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            queue_max_attempts: 3,
            db: OnceCell::new(),
        }
    }

    /// Sets the redelivery ceiling stamped on enqueued entries.
    pub fn with_queue_max_attempts(mut self, max_attempts: i32) -> Self {
        self.queue_max_attempts = max_attempts;
        self
    }

    /// Returns a reference to the underlying Database, or an error if not initialized.
    fn db(&self) -> Result<&Database, FacemarkError> {
        self.db.get().ok_or_else(|| FacemarkError::Storage {
            source: "storage not initialized -- call initialize() first".into(),
        })
    }
}

#[async_trait]
impl PluginAdapter for SqliteStorage {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, FacemarkError> {
        let db = self.db()?;
        db.connection()
            .call(|conn| {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
            .map_err(crate::database::map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), FacemarkError> {
        // Shutdown delegates to close if the DB was initialized.
        if let Some(db) = self.db.get() {
            db.close().await?;
            debug!("shutdown: WAL checkpoint complete");
        }
        Ok(())
    }
}

#[async_trait]
impl StorageAdapter for SqliteStorage {
    async fn initialize(&self) -> Result<(), FacemarkError> {
        let db = Database::open(&self.config.database_path).await?;
        self.db.set(db).map_err(|_| FacemarkError::Storage {
            source: "storage already initialized".into(),
        })?;
        debug!(path = %self.config.database_path, "SQLite storage initialized");
        Ok(())
    }

    async fn close(&self) -> Result<(), FacemarkError> {
        self.db()?.close().await
    }
}

#[async_trait]
impl StudentStore for SqliteStorage {
    async fn get_student(&self, user_id: &str) -> Result<Option<StudentProfile>, FacemarkError> {
        queries::students::get_student(self.db()?, user_id).await
    }

    async fn upsert_student(&self, profile: &StudentProfile) -> Result<(), FacemarkError> {
        queries::students::upsert_student(self.db()?, profile).await
    }

    async fn mark_face_registered(
        &self,
        user_id: &str,
        face_s3_key: &str,
        registered_at: &str,
    ) -> Result<(), FacemarkError> {
        let updated =
            queries::students::mark_face_registered(self.db()?, user_id, face_s3_key, registered_at)
                .await?;
        if !updated {
            return Err(FacemarkError::Storage {
                source: format!("no student profile for user {user_id}").into(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl AttendanceStore for SqliteStorage {
    async fn create_record(&self, record: &AttendanceRecord) -> Result<(), FacemarkError> {
        queries::attendance::create_record(self.db()?, record).await
    }

    async fn get_record(
        &self,
        user_id: &str,
        attendance_date: &str,
    ) -> Result<Option<AttendanceRecord>, FacemarkError> {
        queries::attendance::get_record(self.db()?, user_id, attendance_date).await
    }

    async fn get_record_by_tracking_id(
        &self,
        tracking_id: &str,
    ) -> Result<Option<AttendanceRecord>, FacemarkError> {
        queries::attendance::get_record_by_tracking_id(self.db()?, tracking_id).await
    }

    async fn finalize_record(
        &self,
        user_id: &str,
        attendance_date: &str,
        status: AttendanceStatus,
        similarity_score: Option<f64>,
        error_message: Option<&str>,
    ) -> Result<AttendanceRecord, FacemarkError> {
        queries::attendance::finalize_record(
            self.db()?,
            user_id,
            attendance_date,
            status,
            similarity_score,
            error_message,
        )
        .await
    }
}

#[async_trait]
impl JobQueue for SqliteStorage {
    async fn enqueue(&self, queue_name: &str, payload: &str) -> Result<i64, FacemarkError> {
        queries::queue::enqueue(self.db()?, queue_name, payload, self.queue_max_attempts).await
    }

    async fn dequeue(&self, queue_name: &str) -> Result<Option<QueueEntry>, FacemarkError> {
        queries::queue::dequeue(self.db()?, queue_name).await
    }

    async fn ack(&self, id: i64) -> Result<(), FacemarkError> {
        queries::queue::ack(self.db()?, id).await
    }

    async fn fail(&self, id: i64) -> Result<(), FacemarkError> {
        queries::queue::fail(self.db()?, id).await
    }

    async fn release_expired(&self, queue_name: &str) -> Result<u64, FacemarkError> {
        queries::queue::release_expired(self.db()?, queue_name).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn make_config(path: &str) -> StorageConfig {
        StorageConfig {
            database_path: path.to_string(),
            wal_mode: true,
        }
    }

    fn sample_profile(user_id: &str) -> StudentProfile {
        StudentProfile {
            user_id: user_id.to_string(),
            first_name: "Grace".to_string(),
            last_name: "Hopper".to_string(),
            email: "grace@example.edu".to_string(),
            face_registered: true,
            face_s3_key: Some(format!("faces/registered/{user_id}/ref.jpg")),
            face_registered_at: Some("2026-02-01T10:00:00.000Z".to_string()),
            created_at: "2026-02-01T10:00:00.000Z".to_string(),
            updated_at: "2026-02-01T10:00:00.000Z".to_string(),
        }
    }

    #[tokio::test]
    async fn sqlite_storage_implements_plugin_adapter() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("plugin.db");
        let storage = SqliteStorage::new(make_config(db_path.to_str().unwrap()));

        assert_eq!(storage.name(), "sqlite");
        assert_eq!(storage.version(), semver::Version::new(0, 1, 0));
        assert_eq!(storage.adapter_type(), AdapterType::Storage);
    }

    #[tokio::test]
    async fn initialize_twice_returns_error() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("double_init.db");
        let storage = SqliteStorage::new(make_config(db_path.to_str().unwrap()));

        storage.initialize().await.unwrap();
        assert!(storage.initialize().await.is_err());
    }

    #[tokio::test]
    async fn health_check_fails_when_not_initialized() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("no_init.db");
        let storage = SqliteStorage::new(make_config(db_path.to_str().unwrap()));

        assert!(storage.health_check().await.is_err());
    }

    #[tokio::test]
    async fn health_check_returns_healthy_when_initialized() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("health.db");
        let storage = SqliteStorage::new(make_config(db_path.to_str().unwrap()));

        storage.initialize().await.unwrap();
        assert_eq!(storage.health_check().await.unwrap(), HealthStatus::Healthy);
    }

    #[tokio::test]
    async fn full_pipeline_lifecycle_through_adapter() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("lifecycle.db");
        let storage = SqliteStorage::new(make_config(db_path.to_str().unwrap()));
        storage.initialize().await.unwrap();

        // Student profile.
        storage.upsert_student(&sample_profile("u-1")).await.unwrap();
        let student = storage.get_student("u-1").await.unwrap().unwrap();
        assert!(student.face_registered);

        // Processing record.
        let record = AttendanceRecord {
            attendance_id: "a-1".to_string(),
            tracking_id: "t-1".to_string(),
            user_id: "u-1".to_string(),
            attendance_date: "2026-03-02T09:15:00.000Z".to_string(),
            status: AttendanceStatus::Processing,
            similarity_score: None,
            face_s3_key: "faces/attendance/u-1/t-1.jpg".to_string(),
            course_id: None,
            schedule_id: None,
            error_message: None,
            created_at: "2026-03-02T09:15:00.000Z".to_string(),
            verified_at: None,
            updated_at: "2026-03-02T09:15:00.000Z".to_string(),
        };
        storage.create_record(&record).await.unwrap();

        // Comparison job through the queue.
        let id = storage
            .enqueue("face-comparison", r#"{"tracking_id":"t-1"}"#)
            .await
            .unwrap();
        let entry = storage.dequeue("face-comparison").await.unwrap().unwrap();
        assert_eq!(entry.id, id);

        // Terminal update, then ack.
        let updated = storage
            .finalize_record(
                "u-1",
                "2026-03-02T09:15:00.000Z",
                AttendanceStatus::Verified,
                Some(93.2),
                None,
            )
            .await
            .unwrap();
        assert_eq!(updated.status, AttendanceStatus::Verified);
        storage.ack(entry.id).await.unwrap();

        // Status poll by tracking id sees the terminal record.
        let polled = storage.get_record_by_tracking_id("t-1").await.unwrap().unwrap();
        assert_eq!(polled.status, AttendanceStatus::Verified);

        storage.close().await.unwrap();
    }

    #[tokio::test]
    async fn configured_max_attempts_is_stamped_on_entries() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("attempts.db");
        let storage = SqliteStorage::new(make_config(db_path.to_str().unwrap()))
            .with_queue_max_attempts(1);
        storage.initialize().await.unwrap();

        storage.enqueue("face-comparison", "p").await.unwrap();
        let entry = storage.dequeue("face-comparison").await.unwrap().unwrap();
        assert_eq!(entry.max_attempts, 1);

        // A single failure dead-letters immediately.
        storage.fail(entry.id).await.unwrap();
        assert!(storage.dequeue("face-comparison").await.unwrap().is_none());

        storage.close().await.unwrap();
    }
}
