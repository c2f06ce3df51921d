// SPDX-FileCopyrightText: 2026 Facemark Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Attendance record queries.
//!
//! The terminal update is guarded at the SQL level: `finalize_record` only
//! touches rows still in `processing`, so a record that already reached
//! VERIFIED or FAILED is returned unchanged no matter how often a job is
//! redelivered.

use std::str::FromStr;

use facemark_core::types::validate_similarity_score;
use facemark_core::{AttendanceRecord, AttendanceStatus, FacemarkError};
use rusqlite::{OptionalExtension, params};

use crate::database::Database;

const RECORD_COLUMNS: &str = "user_id, attendance_date, attendance_id, tracking_id, status,
     similarity_score, face_s3_key, course_id, schedule_id, error_message,
     created_at, verified_at, updated_at";

fn row_to_record(row: &rusqlite::Row<'_>) -> Result<AttendanceRecord, rusqlite::Error> {
    let status_str: String = row.get(4)?;
    let status = AttendanceStatus::from_str(&status_str).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(
            4,
            rusqlite::types::Type::Text,
            Box::new(e),
        )
    })?;
    Ok(AttendanceRecord {
        user_id: row.get(0)?,
        attendance_date: row.get(1)?,
        attendance_id: row.get(2)?,
        tracking_id: row.get(3)?,
        status,
        similarity_score: row.get(5)?,
        face_s3_key: row.get(6)?,
        course_id: row.get(7)?,
        schedule_id: row.get(8)?,
        error_message: row.get(9)?,
        created_at: row.get(10)?,
        verified_at: row.get(11)?,
        updated_at: row.get(12)?,
    })
}

/// Create (or replace, by primary-key semantics) an attendance record.
pub async fn create_record(db: &Database, record: &AttendanceRecord) -> Result<(), FacemarkError> {
    validate_similarity_score(record.similarity_score)?;
    let r = record.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT OR REPLACE INTO attendance
                 (user_id, attendance_date, attendance_id, tracking_id, status,
                  similarity_score, face_s3_key, course_id, schedule_id,
                  error_message, created_at, verified_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
                params![
                    r.user_id,
                    r.attendance_date,
                    r.attendance_id,
                    r.tracking_id,
                    r.status.to_string(),
                    r.similarity_score,
                    r.face_s3_key,
                    r.course_id,
                    r.schedule_id,
                    r.error_message,
                    r.created_at,
                    r.verified_at,
                    r.updated_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Fetch the record for `(user_id, attendance_date)`.
pub async fn get_record(
    db: &Database,
    user_id: &str,
    attendance_date: &str,
) -> Result<Option<AttendanceRecord>, FacemarkError> {
    let user_id = user_id.to_string();
    let attendance_date = attendance_date.to_string();
    db.connection()
        .call(move |conn| {
            let record = conn
                .query_row(
                    &format!(
                        "SELECT {RECORD_COLUMNS} FROM attendance
                         WHERE user_id = ?1 AND attendance_date = ?2"
                    ),
                    params![user_id, attendance_date],
                    row_to_record,
                )
                .optional()?;
            Ok(record)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Fetch a record by its client-visible tracking id.
pub async fn get_record_by_tracking_id(
    db: &Database,
    tracking_id: &str,
) -> Result<Option<AttendanceRecord>, FacemarkError> {
    let tracking_id = tracking_id.to_string();
    db.connection()
        .call(move |conn| {
            let record = conn
                .query_row(
                    &format!(
                        "SELECT {RECORD_COLUMNS} FROM attendance
                         WHERE tracking_id = ?1 LIMIT 1"
                    ),
                    params![tracking_id],
                    row_to_record,
                )
                .optional()?;
            Ok(record)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Move a `processing` record to its terminal state.
///
/// Sets status, similarity score, error message, and `verified_at`. The
/// update is a no-op for records already in a terminal state; the stored
/// record is returned either way.
pub async fn finalize_record(
    db: &Database,
    user_id: &str,
    attendance_date: &str,
    status: AttendanceStatus,
    similarity_score: Option<f64>,
    error_message: Option<&str>,
) -> Result<AttendanceRecord, FacemarkError> {
    if !status.is_terminal() {
        return Err(FacemarkError::Internal(format!(
            "finalize_record called with non-terminal status {status}"
        )));
    }
    validate_similarity_score(similarity_score)?;

    let user_id = user_id.to_string();
    let attendance_date = attendance_date.to_string();
    let error_message = error_message.map(str::to_string);
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE attendance
                 SET status = ?1,
                     similarity_score = ?2,
                     error_message = ?3,
                     verified_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now'),
                     updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE user_id = ?4 AND attendance_date = ?5 AND status = 'processing'",
                params![
                    status.to_string(),
                    similarity_score,
                    error_message,
                    user_id,
                    attendance_date,
                ],
            )?;

            let record = conn
                .query_row(
                    &format!(
                        "SELECT {RECORD_COLUMNS} FROM attendance
                         WHERE user_id = ?1 AND attendance_date = ?2"
                    ),
                    params![user_id, attendance_date],
                    row_to_record,
                )
                .optional()?;
            Ok(record)
        })
        .await
        .map_err(crate::database::map_tr_err)?
        .ok_or_else(|| FacemarkError::Storage {
            source: "finalize_record: no attendance record for key".into(),
        })
}
