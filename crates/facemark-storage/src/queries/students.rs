// SPDX-FileCopyrightText: 2026 Facemark Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Student profile queries.

use facemark_core::{FacemarkError, StudentProfile};
use rusqlite::{OptionalExtension, params};

use crate::database::Database;

fn row_to_profile(row: &rusqlite::Row<'_>) -> Result<StudentProfile, rusqlite::Error> {
    Ok(StudentProfile {
        user_id: row.get(0)?,
        first_name: row.get(1)?,
        last_name: row.get(2)?,
        email: row.get(3)?,
        face_registered: row.get::<_, i64>(4)? != 0,
        face_s3_key: row.get(5)?,
        face_registered_at: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

const PROFILE_COLUMNS: &str = "user_id, first_name, last_name, email, face_registered,
     face_s3_key, face_registered_at, created_at, updated_at";

/// Fetch a student profile by user id.
pub async fn get_student(
    db: &Database,
    user_id: &str,
) -> Result<Option<StudentProfile>, FacemarkError> {
    let user_id = user_id.to_string();
    db.connection()
        .call(move |conn| {
            let profile = conn
                .query_row(
                    &format!("SELECT {PROFILE_COLUMNS} FROM students WHERE user_id = ?1"),
                    params![user_id],
                    row_to_profile,
                )
                .optional()?;
            Ok(profile)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Create or replace a student profile.
pub async fn upsert_student(db: &Database, profile: &StudentProfile) -> Result<(), FacemarkError> {
    let p = profile.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT OR REPLACE INTO students
                 (user_id, first_name, last_name, email, face_registered,
                  face_s3_key, face_registered_at, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    p.user_id,
                    p.first_name,
                    p.last_name,
                    p.email,
                    p.face_registered as i64,
                    p.face_s3_key,
                    p.face_registered_at,
                    p.created_at,
                    p.updated_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Record a completed face registration. Returns false when no such profile
/// exists.
pub async fn mark_face_registered(
    db: &Database,
    user_id: &str,
    face_s3_key: &str,
    registered_at: &str,
) -> Result<bool, FacemarkError> {
    let user_id = user_id.to_string();
    let face_s3_key = face_s3_key.to_string();
    let registered_at = registered_at.to_string();
    db.connection()
        .call(move |conn| {
            let changed = conn.execute(
                "UPDATE students
                 SET face_registered = 1,
                     face_s3_key = ?1,
                     face_registered_at = ?2,
                     updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE user_id = ?3",
                params![face_s3_key, registered_at, user_id],
            )?;
            Ok(changed > 0)
        })
        .await
        .map_err(crate::database::map_tr_err)
}
