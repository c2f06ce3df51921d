// SPDX-FileCopyrightText: 2026 Facemark Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the gateway REST API.
//!
//! Handles POST /v1/attendance, GET /v1/attendance/{tracking_id},
//! POST /v1/students/face, and GET /health. Every branch returns a
//! structured response; no error escapes a handler uncaught.

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use facemark_core::{AttendanceRecord, AttendanceStatus, ComparisonJob};
use facemark_imagestore::{attendance_face_key, registered_face_key};

use crate::auth::IdentityClaims;
use crate::server::GatewayState;

/// Hard ceiling on the encoded image payload, checked before decode.
///
/// This is 13 MiB of base64 *text*: the upstream edge enforces a 10 MiB
/// binary limit before encoding, and the ~33% base64 expansion keeps any
/// accepted payload under that limit after decode.
pub const MAX_ENCODED_IMAGE_BYTES: usize = 13 * 1024 * 1024;

/// Request body for POST /v1/attendance.
#[derive(Debug, Deserialize)]
pub struct AttendanceRequest {
    /// Base64-encoded face image.
    #[serde(rename = "faceImage")]
    pub face_image: String,
    /// Optional course context.
    #[serde(default)]
    pub course_id: Option<String>,
    /// Optional schedule context.
    #[serde(default)]
    pub schedule_id: Option<String>,
}

/// Response body for POST /v1/attendance.
#[derive(Debug, Serialize)]
pub struct AttendanceResponse {
    pub tracking_id: String,
    pub status: String,
    pub message: String,
}

/// Request body for POST /v1/students/face.
#[derive(Debug, Deserialize)]
pub struct RegisterFaceRequest {
    /// Base64-encoded reference face image.
    #[serde(rename = "faceImage")]
    pub face_image: String,
}

/// Response body for POST /v1/students/face.
#[derive(Debug, Serialize)]
pub struct RegisterFaceResponse {
    pub face_s3_key: String,
    pub message: String,
}

/// Response body for GET /v1/attendance/{tracking_id}.
#[derive(Debug, Serialize)]
pub struct AttendanceStatusResponse {
    pub tracking_id: String,
    pub attendance_date: String,
    pub status: AttendanceStatus,
    pub similarity_score: Option<f64>,
    pub course_id: Option<String>,
    pub schedule_id: Option<String>,
    pub verified_at: Option<String>,
    pub error_message: Option<String>,
}

impl From<AttendanceRecord> for AttendanceStatusResponse {
    fn from(record: AttendanceRecord) -> Self {
        Self {
            tracking_id: record.tracking_id,
            attendance_date: record.attendance_date,
            status: record.status,
            similarity_score: record.similarity_score,
            course_id: record.course_id,
            schedule_id: record.schedule_id,
            verified_at: record.verified_at,
            error_message: record.error_message,
        }
    }
}

/// Response body for GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

fn error_response(status: StatusCode, error: &str, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: error.to_string(),
            message: message.into(),
        }),
    )
        .into_response()
}

/// Validates the encoded payload size and decodes it.
///
/// Returns the image bytes, or the full error response to send back.
fn check_and_decode_image(encoded: &str) -> Result<Vec<u8>, Response> {
    if encoded.len() > MAX_ENCODED_IMAGE_BYTES {
        return Err(error_response(
            StatusCode::PAYLOAD_TOO_LARGE,
            "Payload Too Large",
            "Image size exceeds 13MiB limit",
        ));
    }
    BASE64.decode(encoded).map_err(|e| {
        error_response(
            StatusCode::BAD_REQUEST,
            "Invalid Image",
            format!("Invalid base64 image data: {e}"),
        )
    })
}

/// POST /v1/attendance
///
/// Ingestion: resolve profile, persist the submitted image, create the
/// PROCESSING record, enqueue the comparison job, and return the tracking
/// id. Side-effect order is significant (image, then record, then job) and
/// there is no rollback on partial failure: every artifact is keyed by the
/// same tracking id so partial progress can be reconciled offline.
pub async fn post_attendance(
    State(state): State<GatewayState>,
    Extension(claims): Extension<IdentityClaims>,
    Json(body): Json<AttendanceRequest>,
) -> Response {
    let user_id = claims.sub;

    if body.face_image.is_empty() {
        return error_response(
            StatusCode::BAD_REQUEST,
            "Bad Request",
            "faceImage is required",
        );
    }

    let image_bytes = match check_and_decode_image(&body.face_image) {
        Ok(bytes) => bytes,
        Err(response) => return response,
    };

    info!(user_id = user_id.as_str(), "processing attendance submission");

    let student = match state.students.get_student(&user_id).await {
        Ok(student) => student,
        Err(e) => {
            error!(user_id = user_id.as_str(), error = %e, "student lookup failed");
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal Server Error",
                "Failed to resolve student profile",
            );
        }
    };
    let Some(student) = student else {
        return error_response(
            StatusCode::NOT_FOUND,
            "Not Found",
            "Student profile not found",
        );
    };
    if !student.face_registered {
        return error_response(
            StatusCode::BAD_REQUEST,
            "Face Not Registered",
            "Please register your face first before marking attendance",
        );
    }

    let tracking_id = uuid::Uuid::new_v4().to_string();
    let now = chrono::Utc::now().to_rfc3339();
    let face_s3_key = attendance_face_key(&user_id, &tracking_id);

    if let Err(e) = state
        .images
        .put_object(&face_s3_key, image_bytes, "image/jpeg")
        .await
    {
        error!(user_id = user_id.as_str(), tracking_id = tracking_id.as_str(), error = %e, "image upload failed");
        return error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal Server Error",
            "Failed to upload face image",
        );
    }

    let record = AttendanceRecord {
        attendance_id: uuid::Uuid::new_v4().to_string(),
        tracking_id: tracking_id.clone(),
        user_id: user_id.clone(),
        attendance_date: now.clone(),
        status: AttendanceStatus::Processing,
        similarity_score: None,
        face_s3_key: face_s3_key.clone(),
        course_id: body.course_id.clone(),
        schedule_id: body.schedule_id.clone(),
        error_message: None,
        created_at: now.clone(),
        verified_at: None,
        updated_at: now.clone(),
    };
    if let Err(e) = state.attendance.create_record(&record).await {
        error!(user_id = user_id.as_str(), tracking_id = tracking_id.as_str(), error = %e, "attendance record creation failed");
        return error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal Server Error",
            "Failed to create attendance record",
        );
    }

    // The job carries everything the worker needs; no re-lookup of the
    // submission ever happens.
    let job = ComparisonJob {
        tracking_id: tracking_id.clone(),
        user_id,
        face_s3_key,
        attendance_date: now,
        course_id: body.course_id,
        schedule_id: body.schedule_id,
    };
    let payload = match serde_json::to_string(&job) {
        Ok(payload) => payload,
        Err(e) => {
            error!(tracking_id = tracking_id.as_str(), error = %e, "job serialization failed");
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal Server Error",
                "Failed to queue attendance verification",
            );
        }
    };
    if let Err(e) = state.queue.enqueue(&state.queue_name, &payload).await {
        error!(tracking_id = tracking_id.as_str(), error = %e, "job enqueue failed");
        return error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal Server Error",
            "Failed to queue attendance verification",
        );
    }

    info!(tracking_id = tracking_id.as_str(), "attendance submission accepted");
    (
        StatusCode::OK,
        Json(AttendanceResponse {
            tracking_id,
            status: "processing".to_string(),
            message: "Attendance verification in progress".to_string(),
        }),
    )
        .into_response()
}

/// GET /v1/attendance/{tracking_id}
///
/// Status poll: the asynchronous path's only synchronous observation point.
pub async fn get_attendance(
    State(state): State<GatewayState>,
    Extension(_claims): Extension<IdentityClaims>,
    Path(tracking_id): Path<String>,
) -> Response {
    match state.attendance.get_record_by_tracking_id(&tracking_id).await {
        Ok(Some(record)) => {
            (StatusCode::OK, Json(AttendanceStatusResponse::from(record))).into_response()
        }
        Ok(None) => error_response(
            StatusCode::NOT_FOUND,
            "Not Found",
            "No attendance record for tracking id",
        ),
        Err(e) => {
            error!(tracking_id = tracking_id.as_str(), error = %e, "attendance lookup failed");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal Server Error",
                "Failed to retrieve attendance record",
            )
        }
    }
}

/// POST /v1/students/face
///
/// Registers the caller's reference face image: uploads it under the
/// registered prefix and flips `face_registered` on the profile.
pub async fn post_register_face(
    State(state): State<GatewayState>,
    Extension(claims): Extension<IdentityClaims>,
    Json(body): Json<RegisterFaceRequest>,
) -> Response {
    let user_id = claims.sub;

    if body.face_image.is_empty() {
        return error_response(
            StatusCode::BAD_REQUEST,
            "Bad Request",
            "faceImage is required",
        );
    }

    let image_bytes = match check_and_decode_image(&body.face_image) {
        Ok(bytes) => bytes,
        Err(response) => return response,
    };

    match state.students.get_student(&user_id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return error_response(
                StatusCode::NOT_FOUND,
                "Not Found",
                "Student profile not found",
            );
        }
        Err(e) => {
            error!(user_id = user_id.as_str(), error = %e, "student lookup failed");
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal Server Error",
                "Failed to resolve student profile",
            );
        }
    }

    let now = chrono::Utc::now();
    let face_s3_key = registered_face_key(&user_id, &now.format("%Y%m%d_%H%M%S").to_string());

    if let Err(e) = state
        .images
        .put_object(&face_s3_key, image_bytes, "image/jpeg")
        .await
    {
        error!(user_id = user_id.as_str(), error = %e, "reference image upload failed");
        return error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal Server Error",
            "Failed to upload face image",
        );
    }

    if let Err(e) = state
        .students
        .mark_face_registered(&user_id, &face_s3_key, &now.to_rfc3339())
        .await
    {
        error!(user_id = user_id.as_str(), error = %e, "face registration update failed");
        return error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal Server Error",
            "Failed to update student profile",
        );
    }

    info!(user_id = user_id.as_str(), face_s3_key = face_s3_key.as_str(), "face registered");
    (
        StatusCode::OK,
        Json(RegisterFaceResponse {
            face_s3_key,
            message: "Face registered successfully".to_string(),
        }),
    )
        .into_response()
}

/// GET /health
///
/// Unauthenticated health endpoint.
pub async fn get_public_health(State(state): State<GatewayState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
}
