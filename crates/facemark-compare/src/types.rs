// SPDX-FileCopyrightText: 2026 Facemark Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Request/response types for the face comparison service API.

use serde::{Deserialize, Serialize};

/// An image referenced by its object-store location.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageReference {
    pub bucket: String,
    pub key: String,
}

/// Request body for the compare-faces endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompareFacesRequest {
    /// The registered reference face.
    pub source_image: ImageReference,
    /// The submitted face to verify.
    pub target_image: ImageReference,
    /// Minimum similarity percentage for a match.
    pub similarity_threshold: f64,
}

/// One face in the target image that matched the source face at or above
/// the threshold.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FaceMatch {
    /// Similarity percentage in [0, 100].
    pub similarity: f64,
}

/// Response body for a successful compare-faces call.
///
/// `unmatched_faces` entries carry bounding-box details this backend never
/// inspects; only their presence matters for the taxonomy.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompareFacesResponse {
    #[serde(default)]
    pub face_matches: Vec<FaceMatch>,
    #[serde(default)]
    pub unmatched_faces: Vec<serde_json::Value>,
}

/// Error body returned by the service on client errors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorBody {
    pub code: String,
    pub message: String,
}
