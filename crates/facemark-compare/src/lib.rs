// SPDX-FileCopyrightText: 2026 Facemark Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Face comparison service adapter for the Facemark attendance backend.
//!
//! This crate implements [`FaceComparator`] over the external
//! face-similarity HTTP service, translating its response taxonomy into a
//! normalized [`ComparisonResult`]. Terminal outcomes -- no face detected,
//! similarity below threshold, multiple faces, coded parameter errors --
//! come back as `Ok` results; throttling and unclassified failures are
//! raised so the job queue's redelivery applies.

pub mod client;
pub mod types;

use async_trait::async_trait;
use tracing::{info, warn};

use facemark_core::{
    AdapterType, ComparisonErrorCode, ComparisonResult, FaceComparator, FacemarkError,
    HealthStatus, PluginAdapter,
};

use crate::client::{CompareApiOutcome, FaceCompareClient};
use crate::types::{CompareFacesRequest, CompareFacesResponse, ImageReference};

/// Face comparison adapter implementing [`FaceComparator`].
pub struct FaceCompareService {
    client: FaceCompareClient,
    bucket: String,
}

impl FaceCompareService {
    /// Creates a new comparison adapter for images in `bucket`.
    pub fn new(
        endpoint: String,
        api_key: Option<&str>,
        bucket: String,
    ) -> Result<Self, FacemarkError> {
        Ok(Self {
            client: FaceCompareClient::new(endpoint, api_key)?,
            bucket,
        })
    }

    /// Maps a completed comparison response onto the result taxonomy.
    fn map_response(response: CompareFacesResponse) -> ComparisonResult {
        if response.face_matches.is_empty() {
            if response.unmatched_faces.is_empty() {
                // No face detected in the submitted image.
                warn!("no face detected in the submitted image");
                return ComparisonResult::failure(
                    ComparisonErrorCode::NoFaceDetected,
                    "No face detected in image. Please ensure your face is clearly visible \
                     and try again.",
                    None,
                );
            }
            // A face was detected but similarity is below threshold.
            warn!(
                unmatched = response.unmatched_faces.len(),
                "face detected but similarity below threshold"
            );
            return ComparisonResult::failure(
                ComparisonErrorCode::SimilarityBelowThreshold,
                "Face verification failed: Similarity below threshold. Please ensure good \
                 lighting and face the camera directly.",
                None,
            );
        }

        let best = response
            .face_matches
            .iter()
            .map(|m| m.similarity)
            .fold(f64::MIN, f64::max);

        if response.face_matches.len() > 1 {
            warn!(
                matches = response.face_matches.len(),
                "multiple matching faces detected"
            );
            return ComparisonResult::failure(
                ComparisonErrorCode::MultipleFacesDetected,
                format!(
                    "Multiple faces detected in image (found {} matches). Please ensure \
                     only your face is visible and try again.",
                    response.face_matches.len()
                ),
                Some(best),
            );
        }

        info!(similarity = best, "face match found");
        ComparisonResult::verified(best)
    }

    /// Maps a coded service rejection to a terminal result, or raises it as
    /// retryable when the code is unknown.
    fn map_rejection(code: &str, message: &str) -> Result<ComparisonResult, FacemarkError> {
        let mapped = match code {
            "InvalidParameterException" => ComparisonResult::failure(
                ComparisonErrorCode::InvalidParameter,
                "Invalid image format or parameters. Please upload a clear photo of your face.",
                None,
            ),
            "ImageTooLargeException" => ComparisonResult::failure(
                ComparisonErrorCode::ImageTooLarge,
                "Image size too large. Please upload a smaller image (max 15MB).",
                None,
            ),
            "InvalidObjectException" => ComparisonResult::failure(
                ComparisonErrorCode::ImageNotFound,
                "Image not found or inaccessible. Please try uploading again.",
                None,
            ),
            "InvalidImageFormatException" => ComparisonResult::failure(
                ComparisonErrorCode::InvalidImageFormat,
                "Invalid image format. Please upload a JPEG or PNG image.",
                None,
            ),
            _ => {
                // Throughput-exceeded and anything unclassified is raised so
                // the caller's retry policy applies.
                return Err(FacemarkError::Comparison {
                    message: format!("comparison service rejected request ({code}): {message}"),
                    source: None,
                });
            }
        };
        warn!(code, message, "comparison service rejected request");
        Ok(mapped)
    }
}

#[async_trait]
impl PluginAdapter for FaceCompareService {
    fn name(&self) -> &str {
        "face-compare"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Comparison
    }

    async fn health_check(&self) -> Result<HealthStatus, FacemarkError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), FacemarkError> {
        Ok(())
    }
}

#[async_trait]
impl FaceComparator for FaceCompareService {
    async fn compare(
        &self,
        reference_key: &str,
        candidate_key: &str,
        threshold: f64,
    ) -> Result<ComparisonResult, FacemarkError> {
        info!(
            reference = reference_key,
            candidate = candidate_key,
            threshold,
            "comparing faces"
        );

        let request = CompareFacesRequest {
            source_image: ImageReference {
                bucket: self.bucket.clone(),
                key: reference_key.to_string(),
            },
            target_image: ImageReference {
                bucket: self.bucket.clone(),
                key: candidate_key.to_string(),
            },
            similarity_threshold: threshold,
        };

        match self.client.compare_faces(&request).await? {
            CompareApiOutcome::Completed(response) => Ok(Self::map_response(response)),
            CompareApiOutcome::Rejected(err) => Self::map_rejection(&err.code, &err.message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn service_for(server: &MockServer) -> FaceCompareService {
        FaceCompareService::new(server.uri(), Some("test-key"), "facemark-faces".to_string())
            .unwrap()
    }

    #[tokio::test]
    async fn single_match_above_threshold_is_verified() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/compare-faces"))
            .and(body_partial_json(json!({"similarityThreshold": 80.0})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "faceMatches": [{"similarity": 97.4}],
                "unmatchedFaces": []
            })))
            .mount(&server)
            .await;

        let result = service_for(&server)
            .await
            .compare("ref.jpg", "cand.jpg", 80.0)
            .await
            .unwrap();
        assert!(result.success);
        assert_eq!(result.similarity_score, Some(97.4));
        assert!(result.error_code.is_none());
    }

    #[tokio::test]
    async fn no_matches_and_no_unmatched_is_no_face_detected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/compare-faces"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "faceMatches": [],
                "unmatchedFaces": []
            })))
            .mount(&server)
            .await;

        let result = service_for(&server)
            .await
            .compare("ref.jpg", "cand.jpg", 80.0)
            .await
            .unwrap();
        assert!(!result.success);
        assert_eq!(result.error_code, Some(ComparisonErrorCode::NoFaceDetected));
        assert!(result.similarity_score.is_none());
    }

    #[tokio::test]
    async fn no_matches_with_unmatched_faces_is_below_threshold() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/compare-faces"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "faceMatches": [],
                "unmatchedFaces": [{"boundingBox": {}}]
            })))
            .mount(&server)
            .await;

        let result = service_for(&server)
            .await
            .compare("ref.jpg", "cand.jpg", 80.0)
            .await
            .unwrap();
        assert!(!result.success);
        assert_eq!(
            result.error_code,
            Some(ComparisonErrorCode::SimilarityBelowThreshold)
        );
    }

    #[tokio::test]
    async fn multiple_matches_fail_with_best_score() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/compare-faces"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "faceMatches": [{"similarity": 88.0}, {"similarity": 93.5}],
                "unmatchedFaces": []
            })))
            .mount(&server)
            .await;

        let result = service_for(&server)
            .await
            .compare("ref.jpg", "cand.jpg", 80.0)
            .await
            .unwrap();
        assert!(!result.success);
        assert_eq!(
            result.error_code,
            Some(ComparisonErrorCode::MultipleFacesDetected)
        );
        assert_eq!(result.similarity_score, Some(93.5));
    }

    #[tokio::test]
    async fn coded_rejection_maps_to_terminal_result() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/compare-faces"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "code": "InvalidImageFormatException",
                "message": "unsupported content"
            })))
            .mount(&server)
            .await;

        let result = service_for(&server)
            .await
            .compare("ref.jpg", "cand.jpg", 80.0)
            .await
            .unwrap();
        assert!(!result.success);
        assert_eq!(
            result.error_code,
            Some(ComparisonErrorCode::InvalidImageFormat)
        );
    }

    #[tokio::test]
    async fn throttling_is_raised_for_retry() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/compare-faces"))
            .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
            .mount(&server)
            .await;

        let err = service_for(&server)
            .await
            .compare("ref.jpg", "cand.jpg", 80.0)
            .await
            .unwrap_err();
        assert!(matches!(err, FacemarkError::Comparison { .. }));
    }

    #[tokio::test]
    async fn server_error_is_raised_for_retry() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/compare-faces"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = service_for(&server)
            .await
            .compare("ref.jpg", "cand.jpg", 80.0)
            .await
            .unwrap_err();
        assert!(matches!(err, FacemarkError::Comparison { .. }));
    }

    #[tokio::test]
    async fn unknown_rejection_code_is_raised_for_retry() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/compare-faces"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "code": "ThrottlingException",
                "message": "rate exceeded"
            })))
            .mount(&server)
            .await;

        let err = service_for(&server)
            .await
            .compare("ref.jpg", "cand.jpg", 80.0)
            .await
            .unwrap_err();
        assert!(matches!(err, FacemarkError::Comparison { .. }));
    }
}
