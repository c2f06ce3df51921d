// SPDX-FileCopyrightText: 2026 Facemark Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! S3-compatible object store client for Facemark face images.
//!
//! Implements [`ImageStore`] over plain HTTP object semantics
//! (`PUT/GET/DELETE {endpoint}/{bucket}/{key}`). Both the submitted
//! attendance images and the registered reference images live in the same
//! bucket, under key prefixes that correlate every artifact of a submission
//! by user and tracking id.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::debug;

use facemark_core::{AdapterType, FacemarkError, HealthStatus, ImageStore, PluginAdapter};

/// Key prefix for submitted attendance images.
pub const ATTENDANCE_PREFIX: &str = "faces/attendance";

/// Key prefix for registered reference images.
pub const REGISTERED_PREFIX: &str = "faces/registered";

/// Object key for a submitted attendance face image.
pub fn attendance_face_key(user_id: &str, tracking_id: &str) -> String {
    format!("{ATTENDANCE_PREFIX}/{user_id}/{tracking_id}.jpg")
}

/// Object key for a registered reference face image.
pub fn registered_face_key(user_id: &str, timestamp: &str) -> String {
    format!("{REGISTERED_PREFIX}/{user_id}/{timestamp}.jpg")
}

/// HTTP client for the S3-compatible face image bucket.
pub struct ObjectStoreClient {
    client: reqwest::Client,
    endpoint: String,
    bucket: String,
}

impl ObjectStoreClient {
    /// Creates a new object store client for the given endpoint and bucket.
    pub fn new(endpoint: String, bucket: String) -> Result<Self, FacemarkError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| FacemarkError::ImageStore {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;
        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            bucket,
        })
    }

    fn object_url(&self, key: &str) -> String {
        format!("{}/{}/{key}", self.endpoint, self.bucket)
    }
}

#[async_trait]
impl PluginAdapter for ObjectStoreClient {
    fn name(&self) -> &str {
        "object-store"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::ImageStore
    }

    async fn health_check(&self) -> Result<HealthStatus, FacemarkError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), FacemarkError> {
        Ok(())
    }
}

#[async_trait]
impl ImageStore for ObjectStoreClient {
    async fn put_object(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), FacemarkError> {
        let url = self.object_url(key);
        let response = self
            .client
            .put(&url)
            .header("content-type", content_type)
            .body(bytes)
            .send()
            .await
            .map_err(|e| FacemarkError::ImageStore {
                message: format!("upload of {key} failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        if !response.status().is_success() {
            return Err(FacemarkError::ImageStore {
                message: format!("upload of {key} returned {}", response.status()),
                source: None,
            });
        }
        debug!(key, "object uploaded");
        Ok(())
    }

    async fn get_object(&self, key: &str) -> Result<Vec<u8>, FacemarkError> {
        let url = self.object_url(key);
        let response =
            self.client
                .get(&url)
                .send()
                .await
                .map_err(|e| FacemarkError::ImageStore {
                    message: format!("fetch of {key} failed: {e}"),
                    source: Some(Box::new(e)),
                })?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(FacemarkError::ImageStore {
                message: format!("object {key} not found"),
                source: None,
            });
        }
        if !response.status().is_success() {
            return Err(FacemarkError::ImageStore {
                message: format!("fetch of {key} returned {}", response.status()),
                source: None,
            });
        }

        let bytes = response.bytes().await.map_err(|e| FacemarkError::ImageStore {
            message: format!("reading body of {key} failed: {e}"),
            source: Some(Box::new(e)),
        })?;
        Ok(bytes.to_vec())
    }

    async fn delete_object(&self, key: &str) -> Result<(), FacemarkError> {
        let url = self.object_url(key);
        let response =
            self.client
                .delete(&url)
                .send()
                .await
                .map_err(|e| FacemarkError::ImageStore {
                    message: format!("delete of {key} failed: {e}"),
                    source: Some(Box::new(e)),
                })?;

        // Deleting an absent object is not an error.
        if !response.status().is_success() && response.status() != StatusCode::NOT_FOUND {
            return Err(FacemarkError::ImageStore {
                message: format!("delete of {key} returned {}", response.status()),
                source: None,
            });
        }
        debug!(key, "object deleted");
        Ok(())
    }
}
