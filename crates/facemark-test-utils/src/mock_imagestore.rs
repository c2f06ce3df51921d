// SPDX-FileCopyrightText: 2026 Facemark Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory image store for testing.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use facemark_core::{AdapterType, FacemarkError, HealthStatus, ImageStore, PluginAdapter};

/// An in-memory `ImageStore` keyed by object path.
pub struct MockImageStore {
    objects: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    fail_puts: AtomicBool,
}

impl MockImageStore {
    pub fn new() -> Self {
        Self {
            objects: Arc::new(Mutex::new(HashMap::new())),
            fail_puts: AtomicBool::new(false),
        }
    }

    /// Make every subsequent `put_object` fail, for upload-failure paths.
    pub fn fail_puts(&self, fail: bool) {
        self.fail_puts.store(fail, Ordering::SeqCst);
    }

    /// Number of stored objects.
    pub async fn object_count(&self) -> usize {
        self.objects.lock().await.len()
    }

    /// True when an object exists under `key`.
    pub async fn contains(&self, key: &str) -> bool {
        self.objects.lock().await.contains_key(key)
    }
}

impl Default for MockImageStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockImageStore {
    fn name(&self) -> &str {
        "mock-image-store"
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
impl ImageStore for MockImageStore {
    async fn put_object(
        &self,
        key: &str,
        bytes: Vec<u8>,
        _content_type: &str,
    ) -> Result<(), FacemarkError> {
        if self.fail_puts.load(Ordering::SeqCst) {
            return Err(FacemarkError::ImageStore {
                message: "simulated upload failure".to_string(),
                source: None,
            });
        }
        self.objects.lock().await.insert(key.to_string(), bytes);
        Ok(())
    }

    async fn get_object(&self, key: &str) -> Result<Vec<u8>, FacemarkError> {
        self.objects
            .lock()
            .await
            .get(key)
            .cloned()
            .ok_or_else(|| FacemarkError::ImageStore {
                message: format!("object {key} not found"),
                source: None,
            })
    }

    async fn delete_object(&self, key: &str) -> Result<(), FacemarkError> {
        self.objects.lock().await.remove(key);
        Ok(())
    }
}
