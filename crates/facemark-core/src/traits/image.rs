// SPDX-FileCopyrightText: 2026 Facemark Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Object store trait for face images.

use async_trait::async_trait;

use crate::error::FacemarkError;
use crate::traits::adapter::PluginAdapter;

/// Content-addressable store for reference and submitted face images.
///
/// Keys are namespaced paths (`faces/attendance/{user_id}/{tracking_id}.jpg`,
/// `faces/registered/{user_id}/{timestamp}.jpg`) so all artifacts of one
/// submission are correlated by tracking id.
#[async_trait]
pub trait ImageStore: PluginAdapter {
    /// Stores an object under the given key, replacing any existing object.
    async fn put_object(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), FacemarkError>;

    /// Fetches the object stored under the given key.
    async fn get_object(&self, key: &str) -> Result<Vec<u8>, FacemarkError>;

    /// Deletes the object stored under the given key, if any.
    async fn delete_object(&self, key: &str) -> Result<(), FacemarkError>;
}
