// SPDX-FileCopyrightText: 2026 Facemark Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Durable job queue trait.
//!
//! Delivery is at-least-once: an entry claimed by `dequeue` that is neither
//! acked nor failed before its lock expires is released for redelivery. The
//! queue owns attempt counting and dead-letters an entry once it exceeds its
//! maximum attempts.

use async_trait::async_trait;

use crate::error::FacemarkError;
use crate::traits::adapter::PluginAdapter;
use crate::types::QueueEntry;

/// Durable at-least-once job queue.
#[async_trait]
pub trait JobQueue: PluginAdapter {
    /// Appends a payload to the named queue. Returns the entry id.
    async fn enqueue(&self, queue_name: &str, payload: &str) -> Result<i64, FacemarkError>;

    /// Atomically claims the oldest pending entry, marking it in-flight with
    /// a visibility lock. `Ok(None)` when the queue is empty.
    async fn dequeue(&self, queue_name: &str) -> Result<Option<QueueEntry>, FacemarkError>;

    /// Acknowledges successful handling of an entry.
    async fn ack(&self, id: i64) -> Result<(), FacemarkError>;

    /// Reports failed handling. Below the attempt ceiling the entry returns
    /// to pending; at the ceiling it is dead-lettered.
    async fn fail(&self, id: i64) -> Result<(), FacemarkError>;

    /// Releases in-flight entries whose visibility lock has expired
    /// (abandoned by a crashed or hung consumer). Returns the release count.
    async fn release_expired(&self, queue_name: &str) -> Result<u64, FacemarkError>;
}
