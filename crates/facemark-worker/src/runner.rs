// SPDX-FileCopyrightText: 2026 Facemark Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Poll loop driving the comparison job queue.
//!
//! Each cycle releases expired visibility locks, claims up to a batch of
//! pending entries, processes them, and then acks handled entries and fails
//! retryable ones. The queue owns redelivery counting and dead-lettering.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use facemark_config::model::WorkerConfig;
use facemark_core::{FacemarkError, JobQueue};

use crate::processor::JobProcessor;

/// Background loop consuming the comparison job queue.
pub struct WorkerLoop {
    queue: Arc<dyn JobQueue>,
    processor: Arc<JobProcessor>,
    config: WorkerConfig,
}

impl WorkerLoop {
    pub fn new(queue: Arc<dyn JobQueue>, processor: Arc<JobProcessor>, config: WorkerConfig) -> Self {
        Self {
            queue,
            processor,
            config,
        }
    }

    /// Runs the poll loop until cancellation.
    pub async fn run(&self, cancel: CancellationToken) {
        info!(
            queue = self.config.queue_name.as_str(),
            batch_size = self.config.batch_size,
            poll_interval_secs = self.config.poll_interval_secs,
            "worker loop started"
        );

        let mut interval =
            tokio::time::interval(Duration::from_secs(self.config.poll_interval_secs));

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    match self.poll_once().await {
                        Ok(0) => {}
                        Ok(n) => debug!(jobs = n, "poll cycle processed jobs"),
                        Err(e) => error!(error = %e, "poll cycle failed"),
                    }
                }
                _ = cancel.cancelled() => {
                    info!("worker loop shutting down");
                    break;
                }
            }
        }
    }

    /// Runs one poll cycle. Returns the number of entries claimed.
    pub async fn poll_once(&self) -> Result<usize, FacemarkError> {
        let released = self.queue.release_expired(&self.config.queue_name).await?;
        if released > 0 {
            info!(released, "released expired queue locks");
        }

        let mut entries = Vec::new();
        while entries.len() < self.config.batch_size {
            match self.queue.dequeue(&self.config.queue_name).await? {
                Some(entry) => entries.push(entry),
                None => break,
            }
        }
        if entries.is_empty() {
            return Ok(0);
        }

        let claimed = entries.len();
        let outcome = self.processor.process_batch(&entries).await;

        for entry in &entries {
            if outcome.failures.contains(&entry.id) {
                self.queue.fail(entry.id).await?;
            } else {
                self.queue.ack(entry.id).await?;
            }
        }

        Ok(claimed)
    }
}
