// SPDX-FileCopyrightText: 2026 Facemark Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Comparison worker for the Facemark attendance backend.
//!
//! Consumes queued [`ComparisonJob`] messages, resolves the genuine
//! verification outcome for each independently, and reports which entries
//! require redelivery. Ordering, retry, and partial-failure semantics live
//! here; the queue itself only provides at-least-once delivery.
//!
//! [`ComparisonJob`]: facemark_core::ComparisonJob

pub mod processor;
pub mod runner;

pub use processor::{BatchOutcome, JobOutcome, JobProcessor};
pub use runner::WorkerLoop;
