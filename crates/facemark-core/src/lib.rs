// SPDX-FileCopyrightText: 2026 Facemark Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Facemark attendance backend.
//!
//! This crate provides the foundational trait definitions, error types, and
//! domain types used throughout the Facemark workspace. The gateway, worker,
//! and all backing-service adapters depend only on the seams defined here.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::FacemarkError;
pub use types::{
    AdapterType, AttendanceRecord, AttendanceStatus, ComparisonErrorCode, ComparisonJob,
    ComparisonResult, HealthStatus, QueueEntry, StudentProfile,
};

// Re-export all adapter traits at crate root.
pub use traits::{
    AttendanceStore, FaceComparator, ImageStore, JobQueue, NotificationPublisher, PluginAdapter,
    StorageAdapter, StudentStore,
};
