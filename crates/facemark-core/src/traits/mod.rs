// SPDX-FileCopyrightText: 2026 Facemark Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter trait definitions for the Facemark pipeline.
//!
//! All adapters extend the [`PluginAdapter`] base trait and use
//! `#[async_trait]` for dynamic dispatch compatibility. The pipeline
//! components receive these as explicit constructor dependencies, which is
//! what makes the worker and gateway testable with in-memory doubles.

pub mod adapter;
pub mod compare;
pub mod image;
pub mod notify;
pub mod queue;
pub mod storage;

// Re-export all traits at the traits module level for convenience.
pub use adapter::PluginAdapter;
pub use compare::FaceComparator;
pub use image::ImageStore;
pub use notify::NotificationPublisher;
pub use queue::JobQueue;
pub use storage::{AttendanceStore, StorageAdapter, StudentStore};
