// SPDX-FileCopyrightText: 2026 Facemark Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Facemark integration tests.
//!
//! Provides mock implementations of the comparison, image store, and
//! notification seams plus a temp-SQLite [`TestHarness`] assembling the
//! full dependency set of the pipeline.

pub mod harness;
pub mod mock_comparator;
pub mod mock_imagestore;
pub mod mock_publisher;

pub use harness::TestHarness;
pub use mock_comparator::{CompareCall, MockComparator};
pub use mock_imagestore::MockImageStore;
pub use mock_publisher::{MockPublisher, PublishedNotification};
