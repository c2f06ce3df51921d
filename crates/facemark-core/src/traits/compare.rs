// SPDX-FileCopyrightText: 2026 Facemark Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Face comparison service trait.

use async_trait::async_trait;

use crate::error::FacemarkError;
use crate::traits::adapter::PluginAdapter;
use crate::types::ComparisonResult;

/// Adapter over an external face-similarity service.
///
/// The adapter owns the translation of the service's failure taxonomy:
/// terminal outcomes (no face, below threshold, multiple faces, bad
/// parameters) come back as `Ok(ComparisonResult)` with an error code, while
/// throttling and unclassified failures return `Err` so the caller's retry
/// policy applies.
#[async_trait]
pub trait FaceComparator: PluginAdapter {
    /// Compares the reference image against the candidate image.
    ///
    /// Both arguments are object-store keys within the adapter's configured
    /// bucket. `threshold` is the minimum similarity percentage for a match.
    async fn compare(
        &self,
        reference_key: &str,
        candidate_key: &str,
        threshold: f64,
    ) -> Result<ComparisonResult, FacemarkError>;
}
