// SPDX-FileCopyrightText: 2026 Facemark Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock face comparator for deterministic testing.
//!
//! `MockComparator` implements `FaceComparator` with scripted results and
//! captured calls for assertion in tests.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use facemark_core::{
    AdapterType, ComparisonResult, FaceComparator, FacemarkError, HealthStatus, PluginAdapter,
};

/// One recorded comparison call.
#[derive(Debug, Clone, PartialEq)]
pub struct CompareCall {
    pub reference_key: String,
    pub candidate_key: String,
    pub threshold: f64,
}

/// A mock comparison service for testing.
///
/// Results queued via `script_result()` are returned in order; once the
/// script is exhausted, every call verifies with similarity 99.0.
pub struct MockComparator {
    script: Arc<Mutex<VecDeque<Result<ComparisonResult, FacemarkError>>>>,
    calls: Arc<Mutex<Vec<CompareCall>>>,
}

impl MockComparator {
    pub fn new() -> Self {
        Self {
            script: Arc::new(Mutex::new(VecDeque::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Queue the result for the next comparison call.
    pub async fn script_result(&self, result: Result<ComparisonResult, FacemarkError>) {
        self.script.lock().await.push_back(result);
    }

    /// All calls made to `compare()`.
    pub async fn calls(&self) -> Vec<CompareCall> {
        self.calls.lock().await.clone()
    }

    /// Count of calls made to `compare()`.
    pub async fn call_count(&self) -> usize {
        self.calls.lock().await.len()
    }
}

impl Default for MockComparator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockComparator {
    fn name(&self) -> &str {
        "mock-comparator"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Comparison
    }

    async fn health_check(&self) -> Result<HealthStatus, FacemarkError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), FacemarkError> {
        Ok(())
    }
}

#[async_trait]
impl FaceComparator for MockComparator {
    async fn compare(
        &self,
        reference_key: &str,
        candidate_key: &str,
        threshold: f64,
    ) -> Result<ComparisonResult, FacemarkError> {
        self.calls.lock().await.push(CompareCall {
            reference_key: reference_key.to_string(),
            candidate_key: candidate_key.to_string(),
            threshold,
        });
        match self.script.lock().await.pop_front() {
            Some(result) => result,
            None => Ok(ComparisonResult::verified(99.0)),
        }
    }
}
