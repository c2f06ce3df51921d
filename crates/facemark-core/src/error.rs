// SPDX-FileCopyrightText: 2026 Facemark Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Facemark attendance backend.

use thiserror::Error;

/// The primary error type used across all Facemark adapter traits and core operations.
///
/// The worker treats `Storage`, `Comparison`, and `Timeout` as retryable when they
/// escape a job (the queue redelivers); everything else is classified at the call
/// site into a terminal record or a dropped message.
#[derive(Debug, Error)]
pub enum FacemarkError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Object store errors (upload failure, missing object, transport).
    #[error("image store error: {message}")]
    ImageStore {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Face-comparison service errors (throttled, unavailable, unclassified).
    ///
    /// Terminal comparison outcomes (no face, below threshold, multiple faces)
    /// are NOT errors -- they come back as a [`ComparisonResult`] with an error
    /// code. This variant is reserved for failures the queue should retry.
    ///
    /// [`ComparisonResult`]: crate::types::ComparisonResult
    #[error("comparison service error: {message}")]
    Comparison {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Notification publish errors (topic unreachable, rejected payload).
    #[error("notification error: {message}")]
    Notification {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Gateway errors (bind failure, serve failure).
    #[error("gateway error: {message}")]
    Gateway {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl FacemarkError {
    /// True when the queue's redelivery-with-backoff should apply.
    ///
    /// Transient infrastructure failures are retryable; anything else escaping
    /// the worker indicates a bug and is retried as well rather than silently
    /// dropped (the queue's max-attempts bound dead-letters a poison message).
    pub fn is_retryable(&self) -> bool {
        !matches!(self, FacemarkError::Config(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn facemark_error_has_all_variants() {
        let _config = FacemarkError::Config("test".into());
        let _storage = FacemarkError::Storage {
            source: Box::new(std::io::Error::other("test")),
        };
        let _images = FacemarkError::ImageStore {
            message: "test".into(),
            source: None,
        };
        let _comparison = FacemarkError::Comparison {
            message: "test".into(),
            source: None,
        };
        let _notification = FacemarkError::Notification {
            message: "test".into(),
            source: None,
        };
        let _gateway = FacemarkError::Gateway {
            message: "test".into(),
            source: None,
        };
        let _timeout = FacemarkError::Timeout {
            duration: std::time::Duration::from_secs(30),
        };
        let _internal = FacemarkError::Internal("test".into());
    }

    #[test]
    fn display_includes_context() {
        let err = FacemarkError::Comparison {
            message: "throttled".into(),
            source: None,
        };
        assert!(err.to_string().contains("throttled"));
    }

    #[test]
    fn config_errors_are_not_retryable() {
        assert!(!FacemarkError::Config("bad".into()).is_retryable());
        assert!(
            FacemarkError::Storage {
                source: Box::new(std::io::Error::other("down"))
            }
            .is_retryable()
        );
    }
}
