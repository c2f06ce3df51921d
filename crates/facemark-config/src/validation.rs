// SPDX-FileCopyrightText: 2026 Facemark Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation of configuration values.
//!
//! Figment/serde guarantees shape; this layer checks values that are
//! syntactically valid but semantically wrong (out-of-range threshold, zero
//! batch size) so misconfiguration fails at startup, not mid-pipeline.

use thiserror::Error;

use crate::model::FacemarkConfig;

/// A single configuration validation failure.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A config value failed semantic validation.
    #[error("invalid config value for `{field}`: {reason}")]
    Invalid { field: String, reason: String },

    /// Figment failed to load or deserialize the configuration.
    #[error("failed to load configuration: {0}")]
    Load(#[from] Box<figment::Error>),
}

/// Validate a loaded configuration, collecting every failure.
pub fn validate_config(config: &FacemarkConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    let threshold = config.comparison.similarity_threshold;
    if !(0.0..=100.0).contains(&threshold) {
        errors.push(invalid(
            "comparison.similarity_threshold",
            format!("{threshold} is outside [0, 100]"),
        ));
    }

    if config.worker.batch_size == 0 {
        errors.push(invalid("worker.batch_size", "must be at least 1"));
    }

    if config.worker.max_attempts < 1 {
        errors.push(invalid("worker.max_attempts", "must be at least 1"));
    }

    if config.worker.poll_interval_secs == 0 {
        errors.push(invalid("worker.poll_interval_secs", "must be at least 1"));
    }

    if config.gateway.enabled && config.gateway.port == 0 {
        errors.push(invalid("gateway.port", "must be a non-zero port"));
    }

    if !["trace", "debug", "info", "warn", "error"]
        .contains(&config.service.log_level.as_str())
    {
        errors.push(invalid(
            "service.log_level",
            format!(
                "`{}` is not one of trace, debug, info, warn, error",
                config.service.log_level
            ),
        ));
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

fn invalid(field: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field: field.to_string(),
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = FacemarkConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn out_of_range_threshold_is_rejected() {
        let mut config = FacemarkConfig::default();
        config.comparison.similarity_threshold = 150.0;
        let errors = validate_config(&config).unwrap_err();
        assert!(
            errors
                .iter()
                .any(|e| e.to_string().contains("similarity_threshold"))
        );
    }

    #[test]
    fn zero_batch_size_is_rejected() {
        let mut config = FacemarkConfig::default();
        config.worker.batch_size = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn multiple_failures_are_all_reported() {
        let mut config = FacemarkConfig::default();
        config.worker.batch_size = 0;
        config.worker.max_attempts = 0;
        config.service.log_level = "loud".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
    }
}
