// SPDX-FileCopyrightText: 2026 Facemark Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for the Facemark attendance backend.
//!
//! Provides TOML configuration parsing with strict validation
//! (`deny_unknown_fields`), XDG file hierarchy lookup, and environment
//! variable overrides.
//!
//! # Usage
//!
//! ```no_run
//! use facemark_config::load_and_validate;
//!
//! let config = load_and_validate().expect("config errors");
//! println!("similarity threshold: {}", config.comparison.similarity_threshold);
//! ```

pub mod loader;
pub mod model;
pub mod validation;

pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::FacemarkConfig;
pub use validation::ConfigError;

/// Load configuration from the XDG hierarchy and validate it.
///
/// The high-level entry point: loads config from TOML files + env vars via
/// Figment, then runs post-deserialization validation. Returns either a valid
/// `FacemarkConfig` or every validation failure found.
pub fn load_and_validate() -> Result<FacemarkConfig, Vec<ConfigError>> {
    match loader::load_config() {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => Err(vec![ConfigError::Load(Box::new(err))]),
    }
}

/// Load configuration from a TOML string and validate it.
///
/// Useful for testing and explicit configuration.
pub fn load_and_validate_str(toml_content: &str) -> Result<FacemarkConfig, Vec<ConfigError>> {
    match loader::load_config_from_str(toml_content) {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => Err(vec![ConfigError::Load(Box::new(err))]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_and_validate_str_accepts_good_config() {
        let config = load_and_validate_str(
            r#"
            [gateway]
            identity_secret = "shared-secret"

            [comparison]
            similarity_threshold = 85.0
            "#,
        )
        .unwrap();
        assert_eq!(config.comparison.similarity_threshold, 85.0);
        assert_eq!(config.gateway.identity_secret.as_deref(), Some("shared-secret"));
    }

    #[test]
    fn load_and_validate_str_rejects_bad_values() {
        let errors = load_and_validate_str(
            r#"
            [worker]
            batch_size = 0
            "#,
        )
        .unwrap_err();
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn load_and_validate_str_reports_unknown_keys() {
        let result = load_and_validate_str(
            r#"
            [worker]
            batchsize = 5
            "#,
        );
        assert!(result.is_err(), "unknown key should fail extraction");
    }
}
