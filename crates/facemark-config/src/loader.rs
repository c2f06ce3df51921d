// SPDX-FileCopyrightText: 2026 Facemark Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./facemark.toml` > `~/.config/facemark/facemark.toml`
//! > `/etc/facemark/facemark.toml` with environment variable overrides via the
//! `FACEMARK_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::FacemarkConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/facemark/facemark.toml` (system-wide)
/// 3. `~/.config/facemark/facemark.toml` (user XDG config)
/// 4. `./facemark.toml` (local directory)
/// 5. `FACEMARK_*` environment variables
pub fn load_config() -> Result<FacemarkConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(FacemarkConfig::default()))
        .merge(Toml::file("/etc/facemark/facemark.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("facemark/facemark.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("facemark.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no XDG lookup).
///
/// Used for testing and explicit config specification.
pub fn load_config_from_str(toml_content: &str) -> Result<FacemarkConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(FacemarkConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<FacemarkConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(FacemarkConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names: `FACEMARK_WORKER_BATCH_SIZE` must map to
/// `worker.batch_size`, not `worker.batch.size`.
fn env_provider() -> Env {
    Env::prefixed("FACEMARK_").map(|key| {
        // `key` is the lowercased env var name with prefix stripped.
        // Example: FACEMARK_COMPARISON_SIMILARITY_THRESHOLD
        //   -> "comparison_similarity_threshold"
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("service_", "service.", 1)
            .replacen("gateway_", "gateway.", 1)
            .replacen("storage_", "storage.", 1)
            .replacen("images_", "images.", 1)
            .replacen("comparison_", "comparison.", 1)
            .replacen("notification_", "notification.", 1)
            .replacen("worker_", "worker.", 1);
        mapped.into()
    })
}
