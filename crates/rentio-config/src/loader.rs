// SPDX-FileCopyrightText: 2026 Rentio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./rentio.toml` > `~/.config/rentio/rentio.toml` > `/etc/rentio/rentio.toml`
//! with environment variable overrides via `RENTIO_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::RentioConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/rentio/rentio.toml` (system-wide)
/// 3. `~/.config/rentio/rentio.toml` (user XDG config)
/// 4. `./rentio.toml` (local directory)
/// 5. `RENTIO_*` environment variables
pub fn load_config() -> Result<RentioConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a specific TOML string only (no XDG lookup).
///
/// Used for testing and explicit config specification.
pub fn load_config_from_str(toml_content: &str) -> Result<RentioConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(RentioConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<RentioConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(RentioConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used internally for config loading (exposed for diagnostic use).
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(RentioConfig::default()))
        .merge(Toml::file("/etc/rentio/rentio.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("rentio/rentio.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("rentio.toml"))
        .merge(env_provider())
}

/// Create the environment variable provider using explicit `map()` for section-to-dot mapping.
///
/// Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names. For example, `RENTIO_TELEGRAM_BOT_TOKEN`
/// must map to `telegram.bot_token`, not `telegram.bot.token`.
fn env_provider() -> Env {
    Env::prefixed("RENTIO_").map(|key| {
        // `key` is the lowercased env var name with prefix stripped.
        // Example: RENTIO_TELEGRAM_BOT_TOKEN -> "telegram_bot_token"
        let key_str = key.as_str();
        for section in ["bot", "telegram", "storage", "tenancy", "workflow", "scanner"] {
            if let Some(rest) = key_str.strip_prefix(&format!("{section}_")) {
                return format!("{section}.{rest}").into();
            }
        }
        key_str.to_string().into()
    })
}
