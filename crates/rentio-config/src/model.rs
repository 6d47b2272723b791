// SPDX-FileCopyrightText: 2026 Rentio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Rentio tenancy bot.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Rentio configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable
/// overrides. All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RentioConfig {
    /// Bot identity and logging settings.
    #[serde(default)]
    pub bot: BotConfig,

    /// Telegram integration settings.
    #[serde(default)]
    pub telegram: TelegramConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Facility shape and pricing settings.
    #[serde(default)]
    pub tenancy: TenancyConfig,

    /// Multi-step workflow settings.
    #[serde(default)]
    pub workflow: WorkflowConfig,

    /// Expiry scanner settings.
    #[serde(default)]
    pub scanner: ScannerConfig,
}

/// Bot identity and logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BotConfig {
    /// Display name of the bot.
    #[serde(default = "default_bot_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            name: default_bot_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_bot_name() -> String {
    "rentio".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Telegram integration configuration.
///
/// No admin list is configured here: the first distinct caller is promoted to
/// administrator when the admin set is empty (bootstrap rule).
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TelegramConfig {
    /// Telegram Bot API token. `None` disables Telegram integration.
    #[serde(default)]
    pub bot_token: Option<String>,
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("rentio").join("rentio.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("rentio.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

/// Facility shape and pricing configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TenancyConfig {
    /// Number of rooms in the facility.
    #[serde(default = "default_room_count")]
    pub room_count: u32,

    /// Maximum active occupants per room.
    #[serde(default = "default_room_limit")]
    pub room_limit: u32,

    /// Default price per day in the smallest currency unit. Used to seed the
    /// mutable `price_per_day` setting on first run; changing the setting
    /// affects only future extensions.
    #[serde(default = "default_price_per_day")]
    pub price_per_day: u64,
}

impl Default for TenancyConfig {
    fn default() -> Self {
        Self {
            room_count: default_room_count(),
            room_limit: default_room_limit(),
            price_per_day: default_price_per_day(),
        }
    }
}

fn default_room_count() -> u32 {
    24
}

fn default_room_limit() -> u32 {
    4
}

fn default_price_per_day() -> u64 {
    26_666
}

/// Multi-step workflow configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct WorkflowConfig {
    /// Seconds after which an abandoned pending workflow state expires.
    #[serde(default = "default_pending_ttl_secs")]
    pub pending_ttl_secs: u64,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            pending_ttl_secs: default_pending_ttl_secs(),
        }
    }
}

fn default_pending_ttl_secs() -> u64 {
    3600 // 1 hour
}

/// Expiry scanner configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ScannerConfig {
    /// Scan interval in seconds.
    #[serde(default = "default_scan_interval_secs")]
    pub interval_secs: u64,

    /// Reminder fires when exactly this many whole days remain.
    #[serde(default = "default_warning_threshold_days")]
    pub warning_threshold_days: i64,

    /// Also copy reminders to the administrator set.
    #[serde(default = "default_notify_admins")]
    pub notify_admins: bool,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_scan_interval_secs(),
            warning_threshold_days: default_warning_threshold_days(),
            notify_admins: default_notify_admins(),
        }
    }
}

fn default_scan_interval_secs() -> u64 {
    3600 // 1 hour
}

fn default_warning_threshold_days() -> i64 {
    3
}

fn default_notify_admins() -> bool {
    true
}
