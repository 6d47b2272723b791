// SPDX-FileCopyrightText: 2026 Rentio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes, such as positive room counts and a non-empty database path.

use crate::diagnostic::ConfigError;
use crate::model::RentioConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &RentioConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    if config.tenancy.room_count < 1 {
        errors.push(ConfigError::Validation {
            message: format!(
                "tenancy.room_count must be at least 1, got {}",
                config.tenancy.room_count
            ),
        });
    }

    if config.tenancy.room_limit < 1 {
        errors.push(ConfigError::Validation {
            message: format!(
                "tenancy.room_limit must be at least 1, got {}",
                config.tenancy.room_limit
            ),
        });
    }

    if config.tenancy.price_per_day < 1 {
        errors.push(ConfigError::Validation {
            message: format!(
                "tenancy.price_per_day must be at least 1, got {}",
                config.tenancy.price_per_day
            ),
        });
    }

    if config.scanner.warning_threshold_days < 0 {
        errors.push(ConfigError::Validation {
            message: format!(
                "scanner.warning_threshold_days must be non-negative, got {}",
                config.scanner.warning_threshold_days
            ),
        });
    }

    if config.scanner.interval_secs < 1 {
        errors.push(ConfigError::Validation {
            message: format!(
                "scanner.interval_secs must be at least 1, got {}",
                config.scanner.interval_secs
            ),
        });
    }

    if let Some(token) = &config.telegram.bot_token
        && token.trim().is_empty()
    {
        errors.push(ConfigError::Validation {
            message: "telegram.bot_token must not be empty when set".to_string(),
        });
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}
