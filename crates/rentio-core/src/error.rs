// SPDX-FileCopyrightText: 2026 Rentio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Rentio tenancy bot.

use thiserror::Error;

/// The primary error type used across all Rentio adapter traits and core operations.
#[derive(Debug, Error)]
pub enum RentioError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Channel adapter errors (connection failure, message format, rate limiting).
    #[error("channel error: {message}")]
    Channel {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Room already holds the maximum number of active occupants.
    #[error("room {room} is full ({limit} occupants)")]
    CapacityExceeded { room: u32, limit: u32 },

    /// The contact identifier is already bound to another active occupant.
    #[error("contact {contact} is already registered to another occupant")]
    DuplicateContact { contact: String },

    /// No active occupant with the given id.
    #[error("occupant {occupant} not found")]
    NotFound { occupant: i64 },

    /// Payment amount is not a positive integer.
    #[error("invalid amount: {reason}")]
    InvalidAmount { reason: String },

    /// A proof submission could not be resolved to a registered occupant.
    #[error("no registered occupant for contact {contact}")]
    UnknownOccupant { contact: String },

    /// Replay of a proof submission that was already confirmed.
    #[error("payment proof {submission} was already confirmed")]
    AlreadyConfirmed { submission: i64 },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl RentioError {
    /// Whether this error is a domain-level rejection that should be surfaced
    /// to the initiating actor rather than treated as a fault.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            RentioError::CapacityExceeded { .. }
                | RentioError::DuplicateContact { .. }
                | RentioError::NotFound { .. }
                | RentioError::InvalidAmount { .. }
                | RentioError::UnknownOccupant { .. }
                | RentioError::AlreadyConfirmed { .. }
        )
    }
}
