// SPDX-FileCopyrightText: 2026 Rentio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Rentio tenancy bot.
//!
//! This crate provides the foundational trait definitions, error types, and
//! common types used throughout the Rentio workspace. The channel and storage
//! adapters implement traits defined here.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::RentioError;
pub use types::{
    ActorRef, AdapterType, Choice, Contact, HealthStatus, Intent, MessageId, Notification,
    Occupant, Payment, ProofSubmission,
};

// Re-export all adapter traits at crate root.
pub use traits::{ChannelAdapter, PluginAdapter, StorageAdapter};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adapter_type_round_trips() {
        use std::str::FromStr;

        for variant in [AdapterType::Channel, AdapterType::Storage] {
            let s = variant.to_string();
            let parsed = AdapterType::from_str(&s).expect("should parse back");
            assert_eq!(variant, parsed);
        }
    }

    #[test]
    fn adapter_type_serialization() {
        let channel = AdapterType::Channel;
        let json = serde_json::to_string(&channel).expect("should serialize");
        let parsed: AdapterType = serde_json::from_str(&json).expect("should deserialize");
        assert_eq!(channel, parsed);
    }

    #[test]
    fn health_status_variants() {
        let healthy = HealthStatus::Healthy;
        let degraded = HealthStatus::Degraded("slow".into());
        let unhealthy = HealthStatus::Unhealthy("down".into());

        assert_eq!(healthy, HealthStatus::Healthy);
        assert_ne!(degraded, healthy);
        assert_ne!(unhealthy, healthy);
    }

    #[test]
    fn trait_modules_are_exported() {
        // If any trait module is missing or has a compile error, this test
        // won't compile.
        fn _assert_plugin_adapter<T: PluginAdapter>() {}
        fn _assert_channel_adapter<T: ChannelAdapter>() {}
        fn _assert_storage_adapter<T: StorageAdapter>() {}
    }
}
