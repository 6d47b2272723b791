// SPDX-FileCopyrightText: 2026 Rentio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Rentio integration tests.
//!
//! Provides mock adapters and fixtures for fast, deterministic,
//! CI-runnable tests without external services.
//!
//! # Components
//!
//! - [`MockChannel`] - Mock messaging channel with intent injection and
//!   notification capture
//! - [`fixtures::temp_storage`] - Initialized SQLite storage in a tempdir

pub mod fixtures;
pub mod mock_channel;

pub use fixtures::temp_storage;
pub use mock_channel::MockChannel;
