// SPDX-FileCopyrightText: 2026 Rentio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Intent dispatch and multi-step confirmation workflows for Rentio.
//!
//! The [`WorkflowEngine`] consumes channel intents and produces notifications;
//! pending multi-step prompts are parked per actor in a [`pending::SessionMap`].

pub mod engine;
pub mod pending;

pub use engine::WorkflowEngine;
pub use pending::{ConfirmTarget, PendingState, SessionMap};
