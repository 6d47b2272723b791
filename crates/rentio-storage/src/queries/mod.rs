// SPDX-FileCopyrightText: 2026 Rentio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed query modules, one per table family.

pub mod admins;
pub mod occupants;
pub mod payments;
pub mod proofs;
pub mod reminders;
pub mod settings;
