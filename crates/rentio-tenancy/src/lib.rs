// SPDX-FileCopyrightText: 2026 Rentio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tenancy accounting for the Rentio bot.
//!
//! Pure date-extension arithmetic, the room capacity policy, and the
//! payment ledger service that applies confirmed payments through the
//! storage adapter.

pub mod extend;
pub mod ledger;
pub mod rooms;

pub use extend::extend_paid_until;
pub use ledger::PaymentLedger;
pub use rooms::{days_remaining, expiring_soon, RoomPolicy};
