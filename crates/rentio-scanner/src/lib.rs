// SPDX-FileCopyrightText: 2026 Rentio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Background jobs: expiry reminders and periodic income reports.
//!
//! [`ExpiryScanner`] walks the occupant roster and reminds anyone whose paid
//! period is about to run out, once per period. The [`report`] module renders
//! and delivers the monthly income summary. The serve loop drives both on a
//! timer.

pub mod report;
pub mod scan;

pub use scan::{ExpiryScanner, ScanOutcome};
