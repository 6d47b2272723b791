// SPDX-FileCopyrightText: 2026 Rentio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage adapter trait for the persistence backend.
//!
//! The trait exposes the five persisted entities (occupants, payments,
//! admins, settings, proof submissions) plus the reminder dedup record.
//! Multi-table mutations (`create_occupant`, `apply_payment`) must be atomic:
//! the backend commits all involved rows in one transaction or none.

use async_trait::async_trait;

use crate::error::RentioError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{Contact, NewOccupant, Occupant, OccupantUpdate, Payment, ProofSubmission};

/// Adapter for the transactional persistence backend.
#[async_trait]
pub trait StorageAdapter: PluginAdapter {
    /// Initializes the storage backend (migrations, connection, etc.).
    async fn initialize(&self) -> Result<(), RentioError>;

    /// Closes the storage backend, flushing pending writes.
    async fn close(&self) -> Result<(), RentioError>;

    // --- Occupant store ---

    /// Registers a new occupant, enforcing room capacity and contact
    /// uniqueness in a single transaction. Returns the new occupant id.
    async fn create_occupant(
        &self,
        new: &NewOccupant,
        room_limit: u32,
    ) -> Result<i64, RentioError>;

    /// Fetches an occupant by id, failing with `NotFound` when absent.
    async fn get_occupant(&self, id: i64) -> Result<Occupant, RentioError>;

    /// Active occupants of a room, in insertion order.
    async fn occupants_in_room(&self, room: u32) -> Result<Vec<Occupant>, RentioError>;

    /// All active occupants, ordered by room then insertion.
    async fn list_occupants(&self) -> Result<Vec<Occupant>, RentioError>;

    /// Finds an active occupant by contact identity.
    async fn find_occupant_by_contact(
        &self,
        contact: &Contact,
    ) -> Result<Option<Occupant>, RentioError>;

    /// Partial update of mutable profile fields. `paid_until` and
    /// `accrued_total` are only touched by [`StorageAdapter::apply_payment`].
    async fn update_occupant(&self, id: i64, fields: &OccupantUpdate)
    -> Result<(), RentioError>;

    /// Removes the occupant from active accounting. Ledger rows are kept.
    async fn delete_occupant(&self, id: i64) -> Result<(), RentioError>;

    /// One-way upgrade of a textual handle to a numeric identity once it
    /// resolves through an inbound interaction. No-op when already bound or
    /// no occupant carries the handle.
    async fn bind_contact_if_unbound(&self, handle: &str, user_id: i64)
    -> Result<(), RentioError>;

    // --- Payment ledger ---

    /// Atomically extends the occupant's paid-until date, increments the
    /// accrued total, and appends the payment row.
    async fn apply_payment(
        &self,
        occupant_id: i64,
        amount: i64,
        new_paid_until: &str,
        confirmed_at: &str,
    ) -> Result<i64, RentioError>;

    /// Ledger entries for an occupant, ordered by confirmation time.
    /// Queryable after occupant deletion (audit retention).
    async fn payments_for(&self, occupant_id: i64) -> Result<Vec<Payment>, RentioError>;

    /// Sum of ledger entries for an occupant.
    async fn occupant_total(&self, occupant_id: i64) -> Result<i64, RentioError>;

    /// Per-room income totals over the whole ledger history of active occupants.
    async fn room_income(&self) -> Result<Vec<(u32, i64)>, RentioError>;

    /// Total confirmed payments for a `YYYY-MM` month prefix.
    async fn monthly_income(&self, year_month: &str) -> Result<i64, RentioError>;

    // --- Proof submissions ---

    /// Records a submitted payment proof. Returns the submission id.
    async fn record_proof(
        &self,
        sender_id: i64,
        image_ref: &str,
        submitted_at: &str,
    ) -> Result<i64, RentioError>;

    /// Fetches a proof submission by id.
    async fn get_proof(&self, id: i64) -> Result<ProofSubmission, RentioError>;

    /// Consumes the proof and records the payment it backs in one
    /// transaction. Fails with `AlreadyConfirmed` when the proof was
    /// consumed before; any later failure rolls the consumed flag back so
    /// the confirmation can be retried.
    async fn apply_proof_payment(
        &self,
        submission_id: i64,
        occupant_id: i64,
        amount: i64,
        new_paid_until: &str,
        confirmed_at: &str,
    ) -> Result<i64, RentioError>;

    // --- Reminder dedup ---

    /// Whether a reminder was already recorded for (occupant, days-left,
    /// paid-until).
    async fn reminder_exists(
        &self,
        occupant_id: i64,
        days_left: i64,
        paid_until: &str,
    ) -> Result<bool, RentioError>;

    /// Records that a reminder fired for (occupant, days-left, paid-until).
    /// Returns `false` when an identical reminder was already recorded.
    async fn try_record_reminder(
        &self,
        occupant_id: i64,
        days_left: i64,
        paid_until: &str,
        sent_at: &str,
    ) -> Result<bool, RentioError>;

    // --- Administrators ---

    /// Bootstrap guard: makes the caller an administrator when the admin set
    /// is empty. Returns `true` when the caller was promoted.
    async fn ensure_first_admin(&self, user_id: i64) -> Result<bool, RentioError>;

    async fn is_admin(&self, user_id: i64) -> Result<bool, RentioError>;

    async fn list_admins(&self) -> Result<Vec<i64>, RentioError>;

    // --- Settings ---

    async fn get_setting(&self, key: &str) -> Result<Option<String>, RentioError>;

    async fn set_setting(&self, key: &str, value: &str) -> Result<(), RentioError>;
}
