// SPDX-FileCopyrightText: 2026 Rentio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Payment ledger service.
//!
//! Sits between confirmation workflows and the storage adapter: resolves
//! the effective daily price, computes the date extension, and applies the
//! payment atomically. The occupant's cached `accrued_total` always equals
//! the sum of their ledger rows because both are written in one storage
//! transaction.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rentio_core::types::{format_ts, Occupant, Payment};
use rentio_core::{RentioError, StorageAdapter};
use rentio_storage::queries::settings::SETTING_PRICE_PER_DAY;
use tracing::info;

use crate::extend::extend_paid_until;

/// Persistent payment ledger over the storage adapter.
pub struct PaymentLedger {
    storage: Arc<dyn StorageAdapter>,
    /// Config fallback when no `price_per_day` setting is stored.
    default_price: i64,
}

impl PaymentLedger {
    pub fn new(storage: Arc<dyn StorageAdapter>, default_price: i64) -> Self {
        Self {
            storage,
            default_price,
        }
    }

    /// Effective daily price: the stored setting when present and well
    /// formed, otherwise the config default.
    pub async fn price_per_day(&self) -> Result<i64, RentioError> {
        match self.storage.get_setting(SETTING_PRICE_PER_DAY).await? {
            Some(raw) => raw.parse::<i64>().map_err(|_| {
                RentioError::Config(format!("stored price_per_day is not a number: {raw:?}"))
            }),
            None => Ok(self.default_price),
        }
    }

    /// Confirm a payment for an occupant: extend their paid-until date and
    /// append the ledger row atomically. Returns the updated occupant and
    /// the new paid-until instant.
    pub async fn record_payment(
        &self,
        occupant_id: i64,
        amount: i64,
        now: DateTime<Utc>,
    ) -> Result<(Occupant, DateTime<Utc>), RentioError> {
        let occupant = self.storage.get_occupant(occupant_id).await?;
        let price = self.price_per_day().await?;
        let new_paid_until = extend_paid_until(occupant.paid_until_ts(), amount, price, now)?;

        self.storage
            .apply_payment(
                occupant_id,
                amount,
                &format_ts(new_paid_until),
                &format_ts(now),
            )
            .await?;

        info!(
            occupant_id,
            amount,
            paid_until = %format_ts(new_paid_until),
            "payment recorded"
        );

        let updated = self.storage.get_occupant(occupant_id).await?;
        Ok((updated, new_paid_until))
    }

    /// Like [`PaymentLedger::record_payment`], for a payment backed by a
    /// proof submission. The proof's consumed flag commits in the same
    /// storage transaction as the ledger row, so a replay fails with
    /// `AlreadyConfirmed` and a failed confirmation leaves the proof open
    /// for retry.
    pub async fn record_proof_payment(
        &self,
        submission_id: i64,
        occupant_id: i64,
        amount: i64,
        now: DateTime<Utc>,
    ) -> Result<(Occupant, DateTime<Utc>), RentioError> {
        let occupant = self.storage.get_occupant(occupant_id).await?;
        let price = self.price_per_day().await?;
        let new_paid_until = extend_paid_until(occupant.paid_until_ts(), amount, price, now)?;

        self.storage
            .apply_proof_payment(
                submission_id,
                occupant_id,
                amount,
                &format_ts(new_paid_until),
                &format_ts(now),
            )
            .await?;

        info!(
            occupant_id,
            submission_id,
            amount,
            paid_until = %format_ts(new_paid_until),
            "proof-backed payment recorded"
        );

        let updated = self.storage.get_occupant(occupant_id).await?;
        Ok((updated, new_paid_until))
    }

    /// Ledger rows for one occupant, oldest first.
    pub async fn payments_for(&self, occupant_id: i64) -> Result<Vec<Payment>, RentioError> {
        self.storage.payments_for(occupant_id).await
    }

    /// Sum of all confirmed payments for one occupant.
    pub async fn occupant_total(&self, occupant_id: i64) -> Result<i64, RentioError> {
        self.storage.occupant_total(occupant_id).await
    }

    /// Accrued income per occupied room.
    pub async fn room_income(&self) -> Result<Vec<(u32, i64)>, RentioError> {
        self.storage.room_income().await
    }

    /// Total confirmed income in a `YYYY-MM` month.
    pub async fn monthly_income(&self, year_month: &str) -> Result<i64, RentioError> {
        self.storage.monthly_income(year_month).await
    }
}
