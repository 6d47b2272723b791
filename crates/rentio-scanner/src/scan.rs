// SPDX-FileCopyrightText: 2026 Rentio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Expiry scan over the occupant roster.
//!
//! A reminder fires when an occupant has exactly `warning_threshold_days`
//! whole days of paid stay left. The dedup record in storage makes repeat
//! scans of the same day silent; a payment extension re-arms the reminder
//! for the new period. One occupant's failure never aborts the scan.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rentio_config::model::ScannerConfig;
use rentio_core::types::{format_ts, Notification, Occupant};
use rentio_core::{ChannelAdapter, RentioError, StorageAdapter};
use rentio_tenancy::rooms::days_remaining;
use tracing::{debug, info, warn};

/// Counters from one scan pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanOutcome {
    /// Occupants whose remaining days matched the threshold.
    pub matched: usize,
    /// Reminders actually delivered this pass.
    pub fired: usize,
    /// Matches suppressed by the dedup record.
    pub suppressed: usize,
    /// Occupants skipped because of an error.
    pub failures: usize,
}

/// Scans the roster for occupants nearing expiry and sends reminders.
pub struct ExpiryScanner {
    storage: Arc<dyn StorageAdapter>,
    channel: Arc<dyn ChannelAdapter>,
    config: ScannerConfig,
}

impl ExpiryScanner {
    pub fn new(
        storage: Arc<dyn StorageAdapter>,
        channel: Arc<dyn ChannelAdapter>,
        config: ScannerConfig,
    ) -> Self {
        Self {
            storage,
            channel,
            config,
        }
    }

    /// Run one scan pass at the given instant.
    pub async fn run_scan(&self, now: DateTime<Utc>) -> Result<ScanOutcome, RentioError> {
        let occupants = self.storage.list_occupants().await?;
        let mut outcome = ScanOutcome::default();

        for occupant in occupants {
            let Some(until) = occupant.paid_until_ts() else {
                continue;
            };
            let (days, _) = days_remaining(until, now);
            if days != self.config.warning_threshold_days {
                continue;
            }
            outcome.matched += 1;

            match self.remind(&occupant, days, now).await {
                Ok(true) => outcome.fired += 1,
                Ok(false) => outcome.suppressed += 1,
                Err(e) => {
                    warn!(
                        occupant_id = occupant.id,
                        error = %e,
                        "reminder failed, continuing scan"
                    );
                    outcome.failures += 1;
                }
            }
        }

        info!(
            matched = outcome.matched,
            fired = outcome.fired,
            suppressed = outcome.suppressed,
            failures = outcome.failures,
            "expiry scan complete"
        );
        Ok(outcome)
    }

    /// Send the reminder for one occupant unless it already fired for this
    /// (days-left, paid-until) pair. Returns whether a reminder was sent.
    async fn remind(
        &self,
        occupant: &Occupant,
        days_left: i64,
        now: DateTime<Utc>,
    ) -> Result<bool, RentioError> {
        let paid_until = occupant.paid_until.as_deref().unwrap_or_default();
        if self
            .storage
            .reminder_exists(occupant.id, days_left, paid_until)
            .await?
        {
            debug!(occupant_id = occupant.id, "reminder already sent for this period");
            return Ok(false);
        }

        let text = format!(
            "Your stay is paid until {paid_until}. {days_left} day(s) left; please pay to extend."
        );
        if let Some(contact) = occupant.contact() {
            // Deliver first, record after: a transient send failure leaves
            // no dedup row, so the next pass retries the reminder.
            self.channel
                .send(Notification::text(contact, text.clone()))
                .await?;
        } else {
            warn!(occupant_id = occupant.id, "occupant has no contact, reminder undeliverable");
        }
        self.storage
            .try_record_reminder(occupant.id, days_left, paid_until, &format_ts(now))
            .await?;

        if self.config.notify_admins {
            for admin in self.storage.list_admins().await? {
                self.channel
                    .send(Notification::text(
                        rentio_core::Contact::UserId(admin),
                        format!(
                            "{} (room {}): {days_left} day(s) of paid stay left.",
                            occupant.name, occupant.room
                        ),
                    ))
                    .await?;
            }
        }
        Ok(true)
    }
}
