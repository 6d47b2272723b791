// SPDX-FileCopyrightText: 2026 Rentio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Key-value settings store.
//!
//! Holds runtime-adjustable values such as the daily price and the payment
//! card number shown to occupants. Config file values act as defaults; a
//! stored setting overrides them.

use rentio_core::RentioError;
use rusqlite::params;

use crate::database::{map_tr_err, Database};

/// Well-known setting: price of one day of stay, smallest currency unit.
pub const SETTING_PRICE_PER_DAY: &str = "price_per_day";
/// Well-known setting: card number occupants should pay to.
pub const SETTING_PAYMENT_CARD: &str = "payment_card";

/// Get a setting value by key.
pub async fn get_setting(db: &Database, key: &str) -> Result<Option<String>, RentioError> {
    let key = key.to_string();
    db.connection()
        .call(move |conn| -> Result<Option<String>, rusqlite::Error> {
            match conn.query_row(
                "SELECT value FROM settings WHERE key = ?1",
                params![key],
                |row| row.get(0),
            ) {
                Ok(value) => Ok(Some(value)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// Set (or replace) a setting value.
pub async fn set_setting(db: &Database, key: &str, value: &str) -> Result<(), RentioError> {
    let key = key.to_string();
    let value = value.to_string();
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute(
                "INSERT INTO settings (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                params![key, value],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}
