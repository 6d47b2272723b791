// SPDX-FileCopyrightText: 2026 Rentio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Append-only payment ledger operations.
//!
//! A confirmed payment is one transaction: advance the occupant's
//! `paid_until`, bump the accrued total cache, and append the ledger row.
//! Either all three land or none do.

use rentio_core::types::Payment;
use rentio_core::RentioError;
use rusqlite::params;

use crate::database::{map_tr_err, Database};

/// Atomically record a confirmed payment for an occupant.
///
/// Returns the new ledger row id. Fails with [`RentioError::NotFound`] if
/// the occupant was deleted between confirmation and application.
pub async fn apply_payment(
    db: &Database,
    occupant_id: i64,
    amount: i64,
    new_paid_until: &str,
    confirmed_at: &str,
) -> Result<i64, RentioError> {
    let new_paid_until = new_paid_until.to_string();
    let confirmed_at = confirmed_at.to_string();
    db.connection()
        .call(move |conn| -> Result<Result<i64, RentioError>, rusqlite::Error> {
            let tx = conn.transaction()?;

            let updated = tx.execute(
                "UPDATE occupants
                 SET paid_until = ?1, accrued_total = accrued_total + ?2
                 WHERE id = ?3",
                params![new_paid_until, amount, occupant_id],
            )?;
            if updated == 0 {
                return Ok(Err(RentioError::NotFound {
                    occupant: occupant_id,
                }));
            }

            tx.execute(
                "INSERT INTO payments (occupant_id, amount, confirmed_at)
                 VALUES (?1, ?2, ?3)",
                params![occupant_id, amount, confirmed_at],
            )?;
            let id = tx.last_insert_rowid();
            tx.commit()?;
            Ok(Ok(id))
        })
        .await
        .map_err(map_tr_err)?
}

/// Atomically consume a proof submission and record the payment it backs.
///
/// The consumed flag, the paid-until advance, and the ledger row commit in
/// one transaction; any failure rolls all of them back, leaving the proof
/// unconsumed so the confirmation can be retried. Replays fail with
/// [`RentioError::AlreadyConfirmed`].
pub async fn apply_proof_payment(
    db: &Database,
    submission_id: i64,
    occupant_id: i64,
    amount: i64,
    new_paid_until: &str,
    confirmed_at: &str,
) -> Result<i64, RentioError> {
    let new_paid_until = new_paid_until.to_string();
    let confirmed_at = confirmed_at.to_string();
    db.connection()
        .call(move |conn| -> Result<Result<i64, RentioError>, rusqlite::Error> {
            let tx = conn.transaction()?;

            let consumed = tx.execute(
                "UPDATE proof_submissions SET consumed = 1 WHERE id = ?1 AND consumed = 0",
                params![submission_id],
            )?;
            if consumed == 0 {
                let exists: i64 = tx.query_row(
                    "SELECT COUNT(*) FROM proof_submissions WHERE id = ?1",
                    params![submission_id],
                    |row| row.get(0),
                )?;
                return Ok(Err(if exists > 0 {
                    RentioError::AlreadyConfirmed {
                        submission: submission_id,
                    }
                } else {
                    RentioError::Internal(format!(
                        "proof submission {submission_id} does not exist"
                    ))
                }));
            }

            let updated = tx.execute(
                "UPDATE occupants
                 SET paid_until = ?1, accrued_total = accrued_total + ?2
                 WHERE id = ?3",
                params![new_paid_until, amount, occupant_id],
            )?;
            if updated == 0 {
                // Dropping the transaction rolls the consumed flag back.
                return Ok(Err(RentioError::NotFound {
                    occupant: occupant_id,
                }));
            }

            tx.execute(
                "INSERT INTO payments (occupant_id, amount, confirmed_at)
                 VALUES (?1, ?2, ?3)",
                params![occupant_id, amount, confirmed_at],
            )?;
            let id = tx.last_insert_rowid();
            tx.commit()?;
            Ok(Ok(id))
        })
        .await
        .map_err(map_tr_err)?
}

/// Ledger rows for one occupant, oldest first.
///
/// Works for deleted occupants too; the ledger outlives the roster row.
pub async fn payments_for(db: &Database, occupant_id: i64) -> Result<Vec<Payment>, RentioError> {
    db.connection()
        .call(move |conn| -> Result<Vec<Payment>, rusqlite::Error> {
            let mut stmt = conn.prepare(
                "SELECT id, occupant_id, amount, confirmed_at FROM payments
                 WHERE occupant_id = ?1 ORDER BY confirmed_at ASC, id ASC",
            )?;
            let rows = stmt.query_map(params![occupant_id], |row| {
                Ok(Payment {
                    id: row.get(0)?,
                    occupant_id: row.get(1)?,
                    amount: row.get(2)?,
                    confirmed_at: row.get(3)?,
                })
            })?;
            let mut payments = Vec::new();
            for row in rows {
                payments.push(row?);
            }
            Ok(payments)
        })
        .await
        .map_err(map_tr_err)
}

/// Sum of all ledger rows for one occupant.
pub async fn occupant_total(db: &Database, occupant_id: i64) -> Result<i64, RentioError> {
    db.connection()
        .call(move |conn| -> Result<i64, rusqlite::Error> {
            conn.query_row(
                "SELECT COALESCE(SUM(amount), 0) FROM payments WHERE occupant_id = ?1",
                params![occupant_id],
                |row| row.get(0),
            )
        })
        .await
        .map_err(map_tr_err)
}

/// Accrued income per room, for rooms with at least one current occupant.
pub async fn room_income(db: &Database) -> Result<Vec<(u32, i64)>, RentioError> {
    db.connection()
        .call(|conn| -> Result<Vec<(u32, i64)>, rusqlite::Error> {
            let mut stmt = conn.prepare(
                "SELECT room, SUM(accrued_total) FROM occupants
                 GROUP BY room ORDER BY room ASC",
            )?;
            let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
            let mut totals = Vec::new();
            for row in rows {
                totals.push(row?);
            }
            Ok(totals)
        })
        .await
        .map_err(map_tr_err)
}

/// Total confirmed income in one calendar month (`"YYYY-MM"`).
pub async fn monthly_income(db: &Database, month: &str) -> Result<i64, RentioError> {
    let prefix = format!("{month}%");
    db.connection()
        .call(move |conn| -> Result<i64, rusqlite::Error> {
            conn.query_row(
                "SELECT COALESCE(SUM(amount), 0) FROM payments WHERE confirmed_at LIKE ?1",
                params![prefix],
                |row| row.get(0),
            )
        })
        .await
        .map_err(map_tr_err)
}
