// SPDX-FileCopyrightText: 2026 Rentio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Expiry reminder deduplication.
//!
//! The scanner may visit the same occupant many times while their remaining
//! days sit on the warning threshold. The dedup key is
//! `(occupant_id, days_left, paid_until)`, so a payment extension re-arms
//! the reminder for the new period.

use rentio_core::RentioError;
use rusqlite::params;

use crate::database::{map_tr_err, Database};

/// Whether a reminder was already recorded for the given occupant, remaining
/// days, and paid-until period.
pub async fn reminder_exists(
    db: &Database,
    occupant_id: i64,
    days_left: i64,
    paid_until: &str,
) -> Result<bool, RentioError> {
    let paid_until = paid_until.to_string();
    db.connection()
        .call(move |conn| -> Result<bool, rusqlite::Error> {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM reminders_sent
                 WHERE occupant_id = ?1 AND days_left = ?2 AND paid_until = ?3",
                params![occupant_id, days_left, paid_until],
                |row| row.get(0),
            )?;
            Ok(count > 0)
        })
        .await
        .map_err(map_tr_err)
}

/// Record that a reminder was sent, unless one was already recorded for the
/// same occupant, remaining days, and paid-until period.
///
/// Returns `true` when this call inserted the record (the reminder should be
/// sent), `false` when it was already present.
pub async fn try_record_reminder(
    db: &Database,
    occupant_id: i64,
    days_left: i64,
    paid_until: &str,
    sent_at: &str,
) -> Result<bool, RentioError> {
    let paid_until = paid_until.to_string();
    let sent_at = sent_at.to_string();
    db.connection()
        .call(move |conn| -> Result<bool, rusqlite::Error> {
            let inserted = conn.execute(
                "INSERT OR IGNORE INTO reminders_sent (occupant_id, days_left, paid_until, sent_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![occupant_id, days_left, paid_until, sent_at],
            )?;
            Ok(inserted > 0)
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn setup_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        (db, dir)
    }

    #[tokio::test]
    async fn first_record_wins_second_is_suppressed() {
        let (db, _dir) = setup_db().await;
        assert!(!reminder_exists(&db, 1, 3, "2026-08-30T00:00:00.000Z").await.unwrap());

        let sent = try_record_reminder(&db, 1, 3, "2026-08-30T00:00:00.000Z", "2026-08-27T09:00:00.000Z")
            .await
            .unwrap();
        assert!(sent);
        assert!(reminder_exists(&db, 1, 3, "2026-08-30T00:00:00.000Z").await.unwrap());

        let again = try_record_reminder(&db, 1, 3, "2026-08-30T00:00:00.000Z", "2026-08-27T10:00:00.000Z")
            .await
            .unwrap();
        assert!(!again);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn new_paid_until_rearms_the_reminder() {
        let (db, _dir) = setup_db().await;
        assert!(
            try_record_reminder(&db, 1, 3, "2026-08-30T00:00:00.000Z", "2026-08-27T09:00:00.000Z")
                .await
                .unwrap()
        );
        // After a payment extension the period changed, so a fresh warning fires.
        assert!(
            try_record_reminder(&db, 1, 3, "2026-09-30T00:00:00.000Z", "2026-09-27T09:00:00.000Z")
                .await
                .unwrap()
        );
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn different_occupants_do_not_collide() {
        let (db, _dir) = setup_db().await;
        assert!(
            try_record_reminder(&db, 1, 3, "2026-08-30T00:00:00.000Z", "2026-08-27T09:00:00.000Z")
                .await
                .unwrap()
        );
        assert!(
            try_record_reminder(&db, 2, 3, "2026-08-30T00:00:00.000Z", "2026-08-27T09:00:00.000Z")
                .await
                .unwrap()
        );
        db.close().await.unwrap();
    }
}
