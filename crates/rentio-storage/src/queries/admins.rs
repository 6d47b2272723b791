// SPDX-FileCopyrightText: 2026 Rentio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Admin roster operations.

use rentio_core::RentioError;
use rusqlite::params;

use crate::database::{map_tr_err, Database};

/// Promote `user_id` to admin if no admin exists yet.
///
/// Returns `true` when this call promoted the user. First contact with an
/// empty admin table bootstraps the deployment.
pub async fn ensure_first_admin(db: &Database, user_id: i64) -> Result<bool, RentioError> {
    db.connection()
        .call(move |conn| -> Result<bool, rusqlite::Error> {
            let tx = conn.transaction()?;
            let count: i64 =
                tx.query_row("SELECT COUNT(*) FROM admins", [], |row| row.get(0))?;
            if count > 0 {
                return Ok(false);
            }
            tx.execute(
                "INSERT INTO admins (user_id, added_at) VALUES (?1, strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))",
                params![user_id],
            )?;
            tx.commit()?;
            Ok(true)
        })
        .await
        .map_err(map_tr_err)
}

/// Whether `user_id` is an admin.
pub async fn is_admin(db: &Database, user_id: i64) -> Result<bool, RentioError> {
    db.connection()
        .call(move |conn| -> Result<bool, rusqlite::Error> {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM admins WHERE user_id = ?1",
                params![user_id],
                |row| row.get(0),
            )?;
            Ok(count > 0)
        })
        .await
        .map_err(map_tr_err)
}

/// All admin user ids, oldest first.
pub async fn list_admins(db: &Database) -> Result<Vec<i64>, RentioError> {
    db.connection()
        .call(|conn| -> Result<Vec<i64>, rusqlite::Error> {
            let mut stmt =
                conn.prepare("SELECT user_id FROM admins ORDER BY added_at ASC, user_id ASC")?;
            let rows = stmt.query_map([], |row| row.get(0))?;
            let mut admins = Vec::new();
            for row in rows {
                admins.push(row?);
            }
            Ok(admins)
        })
        .await
        .map_err(map_tr_err)
}
