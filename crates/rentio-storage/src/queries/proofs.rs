// SPDX-FileCopyrightText: 2026 Rentio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Payment proof submissions.
//!
//! A proof is recorded when an occupant sends a receipt image and consumed
//! exactly once when an admin confirms it. The consumed flag makes
//! confirmation idempotent across duplicate button presses; it is flipped
//! inside the payment transaction (see `payments::apply_proof_payment`).

use rentio_core::types::ProofSubmission;
use rentio_core::RentioError;
use rusqlite::params;

use crate::database::{map_tr_err, Database};

/// Record a newly submitted proof image. Returns the submission id.
pub async fn record_proof(
    db: &Database,
    sender_id: i64,
    image_ref: &str,
    submitted_at: &str,
) -> Result<i64, RentioError> {
    let image_ref = image_ref.to_string();
    let submitted_at = submitted_at.to_string();
    db.connection()
        .call(move |conn| -> Result<i64, rusqlite::Error> {
            conn.execute(
                "INSERT INTO proof_submissions (sender_id, image_ref, submitted_at)
                 VALUES (?1, ?2, ?3)",
                params![sender_id, image_ref, submitted_at],
            )?;
            Ok(conn.last_insert_rowid())
        })
        .await
        .map_err(map_tr_err)
}

/// Get a proof submission by id.
pub async fn get_proof(db: &Database, id: i64) -> Result<ProofSubmission, RentioError> {
    db.connection()
        .call(move |conn| -> Result<Option<ProofSubmission>, rusqlite::Error> {
            let mut stmt = conn.prepare(
                "SELECT id, sender_id, image_ref, submitted_at, consumed
                 FROM proof_submissions WHERE id = ?1",
            )?;
            match stmt.query_row(params![id], |row| {
                Ok(ProofSubmission {
                    id: row.get(0)?,
                    sender_id: row.get(1)?,
                    image_ref: row.get(2)?,
                    submitted_at: row.get(3)?,
                    consumed: row.get(4)?,
                })
            }) {
                Ok(proof) => Ok(Some(proof)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(map_tr_err)?
        .ok_or_else(|| RentioError::Internal(format!("proof submission {id} does not exist")))
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
    async fn record_and_get_proof_roundtrips() {
        let (db, _dir) = setup_db().await;
        let id = record_proof(&db, 42, "file-abc", "2026-08-27T10:00:00.000Z")
            .await
            .unwrap();

        let proof = get_proof(&db, id).await.unwrap();
        assert_eq!(proof.sender_id, 42);
        assert_eq!(proof.image_ref, "file-abc");
        assert!(!proof.consumed);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn missing_proof_is_internal_error() {
        let (db, _dir) = setup_db().await;
        let err = get_proof(&db, 999).await.unwrap_err();
        assert!(matches!(err, RentioError::Internal(_)));
        db.close().await.unwrap();
    }
}
