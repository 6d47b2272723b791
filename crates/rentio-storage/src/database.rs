// SPDX-FileCopyrightText: 2026 Rentio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Async SQLite database handle.
//!
//! Wraps a [`tokio_rusqlite::Connection`] so that all SQL runs on a single
//! dedicated writer thread. Query modules borrow the connection via
//! [`Database::connection`] and submit closures with `call`.

use std::path::Path;

use rentio_core::RentioError;
use tracing::debug;

use crate::migrations::run_migrations;

/// Map a tokio-rusqlite error into the crate-wide storage error.
pub fn map_tr_err<E>(e: tokio_rusqlite::Error<E>) -> RentioError
where
    E: std::error::Error + Send + Sync + 'static,
{
    RentioError::Storage {
        source: Box::new(e),
    }
}

/// Handle to the SQLite database.
///
/// All access goes through the inner async connection, which serializes
/// statements onto one background thread. Opening the database creates
/// parent directories, applies connection pragmas, and runs any pending
/// migrations.
#[derive(Debug)]
pub struct Database {
    conn: tokio_rusqlite::Connection,
}

impl Database {
    /// Open (or create) the database at `path` and bring the schema up to date.
    pub async fn open(path: &str) -> Result<Self, RentioError> {
        if let Some(parent) = Path::new(path).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| RentioError::Storage {
                source: Box::new(e),
            })?;
        }

        // `open` fails with a bare rusqlite error, not the generic call wrapper.
        let conn = tokio_rusqlite::Connection::open(path)
            .await
            .map_err(|e| RentioError::Storage {
                source: Box::new(e),
            })?;

        conn.call(|conn| -> Result<(), rusqlite::Error> {
            conn.execute_batch(
                "PRAGMA journal_mode = WAL;
                 PRAGMA synchronous = NORMAL;
                 PRAGMA foreign_keys = ON;
                 PRAGMA busy_timeout = 5000;",
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)?;

        conn.call(|conn| run_migrations(conn))
            .await
            .map_err(map_tr_err)?;

        debug!(path, "database opened");
        Ok(Self { conn })
    }

    /// Borrow the async connection for query submission.
    pub fn connection(&self) -> &tokio_rusqlite::Connection {
        &self.conn
    }

    /// Checkpoint the WAL and flush to the main database file.
    pub async fn close(&self) -> Result<(), RentioError> {
        self.conn
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        debug!("WAL checkpoint complete");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn open_creates_database_file() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("open.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        assert!(db_path.exists());
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn open_creates_missing_parent_directories() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("nested/deeper/open.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        assert!(db_path.exists());
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn open_failure_surfaces_as_storage_error() {
        let dir = tempdir().unwrap();
        // A directory is not a valid database file.
        let err = Database::open(dir.path().to_str().unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, RentioError::Storage { .. }));
    }

    #[tokio::test]
    async fn migrations_create_expected_tables() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("schema.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();

        let tables: Vec<String> = db
            .connection()
            .call(|conn| -> Result<Vec<String>, rusqlite::Error> {
                let mut stmt = conn.prepare(
                    "SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name",
                )?;
                let rows = stmt.query_map([], |row| row.get(0))?;
                let mut names = Vec::new();
                for row in rows {
                    names.push(row?);
                }
                Ok(names)
            })
            .await
            .unwrap();

        for expected in [
            "occupants",
            "payments",
            "admins",
            "settings",
            "proof_submissions",
            "reminders_sent",
        ] {
            assert!(
                tables.iter().any(|t| t == expected),
                "missing table {expected}, got {tables:?}"
            );
        }
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn reopen_is_idempotent() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("reopen.db");
        {
            let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
            db.close().await.unwrap();
        }
        // Second open must not re-run applied migrations.
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        db.close().await.unwrap();
    }
}
