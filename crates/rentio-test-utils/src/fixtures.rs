// SPDX-FileCopyrightText: 2026 Rentio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared storage fixtures for integration tests.

use std::sync::Arc;

use rentio_config::model::StorageConfig;
use rentio_core::StorageAdapter;
use rentio_storage::SqliteStorage;
use tempfile::TempDir;

/// Open an initialized SQLite storage in a fresh temporary directory.
///
/// The returned [`TempDir`] must be kept alive for the storage's lifetime.
pub async fn temp_storage() -> (Arc<dyn StorageAdapter>, TempDir) {
    let dir = TempDir::new().expect("create tempdir");
    let storage = SqliteStorage::new(StorageConfig {
        database_path: dir.path().join("test.db").to_string_lossy().into_owned(),
        wal_mode: true,
    });
    storage.initialize().await.expect("initialize storage");
    (Arc::new(storage), dir)
}
