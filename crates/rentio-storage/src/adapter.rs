// SPDX-FileCopyrightText: 2026 Rentio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the StorageAdapter trait.

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::debug;

use rentio_config::model::StorageConfig;
use rentio_core::types::{Contact, NewOccupant, Occupant, OccupantUpdate, Payment, ProofSubmission};
use rentio_core::{AdapterType, HealthStatus, PluginAdapter, RentioError, StorageAdapter};

use crate::database::Database;
use crate::queries;

/// SQLite-backed storage adapter.
///
/// Wraps a [`Database`] handle and delegates all query operations to the
/// typed query modules. The database is lazily initialized on the first
/// call to [`StorageAdapter::initialize`].
pub struct SqliteStorage {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteStorage {
    /// Create a new SqliteStorage with the given configuration.
    ///
    /// The database connection is not opened until [`StorageAdapter::initialize`]
    /// is called.
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    /// Returns a reference to the underlying Database, or an error if not initialized.
    fn db(&self) -> Result<&Database, RentioError> {
        self.db.get().ok_or_else(|| RentioError::Storage {
            source: "storage not initialized -- call initialize() first".into(),
        })
    }
}

#[async_trait]
impl PluginAdapter for SqliteStorage {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, RentioError> {
        let db = self.db()?;
        db.connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
            .map_err(crate::database::map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), RentioError> {
        // Shutdown delegates to close if the DB was initialized.
        if let Some(db) = self.db.get() {
            db.close().await?;
            debug!("shutdown: WAL checkpoint complete");
        }
        Ok(())
    }
}

#[async_trait]
impl StorageAdapter for SqliteStorage {
    async fn initialize(&self) -> Result<(), RentioError> {
        let path = self.config.database_path.clone();
        let db = Database::open(&path).await?;
        if !self.config.wal_mode {
            db.connection()
                .call(|conn| -> Result<(), rusqlite::Error> {
                    conn.execute_batch("PRAGMA journal_mode = DELETE;")?;
                    Ok(())
                })
                .await
                .map_err(crate::database::map_tr_err)?;
        }
        self.db.set(db).map_err(|_| RentioError::Storage {
            source: "storage already initialized".into(),
        })?;
        debug!(path = %self.config.database_path, "SQLite storage initialized");
        Ok(())
    }

    async fn close(&self) -> Result<(), RentioError> {
        self.db()?.close().await
    }

    // --- Occupant store ---

    async fn create_occupant(
        &self,
        new: &NewOccupant,
        room_limit: u32,
    ) -> Result<i64, RentioError> {
        queries::occupants::create(self.db()?, new, room_limit).await
    }

    async fn get_occupant(&self, id: i64) -> Result<Occupant, RentioError> {
        queries::occupants::get(self.db()?, id).await
    }

    async fn occupants_in_room(&self, room: u32) -> Result<Vec<Occupant>, RentioError> {
        queries::occupants::list_by_room(self.db()?, room).await
    }

    async fn list_occupants(&self) -> Result<Vec<Occupant>, RentioError> {
        queries::occupants::list_all(self.db()?).await
    }

    async fn find_occupant_by_contact(
        &self,
        contact: &Contact,
    ) -> Result<Option<Occupant>, RentioError> {
        queries::occupants::find_by_contact(self.db()?, contact).await
    }

    async fn update_occupant(
        &self,
        id: i64,
        fields: &OccupantUpdate,
    ) -> Result<(), RentioError> {
        queries::occupants::update(self.db()?, id, fields).await
    }

    async fn delete_occupant(&self, id: i64) -> Result<(), RentioError> {
        queries::occupants::delete(self.db()?, id).await
    }

    async fn bind_contact_if_unbound(
        &self,
        handle: &str,
        user_id: i64,
    ) -> Result<(), RentioError> {
        queries::occupants::bind_contact_if_unbound(self.db()?, handle, user_id).await
    }

    // --- Payment ledger ---

    async fn apply_payment(
        &self,
        occupant_id: i64,
        amount: i64,
        new_paid_until: &str,
        confirmed_at: &str,
    ) -> Result<i64, RentioError> {
        queries::payments::apply_payment(self.db()?, occupant_id, amount, new_paid_until, confirmed_at)
            .await
    }

    async fn payments_for(&self, occupant_id: i64) -> Result<Vec<Payment>, RentioError> {
        queries::payments::payments_for(self.db()?, occupant_id).await
    }

    async fn occupant_total(&self, occupant_id: i64) -> Result<i64, RentioError> {
        queries::payments::occupant_total(self.db()?, occupant_id).await
    }

    async fn room_income(&self) -> Result<Vec<(u32, i64)>, RentioError> {
        queries::payments::room_income(self.db()?).await
    }

    async fn monthly_income(&self, year_month: &str) -> Result<i64, RentioError> {
        queries::payments::monthly_income(self.db()?, year_month).await
    }

    // --- Proof submissions ---

    async fn record_proof(
        &self,
        sender_id: i64,
        image_ref: &str,
        submitted_at: &str,
    ) -> Result<i64, RentioError> {
        queries::proofs::record_proof(self.db()?, sender_id, image_ref, submitted_at).await
    }

    async fn get_proof(&self, id: i64) -> Result<ProofSubmission, RentioError> {
        queries::proofs::get_proof(self.db()?, id).await
    }

    async fn apply_proof_payment(
        &self,
        submission_id: i64,
        occupant_id: i64,
        amount: i64,
        new_paid_until: &str,
        confirmed_at: &str,
    ) -> Result<i64, RentioError> {
        queries::payments::apply_proof_payment(
            self.db()?,
            submission_id,
            occupant_id,
            amount,
            new_paid_until,
            confirmed_at,
        )
        .await
    }

    // --- Reminder dedup ---

    async fn reminder_exists(
        &self,
        occupant_id: i64,
        days_left: i64,
        paid_until: &str,
    ) -> Result<bool, RentioError> {
        queries::reminders::reminder_exists(self.db()?, occupant_id, days_left, paid_until).await
    }

    async fn try_record_reminder(
        &self,
        occupant_id: i64,
        days_left: i64,
        paid_until: &str,
        sent_at: &str,
    ) -> Result<bool, RentioError> {
        queries::reminders::try_record_reminder(self.db()?, occupant_id, days_left, paid_until, sent_at)
            .await
    }

    // --- Administrators ---

    async fn ensure_first_admin(&self, user_id: i64) -> Result<bool, RentioError> {
        queries::admins::ensure_first_admin(self.db()?, user_id).await
    }

    async fn is_admin(&self, user_id: i64) -> Result<bool, RentioError> {
        queries::admins::is_admin(self.db()?, user_id).await
    }

    async fn list_admins(&self) -> Result<Vec<i64>, RentioError> {
        queries::admins::list_admins(self.db()?).await
    }

    // --- Settings ---

    async fn get_setting(&self, key: &str) -> Result<Option<String>, RentioError> {
        queries::settings::get_setting(self.db()?, key).await
    }

    async fn set_setting(&self, key: &str, value: &str) -> Result<(), RentioError> {
        queries::settings::set_setting(self.db()?, key, value).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn make_config(path: &str) -> StorageConfig {
        StorageConfig {
            database_path: path.to_string(),
            wal_mode: true,
        }
    }

    fn make_new(room: u32, name: &str, contact: Contact) -> NewOccupant {
        NewOccupant {
            room,
            name: name.to_string(),
            contact,
            phone: None,
            document_ref: None,
        }
    }

    #[tokio::test]
    async fn sqlite_storage_implements_plugin_adapter() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let storage = SqliteStorage::new(make_config(db_path.to_str().unwrap()));

        assert_eq!(storage.name(), "sqlite");
        assert_eq!(storage.version(), semver::Version::new(0, 1, 0));
        assert_eq!(storage.adapter_type(), AdapterType::Storage);
    }

    #[tokio::test]
    async fn initialize_opens_database_at_configured_path() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("init_test.db");
        let storage = SqliteStorage::new(make_config(db_path.to_str().unwrap()));

        storage.initialize().await.unwrap();
        assert!(db_path.exists(), "database file should be created");
    }

    #[tokio::test]
    async fn initialize_twice_returns_error() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("double_init.db");
        let storage = SqliteStorage::new(make_config(db_path.to_str().unwrap()));

        storage.initialize().await.unwrap();
        let result = storage.initialize().await;
        assert!(result.is_err(), "second initialize should fail");
    }

    #[tokio::test]
    async fn health_check_returns_healthy_when_initialized() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("health.db");
        let storage = SqliteStorage::new(make_config(db_path.to_str().unwrap()));

        storage.initialize().await.unwrap();
        let status = storage.health_check().await.unwrap();
        assert_eq!(status, HealthStatus::Healthy);
    }

    #[tokio::test]
    async fn health_check_fails_when_not_initialized() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("no_init.db");
        let storage = SqliteStorage::new(make_config(db_path.to_str().unwrap()));

        let result = storage.health_check().await;
        assert!(result.is_err(), "health_check should fail before initialize");
    }

    #[tokio::test]
    async fn full_tenancy_lifecycle_through_adapter() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("lifecycle.db");
        let storage = SqliteStorage::new(make_config(db_path.to_str().unwrap()));
        storage.initialize().await.unwrap();

        // First contact bootstraps the admin.
        assert!(storage.ensure_first_admin(999).await.unwrap());
        assert!(storage.is_admin(999).await.unwrap());

        // Register an occupant.
        let id = storage
            .create_occupant(&make_new(3, "Ali", Contact::Handle("ali".into())), 4)
            .await
            .unwrap();
        let occ = storage.get_occupant(id).await.unwrap();
        assert_eq!(occ.room, 3);
        assert!(occ.paid_until.is_none());

        // First inbound interaction from @ali binds the numeric identity.
        storage.bind_contact_if_unbound("ali", 1234).await.unwrap();
        let found = storage
            .find_occupant_by_contact(&Contact::UserId(1234))
            .await
            .unwrap();
        assert_eq!(found.map(|o| o.id), Some(id));

        // Proof submitted, then confirmed as a payment.
        let proof = storage
            .record_proof(1234, "file-xyz", "2026-08-27T10:00:00.000Z")
            .await
            .unwrap();
        storage
            .apply_proof_payment(proof, id, 26_666, "2026-08-28T10:00:00.000Z", "2026-08-27T10:05:00.000Z")
            .await
            .unwrap();
        assert!(storage.get_proof(proof).await.unwrap().consumed);

        let occ = storage.get_occupant(id).await.unwrap();
        assert_eq!(occ.accrued_total, 26_666);
        assert_eq!(storage.occupant_total(id).await.unwrap(), 26_666);
        assert_eq!(storage.room_income().await.unwrap(), vec![(3, 26_666)]);
        assert_eq!(storage.monthly_income("2026-08").await.unwrap(), 26_666);

        storage.close().await.unwrap();
    }

    #[tokio::test]
    async fn shutdown_runs_checkpoint() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("shutdown.db");
        let storage = SqliteStorage::new(make_config(db_path.to_str().unwrap()));
        storage.initialize().await.unwrap();

        storage
            .set_setting(queries::settings::SETTING_PRICE_PER_DAY, "26666")
            .await
            .unwrap();
        storage.shutdown().await.unwrap();
    }
}
