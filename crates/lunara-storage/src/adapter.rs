// SPDX-FileCopyrightText: 2026 Lunara Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the UserStore trait.

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::OnceCell;
use tracing::debug;

use lunara_config::model::StorageConfig;
use lunara_core::types::{ReminderTarget, SymptomEntry, UserProfile};
use lunara_core::{AdapterType, HealthStatus, LunaraError, PluginAdapter, UserStore};

use crate::database::Database;
use crate::queries;

/// SQLite-backed user store.
///
/// Wraps a [`Database`] handle and delegates all query operations to the
/// typed query modules. The database is lazily initialized on the first
/// call to [`UserStore::initialize`].
pub struct SqliteStore {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteStore {
    /// Create a new SqliteStore with the given configuration.
    ///
    /// The database connection is not opened until [`UserStore::initialize`]
    /// is called.
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    /// Returns a reference to the underlying Database, or an error if not initialized.
    fn db(&self) -> Result<&Database, LunaraError> {
        self.db.get().ok_or_else(|| LunaraError::Storage {
            source: "storage not initialized -- call initialize() first".into(),
        })
    }
}

#[async_trait]
impl PluginAdapter for SqliteStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, LunaraError> {
        let db = self.db()?;
        db.connection()
            .call(|conn| {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
            .map_err(crate::database::map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), LunaraError> {
        // Shutdown delegates to close if the DB was initialized.
        if let Some(db) = self.db.get() {
            db.close().await?;
            debug!("shutdown: WAL checkpoint complete");
        }
        Ok(())
    }
}

#[async_trait]
impl UserStore for SqliteStore {
    async fn initialize(&self) -> Result<(), LunaraError> {
        let db = Database::open_with(&self.config.database_path, self.config.wal_mode).await?;
        self.db.set(db).map_err(|_| LunaraError::Storage {
            source: "storage already initialized".into(),
        })?;
        debug!(path = %self.config.database_path, "SQLite storage initialized");
        Ok(())
    }

    async fn close(&self) -> Result<(), LunaraError> {
        self.db()?.close().await
    }

    // --- User profile ---

    async fn get_user(&self, chat_id: &str) -> Result<Option<UserProfile>, LunaraError> {
        queries::users::get_user(self.db()?, chat_id).await
    }

    async fn upsert_user(&self, chat_id: &str, display_name: &str) -> Result<(), LunaraError> {
        queries::users::upsert_user(self.db()?, chat_id, display_name).await
    }

    async fn update_language(&self, chat_id: &str, language: &str) -> Result<(), LunaraError> {
        queries::users::update_language(self.db()?, chat_id, language).await
    }

    async fn update_period(
        &self,
        chat_id: &str,
        last: NaiveDate,
        next: NaiveDate,
    ) -> Result<(), LunaraError> {
        queries::users::update_period(self.db()?, chat_id, last, next).await
    }

    async fn update_reminder_flag(&self, chat_id: &str, wants: bool) -> Result<(), LunaraError> {
        queries::users::update_reminder_flag(self.db()?, chat_id, wants).await
    }

    // --- Symptom log ---

    async fn append_symptom(&self, chat_id: &str, symptom: &str) -> Result<(), LunaraError> {
        queries::symptoms::append_symptom(self.db()?, chat_id, symptom).await
    }

    async fn list_symptoms(&self, chat_id: &str) -> Result<Vec<SymptomEntry>, LunaraError> {
        queries::symptoms::list_symptoms(self.db()?, chat_id).await
    }

    // --- Feedback ---

    async fn append_feedback(
        &self,
        chat_id: &str,
        response1: &str,
        response2: &str,
    ) -> Result<(), LunaraError> {
        queries::feedback::append_feedback(self.db()?, chat_id, response1, response2).await
    }

    // --- Reminder scan ---

    async fn list_reminder_optins(&self) -> Result<Vec<ReminderTarget>, LunaraError> {
        queries::users::list_reminder_optins(self.db()?).await
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

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[tokio::test]
    async fn sqlite_store_implements_plugin_adapter() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let store = SqliteStore::new(make_config(db_path.to_str().unwrap()));

        assert_eq!(store.name(), "sqlite");
        assert_eq!(store.version(), semver::Version::new(0, 1, 0));
        assert_eq!(store.adapter_type(), AdapterType::Storage);
    }

    #[tokio::test]
    async fn initialize_opens_database_at_configured_path() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("init_test.db");
        let store = SqliteStore::new(make_config(db_path.to_str().unwrap()));

        store.initialize().await.unwrap();
        assert!(db_path.exists(), "database file should be created");
    }

    #[tokio::test]
    async fn initialize_twice_returns_error() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("double_init.db");
        let store = SqliteStore::new(make_config(db_path.to_str().unwrap()));

        store.initialize().await.unwrap();
        let result = store.initialize().await;
        assert!(result.is_err(), "second initialize should fail");
    }

    #[tokio::test]
    async fn health_check_fails_when_not_initialized() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("no_init.db");
        let store = SqliteStore::new(make_config(db_path.to_str().unwrap()));

        let result = store.health_check().await;
        assert!(result.is_err(), "health_check should fail before initialize");
    }

    #[tokio::test]
    async fn health_check_returns_healthy_when_initialized() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("health.db");
        let store = SqliteStore::new(make_config(db_path.to_str().unwrap()));

        store.initialize().await.unwrap();
        let status = store.health_check().await.unwrap();
        assert_eq!(status, HealthStatus::Healthy);
    }

    #[tokio::test]
    async fn full_user_lifecycle_through_adapter() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("lifecycle.db");
        let store = SqliteStore::new(make_config(db_path.to_str().unwrap()));
        store.initialize().await.unwrap();

        // First message creates the profile.
        store.upsert_user("chat-1", "Ada").await.unwrap();
        let user = store.get_user("chat-1").await.unwrap().unwrap();
        assert_eq!(user.display_name, "Ada");

        // Track a period.
        store
            .update_period("chat-1", d(2025, 5, 12), d(2025, 6, 9))
            .await
            .unwrap();
        store.update_reminder_flag("chat-1", true).await.unwrap();
        store.update_language("chat-1", "Hausa").await.unwrap();

        let user = store.get_user("chat-1").await.unwrap().unwrap();
        assert_eq!(user.last_period, Some(d(2025, 5, 12)));
        assert_eq!(user.next_period, Some(d(2025, 6, 9)));
        assert!(user.wants_reminder);
        assert_eq!(user.language.as_deref(), Some("Hausa"));

        // Log symptoms and feedback.
        store.append_symptom("chat-1", "cramps").await.unwrap();
        store.append_symptom("chat-1", "fatigue").await.unwrap();
        let symptoms = store.list_symptoms("chat-1").await.unwrap();
        assert_eq!(symptoms.len(), 2);
        assert_eq!(symptoms[0].symptom, "fatigue");

        store
            .append_feedback("chat-1", "1", "none this month")
            .await
            .unwrap();

        // The reminder scan sees this user.
        let targets = store.list_reminder_optins().await.unwrap();
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].chat_id, "chat-1");
        assert_eq!(targets[0].language.as_deref(), Some("Hausa"));

        store.close().await.unwrap();
    }

    #[tokio::test]
    async fn shutdown_runs_checkpoint() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("shutdown.db");
        let store = SqliteStore::new(make_config(db_path.to_str().unwrap()));
        store.initialize().await.unwrap();

        store.upsert_user("chat-1", "Ada").await.unwrap();
        store.shutdown().await.unwrap();
    }
}
