// SPDX-FileCopyrightText: 2026 Lunara Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end integration testing.
//!
//! `TestHarness` assembles a complete bot stack with a temp SQLite database
//! and the real state machine. Provides `send()` to drive the full pipeline
//! (profile upsert -> language refresh -> state dispatch -> replies) in tests.

use std::sync::Arc;

use lunara_bot::Engine;
use lunara_config::model::{BotConfig, StorageConfig};
use lunara_core::types::{ChatId, InboundMessage, OutboundMessage};
use lunara_core::{LunaraError, UserStore};
use lunara_i18n::Catalog;
use lunara_storage::SqliteStore;

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    bot: BotConfig,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            bot: BotConfig::default(),
        }
    }

    /// Replace the whole bot configuration.
    pub fn with_bot_config(mut self, bot: BotConfig) -> Self {
        self.bot = bot;
        self
    }

    /// Set the vendor chat that receives order notifications.
    pub fn with_vendor_chat(mut self, vendor: &str) -> Self {
        self.bot.vendor_chat_id = Some(vendor.to_string());
        self
    }

    /// Build the test harness, creating all required subsystems.
    pub async fn build(self) -> Result<TestHarness, LunaraError> {
        // Create temp directory for SQLite
        let temp_dir =
            tempfile::TempDir::new().map_err(|e| LunaraError::Storage { source: e.into() })?;
        let db_path = temp_dir.path().join("test.db");

        let storage_config = StorageConfig {
            database_path: db_path.to_string_lossy().to_string(),
            wal_mode: true,
        };
        let store = Arc::new(SqliteStore::new(storage_config));
        store.initialize().await?;

        let catalog = Arc::new(Catalog::builtin(&self.bot.reference_language)?);
        let engine = Arc::new(Engine::new(store.clone(), catalog.clone(), &self.bot));

        Ok(TestHarness {
            store,
            engine,
            catalog,
            _temp_dir: temp_dir,
        })
    }
}

/// A complete test environment with temp storage and the real engine.
pub struct TestHarness {
    /// The SQLite store, for seeding and assertions.
    pub store: Arc<SqliteStore>,
    /// The conversation state machine under test.
    pub engine: Arc<Engine>,
    /// The message catalog, for asserting against rendered templates.
    pub catalog: Arc<Catalog>,
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Drive one message from `chat` through the engine and return the replies.
    pub async fn send(
        &self,
        chat: &str,
        body: &str,
    ) -> Result<Vec<OutboundMessage>, LunaraError> {
        let inbound = InboundMessage {
            id: format!("test-{}", uuid::Uuid::new_v4()),
            chat: ChatId::from(chat),
            sender_name: "Test User".to_string(),
            body: body.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        };
        self.engine.handle_message(&inbound).await
    }

    /// Like [`send`](Self::send) but asserts exactly one reply and returns
    /// its text.
    pub async fn send_expect_one(&self, chat: &str, body: &str) -> String {
        let replies = self.send(chat, body).await.expect("handle_message failed");
        assert_eq!(
            replies.len(),
            1,
            "expected exactly one reply, got {replies:?}"
        );
        replies.into_iter().next().unwrap().text
    }
}
