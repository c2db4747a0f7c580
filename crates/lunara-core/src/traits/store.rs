// SPDX-FileCopyrightText: 2026 Lunara Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! User store trait for persistence backends (SQLite, etc.).

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::LunaraError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{ReminderTarget, SymptomEntry, UserProfile};

/// Adapter for the persistence backend.
///
/// Carries the user profile, the append-only symptom log, and the feedback
/// store. All operations are keyed by the chat identity string.
#[async_trait]
pub trait UserStore: PluginAdapter {
    /// Initializes the storage backend (migrations, connection, etc.).
    async fn initialize(&self) -> Result<(), LunaraError>;

    /// Closes the storage backend, flushing pending writes.
    async fn close(&self) -> Result<(), LunaraError>;

    // --- User profile ---

    /// Fetches a user profile, or `None` if the identity has never been seen.
    async fn get_user(&self, chat_id: &str) -> Result<Option<UserProfile>, LunaraError>;

    /// Inserts a new profile (stamping `first_seen`) or refreshes the display
    /// name and `last_seen` of an existing one.
    async fn upsert_user(&self, chat_id: &str, display_name: &str) -> Result<(), LunaraError>;

    /// Persists the user's preferred display language.
    async fn update_language(&self, chat_id: &str, language: &str) -> Result<(), LunaraError>;

    /// Persists the last recorded and predicted next cycle start dates.
    async fn update_period(
        &self,
        chat_id: &str,
        last: NaiveDate,
        next: NaiveDate,
    ) -> Result<(), LunaraError>;

    /// Persists the reminder opt-in flag.
    async fn update_reminder_flag(&self, chat_id: &str, wants: bool) -> Result<(), LunaraError>;

    // --- Symptom log ---

    /// Appends one symptom entry. Entries are never mutated or deleted.
    async fn append_symptom(&self, chat_id: &str, symptom: &str) -> Result<(), LunaraError>;

    /// Lists a user's symptom entries, most recent first.
    async fn list_symptoms(&self, chat_id: &str) -> Result<Vec<SymptomEntry>, LunaraError>;

    // --- Feedback ---

    /// Appends one feedback entry (first categorical answer + free text).
    async fn append_feedback(
        &self,
        chat_id: &str,
        response1: &str,
        response2: &str,
    ) -> Result<(), LunaraError>;

    // --- Reminder scan ---

    /// Lists all users with the reminder flag set and a non-null predicted
    /// next date.
    async fn list_reminder_optins(&self) -> Result<Vec<ReminderTarget>, LunaraError>;
}
