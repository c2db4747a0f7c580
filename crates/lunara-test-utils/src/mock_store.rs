// SPDX-FileCopyrightText: 2026 Lunara Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory `UserStore` with injectable read/write failures.
//!
//! Backs engine unit tests without SQLite. State lives behind a std mutex;
//! no lock is ever held across an await point.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::NaiveDate;

use lunara_core::types::{ReminderTarget, SymptomEntry, UserProfile};
use lunara_core::{AdapterType, HealthStatus, LunaraError, PluginAdapter, UserStore};

#[derive(Default)]
struct Inner {
    users: HashMap<String, UserProfile>,
    symptoms: Vec<SymptomEntry>,
    feedback: Vec<(String, String, String)>,
}

/// In-memory mock persistence gateway.
pub struct MockStore {
    inner: Mutex<Inner>,
    fail_writes: AtomicBool,
    fail_reads: AtomicBool,
}

impl MockStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            fail_writes: AtomicBool::new(false),
            fail_reads: AtomicBool::new(false),
        }
    }

    /// Make every subsequent write operation fail.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Make every subsequent read operation fail.
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Direct profile access for assertions.
    pub fn user(&self, chat_id: &str) -> Option<UserProfile> {
        self.inner.lock().unwrap().users.get(chat_id).cloned()
    }

    /// Symptom texts for one chat, in insertion (log) order.
    pub fn symptoms(&self, chat_id: &str) -> Vec<String> {
        self.inner
            .lock()
            .unwrap()
            .symptoms
            .iter()
            .filter(|e| e.chat_id == chat_id)
            .map(|e| e.symptom.clone())
            .collect()
    }

    /// All feedback entries as (chat_id, response1, response2).
    pub fn feedback_entries(&self) -> Vec<(String, String, String)> {
        self.inner.lock().unwrap().feedback.clone()
    }

    fn write_gate(&self) -> Result<(), LunaraError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(LunaraError::Storage {
                source: "injected write failure".into(),
            });
        }
        Ok(())
    }

    fn read_gate(&self) -> Result<(), LunaraError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(LunaraError::Storage {
                source: "injected read failure".into(),
            });
        }
        Ok(())
    }
}

impl Default for MockStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockStore {
    fn name(&self) -> &str {
        "mock-store"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, LunaraError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), LunaraError> {
        Ok(())
    }
}

#[async_trait]
impl UserStore for MockStore {
    async fn initialize(&self) -> Result<(), LunaraError> {
        Ok(())
    }

    async fn close(&self) -> Result<(), LunaraError> {
        Ok(())
    }

    async fn get_user(&self, chat_id: &str) -> Result<Option<UserProfile>, LunaraError> {
        self.read_gate()?;
        Ok(self.inner.lock().unwrap().users.get(chat_id).cloned())
    }

    async fn upsert_user(&self, chat_id: &str, display_name: &str) -> Result<(), LunaraError> {
        self.write_gate()?;
        let now = chrono::Utc::now().to_rfc3339();
        let mut inner = self.inner.lock().unwrap();
        inner
            .users
            .entry(chat_id.to_string())
            .and_modify(|u| {
                u.display_name = display_name.to_string();
                u.last_seen = now.clone();
            })
            .or_insert_with(|| UserProfile {
                chat_id: chat_id.to_string(),
                display_name: display_name.to_string(),
                first_seen: now.clone(),
                last_seen: now.clone(),
                language: None,
                last_period: None,
                next_period: None,
                wants_reminder: false,
            });
        Ok(())
    }

    async fn update_language(&self, chat_id: &str, language: &str) -> Result<(), LunaraError> {
        self.write_gate()?;
        if let Some(u) = self.inner.lock().unwrap().users.get_mut(chat_id) {
            u.language = Some(language.to_string());
        }
        Ok(())
    }

    async fn update_period(
        &self,
        chat_id: &str,
        last: NaiveDate,
        next: NaiveDate,
    ) -> Result<(), LunaraError> {
        self.write_gate()?;
        if let Some(u) = self.inner.lock().unwrap().users.get_mut(chat_id) {
            u.last_period = Some(last);
            u.next_period = Some(next);
        }
        Ok(())
    }

    async fn update_reminder_flag(&self, chat_id: &str, wants: bool) -> Result<(), LunaraError> {
        self.write_gate()?;
        if let Some(u) = self.inner.lock().unwrap().users.get_mut(chat_id) {
            u.wants_reminder = wants;
        }
        Ok(())
    }

    async fn append_symptom(&self, chat_id: &str, symptom: &str) -> Result<(), LunaraError> {
        self.write_gate()?;
        self.inner.lock().unwrap().symptoms.push(SymptomEntry {
            chat_id: chat_id.to_string(),
            symptom: symptom.to_string(),
            logged_at: chrono::Utc::now().to_rfc3339(),
        });
        Ok(())
    }

    async fn list_symptoms(&self, chat_id: &str) -> Result<Vec<SymptomEntry>, LunaraError> {
        self.read_gate()?;
        // Most recent first, like the SQL implementation.
        Ok(self
            .inner
            .lock()
            .unwrap()
            .symptoms
            .iter()
            .filter(|e| e.chat_id == chat_id)
            .rev()
            .cloned()
            .collect())
    }

    async fn append_feedback(
        &self,
        chat_id: &str,
        response1: &str,
        response2: &str,
    ) -> Result<(), LunaraError> {
        self.write_gate()?;
        self.inner.lock().unwrap().feedback.push((
            chat_id.to_string(),
            response1.to_string(),
            response2.to_string(),
        ));
        Ok(())
    }

    async fn list_reminder_optins(&self) -> Result<Vec<ReminderTarget>, LunaraError> {
        self.read_gate()?;
        Ok(self
            .inner
            .lock()
            .unwrap()
            .users
            .values()
            .filter(|u| u.wants_reminder)
            .filter_map(|u| {
                u.next_period.map(|next_period| ReminderTarget {
                    chat_id: u.chat_id.clone(),
                    next_period,
                    language: u.language.clone(),
                })
            })
            .collect())
    }
}
