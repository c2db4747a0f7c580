// SPDX-FileCopyrightText: 2026 Lunara Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types used across adapter traits and the Lunara bot.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Stable identifier for a single user or group conversation on the channel.
///
/// For WhatsApp this is the sender's phone-number id; the bot treats it as an
/// opaque string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChatId(pub String);

impl ChatId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ChatId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ChatId {
    fn from(s: &str) -> Self {
        ChatId(s.to_string())
    }
}

/// Unique identifier for a delivered message, assigned by the channel.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub String);

/// An inbound message received from a channel adapter.
#[derive(Debug, Clone)]
pub struct InboundMessage {
    /// Channel-assigned message id.
    pub id: String,
    /// Conversation the message arrived from.
    pub chat: ChatId,
    /// Display name of the sender as reported by the channel (may be empty).
    pub sender_name: String,
    /// Untouched message body text.
    pub body: String,
    /// RFC 3339 receive timestamp.
    pub timestamp: String,
}

/// An outbound text message to be sent via a channel adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub chat: ChatId,
    pub text: String,
}

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the type of adapter.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Channel,
    Storage,
}

// --- Persisted entities ---

/// A user profile row, upserted on every inbound message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub chat_id: String,
    pub display_name: String,
    /// RFC 3339 timestamp of the first observed message.
    pub first_seen: String,
    /// RFC 3339 timestamp, refreshed on every message.
    pub last_seen: String,
    /// Preferred display language (bundle name), if the user ever set one.
    pub language: Option<String>,
    /// Last recorded cycle start date.
    pub last_period: Option<NaiveDate>,
    /// Predicted next cycle start date (last + cycle length).
    pub next_period: Option<NaiveDate>,
    pub wants_reminder: bool,
}

/// One append-only symptom log entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymptomEntry {
    pub chat_id: String,
    /// Verbatim symptom text as typed by the user.
    pub symptom: String,
    /// RFC 3339 log timestamp.
    pub logged_at: String,
}

/// Projection returned by the reminder opt-in query: everything the daily
/// scanner needs to decide and render, nothing else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderTarget {
    pub chat_id: String,
    pub next_period: NaiveDate,
    pub language: Option<String>,
}
