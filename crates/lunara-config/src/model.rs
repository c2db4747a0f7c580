// SPDX-FileCopyrightText: 2026 Lunara Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Lunara companion bot.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Lunara configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable
/// overrides. All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LunaraConfig {
    /// Agent identity and logging settings.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Conversation and reminder behavior settings.
    #[serde(default)]
    pub bot: BotConfig,

    /// WhatsApp Cloud API integration settings.
    #[serde(default)]
    pub whatsapp: WhatsAppConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Agent identity and logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Display name of the bot.
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_agent_name() -> String {
    "lunara".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Conversation and reminder behavior configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BotConfig {
    /// Bundle name of the reference (fallback) language.
    #[serde(default = "default_reference_language")]
    pub reference_language: String,

    /// Days added to the last recorded cycle start to predict the next one.
    #[serde(default = "default_cycle_length_days")]
    pub cycle_length_days: u32,

    /// Whole days before the predicted date at which the reminder fires.
    #[serde(default = "default_reminder_lead_days")]
    pub reminder_lead_days: u32,

    /// Cron expression for the daily reminder scan (local time).
    #[serde(default = "default_reminder_cron")]
    pub reminder_cron: String,

    /// Seconds of inactivity after which an in-memory conversation session
    /// expires. `0` disables expiry.
    #[serde(default = "default_session_ttl_secs")]
    pub session_ttl_secs: u64,

    /// Link handed to the user in the order confirmation message.
    #[serde(default = "default_sales_contact_url")]
    pub sales_contact_url: String,

    /// Chat identity notified about new orders. `None` disables vendor
    /// notifications.
    #[serde(default)]
    pub vendor_chat_id: Option<String>,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            reference_language: default_reference_language(),
            cycle_length_days: default_cycle_length_days(),
            reminder_lead_days: default_reminder_lead_days(),
            reminder_cron: default_reminder_cron(),
            session_ttl_secs: default_session_ttl_secs(),
            sales_contact_url: default_sales_contact_url(),
            vendor_chat_id: None,
        }
    }
}

fn default_reference_language() -> String {
    "English".to_string()
}

fn default_cycle_length_days() -> u32 {
    28
}

fn default_reminder_lead_days() -> u32 {
    3
}

fn default_reminder_cron() -> String {
    "0 9 * * *".to_string()
}

fn default_session_ttl_secs() -> u64 {
    1800 // 30 minutes
}

fn default_sales_contact_url() -> String {
    "https://wa.me/".to_string()
}

/// WhatsApp Cloud API integration configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct WhatsAppConfig {
    /// Graph API access token. `None` leaves the channel unconfigured.
    #[serde(default)]
    pub access_token: Option<String>,

    /// Phone number id used as the sender on the Graph API.
    #[serde(default)]
    pub phone_number_id: Option<String>,

    /// Token echoed back during webhook subscription verification.
    #[serde(default)]
    pub verify_token: Option<String>,

    /// App secret used to verify `X-Hub-Signature-256` on webhook deliveries.
    /// `None` skips signature verification (local development only).
    #[serde(default)]
    pub app_secret: Option<String>,

    /// Address the webhook server binds to.
    #[serde(default = "default_webhook_host")]
    pub webhook_host: String,

    /// Port the webhook server binds to.
    #[serde(default = "default_webhook_port")]
    pub webhook_port: u16,
}

impl Default for WhatsAppConfig {
    fn default() -> Self {
        Self {
            access_token: None,
            phone_number_id: None,
            verify_token: None,
            app_secret: None,
            webhook_host: default_webhook_host(),
            webhook_port: default_webhook_port(),
        }
    }
}

fn default_webhook_host() -> String {
    "127.0.0.1".to_string()
}

fn default_webhook_port() -> u16 {
    8443
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("lunara").join("lunara.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("lunara.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}
