// SPDX-FileCopyrightText: 2026 Lunara Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Daily reminder scanner.
//!
//! Once per cron firing (default 09:00 local), scans all users with the
//! reminder flag set and a predicted next date, and messages exactly those
//! whose date is exactly `lead_days` whole days away. No retry and no
//! catch-up: a scan missed on the matching day means no reminder for that
//! cycle.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, NaiveDate};
use croner::Cron;
use lunara_core::{ChannelAdapter, ChatId, LunaraError, OutboundMessage, UserStore};
use lunara_i18n::{Catalog, MessageKey};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Scans persisted users and emits proactive cycle reminders.
pub struct ReminderScanner {
    store: Arc<dyn UserStore>,
    channel: Arc<dyn ChannelAdapter + Send + Sync>,
    catalog: Arc<Catalog>,
    lead_days: u32,
}

impl ReminderScanner {
    pub fn new(
        store: Arc<dyn UserStore>,
        channel: Arc<dyn ChannelAdapter + Send + Sync>,
        catalog: Arc<Catalog>,
        lead_days: u32,
    ) -> Self {
        Self {
            store,
            channel,
            catalog,
            lead_days,
        }
    }

    /// Run one scan as of `today`. Returns the number of reminders sent.
    ///
    /// Both the opt-in query and each send are best-effort: a failed read
    /// skips the scan, a failed send skips that user.
    pub async fn scan_once(&self, today: NaiveDate) -> usize {
        let targets = match self.store.list_reminder_optins().await {
            Ok(targets) => targets,
            Err(e) => {
                warn!(error = %e, "reminder scan query failed, skipping this run");
                return 0;
            }
        };

        let mut sent = 0;
        for target in targets {
            let diff = (target.next_period - today).num_days();
            if diff != i64::from(self.lead_days) {
                continue;
            }

            let date = target.next_period.format("%d/%m/%Y").to_string();
            let text =
                self.catalog
                    .render(target.language.as_deref(), MessageKey::ReminderDue, &[&date]);
            let msg = OutboundMessage {
                chat: ChatId(target.chat_id.clone()),
                text,
            };
            match self.channel.send(msg).await {
                Ok(_) => {
                    info!(chat = %target.chat_id, next = %date, "reminder sent");
                    sent += 1;
                }
                Err(e) => {
                    warn!(chat = %target.chat_id, error = %e, "reminder send failed");
                }
            }
        }

        debug!(sent, "reminder scan complete");
        sent
    }

    /// Run scans on the given cron schedule until cancelled.
    pub async fn run(
        &self,
        cron_expr: &str,
        cancel: CancellationToken,
    ) -> Result<(), LunaraError> {
        let schedule = Cron::from_str(cron_expr).map_err(|e| {
            LunaraError::Config(format!("bot.reminder_cron `{cron_expr}` is invalid: {e}"))
        })?;

        loop {
            let now = Local::now();
            let next = schedule.find_next_occurrence(&now, false).map_err(|e| {
                LunaraError::Config(format!(
                    "bot.reminder_cron `{cron_expr}` has no next occurrence: {e}"
                ))
            })?;
            let wait = (next - now).to_std().unwrap_or(Duration::ZERO);
            debug!(next = %next, "next reminder scan scheduled");

            tokio::select! {
                _ = tokio::time::sleep(wait) => {
                    self.scan_once(Local::now().date_naive()).await;
                }
                _ = cancel.cancelled() => {
                    info!("reminder scanner shutting down");
                    return Ok(());
                }
            }
        }
    }
}
