// SPDX-FileCopyrightText: 2026 Lunara Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The per-chat conversation state machine.
//!
//! [`Engine::handle_message`] interprets one inbound message against the
//! chat's current step, performs the step's persistence writes, commits the
//! step transition, and returns the localized replies to send. The pipeline
//! per message is fixed: profile upsert, language refresh, universal
//! menu/greeting escape hatch, then step dispatch.
//!
//! Failure semantics: input-format problems re-prompt the same step and are
//! not errors; storage reads degrade to "absent"; storage writes propagate
//! *before* the new step is committed, so a failed write leaves the
//! conversation where it was.

use std::sync::Arc;
use std::time::Duration;

use lunara_config::model::BotConfig;
use lunara_core::types::UserProfile;
use lunara_core::{ChatId, InboundMessage, LunaraError, OutboundMessage, UserStore};
use lunara_i18n::{Catalog, MessageKey};
use tracing::{debug, warn};

use crate::dates::{self, DateParse};
use crate::menu::{self, MenuAction};
use crate::normalize::{is_greeting, normalize};
use crate::session::{PadAccess, SessionStore, Step};

/// How many entries the symptom-history view shows.
const SYMPTOM_HISTORY_LIMIT: usize = 5;

/// The conversation state machine for all chats.
pub struct Engine {
    store: Arc<dyn UserStore>,
    catalog: Arc<Catalog>,
    sessions: SessionStore,
    cycle_length_days: u32,
    sales_contact_url: String,
    vendor_chat: Option<ChatId>,
}

impl Engine {
    pub fn new(store: Arc<dyn UserStore>, catalog: Arc<Catalog>, config: &BotConfig) -> Self {
        let ttl = (config.session_ttl_secs > 0)
            .then(|| Duration::from_secs(config.session_ttl_secs));
        Self {
            store,
            catalog,
            sessions: SessionStore::new(ttl),
            cycle_length_days: config.cycle_length_days,
            sales_contact_url: config.sales_contact_url.clone(),
            vendor_chat: config.vendor_chat_id.clone().map(ChatId),
        }
    }

    /// The session store (diagnostics and tests).
    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Handle one inbound message to completion and return the replies.
    pub async fn handle_message(
        &self,
        inbound: &InboundMessage,
    ) -> Result<Vec<OutboundMessage>, LunaraError> {
        let chat = inbound.chat.as_str();
        let raw = inbound.body.trim();
        let token = normalize(raw);

        // Bookkeeping, awaited before any state logic: refresh the profile
        // row and the session's cached language.
        self.store.upsert_user(chat, &inbound.sender_name).await?;
        let language = self.load_profile(chat).await.and_then(|u| u.language);
        self.sessions.set_language(chat, language);
        let (step, lang) = self.sessions.snapshot(chat);
        let lang = lang.as_deref();

        debug!(chat, ?step, token = token.as_str(), "dispatching message");

        // Universal escape hatch: a greeting or menu/back always resets to
        // the menu, clearing any flow scratch.
        if is_greeting(raw) || token == "menu" || token == "back" {
            self.sessions.set_step(chat, Step::Idle);
            return Ok(vec![self.reply(chat, lang, MessageKey::Menu, &[])]);
        }

        match step {
            Step::Idle => self.on_idle(inbound, &token, lang).await,
            Step::AskDate => self.on_ask_date(chat, raw, lang).await,
            Step::AskReminder => self.on_ask_reminder(chat, &token, lang).await,
            Step::SymptomLoop { count } => {
                self.on_symptom_loop(chat, raw, &token, count, lang).await
            }
            // Education content is a passthrough; anything that is not the
            // escape hatch falls to the fallback prompt and the step stays.
            Step::Education => Ok(vec![self.reply(chat, lang, MessageKey::Fallback, &[])]),
            Step::Language => self.on_language(chat, raw).await,
            Step::FeedbackAccess => self.on_feedback_access(chat, &token, lang),
            Step::FeedbackChallenge { access } => {
                self.on_feedback_challenge(chat, raw, access, lang).await
            }
            Step::OrderQuantity => self.on_order(inbound, &token, lang).await,
        }
    }

    // --- Idle menu ---

    async fn on_idle(
        &self,
        inbound: &InboundMessage,
        token: &str,
        lang: Option<&str>,
    ) -> Result<Vec<OutboundMessage>, LunaraError> {
        let chat = inbound.chat.as_str();
        let Some(action) = menu::match_menu(token) else {
            return Ok(vec![self.reply(chat, lang, MessageKey::Fallback, &[])]);
        };

        match action {
            MenuAction::TrackPeriod => {
                self.sessions.set_step(chat, Step::AskDate);
                Ok(vec![self.reply(chat, lang, MessageKey::TrackPrompt, &[])])
            }
            MenuAction::LogSymptoms => {
                self.sessions.set_step(chat, Step::SymptomLoop { count: 0 });
                Ok(vec![self.reply(chat, lang, MessageKey::SymptomPrompt, &[])])
            }
            MenuAction::Education => {
                self.sessions.set_step(chat, Step::Education);
                Ok(vec![self.reply(chat, lang, MessageKey::EduTopics, &[])])
            }
            MenuAction::OrderPads => {
                self.sessions.set_step(chat, Step::OrderQuantity);
                Ok(vec![self.reply(chat, lang, MessageKey::OrderQuantityPrompt, &[])])
            }
            MenuAction::ViewCycle => Ok(vec![self.view_cycle(chat, lang).await]),
            MenuAction::ViewSymptoms => Ok(vec![self.view_symptoms(chat, lang).await]),
            MenuAction::ChangeLanguage => {
                self.sessions.set_step(chat, Step::Language);
                Ok(vec![self.reply(chat, lang, MessageKey::LangPrompt, &[])])
            }
            MenuAction::GiveFeedback => {
                self.sessions.set_step(chat, Step::FeedbackAccess);
                Ok(vec![self.reply(chat, lang, MessageKey::FeedbackQ1, &[])])
            }
        }
    }

    async fn view_cycle(&self, chat: &str, lang: Option<&str>) -> OutboundMessage {
        let profile = self.load_profile(chat).await;
        match profile.and_then(|u| u.last_period.zip(u.next_period)) {
            Some((last, next)) => self.reply(
                chat,
                lang,
                MessageKey::CycleInfo,
                &[&dates::format_display(last), &dates::format_display(next)],
            ),
            None => self.reply(chat, lang, MessageKey::NoPeriod, &[]),
        }
    }

    async fn view_symptoms(&self, chat: &str, lang: Option<&str>) -> OutboundMessage {
        let entries = match self.store.list_symptoms(chat).await {
            Ok(entries) => entries,
            Err(e) => {
                warn!(chat, error = %e, "symptom read failed, treating as empty");
                Vec::new()
            }
        };
        if entries.is_empty() {
            return self.reply(chat, lang, MessageKey::NoSymptoms, &[]);
        }
        let listing = entries
            .iter()
            .take(SYMPTOM_HISTORY_LIMIT)
            .map(|e| {
                format!(
                    "• {}  _({})_",
                    e.symptom,
                    dates::display_timestamp(&e.logged_at)
                )
            })
            .collect::<Vec<_>>()
            .join("\n");
        self.reply(chat, lang, MessageKey::SymptomsHistory, &[&listing])
    }

    // --- Period tracking ---

    async fn on_ask_date(
        &self,
        chat: &str,
        raw: &str,
        lang: Option<&str>,
    ) -> Result<Vec<OutboundMessage>, LunaraError> {
        let last = match dates::parse_period_date(raw) {
            DateParse::NoMatch => {
                return Ok(vec![self.reply(chat, lang, MessageKey::InvalidDate, &[])]);
            }
            DateParse::Invalid => {
                return Ok(vec![self.reply(chat, lang, MessageKey::NotValidDate, &[])]);
            }
            DateParse::Valid(date) => date,
        };
        let Some(next) = dates::predict_next(last, self.cycle_length_days) else {
            return Ok(vec![self.reply(chat, lang, MessageKey::NotValidDate, &[])]);
        };

        self.store.update_period(chat, last, next).await?;
        self.sessions.set_step(chat, Step::AskReminder);
        Ok(vec![self.reply(
            chat,
            lang,
            MessageKey::AskReminder,
            &[&dates::format_display(next)],
        )])
    }

    async fn on_ask_reminder(
        &self,
        chat: &str,
        token: &str,
        lang: Option<&str>,
    ) -> Result<Vec<OutboundMessage>, LunaraError> {
        // "y..." covers yes/yeah, "e..." covers ee (Hausa yes).
        let wants = token.starts_with('y') || token.starts_with('e');
        self.store.update_reminder_flag(chat, wants).await?;
        self.sessions.set_step(chat, Step::Idle);
        let key = if wants {
            MessageKey::ReminderYes
        } else {
            MessageKey::ReminderNo
        };
        Ok(vec![self.reply(chat, lang, key, &[])])
    }

    // --- Symptom loop ---

    async fn on_symptom_loop(
        &self,
        chat: &str,
        raw: &str,
        token: &str,
        count: u32,
        lang: Option<&str>,
    ) -> Result<Vec<OutboundMessage>, LunaraError> {
        if token == "done" {
            self.sessions.set_step(chat, Step::Idle);
            let reply = if count > 0 {
                let n = count.to_string();
                let plural = if count > 1 { "s" } else { "" };
                self.reply(chat, lang, MessageKey::SymptomsDone, &[&n, plural])
            } else {
                self.reply(chat, lang, MessageKey::SymptomsNothingSaved, &[])
            };
            return Ok(vec![reply]);
        }
        if token == "cancel" {
            // Entries appended so far stay in the log; only the report is
            // discarded.
            self.sessions.set_step(chat, Step::Idle);
            return Ok(vec![self.reply(chat, lang, MessageKey::SymptomsCancel, &[])]);
        }

        self.store.append_symptom(chat, raw).await?;
        self.sessions
            .set_step(chat, Step::SymptomLoop { count: count + 1 });
        Ok(vec![self.reply(chat, lang, MessageKey::SavedSymptom, &[])])
    }

    // --- Language change ---

    async fn on_language(
        &self,
        chat: &str,
        raw: &str,
    ) -> Result<Vec<OutboundMessage>, LunaraError> {
        // A prefix of a known bundle name wins; otherwise the typed text is
        // stored verbatim and rendering falls back to the reference bundle.
        let resolved = self
            .catalog
            .resolve_language(raw)
            .map(str::to_string)
            .unwrap_or_else(|| raw.to_string());

        self.store.update_language(chat, &resolved).await?;
        // Refresh the cache before rendering so the confirmation already
        // arrives in the new language.
        self.sessions.set_language(chat, Some(resolved.clone()));
        self.sessions.set_step(chat, Step::Idle);
        Ok(vec![self.reply(
            chat,
            Some(&resolved),
            MessageKey::LanguageSet,
            &[&resolved],
        )])
    }

    // --- Feedback ---

    fn on_feedback_access(
        &self,
        chat: &str,
        token: &str,
        lang: Option<&str>,
    ) -> Result<Vec<OutboundMessage>, LunaraError> {
        let access = match token {
            "1" => PadAccess::Yes,
            "2" => PadAccess::No,
            // Anything else is ignored outright: no re-prompt, no error.
            _ => return Ok(Vec::new()),
        };
        self.sessions
            .set_step(chat, Step::FeedbackChallenge { access });
        Ok(vec![self.reply(chat, lang, MessageKey::FeedbackQ2, &[])])
    }

    async fn on_feedback_challenge(
        &self,
        chat: &str,
        raw: &str,
        access: PadAccess,
        lang: Option<&str>,
    ) -> Result<Vec<OutboundMessage>, LunaraError> {
        self.store
            .append_feedback(chat, access.as_str(), raw)
            .await?;
        self.sessions.set_step(chat, Step::Idle);
        Ok(vec![self.reply(chat, lang, MessageKey::FeedbackThanks, &[])])
    }

    // --- Orders ---

    async fn on_order(
        &self,
        inbound: &InboundMessage,
        token: &str,
        lang: Option<&str>,
    ) -> Result<Vec<OutboundMessage>, LunaraError> {
        let chat = inbound.chat.as_str();
        let qty = token.parse::<u32>().ok().filter(|q| (1..=99).contains(q));
        let Some(qty) = qty else {
            return Ok(vec![self.reply(chat, lang, MessageKey::OrderQuantityInvalid, &[])]);
        };

        let qty_str = qty.to_string();
        let plural = if qty > 1 { "s" } else { "" };
        let mut replies = vec![self.reply(
            chat,
            lang,
            MessageKey::OrderConfirmation,
            &[&qty_str, plural, &self.sales_contact_url],
        )];

        // Purely transient fan-out: nothing is persisted for orders.
        if let Some(vendor) = &self.vendor_chat {
            replies.push(OutboundMessage {
                chat: vendor.clone(),
                text: self.catalog.render(
                    lang,
                    MessageKey::OrderVendorMessage,
                    &[&inbound.sender_name, chat, &qty_str, plural],
                ),
            });
        }

        self.sessions.set_step(chat, Step::Idle);
        Ok(replies)
    }

    // --- Helpers ---

    /// Profile read with degradation: a failed read is treated as "no such
    /// record" rather than failing the message.
    async fn load_profile(&self, chat: &str) -> Option<UserProfile> {
        match self.store.get_user(chat).await {
            Ok(profile) => profile,
            Err(e) => {
                warn!(chat, error = %e, "profile read failed, treating as absent");
                None
            }
        }
    }

    fn reply(
        &self,
        chat: &str,
        lang: Option<&str>,
        key: MessageKey,
        args: &[&str],
    ) -> OutboundMessage {
        OutboundMessage {
            chat: ChatId::from(chat),
            text: self.catalog.render(lang, key, args),
        }
    }
}
