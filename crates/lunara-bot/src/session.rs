// SPDX-FileCopyrightText: 2026 Lunara Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-chat transient conversation state.
//!
//! One session per chat identity, created lazily on first access and owned
//! exclusively by this store. The state machine is the only mutator of the
//! step; the cached display language is refreshed from storage at the start
//! of every message. Sessions idle longer than the configured TTL are reset
//! to the menu on next access instead of accumulating forever.

use std::time::{Duration, Instant};

use dashmap::DashMap;

/// First feedback answer: did the user have access to pads this month.
///
/// Persisted as the literal "1"/"2" the user typed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PadAccess {
    Yes,
    No,
}

impl PadAccess {
    pub fn as_str(self) -> &'static str {
        match self {
            PadAccess::Yes => "1",
            PadAccess::No => "2",
        }
    }
}

/// The active flow state for one chat. Flow-scoped scratch data lives inside
/// the variant that owns it, so leaving a flow cannot leak stale values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Step {
    /// No multi-turn flow active; input is matched against the menu.
    #[default]
    Idle,
    /// Waiting for the last period start date.
    AskDate,
    /// Waiting for the yes/no reminder answer.
    AskReminder,
    /// Collecting symptoms one message at a time.
    SymptomLoop { count: u32 },
    /// Education topic menu (content out of scope).
    Education,
    /// Waiting for a language name.
    Language,
    /// Waiting for the first (categorical) feedback answer.
    FeedbackAccess,
    /// Waiting for the free-text feedback answer.
    FeedbackChallenge { access: PadAccess },
    /// Waiting for an order quantity.
    OrderQuantity,
}

#[derive(Debug)]
struct Session {
    step: Step,
    language: Option<String>,
    last_active: Instant,
}

impl Session {
    fn fresh() -> Self {
        Self {
            step: Step::Idle,
            language: None,
            last_active: Instant::now(),
        }
    }
}

/// In-memory session store keyed by chat identity.
///
/// Get-or-create is atomic (DashMap entry API), so two racing handlers for a
/// brand-new chat cannot lose a session.
pub struct SessionStore {
    inner: DashMap<String, Session>,
    ttl: Option<Duration>,
}

impl SessionStore {
    /// `ttl = None` disables idle expiry.
    pub fn new(ttl: Option<Duration>) -> Self {
        Self {
            inner: DashMap::new(),
            ttl,
        }
    }

    /// Read the current step and cached language, creating the session if
    /// needed. A session idle past the TTL is reset to the menu (the cached
    /// language survives; it is re-read from storage each message anyway).
    /// Marks the session active.
    pub fn snapshot(&self, chat_id: &str) -> (Step, Option<String>) {
        let mut entry = self
            .inner
            .entry(chat_id.to_string())
            .or_insert_with(Session::fresh);
        if let Some(ttl) = self.ttl
            && entry.last_active.elapsed() > ttl
        {
            entry.step = Step::Idle;
        }
        entry.last_active = Instant::now();
        (entry.step, entry.language.clone())
    }

    /// Commit a step transition.
    pub fn set_step(&self, chat_id: &str, step: Step) {
        let mut entry = self
            .inner
            .entry(chat_id.to_string())
            .or_insert_with(Session::fresh);
        entry.step = step;
        entry.last_active = Instant::now();
    }

    /// Refresh the cached display language. Does not mark the session active,
    /// so bookkeeping writes cannot keep an abandoned session alive.
    pub fn set_language(&self, chat_id: &str, language: Option<String>) {
        let mut entry = self
            .inner
            .entry(chat_id.to_string())
            .or_insert_with(Session::fresh);
        entry.language = language;
    }

    /// Number of live sessions (for diagnostics).
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}
