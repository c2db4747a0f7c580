// SPDX-FileCopyrightText: 2026 Lunara Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message keys for the localized string bundles.
//!
//! Every user-facing reply is addressed by one of these keys. The snake_case
//! string form of each variant is the key used in the bundle TOML files.

use strum::{Display, EnumIter, EnumString};

/// Closed set of message template keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum MessageKey {
    Menu,
    Fallback,
    TrackPrompt,
    LangPrompt,
    SavedSymptom,
    AskReminder,
    ReminderYes,
    ReminderNo,
    InvalidDate,
    NotValidDate,
    SymptomsDone,
    SymptomsCancel,
    SymptomsNothingSaved,
    SymptomPrompt,
    EduTopics,
    LanguageSet,
    NoPeriod,
    CycleInfo,
    NoSymptoms,
    SymptomsHistory,
    FeedbackQ1,
    FeedbackQ2,
    FeedbackThanks,
    OrderQuantityPrompt,
    OrderQuantityInvalid,
    OrderConfirmation,
    OrderVendorMessage,
    ReminderDue,
}
