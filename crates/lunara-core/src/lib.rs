// SPDX-FileCopyrightText: 2026 Lunara Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Lunara companion bot.
//!
//! This crate provides the foundational trait definitions, error types, and
//! common types used throughout the Lunara workspace. The channel and storage
//! adapters implement traits defined here.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::LunaraError;
pub use types::{AdapterType, ChatId, HealthStatus, InboundMessage, MessageId, OutboundMessage};

// Re-export all adapter traits at crate root.
pub use traits::{ChannelAdapter, PluginAdapter, UserStore};
