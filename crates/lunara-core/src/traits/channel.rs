// SPDX-FileCopyrightText: 2026 Lunara Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Channel adapter trait for the messaging transport.

use async_trait::async_trait;

use crate::error::LunaraError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{InboundMessage, MessageId, OutboundMessage};

/// Adapter for the bidirectional messaging channel.
///
/// The channel adapter connects Lunara to the messaging platform, handling
/// message ingestion and delivery. Everything behind this trait (device
/// pairing, transport credentials, delivery receipts) is the platform's
/// concern, not the bot's.
#[async_trait]
pub trait ChannelAdapter: PluginAdapter {
    /// Establishes a connection to the messaging platform.
    async fn connect(&mut self) -> Result<(), LunaraError>;

    /// Sends a text message through the channel.
    async fn send(&self, msg: OutboundMessage) -> Result<MessageId, LunaraError>;

    /// Receives the next inbound message from the channel.
    async fn receive(&self) -> Result<InboundMessage, LunaraError>;
}
