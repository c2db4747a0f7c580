// SPDX-FileCopyrightText: 2026 Lunara Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation state machine and bot loop for the Lunara companion bot.
//!
//! The [`BotLoop`] is the central coordinator that:
//! - Receives messages from the channel adapter
//! - Runs each through the [`Engine`] state machine to completion
//! - Sends the resulting replies best-effort
//! - Handles graceful shutdown
//!
//! Messages are handled strictly one at a time, which serializes handling
//! per chat identity (two quick messages from the same user can never
//! interleave their persistence and session writes).

pub mod dates;
pub mod engine;
pub mod menu;
pub mod normalize;
pub mod session;
pub mod shutdown;

use std::sync::Arc;

use lunara_core::{ChannelAdapter, InboundMessage, LunaraError, OutboundMessage};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

pub use engine::Engine;
pub use session::{SessionStore, Step};

/// The main loop coordinating message flow between channel and engine.
pub struct BotLoop {
    channel: Arc<dyn ChannelAdapter + Send + Sync>,
    engine: Arc<Engine>,
}

impl BotLoop {
    pub fn new(channel: Arc<dyn ChannelAdapter + Send + Sync>, engine: Arc<Engine>) -> Self {
        Self { channel, engine }
    }

    /// Runs the loop until the cancellation token is triggered.
    ///
    /// The loop:
    /// 1. Waits for inbound messages from the channel
    /// 2. Handles each to completion before receiving the next
    /// 3. On cancellation, exits cleanly
    pub async fn run(&self, cancel: CancellationToken) -> Result<(), LunaraError> {
        info!("bot loop running");

        loop {
            tokio::select! {
                msg = self.channel.receive() => {
                    match msg {
                        Ok(inbound) => self.handle_inbound(inbound).await,
                        Err(e) => {
                            error!(error = %e, "channel receive error");
                            // If the channel is closed, break out of the loop.
                            if e.to_string().contains("closed") {
                                break;
                            }
                        }
                    }
                }
                _ = cancel.cancelled() => {
                    info!("shutdown signal received, stopping bot loop");
                    break;
                }
            }
        }

        info!("bot loop stopped");
        Ok(())
    }

    /// Handle one inbound message and deliver its replies.
    ///
    /// Handler errors (write failures) are logged, not propagated: one failed
    /// message must not take the loop down.
    async fn handle_inbound(&self, inbound: InboundMessage) {
        debug!(chat = %inbound.chat, "handling inbound message");
        match self.engine.handle_message(&inbound).await {
            Ok(replies) => {
                for reply in replies {
                    self.send_best_effort(reply).await;
                }
            }
            Err(e) => {
                error!(chat = %inbound.chat, error = %e, "message handling failed");
            }
        }
    }

    /// Deliver one reply, swallowing failures: the conversation proceeds as
    /// if sent.
    async fn send_best_effort(&self, msg: OutboundMessage) {
        if let Err(e) = self.channel.send(msg).await {
            warn!(error = %e, "send failed, dropping reply");
        }
    }
}
