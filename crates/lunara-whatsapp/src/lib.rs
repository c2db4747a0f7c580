// SPDX-FileCopyrightText: 2026 Lunara Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! WhatsApp Cloud API channel adapter for the Lunara companion bot.
//!
//! Implements [`ChannelAdapter`] over the Cloud API: inbound messages arrive
//! on a signed webhook served by axum and are queued for `receive()`;
//! outbound text goes through the Graph API `/messages` endpoint. Device
//! pairing, session credentials, and delivery receipts are the platform's
//! concern and stay behind this boundary.

pub mod webhook;

use async_trait::async_trait;
use lunara_config::model::WhatsAppConfig;
use lunara_core::error::LunaraError;
use lunara_core::traits::{ChannelAdapter, PluginAdapter};
use lunara_core::types::{
    AdapterType, HealthStatus, InboundMessage, MessageId, OutboundMessage,
};
use serde::Deserialize;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::webhook::WebhookState;

const GRAPH_API_BASE: &str = "https://graph.facebook.com/v21.0";

/// WhatsApp channel adapter implementing [`ChannelAdapter`].
pub struct WhatsAppChannel {
    config: WhatsAppConfig,
    http: reqwest::Client,
    inbound_rx: tokio::sync::Mutex<mpsc::Receiver<InboundMessage>>,
    inbound_tx: mpsc::Sender<InboundMessage>,
    server_handle: Option<tokio::task::JoinHandle<()>>,
}

impl WhatsAppChannel {
    /// Creates a new WhatsApp channel adapter.
    ///
    /// Requires `config.access_token` and `config.phone_number_id` to be set.
    pub fn new(config: WhatsAppConfig) -> Result<Self, LunaraError> {
        let token = config.access_token.as_deref().ok_or_else(|| {
            LunaraError::Config("whatsapp.access_token is required for the WhatsApp adapter".into())
        })?;
        if token.is_empty() {
            return Err(LunaraError::Config(
                "whatsapp.access_token cannot be empty".into(),
            ));
        }

        let phone_id = config.phone_number_id.as_deref().unwrap_or_default();
        if phone_id.is_empty() {
            return Err(LunaraError::Config(
                "whatsapp.phone_number_id is required for the WhatsApp adapter".into(),
            ));
        }

        let (inbound_tx, inbound_rx) = mpsc::channel(100);

        Ok(Self {
            config,
            http: reqwest::Client::new(),
            inbound_rx: tokio::sync::Mutex::new(inbound_rx),
            inbound_tx,
            server_handle: None,
        })
    }
}

#[async_trait]
impl PluginAdapter for WhatsAppChannel {
    fn name(&self) -> &str {
        "whatsapp"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Channel
    }

    async fn health_check(&self) -> Result<HealthStatus, LunaraError> {
        // Configuration is validated in new(); a webhook server that never
        // started means connect() was not called yet.
        if self.server_handle.is_none() {
            return Ok(HealthStatus::Degraded("webhook server not started".into()));
        }
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), LunaraError> {
        debug!("WhatsApp channel shutting down");
        // The webhook server task is dropped with the adapter, which aborts
        // it. For graceful shutdown, the bot loop stops calling receive()
        // first.
        Ok(())
    }
}

#[async_trait]
impl ChannelAdapter for WhatsAppChannel {
    async fn connect(&mut self) -> Result<(), LunaraError> {
        if self.server_handle.is_some() {
            return Ok(()); // Already connected
        }

        let state = WebhookState {
            tx: self.inbound_tx.clone(),
            verify_token: self.config.verify_token.clone(),
            app_secret: self.config.app_secret.clone(),
        };
        let app = webhook::router(state);

        let addr = format!(
            "{}:{}",
            self.config.webhook_host, self.config.webhook_port
        );
        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| LunaraError::Channel {
                message: format!("failed to bind webhook listener on {addr}: {e}"),
                source: Some(Box::new(e)),
            })?;

        info!(addr = addr.as_str(), "webhook server listening");

        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!(error = %e, "webhook server exited");
            }
        });

        self.server_handle = Some(handle);
        Ok(())
    }

    async fn send(&self, msg: OutboundMessage) -> Result<MessageId, LunaraError> {
        let phone_id = self.config.phone_number_id.as_deref().unwrap_or_default();
        let token = self.config.access_token.as_deref().unwrap_or_default();
        let url = format!("{GRAPH_API_BASE}/{phone_id}/messages");

        let body = serde_json::json!({
            "messaging_product": "whatsapp",
            "recipient_type": "individual",
            "to": msg.chat.as_str(),
            "type": "text",
            "text": { "body": msg.text },
        });

        let response = self
            .http
            .post(&url)
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .map_err(|e| LunaraError::Channel {
                message: format!("failed to send message: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(LunaraError::Channel {
                message: format!("Graph API returned {status}: {detail}"),
                source: None,
            });
        }

        let sent: SendResponse = response.json().await.map_err(|e| LunaraError::Channel {
            message: format!("unparsable Graph API response: {e}"),
            source: Some(Box::new(e)),
        })?;

        let id = sent
            .messages
            .into_iter()
            .next()
            .map(|m| m.id)
            .unwrap_or_default();
        Ok(MessageId(id))
    }

    async fn receive(&self) -> Result<InboundMessage, LunaraError> {
        let mut rx = self.inbound_rx.lock().await;
        rx.recv().await.ok_or_else(|| LunaraError::Channel {
            message: "WhatsApp inbound channel closed".into(),
            source: None,
        })
    }
}

#[derive(Debug, Deserialize)]
struct SendResponse {
    #[serde(default)]
    messages: Vec<SentMessage>,
}

#[derive(Debug, Deserialize)]
struct SentMessage {
    id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configured() -> WhatsAppConfig {
        WhatsAppConfig {
            access_token: Some("EAAG-test-token".into()),
            phone_number_id: Some("106540352242922".into()),
            verify_token: Some("hub-verify".into()),
            app_secret: Some("secret".into()),
            ..WhatsAppConfig::default()
        }
    }

    #[test]
    fn new_requires_access_token() {
        let config = WhatsAppConfig::default();
        assert!(WhatsAppChannel::new(config).is_err());
    }

    #[test]
    fn new_rejects_empty_token() {
        let config = WhatsAppConfig {
            access_token: Some(String::new()),
            phone_number_id: Some("106540352242922".into()),
            ..WhatsAppConfig::default()
        };
        assert!(WhatsAppChannel::new(config).is_err());
    }

    #[test]
    fn new_requires_phone_number_id() {
        let config = WhatsAppConfig {
            access_token: Some("EAAG-test-token".into()),
            phone_number_id: None,
            ..WhatsAppConfig::default()
        };
        assert!(WhatsAppChannel::new(config).is_err());
    }

    #[test]
    fn new_accepts_valid_config() {
        assert!(WhatsAppChannel::new(configured()).is_ok());
    }

    #[test]
    fn plugin_adapter_metadata() {
        let channel = WhatsAppChannel::new(configured()).unwrap();
        assert_eq!(channel.name(), "whatsapp");
        assert_eq!(channel.version(), semver::Version::new(0, 1, 0));
        assert_eq!(channel.adapter_type(), AdapterType::Channel);
    }

    #[tokio::test]
    async fn health_degraded_before_connect() {
        let channel = WhatsAppChannel::new(configured()).unwrap();
        let status = channel.health_check().await.unwrap();
        assert!(matches!(status, HealthStatus::Degraded(_)));
    }

    #[tokio::test]
    async fn connect_binds_webhook_listener() {
        let mut config = configured();
        config.webhook_host = "127.0.0.1".into();
        // Port 0 lets the OS pick a free port, keeping the test collision-free.
        config.webhook_port = 0;

        let mut channel = WhatsAppChannel::new(config).unwrap();
        channel.connect().await.unwrap();
        assert!(matches!(
            channel.health_check().await.unwrap(),
            HealthStatus::Healthy
        ));

        // Connecting twice is a no-op.
        channel.connect().await.unwrap();
    }
}
