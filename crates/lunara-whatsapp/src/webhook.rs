// SPDX-FileCopyrightText: 2026 Lunara Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Webhook endpoint: subscription verification, signature checking, and
//! payload extraction.
//!
//! The Cloud API delivers messages as POSTs signed with
//! `X-Hub-Signature-256` (HMAC-SHA256 over the raw body with the app
//! secret). Subscription setup is a GET echoing `hub.challenge` when
//! `hub.verify_token` matches. Non-text message types are ignored.

use std::collections::HashMap;

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use lunara_core::types::{ChatId, InboundMessage};

/// Shared state for the webhook handlers.
#[derive(Clone)]
pub(crate) struct WebhookState {
    pub tx: mpsc::Sender<InboundMessage>,
    pub verify_token: Option<String>,
    pub app_secret: Option<String>,
}

/// Build the webhook router.
pub(crate) fn router(state: WebhookState) -> Router {
    Router::new()
        .route("/webhook", get(verify_subscription).post(receive_update))
        .with_state(state)
}

async fn verify_subscription(
    State(state): State<WebhookState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    match check_verification(&params, state.verify_token.as_deref()) {
        Some(challenge) => (StatusCode::OK, challenge).into_response(),
        None => StatusCode::FORBIDDEN.into_response(),
    }
}

/// Echo the challenge iff this is a subscribe request with the right token.
pub fn check_verification(
    params: &HashMap<String, String>,
    verify_token: Option<&str>,
) -> Option<String> {
    let token = verify_token?;
    if params.get("hub.mode").map(String::as_str) != Some("subscribe") {
        return None;
    }
    if params.get("hub.verify_token").map(String::as_str) != Some(token) {
        return None;
    }
    params.get("hub.challenge").cloned()
}

async fn receive_update(
    State(state): State<WebhookState>,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    if let Some(secret) = &state.app_secret {
        let signature = headers
            .get("x-hub-signature-256")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");
        if !verify_signature(secret, &body, signature) {
            warn!("webhook delivery rejected: bad or missing signature");
            return StatusCode::UNAUTHORIZED;
        }
    }

    match serde_json::from_slice::<WebhookPayload>(&body) {
        Ok(payload) => {
            for inbound in extract_messages(&payload) {
                if state.tx.send(inbound).await.is_err() {
                    warn!("inbound channel closed, dropping message");
                }
            }
        }
        Err(e) => {
            // The platform retries non-2xx responses; an unparsable payload
            // (status updates, unknown envelope versions) is acknowledged
            // and logged rather than bounced forever.
            debug!(error = %e, "ignoring unparsable webhook payload");
        }
    }

    StatusCode::OK
}

/// Verify `X-Hub-Signature-256` over the raw body.
pub fn verify_signature(app_secret: &str, body: &[u8], signature_header: &str) -> bool {
    let Some(hex_sig) = signature_header.strip_prefix("sha256=") else {
        return false;
    };
    let Ok(expected) = hex::decode(hex_sig) else {
        return false;
    };
    let mut mac = Hmac::<Sha256>::new_from_slice(app_secret.as_bytes())
        .expect("HMAC accepts any key length");
    mac.update(body);
    // Constant-time comparison.
    mac.verify_slice(&expected).is_ok()
}

// --- Cloud API webhook envelope (the fields we consume) ---

#[derive(Debug, Deserialize)]
pub struct WebhookPayload {
    #[serde(default)]
    pub entry: Vec<Entry>,
}

#[derive(Debug, Deserialize)]
pub struct Entry {
    #[serde(default)]
    pub changes: Vec<Change>,
}

#[derive(Debug, Deserialize)]
pub struct Change {
    #[serde(default)]
    pub value: ChangeValue,
}

#[derive(Debug, Default, Deserialize)]
pub struct ChangeValue {
    #[serde(default)]
    pub contacts: Vec<Contact>,
    #[serde(default)]
    pub messages: Vec<WaMessage>,
}

#[derive(Debug, Deserialize)]
pub struct Contact {
    pub wa_id: String,
    pub profile: Profile,
}

#[derive(Debug, Deserialize)]
pub struct Profile {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct WaMessage {
    pub from: String,
    pub id: String,
    pub timestamp: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub text: Option<TextBody>,
}

#[derive(Debug, Deserialize)]
pub struct TextBody {
    pub body: String,
}

/// Flatten a webhook payload into inbound text messages.
///
/// The sender display name comes from the contacts block when present.
/// Non-text messages (media, reactions, status updates) are skipped.
pub fn extract_messages(payload: &WebhookPayload) -> Vec<InboundMessage> {
    let mut out = Vec::new();
    for entry in &payload.entry {
        for change in &entry.changes {
            let names: HashMap<&str, &str> = change
                .value
                .contacts
                .iter()
                .map(|c| (c.wa_id.as_str(), c.profile.name.as_str()))
                .collect();

            for msg in &change.value.messages {
                if msg.kind != "text" {
                    debug!(kind = %msg.kind, "ignoring non-text message");
                    continue;
                }
                let Some(text) = &msg.text else { continue };
                out.push(InboundMessage {
                    id: msg.id.clone(),
                    chat: ChatId(msg.from.clone()),
                    sender_name: names.get(msg.from.as_str()).unwrap_or(&"").to_string(),
                    body: text.body.clone(),
                    timestamp: unix_to_rfc3339(&msg.timestamp),
                });
            }
        }
    }
    out
}

/// The Cloud API sends unix-second timestamps as strings.
fn unix_to_rfc3339(unix: &str) -> String {
    unix.parse::<i64>()
        .ok()
        .and_then(|secs| chrono::DateTime::from_timestamp(secs, 0))
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_else(|| unix.to_string())
}
