//! Gateway webhook: verification handshake and inbound events.
//!
//! The gateway delivers Meta v3 payloads
//! (`entry[].changes[].value.messages[]`). Only text messages matter here;
//! everything else is logged and dropped. The POST handler always answers
//! 200 so the gateway does not retry, even on unparseable bodies.

use std::collections::HashMap;

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use rounds_engine::deliver;

use crate::state::AppState;

/// A normalized inbound event: who wrote, and what.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundEvent {
    /// Sender id: E.164 digits, no leading '+'.
    pub sender_id: String,
    /// Raw message body.
    pub text: String,
}

#[derive(Debug, Default, Deserialize)]
struct WebhookPayload {
    #[serde(default)]
    entry: Vec<Entry>,
}

#[derive(Debug, Default, Deserialize)]
struct Entry {
    #[serde(default)]
    changes: Vec<Change>,
}

#[derive(Debug, Default, Deserialize)]
struct Change {
    #[serde(default)]
    value: ChangeValue,
}

#[derive(Debug, Default, Deserialize)]
struct ChangeValue {
    #[serde(default)]
    messages: Vec<InboundMessage>,
    #[serde(default)]
    statuses: Vec<Value>,
}

#[derive(Debug, Default, Deserialize)]
struct InboundMessage {
    #[serde(default, rename = "type")]
    kind: String,
    #[serde(default)]
    from: String,
    #[serde(default)]
    text: Option<TextBody>,
}

#[derive(Debug, Default, Deserialize)]
struct TextBody {
    #[serde(default)]
    body: String,
}

/// Webhook verification handshake (`hub.mode` / `hub.verify_token` /
/// `hub.challenge`).
pub async fn verify(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> String {
    let subscribe = params.get("hub.mode").map(String::as_str) == Some("subscribe");
    let token_ok = params.get("hub.verify_token") == Some(&state.verify_token);
    if subscribe && token_ok {
        return params
            .get("hub.challenge")
            .cloned()
            .unwrap_or_else(|| "OK".to_string());
    }
    "ok".to_string()
}

/// Inbound gateway events. Always answers 200.
pub async fn receive(State(state): State<AppState>, body: String) -> Json<Value> {
    for event in extract_events(&body) {
        info!(sender = %event.sender_id, "Inbound message");
        // The engine persists and releases every lock before returning;
        // only then do the sends go out.
        let outbound = state.engine.handle_text(&event.sender_id, &event.text).await;
        let report = deliver(state.sender.as_ref(), &outbound).await;
        if report.fail > 0 {
            warn!(
                sender = %event.sender_id,
                ok = report.ok,
                fail = report.fail,
                "Some outbound messages failed"
            );
        }
    }
    Json(json!({"status": "ok"}))
}

/// Pull the normalized text events out of a webhook body.
///
/// Lenient by design: a body that is not valid JSON, or not the expected
/// shape, yields no events rather than an error.
pub fn extract_events(body: &str) -> Vec<InboundEvent> {
    let payload: WebhookPayload = match serde_json::from_str(body) {
        Ok(payload) => payload,
        Err(err) => {
            warn!(error = %err, "Unparseable webhook body");
            return Vec::new();
        }
    };

    let mut events = Vec::new();
    for entry in payload.entry {
        for change in entry.changes {
            if !change.value.statuses.is_empty() {
                debug!(statuses = change.value.statuses.len(), "Delivery statuses");
            }
            for message in change.value.messages {
                if message.kind != "text" || message.from.is_empty() {
                    debug!(kind = %message.kind, "Skipping non-text message");
                    continue;
                }
                let Some(text) = message.text else { continue };
                events.push(InboundEvent {
                    sender_id: message.from,
                    text: text.body,
                });
            }
        }
    }
    events
}
