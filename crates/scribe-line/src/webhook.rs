use serde::Deserialize;

/// Webhook request envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookPayload {
    #[serde(default)]
    pub events: Vec<WebhookEvent>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    pub reply_token: Option<String>,
    pub source: Option<EventSource>,
    pub message: Option<EventMessage>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSource {
    #[serde(rename = "type")]
    pub source_type: String,
    pub group_id: Option<String>,
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventMessage {
    pub id: String,
    #[serde(rename = "type")]
    pub message_type: String,
    pub text: Option<String>,
    pub quote_token: Option<String>,
}

/// A group-sourced text message, flattened out of the webhook envelope.
/// Delivery is at-least-once; consumers must tolerate duplicates.
#[derive(Debug, Clone)]
pub struct InboundMessage {
    pub group_id: String,
    pub user_id: String,
    pub text: String,
    pub reply_token: String,
    pub reply_to_id: Option<String>,
}

impl WebhookEvent {
    /// Extract a group text message, or `None` for any other event kind
    /// (non-message events, direct chats, stickers, ...).
    pub fn as_group_text(&self) -> Option<InboundMessage> {
        if self.event_type != "message" {
            return None;
        }
        let source = self.source.as_ref()?;
        if source.source_type != "group" {
            return None;
        }
        let message = self.message.as_ref()?;
        if message.message_type != "text" {
            return None;
        }
        Some(InboundMessage {
            group_id: source.group_id.clone()?,
            user_id: source.user_id.clone().unwrap_or_default(),
            text: message.text.clone()?,
            reply_token: self.reply_token.clone()?,
            reply_to_id: message.quote_token.clone(),
        })
    }
}
