use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DeliveryError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Messaging API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Nothing to send")]
    EmptyMessage,
}

// ---- Outbound wire types ----

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TextMessage {
    #[serde(rename = "type")]
    pub kind: String,
    pub text: String,
}

impl TextMessage {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            kind: "text".to_string(),
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PushRequest<'a> {
    pub to: &'a str,
    pub messages: Vec<TextMessage>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplyRequest<'a> {
    pub reply_token: &'a str,
    pub messages: Vec<TextMessage>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    #[serde(default)]
    pub display_name: String,
    pub user_id: String,
    pub picture_url: Option<String>,
}

// ---- Delivery bookkeeping ----

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailedDelivery {
    pub recipient: String,
    pub error: String,
}

/// Per-recipient result of one fan-out.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DeliveryReport {
    pub delivered: Vec<String>,
    pub failed: Vec<FailedDelivery>,
}

impl DeliveryReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

// ---- Webhook wire types ----

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookPayload {
    #[serde(default)]
    pub destination: Option<String>,
    #[serde(default)]
    pub events: Vec<WebhookEvent>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum WebhookEvent {
    #[serde(rename_all = "camelCase")]
    Follow {
        reply_token: Option<String>,
        source: EventSource,
    },
    #[serde(rename_all = "camelCase")]
    Message {
        reply_token: Option<String>,
        source: EventSource,
        message: IncomingMessage,
    },
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSource {
    #[serde(rename = "type")]
    pub kind: String,
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum IncomingMessage {
    Text { text: String },
    #[serde(other)]
    Other,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_webhook_payload_parsing() {
        let raw = r##"{
            "destination": "Ubot",
            "events": [
                {"type": "follow", "replyToken": "r1", "source": {"type": "user", "userId": "U1"}, "timestamp": 1},
                {"type": "message", "replyToken": "r2", "source": {"type": "user", "userId": "U2"},
                 "message": {"type": "text", "id": "m1", "text": "#dev hi"}},
                {"type": "message", "replyToken": "r3", "source": {"type": "user", "userId": "U2"},
                 "message": {"type": "sticker", "id": "m2", "packageId": "1"}},
                {"type": "unfollow", "source": {"type": "user", "userId": "U3"}}
            ]
        }"##;

        let payload: WebhookPayload = serde_json::from_str(raw).unwrap();
        assert_eq!(payload.events.len(), 4);
        assert!(matches!(
            &payload.events[0],
            WebhookEvent::Follow { reply_token: Some(t), source } if t == "r1" && source.user_id.as_deref() == Some("U1")
        ));
        assert!(matches!(
            &payload.events[1],
            WebhookEvent::Message { message: IncomingMessage::Text { text }, .. } if text == "#dev hi"
        ));
        assert!(matches!(
            &payload.events[2],
            WebhookEvent::Message { message: IncomingMessage::Other, .. }
        ));
        assert!(matches!(&payload.events[3], WebhookEvent::Unsupported));
    }

    #[test]
    fn test_text_message_serialization() {
        let value = serde_json::to_value(TextMessage::new("hello")).unwrap();
        assert_eq!(value, serde_json::json!({"type": "text", "text": "hello"}));
    }
}
