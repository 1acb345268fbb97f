//! Inbound webhook event payload

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

/// A Chatwoot webhook payload, deserialized leniently.
///
/// Chatwoot posts many event shapes at the same endpoint; every field here is
/// optional so that an absent or differently-shaped field reads as "does not
/// match" during filtering rather than a deserialization error.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InboundEvent {
    #[serde(default)]
    pub message_type: Option<String>,
    #[serde(default)]
    pub event: Option<String>,
    #[serde(default)]
    pub conversation: Option<ConversationPayload>,
    #[serde(default)]
    pub account: Option<AccountPayload>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConversationPayload {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub messages: Vec<MessagePayload>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AccountPayload {
    #[serde(default)]
    pub id: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessagePayload {
    #[serde(default)]
    pub content: Option<String>,
    /// RFC 3339 string or unix seconds, depending on the payload kind.
    #[serde(default)]
    pub created_at: Option<Value>,
}

impl InboundEvent {
    /// Parse a raw payload. A payload that does not fit the expected shape at
    /// all degrades to the default event, which fails the workflow filter.
    pub fn from_value(payload: Value) -> Self {
        serde_json::from_value(payload).unwrap_or_default()
    }

    pub fn conversation_id(&self) -> Option<i64> {
        self.conversation.as_ref()?.id
    }

    pub fn account_id(&self) -> Option<i64> {
        self.account.as_ref()?.id
    }

    pub fn conversation_status(&self) -> Option<&str> {
        self.conversation.as_ref()?.status.as_deref()
    }

    /// First message attached to the conversation, if any.
    pub fn first_message(&self) -> Option<&MessagePayload> {
        self.conversation.as_ref()?.messages.first()
    }
}

impl MessagePayload {
    /// Creation time of the message, when it can be made sense of.
    pub fn created_at_utc(&self) -> Option<DateTime<Utc>> {
        match self.created_at.as_ref()? {
            Value::String(s) => DateTime::parse_from_rfc3339(s)
                .ok()
                .map(|dt| dt.with_timezone(&Utc)),
            Value::Number(n) => n.as_i64().and_then(|secs| DateTime::from_timestamp(secs, 0)),
            _ => None,
        }
    }
}
