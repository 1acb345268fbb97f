//! Conversation workflow
//!
//! Consumes inbound webhook events, consults the store, and drives the
//! greeting/handoff state machine against the messaging platform. Decisions
//! are made by a pure transition function; this module executes the resulting
//! effects, each one best-effort.

pub mod event;

mod effect;
mod state;
mod transition;

#[cfg(test)]
pub mod testing;

pub use effect::Effect;
pub use event::InboundEvent;
pub use state::ConvState;
pub use transition::{transition, IncomingMessage, TransitionResult};

use crate::chatwoot::MessagingClient;
use crate::store::{ConversationStore, DEFAULT_STATE_LABEL};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

/// Status the conversation is flipped to when escalating to a human agent.
const HANDOFF_STATUS: &str = "open";

/// Outcome returned to the webhook caller. Serializes to `{}` on success or
/// `{"message": "..."}` when the event was filtered out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HandleResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
}

impl HandleResult {
    pub fn ok() -> Self {
        Self { message: None }
    }

    pub fn invalid_event() -> Self {
        Self {
            message: Some("Invalid event"),
        }
    }

    pub fn invalid_state() -> Self {
        Self {
            message: Some("Invalid state"),
        }
    }
}

/// Only freshly-pending incoming messages drive the workflow; everything else
/// Chatwoot posts at the webhook (agent replies, status changes, resolved
/// conversations) is filtered out before any store or API call.
fn qualifies(event: &InboundEvent) -> bool {
    event.message_type.as_deref() == Some("incoming")
        && event.event.as_deref() == Some("message_created")
        && event.conversation_status() == Some("pending")
}

/// The conversation-level state machine and its side effects.
pub struct ConversationWorkflow {
    store: Arc<dyn ConversationStore>,
    client: Arc<dyn MessagingClient>,
    greeting_message: String,
    handoff_message: String,
}

impl ConversationWorkflow {
    pub fn new(
        store: Arc<dyn ConversationStore>,
        client: Arc<dyn MessagingClient>,
        greeting_message: String,
        handoff_message: String,
    ) -> Self {
        Self {
            store,
            client,
            greeting_message,
            handoff_message,
        }
    }

    /// Handle one inbound webhook payload. Never fails: store and API faults
    /// are logged and absorbed so the webhook caller always gets an answer.
    pub async fn handle_event(&self, payload: Value) -> HandleResult {
        let event = InboundEvent::from_value(payload);

        if !qualifies(&event) {
            return HandleResult::invalid_event();
        }
        let (Some(conversation_id), Some(account_id)) =
            (event.conversation_id(), event.account_id())
        else {
            return HandleResult::invalid_event();
        };

        let label = match self.store.get_state(conversation_id).await {
            Ok(label) => label,
            Err(e) => {
                tracing::error!(conversation_id, error = %e, "Error getting state, assuming default");
                DEFAULT_STATE_LABEL.to_string()
            }
        };

        let Some(state) = ConvState::from_label(&label) else {
            tracing::warn!(conversation_id, label = %label, "Conversation in unknown state, ignoring");
            return HandleResult::invalid_state();
        };

        let message = event
            .first_message()
            .map(|m| IncomingMessage {
                content: m.content.clone().unwrap_or_default(),
                created_at: m.created_at_utc(),
            })
            .unwrap_or_default();

        let result = transition(state, &message);
        tracing::debug!(
            conversation_id,
            account_id,
            from = %state,
            to = %result.new_state,
            "Handling message"
        );

        for effect in result.effects {
            self.run_effect(conversation_id, account_id, effect).await;
        }

        HandleResult::ok()
    }

    /// Execute one effect. Failures are logged and absorbed so that a fault
    /// in one step never prevents the following steps from running.
    async fn run_effect(&self, conversation_id: i64, account_id: i64, effect: Effect) {
        match effect {
            Effect::SendGreeting => {
                if let Err(e) = self
                    .client
                    .send_message(account_id, conversation_id, &self.greeting_message)
                    .await
                {
                    tracing::error!(conversation_id, account_id, error = %e, "Error sending greeting");
                }
            }
            Effect::LogMessage {
                content,
                created_at,
            } => {
                if let Err(e) = self
                    .store
                    .append_message(conversation_id, &content, created_at)
                    .await
                {
                    tracing::error!(conversation_id, error = %e, "Error saving message");
                }
            }
            Effect::SendHandoffNotice => {
                if let Err(e) = self
                    .client
                    .send_message(account_id, conversation_id, &self.handoff_message)
                    .await
                {
                    tracing::error!(conversation_id, account_id, error = %e, "Error sending handoff message");
                }
            }
            Effect::OpenConversation => {
                if let Err(e) = self
                    .client
                    .toggle_status(account_id, conversation_id, HANDOFF_STATUS)
                    .await
                {
                    tracing::error!(conversation_id, account_id, error = %e, "Error executing handoff action");
                }
            }
            Effect::SetState(state) => {
                if let Err(e) = self.store.set_state(conversation_id, state.as_label()).await {
                    tracing::error!(conversation_id, state = %state, error = %e, "Error setting state");
                }
            }
        }
    }
}
