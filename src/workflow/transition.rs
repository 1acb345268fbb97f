//! Pure state transition function

use super::effect::Effect;
use super::state::ConvState;
use chrono::{DateTime, Utc};

/// The inbound message as seen by the transition function, already extracted
/// and normalized from the webhook payload.
#[derive(Debug, Clone, Default)]
pub struct IncomingMessage {
    pub content: String,
    pub created_at: Option<DateTime<Utc>>,
}

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: ConvState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    fn new(state: ConvState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// Pure transition function: given the current state and a qualifying inbound
/// message, decide the next state and the side effects to run. No I/O happens
/// here; the same inputs always produce the same outputs.
pub fn transition(state: ConvState, message: &IncomingMessage) -> TransitionResult {
    match state {
        // First contact: greet, remember that we did. The message itself is
        // not appended to the log on this branch.
        ConvState::Initial => TransitionResult::new(ConvState::Greeted)
            .with_effect(Effect::SendGreeting)
            .with_effect(Effect::SetState(ConvState::Greeted)),

        // Already greeted: log the message and escalate. Re-running this from
        // Handoff is deliberate; every further message re-notifies and
        // re-opens, and the state write is an idempotent upsert.
        ConvState::Greeted | ConvState::Handoff => TransitionResult::new(ConvState::Handoff)
            .with_effect(Effect::LogMessage {
                content: message.content.clone(),
                created_at: message.created_at,
            })
            .with_effect(Effect::SendHandoffNotice)
            .with_effect(Effect::OpenConversation)
            .with_effect(Effect::SetState(ConvState::Handoff)),
    }
}
