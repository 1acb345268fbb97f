//! Effects produced by state transitions

use super::state::ConvState;
use chrono::{DateTime, Utc};

/// Side effects to be executed, in order, after a state transition.
///
/// The transition function only decides; the workflow executes. Each effect
/// is independently best-effort: a failure is logged and the remaining
/// effects still run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Send the configured greeting reply to the conversation.
    SendGreeting,

    /// Append the inbound message to the message log.
    LogMessage {
        content: String,
        created_at: Option<DateTime<Utc>>,
    },

    /// Send the configured handoff notice to the conversation.
    SendHandoffNotice,

    /// Flip the conversation to "open" so a human agent picks it up.
    OpenConversation,

    /// Persist the new state label.
    SetState(ConvState),
}
