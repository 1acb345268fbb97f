//! Conversation states

use std::fmt;

/// Workflow position of a single conversation.
///
/// The progression is one-way: `Initial` -> `Greeted` -> `Handoff`. A
/// conversation never returns to `Initial`, and `Handoff` is terminal as far
/// as this service is concerned (a human agent owns the conversation from
/// there).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConvState {
    /// Never replied to; the next qualifying message triggers the greeting.
    #[default]
    Initial,
    /// Greeting sent; the next qualifying message triggers the handoff.
    Greeted,
    /// Escalated to a human agent.
    Handoff,
}

impl ConvState {
    /// Parse a stored label. The store itself is untyped, so anything outside
    /// the closed label set comes back as `None` and the caller must treat
    /// the conversation as unroutable.
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "initial" => Some(ConvState::Initial),
            "greeted" => Some(ConvState::Greeted),
            "handoff" => Some(ConvState::Handoff),
            _ => None,
        }
    }

    /// The label persisted for this state.
    pub fn as_label(&self) -> &'static str {
        match self {
            ConvState::Initial => "initial",
            ConvState::Greeted => "greeted",
            ConvState::Handoff => "handoff",
        }
    }
}

impl fmt::Display for ConvState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}
