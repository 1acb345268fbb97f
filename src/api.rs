//! HTTP API
//!
//! One webhook endpoint feeding the workflow; no business logic lives here.

mod handlers;

pub use handlers::create_router;

use crate::workflow::ConversationWorkflow;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub workflow: Arc<ConversationWorkflow>,
}

impl AppState {
    pub fn new(workflow: ConversationWorkflow) -> Self {
        Self {
            workflow: Arc::new(workflow),
        }
    }
}
