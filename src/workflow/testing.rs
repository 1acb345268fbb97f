//! Test doubles for the workflow's collaborators

use crate::chatwoot::{ClientError, ClientResult, MessagingClient};
use crate::store::{ConversationStore, StoreError, StoreResult, DEFAULT_STATE_LABEL};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

fn store_fault() -> StoreError {
    StoreError::Database(sqlx::Error::PoolClosed)
}

fn client_fault() -> ClientError {
    ClientError::Status {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        body: "mock failure".to_string(),
    }
}

/// A message row captured by [`MemoryStore`].
#[derive(Debug, Clone)]
pub struct LoggedMessage {
    pub conversation_id: i64,
    pub message: String,
    pub created_at: Option<DateTime<Utc>>,
}

/// In-memory store with switchable read/write faults.
pub struct MemoryStore {
    states: Mutex<HashMap<i64, String>>,
    messages: Mutex<Vec<LoggedMessage>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            states: Mutex::new(HashMap::new()),
            messages: Mutex::new(Vec::new()),
            fail_reads: AtomicBool::new(false),
            fail_writes: AtomicBool::new(false),
        }
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Pre-populate a conversation's state label.
    pub fn seed_state(&self, conversation_id: i64, label: &str) {
        self.states
            .lock()
            .unwrap()
            .insert(conversation_id, label.to_string());
    }

    pub fn state_of(&self, conversation_id: i64) -> Option<String> {
        self.states.lock().unwrap().get(&conversation_id).cloned()
    }

    pub fn state_row_count(&self) -> usize {
        self.states.lock().unwrap().len()
    }

    pub fn logged_messages(&self) -> Vec<LoggedMessage> {
        self.messages.lock().unwrap().clone()
    }

    pub fn is_empty(&self) -> bool {
        self.states.lock().unwrap().is_empty() && self.messages.lock().unwrap().is_empty()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ConversationStore for MemoryStore {
    async fn get_state(&self, conversation_id: i64) -> StoreResult<String> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(store_fault());
        }
        Ok(self
            .state_of(conversation_id)
            .unwrap_or_else(|| DEFAULT_STATE_LABEL.to_string()))
    }

    async fn set_state(&self, conversation_id: i64, label: &str) -> StoreResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(store_fault());
        }
        self.seed_state(conversation_id, label);
        Ok(())
    }

    async fn append_message(
        &self,
        conversation_id: i64,
        message: &str,
        created_at: Option<DateTime<Utc>>,
    ) -> StoreResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(store_fault());
        }
        self.messages.lock().unwrap().push(LoggedMessage {
            conversation_id,
            message: message.to_string(),
            created_at,
        });
        Ok(())
    }
}

/// A reply captured by [`RecordingClient`].
#[derive(Debug, Clone)]
pub struct SentMessage {
    pub account_id: i64,
    pub conversation_id: i64,
    pub content: String,
}

/// A status change captured by [`RecordingClient`].
#[derive(Debug, Clone)]
pub struct StatusToggle {
    pub account_id: i64,
    pub conversation_id: i64,
    pub status: String,
}

/// Messaging client that records every call; sends can be made to fail while
/// toggles keep succeeding, for failure-isolation tests.
pub struct RecordingClient {
    sent: Mutex<Vec<SentMessage>>,
    toggles: Mutex<Vec<StatusToggle>>,
    fail_sends: AtomicBool,
}

impl RecordingClient {
    pub fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            toggles: Mutex::new(Vec::new()),
            fail_sends: AtomicBool::new(false),
        }
    }

    pub fn fail_sends(&self, fail: bool) {
        self.fail_sends.store(fail, Ordering::SeqCst);
    }

    pub fn sent_messages(&self) -> Vec<SentMessage> {
        self.sent.lock().unwrap().clone()
    }

    pub fn status_toggles(&self) -> Vec<StatusToggle> {
        self.toggles.lock().unwrap().clone()
    }
}

impl Default for RecordingClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MessagingClient for RecordingClient {
    async fn send_message(
        &self,
        account_id: i64,
        conversation_id: i64,
        content: &str,
    ) -> ClientResult<()> {
        if self.fail_sends.load(Ordering::SeqCst) {
            return Err(client_fault());
        }
        self.sent.lock().unwrap().push(SentMessage {
            account_id,
            conversation_id,
            content: content.to_string(),
        });
        Ok(())
    }

    async fn toggle_status(
        &self,
        account_id: i64,
        conversation_id: i64,
        status: &str,
    ) -> ClientResult<()> {
        self.toggles.lock().unwrap().push(StatusToggle {
            account_id,
            conversation_id,
            status: status.to_string(),
        });
        Ok(())
    }
}
