//! Chatwoot REST API client

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("chatwoot returned {status}: {body}")]
    Status { status: StatusCode, body: String },
}

pub type ClientResult<T> = Result<T, ClientError>;

/// Outbound seam to the messaging platform. One attempt per call; callers
/// decide whether a failure stops anything.
#[async_trait]
pub trait MessagingClient: Send + Sync {
    /// Post a reply into a conversation.
    async fn send_message(
        &self,
        account_id: i64,
        conversation_id: i64,
        content: &str,
    ) -> ClientResult<()>;

    /// Toggle the conversation status (e.g. to "open" for agent pickup).
    async fn toggle_status(
        &self,
        account_id: i64,
        conversation_id: i64,
        status: &str,
    ) -> ClientResult<()>;
}

/// HTTP implementation against a Chatwoot installation.
pub struct ChatwootClient {
    client: Client,
    base_url: String,
    api_token: String,
}

#[derive(Serialize)]
struct MessageBody<'a> {
    content: &'a str,
}

#[derive(Serialize)]
struct StatusBody<'a> {
    status: &'a str,
}

impl ChatwootClient {
    pub fn new(base_url: &str, api_token: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_token,
        }
    }

    async fn post<B: Serialize>(&self, url: String, body: &B) -> ClientResult<()> {
        let response = self
            .client
            .post(&url)
            .header("api_access_token", &self.api_token)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Status { status, body });
        }
        Ok(())
    }
}

#[async_trait]
impl MessagingClient for ChatwootClient {
    async fn send_message(
        &self,
        account_id: i64,
        conversation_id: i64,
        content: &str,
    ) -> ClientResult<()> {
        let url = format!(
            "{}/api/v1/accounts/{}/conversations/{}/messages",
            self.base_url, account_id, conversation_id
        );
        self.post(url, &MessageBody { content }).await
    }

    async fn toggle_status(
        &self,
        account_id: i64,
        conversation_id: i64,
        status: &str,
    ) -> ClientResult<()> {
        let url = format!(
            "{}/api/v1/accounts/{}/conversations/{}/toggle_status",
            self.base_url, account_id, conversation_id
        );
        self.post(url, &StatusBody { status }).await
    }
}
