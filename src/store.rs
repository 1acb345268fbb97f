//! Conversation state persistence
//!
//! Two PostgreSQL tables: `states` holds the current label per conversation,
//! `messages` is an append-only log of inbound messages. This layer knows
//! nothing about the workflow; it stores and returns raw labels.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;
use thiserror::Error;

/// Stored label for a conversation that has no row yet.
pub const DEFAULT_STATE_LABEL: &str = "initial";

const CREATE_STATES: &str = "CREATE TABLE IF NOT EXISTS states (
    conversation_id BIGINT PRIMARY KEY,
    state TEXT
)";

const CREATE_MESSAGES: &str = "CREATE TABLE IF NOT EXISTS messages (
    id BIGSERIAL PRIMARY KEY,
    conversation_id BIGINT,
    message TEXT,
    created_at TIMESTAMP WITH TIME ZONE DEFAULT CURRENT_TIMESTAMP
)";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Storage seam for the workflow. Implementations persist state labels and
/// the inbound message log; callers decide what a failure means.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Current label for a conversation, or the default when it has never
    /// been seen.
    async fn get_state(&self, conversation_id: i64) -> StoreResult<String>;

    /// Upsert the label for a conversation. Atomic per conversation; there is
    /// no read-modify-write.
    async fn set_state(&self, conversation_id: i64, label: &str) -> StoreResult<()>;

    /// Append an inbound message to the log. `created_at = None` defers to
    /// the insertion timestamp.
    async fn append_message(
        &self,
        conversation_id: i64,
        message: &str,
        created_at: Option<DateTime<Utc>>,
    ) -> StoreResult<()>;
}

/// PostgreSQL-backed store.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Connect and ensure both tables exist, retrying the whole sequence on
    /// failure. Exhausting the attempts is fatal to the caller; the service
    /// must not start serving without its store.
    pub async fn connect(database_url: &str) -> StoreResult<Self> {
        const MAX_ATTEMPTS: u32 = 3;
        const RETRY_DELAY: Duration = Duration::from_secs(5);

        let mut attempt = 1;
        loop {
            tracing::debug!(attempt, "Connecting to database");
            match Self::try_connect(database_url).await {
                Ok(store) => {
                    tracing::info!("Connected to PostgreSQL");
                    return Ok(store);
                }
                Err(e) if attempt < MAX_ATTEMPTS => {
                    tracing::error!(attempt, error = %e, "Database setup failed, retrying");
                    tokio::time::sleep(RETRY_DELAY).await;
                    attempt += 1;
                }
                Err(e) => {
                    tracing::error!(attempt, error = %e, "Database setup failed, giving up");
                    return Err(e);
                }
            }
        }
    }

    async fn try_connect(database_url: &str) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(5))
            .connect(database_url)
            .await?;

        sqlx::query(CREATE_STATES).execute(&pool).await?;
        sqlx::query(CREATE_MESSAGES).execute(&pool).await?;

        Ok(Self { pool })
    }

    /// Close the pool. Called on shutdown.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl ConversationStore for PgStore {
    async fn get_state(&self, conversation_id: i64) -> StoreResult<String> {
        let label: Option<Option<String>> =
            sqlx::query_scalar("SELECT state FROM states WHERE conversation_id = $1")
                .bind(conversation_id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(label
            .flatten()
            .unwrap_or_else(|| DEFAULT_STATE_LABEL.to_string()))
    }

    async fn set_state(&self, conversation_id: i64, label: &str) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO states (conversation_id, state) VALUES ($1, $2)
             ON CONFLICT (conversation_id) DO UPDATE SET state = EXCLUDED.state",
        )
        .bind(conversation_id)
        .bind(label)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn append_message(
        &self,
        conversation_id: i64,
        message: &str,
        created_at: Option<DateTime<Utc>>,
    ) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO messages (conversation_id, message, created_at)
             VALUES ($1, $2, COALESCE($3, CURRENT_TIMESTAMP))",
        )
        .bind(conversation_id)
        .bind(message)
        .bind(created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
