//! Wootbot - Chatwoot greeting and handoff relay
//!
//! Receives Chatwoot webhook events, tracks a per-conversation state
//! machine in PostgreSQL, and replies/escalates through the Chatwoot
//! REST API.

mod api;
mod chatwoot;
mod config;
mod store;
mod workflow;

use api::{create_router, AppState};
use chatwoot::ChatwootClient;
use config::{Config, ConfigError};
use std::net::SocketAddr;
use std::sync::Arc;
use store::PgStore;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use workflow::ConversationWorkflow;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env()?;

    // Initialize logging; an unparseable LOG_LEVEL is fatal.
    let filter = EnvFilter::try_new(&config.log_level)
        .map_err(|_| ConfigError::InvalidLogLevel(config.log_level.clone()))?;
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    // Initialize the store. Retries internally; exhaustion means we must not
    // start serving.
    let store = PgStore::connect(&config.database_url()).await?;

    let client = ChatwootClient::new(&config.chatwoot_url, config.chatwoot_api_token.clone());

    let workflow = ConversationWorkflow::new(
        Arc::new(store.clone()),
        Arc::new(client),
        config.greeting_message.clone(),
        config.handoff_message.clone(),
    );

    let app = create_router(AppState::new(workflow)).layer(TraceLayer::new_for_http());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Wootbot listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    store.close().await;
    tracing::info!("Shut down");

    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        tracing::info!("Shutdown signal received");
    }
}
