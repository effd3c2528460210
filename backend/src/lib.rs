//! Taskify REST server: task storage, filtering and statistics over HTTP.

use std::sync::Arc;

use anyhow::{Context, Result};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

pub mod api;
pub mod auth;
pub mod clock;
pub mod config;
pub mod error;
pub mod service;
pub mod store;

use api::AppState;
use auth::AccountDirectory;
use clock::SystemClock;
use config::ServerConfig;
use service::TaskService;
use store::TaskStore;

/// Bind the configured address and serve the API over `store` until the listener fails.
pub async fn serve<S: TaskStore>(config: &ServerConfig, store: S) -> Result<()> {
    let accounts = AccountDirectory::from_accounts(&config.accounts);
    if accounts.is_empty() {
        warn!("no accounts configured; every task request will be rejected");
    }

    let state = AppState {
        tasks: TaskService::new(
            Arc::new(store),
            Arc::new(SystemClock::from_offset_minutes(config.utc_offset_minutes)),
        ),
        accounts: Arc::new(accounts),
    };
    let app = api::router(state)
        .layer(api::cors_layer(config.client_url.as_deref())?)
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.bind))?;
    info!(addr = %config.bind, "server running");
    axum::serve(listener, app).await?;
    Ok(())
}
