use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::{fmt::format::FmtSpan, EnvFilter};

use taskify_backend::config::{ServerConfig, StoreBackend};
use taskify_backend::store::{MemoryTaskStore, RedisTaskStore};

#[tokio::main]
async fn main() -> Result<()> {
    install_tracing();

    let config = ServerConfig::load()?;
    match config.store.backend {
        StoreBackend::Redis => {
            let store = RedisTaskStore::open(&config.store.redis_url)
                .context("invalid redis url")?;
            info!("using redis task store");
            taskify_backend::serve(&config, store).await
        }
        StoreBackend::Memory => {
            info!("using in-memory task store");
            taskify_backend::serve(&config, MemoryTaskStore::new()).await
        }
    }
}

fn install_tracing() {
    // RUST_LOG overrides; INFO otherwise.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_span_events(FmtSpan::NONE)
        .compact()
        .try_init();
}
