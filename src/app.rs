use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::domain::error::Result;
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::session::StaticSessionProvider;
use crate::infrastructure::store::InMemoryRecordStore;
use crate::interfaces::http::{start_server, HttpState};

pub async fn run() -> Result<()> {
    let config = AppConfig::load()?;

    // RUST_LOG wins over the configured filter
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_filter.as_str()));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();

    let store = Arc::new(InMemoryRecordStore::new());
    let sessions = Arc::new(StaticSessionProvider::new(&config.sessions));
    let state = HttpState::new(&config, store, sessions);

    let (host, port) = config.bind_address();
    info!(
        host = %host,
        port,
        sessions = config.sessions.len(),
        archive = config.export.archive_dir.is_some(),
        "Starting HTTP server"
    );

    start_server(state, &config.server)?.await?;
    Ok(())
}
