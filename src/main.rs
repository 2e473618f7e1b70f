use anyhow::{Context, Result};
use component_catalog::api::{self, AppState};
use component_catalog::config::{init_tracing, ServerConfig};
use component_catalog::storage::ComponentStorage;
use component_catalog::user_storage::UserStorage;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let config = ServerConfig::from_env()?;
    init_tracing(config.log_format)?;

    let components = if config.seed {
        ComponentStorage::with_samples()
    } else {
        ComponentStorage::new()
    };
    let state = AppState::new(components, UserStorage::new());
    let seeded = state.components.count().await;

    let app = api::router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind_addr))?;

    info!(addr = %config.bind_addr, components = seeded, "component catalog running");
    info!("GET  /api/components?category=<name> - list components");
    info!("GET  /api/components/search?q=<text> - search components");
    info!("GET  /api/components/:id - fetch one component");
    info!("POST /api/components - submit a component");
    info!("GET  /api/health - liveness and catalog size");

    axum::serve(listener, app)
        .await
        .context("Server terminated unexpectedly")?;

    Ok(())
}
