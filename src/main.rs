// Entry point.
// Wires config, market client, valuation engine, and the HTTP server together.

mod cache;
mod config;
mod error;
mod market;
mod server;
mod snapshot;
mod valuation;

use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::error::Result;
use crate::market::MarketClient;
use crate::server::AppState;
use crate::valuation::ValuationEngine;

#[tokio::main]
async fn main() -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .compact()
        .init();

    let config = Config::from_env();
    let client = MarketClient::new()?;
    let engine = ValuationEngine::new(client, &config);
    let state = AppState::new(engine, &config);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port)).await?;
    info!(
        "caseworth listening on port {} ({} items tracked)",
        config.port,
        config.inventory.len()
    );

    axum::serve(listener, server::router(state)).await?;

    Ok(())
}
