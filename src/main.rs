mod app;
mod config;
mod db;
mod errors;
mod logging;
mod models;
mod routes;
mod services;
mod state;
#[cfg(test)]
mod test_support;

use anyhow::{anyhow, Context};
use tokio::net::TcpListener;

use crate::config::AppConfig;
use crate::logging::LoggingConfig;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize logging FIRST
    logging::init_logging(LoggingConfig::from_env())
        .map_err(|e| anyhow!("failed to initialize logging: {}", e))?;

    let config = AppConfig::from_env().context("invalid configuration")?;

    let pool = db::connect(&config.database_url, config.max_connections)
        .await
        .with_context(|| format!("failed to open store at {}", config.database_url))?;
    tracing::info!("Transaction store ready at {}", config.database_url);

    let app = app::create_app(AppState { pool });

    let addr = config.bind_addr();
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    tracing::info!("Portfolio ledger backend running at http://{}/", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
