//! loanpool-gateway server entry point.
//!
//! Starts the Axum HTTP server with REST and WebSocket endpoints.

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use loanpool_gateway::api;
use loanpool_gateway::app_state::AppState;
use loanpool_gateway::config::{GatewayConfig, LogFormat};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = GatewayConfig::from_env().context("loading configuration")?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match config.log_format {
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
    }

    tracing::info!(
        addr = %config.listen_addr,
        owner = %config.ledger_owner,
        repayment_policy = config.repayment_policy.as_str(),
        faucet = config.faucet_enabled,
        "starting loanpool-gateway"
    );

    let app_state = AppState::in_memory(
        config.ledger_owner,
        config.repayment_policy,
        config.event_bus_capacity,
        config.faucet_enabled,
    );
    let app = api::build_app(app_state, config.request_timeout);

    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("binding {}", config.listen_addr))?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app).await.context("serving HTTP")?;

    Ok(())
}
