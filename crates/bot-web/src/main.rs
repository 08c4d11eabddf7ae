//! Webhook server for the club roles bot.
//!
//! Receives gateway events, routes them through the rounds engine, and
//! delivers the resulting messages back through the gateway.

mod config;
mod gateway;
mod routes;
mod state;

use std::sync::Arc;

use rounds_engine::{Engine, Registry};
use tracing::info;
use wa_gateway::{GatewayClient, GatewayConfig};

use crate::config::Config;
use crate::gateway::GatewaySender;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    // Load configuration
    let config = Config::from_env()?;
    info!(addr = %config.addr, clubs_dir = %config.clubs_dir.display(), "Starting roles bot");

    // Load every club and build the engine
    let registry = Registry::load(&config.clubs_dir)?;
    let engine = Arc::new(Engine::new(Arc::new(registry)));

    // Connect the outbound gateway
    let gateway_config = GatewayConfig::new(&config.api_key, &config.source)
        .with_app_name(&config.app_name);
    let client = GatewayClient::new(gateway_config)?;
    let sender = Arc::new(GatewaySender::new(client));

    // Build application state
    let state = AppState::new(
        engine,
        sender,
        config.app_name.clone(),
        config.verify_token.clone(),
    );

    // Build router and serve
    let app = routes::router().with_state(state);
    info!(addr = %config.addr, "Webhook server listening");
    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
