mod client;
mod errors;
mod routes;
mod transform;

use anyhow::Result;
use storefront_core::config::{AppConfig, LoadOptions};
use tracing::{info, warn};

use crate::client::BackendClient;
use crate::routes::GatewayState;

fn init_logging(config: &AppConfig) {
    use storefront_core::config::LogFormat::*;
    use tracing::Level;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);

    match config.logging.format {
        Compact => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).compact().init();
        }
        Pretty => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).pretty().init();
        }
        Json => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).json().init();
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    run().await
}

pub async fn run() -> Result<()> {
    let config = AppConfig::load(LoadOptions::default())?;
    init_logging(&config);

    let gateway = &config.gateway;
    let backend = BackendClient::from_config(gateway)?;
    let app = routes::router(GatewayState { backend }, &gateway.allowed_origins);

    let address = format!("{}:{}", gateway.bind_address, gateway.port);
    let listener = tokio::net::TcpListener::bind(&address).await?;
    info!(
        event_name = "gateway.server.started",
        bind_address = %address,
        backend_url = %gateway.backend_url,
        allowed_origins = gateway.allowed_origins.len(),
        "storefront-gateway started"
    );

    axum::serve(listener, app).with_graceful_shutdown(wait_for_shutdown()).await?;

    info!(event_name = "gateway.server.stopping", "storefront-gateway stopping");
    Ok(())
}

async fn wait_for_shutdown() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        warn!(event_name = "gateway.server.signal_error", error = %error, "ctrl-c handler failed");
        std::future::pending::<()>().await;
    }
}
