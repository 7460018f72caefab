// ============================================================================
// Gateway Service Binary
// ============================================================================
//
// Entry point for the HR platform gateway. All client traffic enters here
// and is forwarded to the owning microservice by path prefix.
//
// ============================================================================

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use workforce_server::clients;
use workforce_server::config::Config;
use workforce_server::gateway::{self, GatewayState, proxy::ServiceProxy};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = Config::from_env()?;
    let config = Arc::new(config);

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.rust_log.clone()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("=== Gateway Starting ===");
    info!("Port: {}", config.port);
    info!(
        "Downstream timeout: {}s",
        config.services.request_timeout_secs
    );

    let http = clients::build_http_client(config.services.request_timeout_secs)
        .context("Failed to create HTTP client")?;

    let state = Arc::new(GatewayState {
        config: config.clone(),
        proxy: ServiceProxy::new(http),
    });

    let app = gateway::create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("Gateway listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .await
        .context("Failed to start server")?;

    Ok(())
}
