// ============================================================================
// Admin HR Service Binary
// ============================================================================
//
// Entry point for the admin aggregation service. Composes the identity and
// profile services into one employee resource behind the admin role gate.
//
// ============================================================================

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use workforce_server::admin::{self, AdminServiceContext};
use workforce_server::auth::TokenVerifier;
use workforce_server::clients::{self, IdentityClient, ProfileClient};
use workforce_server::config::Config;
use workforce_server::secrets::SecretChain;

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

    info!("=== Admin HR Service Starting ===");
    info!("Port: {}", config.port);
    info!("Identity service: {}", config.services.identity_url);
    info!("Profile service: {}", config.services.profile_url);

    // Secret values never reach the logs, only how many candidates resolved.
    let chain = SecretChain::resolve(&config.auth);
    info!("Token verification candidates: {}", chain.len());
    if config.auth.allow_unverified {
        warn!("AUTH_ALLOW_UNVERIFIED is enabled, unsigned tokens with id and role claims will be accepted");
    }
    let verifier = Arc::new(TokenVerifier::new(&chain, config.auth.allow_unverified));

    let http = clients::build_http_client(config.services.request_timeout_secs)
        .context("Failed to create HTTP client")?;

    let context = Arc::new(AdminServiceContext {
        verifier,
        identity: IdentityClient::new(http.clone(), config.services.identity_url.clone()),
        profiles: ProfileClient::new(http, config.services.profile_url.clone()),
        config: config.clone(),
    });

    let app = admin::create_router(context);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("Admin HR service listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .await
        .context("Failed to start server")?;

    Ok(())
}
