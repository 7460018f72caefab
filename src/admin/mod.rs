// ============================================================================
// Admin HR Service
// ============================================================================
//
// Aggregation layer over the identity and profile services: presents one
// employee resource composed from both, behind the admin role gate. Holds
// no storage of its own.
//
// ============================================================================

pub mod employees;
pub mod handlers;

use std::sync::Arc;

use axum::{
    Router,
    middleware::{from_fn, from_fn_with_state},
    routing::get,
};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::auth::TokenVerifier;
use crate::clients::{IdentityClient, ProfileClient};
use crate::config::Config;
use crate::health;
use crate::middleware;

/// Role required for every employee operation.
pub const ADMIN_ROLE: &str = "admin";

/// Shared state for the admin service.
pub struct AdminServiceContext {
    pub config: Arc<Config>,
    pub verifier: Arc<TokenVerifier>,
    pub identity: IdentityClient,
    pub profiles: ProfileClient,
}

/// Build the admin service router. Health and metrics stay outside the
/// authentication layers.
pub fn create_router(ctx: Arc<AdminServiceContext>) -> Router {
    let employees = Router::new()
        .route(
            "/admin/employees",
            get(handlers::list_employees).post(handlers::create_employee),
        )
        .route(
            "/admin/employees/:id",
            get(handlers::get_employee)
                .put(handlers::update_employee)
                .delete(handlers::delete_employee),
        )
        // Order matters: authenticate runs before the role gate so the
        // principal is already in extensions.
        .layer(
            ServiceBuilder::new()
                .layer(from_fn_with_state(
                    ctx.verifier.clone(),
                    middleware::authenticate,
                ))
                .layer(from_fn_with_state(ADMIN_ROLE, middleware::require_role))
                .into_inner(),
        )
        .with_state(ctx);

    Router::new()
        .route("/health", get(health::health_check))
        .route("/metrics", get(health::metrics_handler))
        .merge(employees)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(from_fn(middleware::request_logging))
                .into_inner(),
        )
}
