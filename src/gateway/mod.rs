// ============================================================================
// Gateway Service
// ============================================================================
//
// Stateless entry point for the HR platform. Matches the first path segment
// against a fixed routing table and forwards the request to the owning
// service. One request in, one request out: no retries, no path rewriting,
// no token inspection (that belongs to the target service).
//
// Routing rules:
// - /auth/*        -> identity service
// - /users/*       -> identity service
// - /profiles/*    -> profile service
// - /admin/*       -> admin service
// - /payroll/*     -> payroll service
// - /departments/* -> department service
//
// ============================================================================

pub mod proxy;

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    extract::{Request, State},
    middleware::from_fn,
    response::Response,
    routing::get,
};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::health;
use crate::metrics;
use crate::middleware;
use proxy::ServiceProxy;

/// Shared state for the gateway.
pub struct GatewayState {
    pub config: Arc<Config>,
    pub proxy: ServiceProxy,
}

/// Resolve the owning service for a request path. Returns the service name
/// (for logs) and its base URL.
fn resolve_target<'a>(config: &'a Config, path: &str) -> Option<(&'static str, &'a str)> {
    let services = &config.services;
    if prefix_matches(path, "/auth") || prefix_matches(path, "/users") {
        Some(("identity", &services.identity_url))
    } else if prefix_matches(path, "/profiles") {
        Some(("profile", &services.profile_url))
    } else if prefix_matches(path, "/admin") {
        Some(("admin", &services.admin_url))
    } else if prefix_matches(path, "/payroll") {
        Some(("payroll", &services.payroll_url))
    } else if prefix_matches(path, "/departments") {
        Some(("department", &services.department_url))
    } else {
        None
    }
}

/// A prefix only matches on a segment boundary: `/users` and `/users/42`
/// belong to the identity service, `/usersfoo` does not.
fn prefix_matches(path: &str, prefix: &str) -> bool {
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

/// Route one request to its owning service. Any forwarding failure becomes
/// the generic 500; downstream detail stays in the logs.
pub async fn route_request(
    State(state): State<Arc<GatewayState>>,
    request: Request,
) -> AppResult<Response<Body>> {
    let path = request.uri().path();

    let Some((service_name, service_url)) = resolve_target(&state.config, path) else {
        return Err(AppError::not_found("Route"));
    };

    metrics::PROXIED_REQUESTS_TOTAL.inc();

    match state.proxy.forward(service_url, request).await {
        Ok(response) => Ok(response),
        Err(e) => {
            tracing::error!(
                error = %e,
                service = service_name,
                "Failed to forward request"
            );
            Err(AppError::internal(format!(
                "forwarding to the {} service failed",
                service_name
            )))
        }
    }
}

/// Build the gateway router. Everything except health and metrics falls
/// through to the routing table.
pub fn create_router(state: Arc<GatewayState>) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/metrics", get(health::metrics_handler))
        .fallback(route_request)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(from_fn(middleware::request_logging))
                .into_inner(),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AuthConfig, ServicesConfig};

    fn test_config() -> Config {
        Config {
            port: 0,
            rust_log: "info".to_string(),
            auth: AuthConfig {
                jwt_secret: None,
                alternate_secrets: Vec::new(),
                shared_secret_file: None,
                allow_unverified: false,
            },
            services: ServicesConfig {
                identity_url: "http://identity".to_string(),
                profile_url: "http://profile".to_string(),
                admin_url: "http://admin".to_string(),
                payroll_url: "http://payroll".to_string(),
                department_url: "http://department".to_string(),
                request_timeout_secs: 5,
            },
        }
    }

    #[test]
    fn test_routing_table() {
        let config = test_config();

        for (path, service) in [
            ("/auth/login", "identity"),
            ("/users/42", "identity"),
            ("/profiles/42", "profile"),
            ("/admin/employees", "admin"),
            ("/payroll/runs/2024-06", "payroll"),
            ("/departments", "department"),
        ] {
            let (name, _) = resolve_target(&config, path)
                .unwrap_or_else(|| panic!("{} must resolve to a service", path));
            assert_eq!(name, service, "wrong target for {}", path);
        }
    }

    #[test]
    fn test_unknown_prefixes_do_not_resolve() {
        let config = test_config();
        assert!(resolve_target(&config, "/").is_none());
        assert!(resolve_target(&config, "/unknown").is_none());
        assert!(resolve_target(&config, "/crm/contacts").is_none());
        // Shares leading bytes with a routed segment, but not the segment.
        assert!(resolve_target(&config, "/authors").is_none());
        assert!(resolve_target(&config, "/usersfoo/1").is_none());
    }
}
