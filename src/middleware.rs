// ============================================================================
// HTTP Middleware
// ============================================================================
//
// - request_logging: one debug line in, one info line out with the duration
// - authenticate: verifies the bearer token and stores the Principal (plus
//   the raw token, for downstream forwarding) in request extensions
// - require_role: fail-closed role gate, must run after authenticate
//
// ============================================================================

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};

use crate::auth::{self, BearerToken, Principal, TokenVerifier};
use crate::error::AppError;
use crate::metrics;

/// Request logging middleware.
pub async fn request_logging(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    tracing::debug!(
        method = %method,
        path = %path,
        "Incoming request"
    );

    let response = next.run(req).await;
    let duration = start.elapsed();

    tracing::info!(
        method = %method,
        path = %path,
        status = response.status().as_u16(),
        duration_ms = duration.as_millis() as u64,
        "Request completed"
    );

    response
}

/// Bearer-token authentication middleware.
pub async fn authenticate(
    State(verifier): State<Arc<TokenVerifier>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);

    let principal = match verifier.verify_bearer(header.as_deref()) {
        Ok(principal) => principal,
        Err(e) => {
            metrics::AUTH_REJECTIONS_TOTAL.inc();
            tracing::warn!(
                method = %req.method(),
                path = %req.uri().path(),
                error = %e,
                "Rejected bearer token"
            );
            return Err(e);
        }
    };

    if !principal.verified {
        metrics::UNVERIFIED_ACCEPTS_TOTAL.inc();
        tracing::warn!(
            method = %req.method(),
            path = %req.uri().path(),
            user_id = %principal.id,
            "Accepted bearer token without signature verification"
        );
    }

    // Cannot fail here: verify_bearer already parsed the same header.
    if let Ok(token) = auth::extract_bearer(header.as_deref()) {
        req.extensions_mut().insert(BearerToken(token.to_string()));
    }
    req.extensions_mut().insert(principal);

    Ok(next.run(req).await)
}

/// Role gate middleware. A request that never went through `authenticate`
/// carries no principal and is rejected, not passed through.
pub async fn require_role(
    State(expected): State<&'static str>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Some(principal) = req.extensions().get::<Principal>() else {
        tracing::warn!(
            method = %req.method(),
            path = %req.uri().path(),
            "Role check ran without an authenticated principal"
        );
        return Err(AppError::Forbidden);
    };

    if principal.role != expected {
        tracing::warn!(
            method = %req.method(),
            path = %req.uri().path(),
            user_id = %principal.id,
            role = %principal.role,
            required = %expected,
            "Role check failed"
        );
        return Err(AppError::Forbidden);
    }

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        Router,
        body::Body,
        http::{Request as HttpRequest, StatusCode},
        middleware::from_fn_with_state,
        routing::get,
    };
    use tower::ServiceExt;

    async fn guarded() -> &'static str {
        "ok"
    }

    fn principal(role: &str) -> Principal {
        Principal {
            id: "u1".to_string(),
            email: None,
            role: role.to_string(),
            verified: true,
            extra: serde_json::Map::new(),
        }
    }

    fn gate() -> Router {
        Router::new()
            .route("/guarded", get(guarded))
            .layer(from_fn_with_state("admin", require_role))
    }

    #[tokio::test]
    async fn test_role_gate_fails_closed_without_principal() {
        // No authenticate layer in front at all.
        let response = gate()
            .oneshot(
                HttpRequest::builder()
                    .uri("/guarded")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_role_gate_rejects_wrong_role() {
        let mut request = HttpRequest::builder()
            .uri("/guarded")
            .body(Body::empty())
            .unwrap();
        request.extensions_mut().insert(principal("staff"));

        let response = gate().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_role_gate_passes_matching_role() {
        let mut request = HttpRequest::builder()
            .uri("/guarded")
            .body(Body::empty())
            .unwrap();
        request.extensions_mut().insert(principal("admin"));

        let response = gate().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
