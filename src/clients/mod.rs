// ============================================================================
// Downstream Service Clients
// ============================================================================
//
// REST clients for the collaborator services the admin aggregation composes.
// Every call forwards the caller's bearer token unchanged and shares one
// pooled HTTP client with a per-call timeout. Error statuses are mapped into
// the shared taxonomy: 404 NotFound, 409 Conflict, 400 Validation, anything
// else Upstream.
//
// ============================================================================

pub mod identity;
pub mod profile;

use std::time::Duration;

use axum::http::StatusCode;
use serde_json::Value;

use crate::error::{AppError, AppResult};

pub use identity::{IdentityClient, IdentityRecord};
pub use profile::{ProfileClient, ProfileRecord};

/// Build the pooled HTTP client shared by all downstream calls.
pub fn build_http_client(timeout_secs: u64) -> AppResult<reqwest::Client> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .tcp_keepalive(Duration::from_secs(30))
        .pool_max_idle_per_host(10)
        .pool_idle_timeout(Duration::from_secs(90))
        .build()?;
    Ok(client)
}

/// Read a downstream response as JSON, converting error statuses into the
/// shared taxonomy.
pub(crate) async fn expect_json<T: serde::de::DeserializeOwned>(
    resource: &'static str,
    response: reqwest::Response,
) -> AppResult<T> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json().await?);
    }
    Err(map_error_status(resource, status, read_message(response).await))
}

/// Best-effort extraction of the upstream `{"message": ...}` body.
async fn read_message(response: reqwest::Response) -> Option<String> {
    response
        .json::<Value>()
        .await
        .ok()
        .and_then(|body| body.get("message").and_then(Value::as_str).map(str::to_string))
}

fn map_error_status(resource: &'static str, status: StatusCode, detail: Option<String>) -> AppError {
    if status == StatusCode::NOT_FOUND {
        AppError::not_found(capitalize(resource))
    } else if status == StatusCode::CONFLICT {
        AppError::conflict(detail.unwrap_or_else(|| format!("{} already exists", capitalize(resource))))
    } else if status == StatusCode::BAD_REQUEST {
        AppError::validation(detail.unwrap_or_else(|| format!("Invalid {} payload", resource)))
    } else {
        AppError::upstream(format!("{} service responded with {}", resource, status))
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
