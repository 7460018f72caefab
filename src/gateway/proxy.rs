// ============================================================================
// Gateway Proxy
// ============================================================================
//
// Buffers each inbound request fully and replays it against the target
// service. JSON bodies (by inbound Content-Type) are parsed and re-encoded
// so the outbound Content-Length always matches the bytes actually sent,
// whatever the caller declared. Anything else is forwarded byte-for-byte.
//
// Handles:
// - Method, path and query preservation
// - Header pass-through (host and the recomputed body headers excluded)
// - Response reconstruction with the downstream status and headers
//
// ============================================================================

use axum::{
    body::{Body, to_bytes},
    extract::Request,
    http::{Response, header},
};
use bytes::Bytes;
use serde_json::Value;

use crate::error::{AppError, AppResult};

pub struct ServiceProxy {
    http: reqwest::Client,
}

impl ServiceProxy {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }

    /// Forward a request to `service_url`, preserving method, path, query
    /// and headers.
    pub async fn forward(&self, service_url: &str, request: Request) -> AppResult<Response<Body>> {
        let path = request.uri().path();
        let target_url = match request.uri().query() {
            Some(query) => format!("{}{}?{}", service_url, path, query),
            None => format!("{}{}", service_url, path),
        };

        let method = request.method().clone();
        let headers = request.headers().clone();

        let (_parts, body) = request.into_parts();
        let body_bytes = to_bytes(body, usize::MAX)
            .await
            .map_err(|e| AppError::internal(format!("Failed to buffer request body: {}", e)))?;

        let json_body = reencode_json(&headers, &body_bytes)?;

        let mut outbound = self.http.request(method, &target_url);
        for (key, value) in headers.iter() {
            // Host and Content-Length are recomputed for the new connection;
            // Content-Type only survives for non-JSON bodies.
            if *key == header::HOST || *key == header::CONTENT_LENGTH {
                continue;
            }
            if json_body.is_some() && *key == header::CONTENT_TYPE {
                continue;
            }
            outbound = outbound.header(key, value);
        }

        if let Some(encoded) = json_body {
            outbound = outbound
                .header(header::CONTENT_TYPE, "application/json")
                .body(encoded);
        } else if !body_bytes.is_empty() {
            outbound = outbound.body(body_bytes);
        }

        let response = outbound.send().await?;

        let mut builder = Response::builder().status(response.status());
        for (key, value) in response.headers().iter() {
            builder = builder.header(key, value);
        }
        let bytes = response.bytes().await?;

        builder
            .body(Body::from(bytes))
            .map_err(|e| AppError::internal(format!("Failed to rebuild response: {}", e)))
    }
}

/// Re-encode the body when the caller declared JSON. Returns the compact
/// bytes to send, or None when the body should pass through untouched.
fn reencode_json(headers: &axum::http::HeaderMap, body: &Bytes) -> AppResult<Option<Vec<u8>>> {
    if body.is_empty() {
        return Ok(None);
    }

    let declared_json = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.starts_with("application/json"))
        .unwrap_or(false);
    if !declared_json {
        return Ok(None);
    }

    let parsed: Value = serde_json::from_slice(body)?;
    Ok(Some(serde_json::to_vec(&parsed)?))
}
