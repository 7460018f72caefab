// ============================================================================
// Error Handling
// ============================================================================
//
// One error type for every service in the workspace. Each variant knows its
// HTTP status, its machine-readable code and how much detail the caller is
// allowed to see. Anything in the 5xx range is logged in full and returned
// as a generic "Internal server error".
//
// ============================================================================

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    // ===== Authentication & Authorization =====
    #[error("Missing bearer token")]
    MissingToken,

    #[error("Invalid or unverifiable token")]
    InvalidToken,

    #[error("Token payload missing a user identifier")]
    InvalidTokenPayload,

    #[error("Insufficient role for this operation")]
    Forbidden,

    // ===== Resource errors =====
    #[error("{0} not found")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation error: {0}")]
    Validation(String),

    // ===== Downstream services =====
    #[error("Upstream service error: {0}")]
    Upstream(String),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    // ===== Serialization =====
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // ===== Internal =====
    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Unknown error: {0}")]
    Unknown(#[from] anyhow::Error),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::MissingToken | AppError::InvalidToken | AppError::InvalidTokenPayload => {
                StatusCode::UNAUTHORIZED
            }
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Upstream(_) | AppError::Http(_) => StatusCode::BAD_GATEWAY,
            AppError::Json(_) | AppError::Internal(_) | AppError::Unknown(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message safe to show to the caller. Downstream and internal detail
    /// never crosses this boundary.
    pub fn user_message(&self) -> String {
        match self {
            AppError::MissingToken => "Missing authentication token".to_string(),
            AppError::InvalidToken => "Invalid or expired token".to_string(),
            AppError::InvalidTokenPayload => "Token is missing required claims".to_string(),
            AppError::Forbidden => "Access denied".to_string(),
            AppError::NotFound(what) => format!("{} not found", what),
            AppError::Conflict(msg) => msg.clone(),
            AppError::Validation(msg) => format!("Validation error: {}", msg),
            AppError::Upstream(_) | AppError::Http(_) => "Upstream service error".to_string(),
            _ => "Internal server error".to_string(),
        }
    }

    /// Machine-readable error code for clients.
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::MissingToken => "MISSING_TOKEN",
            AppError::InvalidToken => "INVALID_TOKEN",
            AppError::InvalidTokenPayload => "INVALID_TOKEN_PAYLOAD",
            AppError::Forbidden => "FORBIDDEN",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Conflict(_) => "CONFLICT",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Upstream(_) => "UPSTREAM_ERROR",
            AppError::Http(_) => "HTTP_CLIENT_ERROR",
            AppError::Json(_) => "JSON_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
            AppError::Unknown(_) => "UNKNOWN_ERROR",
        }
    }

    /// Log with severity matching the status class: 5xx as error, auth
    /// failures as warn, the rest as debug.
    pub fn log(&self) {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!(
                error = %self,
                error_code = self.error_code(),
                status = status.as_u16(),
                "Request failed"
            );
        } else if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            tracing::warn!(
                error = %self,
                error_code = self.error_code(),
                status = status.as_u16(),
                "Request rejected"
            );
        } else {
            tracing::debug!(
                error = %self,
                error_code = self.error_code(),
                status = status.as_u16(),
                "Request error"
            );
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.log();

        let status = self.status_code();
        let body = json!({
            "message": self.user_message(),
            "code": self.error_code(),
            "status": status.as_u16(),
        });

        (status, Json(body)).into_response()
    }
}

// ===== Helper constructors =====

impl AppError {
    pub fn not_found(what: impl Into<String>) -> Self {
        AppError::NotFound(what.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        AppError::Conflict(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn upstream(msg: impl Into<String>) -> Self {
        AppError::Upstream(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }
}
