// ============================================================================
// Configuration
// ============================================================================
//
// All configuration comes from environment variables (with a .env file for
// local development). Every value has a default so a bare `cargo run` starts
// a working local instance.
//
// ============================================================================

use std::path::PathBuf;

use anyhow::Result;

// Default listen port; each deployment sets PORT per service
const DEFAULT_PORT: u16 = 8000;

// Default service locations for local development
const DEFAULT_IDENTITY_URL: &str = "http://localhost:8001";
const DEFAULT_PROFILE_URL: &str = "http://localhost:8002";
const DEFAULT_ADMIN_URL: &str = "http://localhost:8003";
const DEFAULT_PAYROLL_URL: &str = "http://localhost:8004";
const DEFAULT_DEPARTMENT_URL: &str = "http://localhost:8005";

// Default per-call timeout for downstream requests (seconds)
const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 30;

/// Token verification settings.
#[derive(Clone, Debug)]
pub struct AuthConfig {
    /// Primary signing secret (JWT_SECRET)
    pub jwt_secret: Option<String>,
    /// Alternate secrets tried after the primary and the shared file,
    /// in priority order (AUTH_SECRET, then TOKEN_SECRET)
    pub alternate_secrets: Vec<String>,
    /// Dotenv-style file the deployment shares between services
    /// (SHARED_SECRET_FILE); read at most once per process
    pub shared_secret_file: Option<PathBuf>,
    /// Accept tokens whose signature cannot be verified with any candidate,
    /// as long as the claims carry both an id and a role
    /// (AUTH_ALLOW_UNVERIFIED, default false)
    pub allow_unverified: bool,
}

/// Downstream service locations.
#[derive(Clone, Debug)]
pub struct ServicesConfig {
    pub identity_url: String,
    pub profile_url: String,
    pub admin_url: String,
    pub payroll_url: String,
    pub department_url: String,
    /// Per-call timeout for downstream HTTP requests (seconds)
    pub request_timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub auth: AuthConfig,
    pub services: ServicesConfig,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_PORT),
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            auth: AuthConfig {
                jwt_secret: non_empty_var("JWT_SECRET"),
                alternate_secrets: ["AUTH_SECRET", "TOKEN_SECRET"]
                    .iter()
                    .filter_map(|name| non_empty_var(name))
                    .collect(),
                shared_secret_file: non_empty_var("SHARED_SECRET_FILE").map(PathBuf::from),
                allow_unverified: std::env::var("AUTH_ALLOW_UNVERIFIED")
                    .unwrap_or_else(|_| "false".to_string())
                    .parse()
                    .unwrap_or(false),
            },
            services: ServicesConfig {
                identity_url: std::env::var("IDENTITY_SERVICE_URL")
                    .unwrap_or_else(|_| DEFAULT_IDENTITY_URL.to_string()),
                profile_url: std::env::var("PROFILE_SERVICE_URL")
                    .unwrap_or_else(|_| DEFAULT_PROFILE_URL.to_string()),
                admin_url: std::env::var("ADMIN_SERVICE_URL")
                    .unwrap_or_else(|_| DEFAULT_ADMIN_URL.to_string()),
                payroll_url: std::env::var("PAYROLL_SERVICE_URL")
                    .unwrap_or_else(|_| DEFAULT_PAYROLL_URL.to_string()),
                department_url: std::env::var("DEPARTMENT_SERVICE_URL")
                    .unwrap_or_else(|_| DEFAULT_DEPARTMENT_URL.to_string()),
                request_timeout_secs: std::env::var("UPSTREAM_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_UPSTREAM_TIMEOUT_SECS),
            },
        })
    }
}

/// Read an env var, treating unset and blank as absent.
fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .filter(|value| !value.trim().is_empty())
}
