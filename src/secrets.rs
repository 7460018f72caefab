// ============================================================================
// Signing Secret Resolution
// ============================================================================
//
// Builds the ordered list of candidate secrets every service verifies
// bearer tokens against:
//
// 1. JWT_SECRET from the environment
// 2. JWT_SECRET parsed out of the shared dotenv file (SHARED_SECRET_FILE)
// 3. AUTH_SECRET, then TOKEN_SECRET from the environment
// 4. The development default
//
// Duplicates are removed keeping the first occurrence, so the order above is
// also the verification order. The shared file is read at most once per
// process; a missing or unreadable file is cached as "no shared secret".
//
// ============================================================================

use std::collections::HashSet;
use std::path::Path;

use once_cell::sync::OnceCell;

use crate::config::AuthConfig;

/// Last-resort secret so local development works with zero configuration.
pub const DEFAULT_DEV_SECRET: &str = "hr-dev-secret";

static SHARED_SECRET: OnceCell<Option<String>> = OnceCell::new();

/// Ordered, deduplicated candidate secrets for token verification.
#[derive(Debug, Clone)]
pub struct SecretChain {
    candidates: Vec<String>,
}

impl SecretChain {
    /// Resolve the chain from configuration, including the one-time shared
    /// file discovery.
    pub fn resolve(auth: &AuthConfig) -> Self {
        let shared = discover_shared_secret(auth.shared_secret_file.as_deref());
        let candidates = build_chain(auth, shared);

        if candidates.len() == 1 {
            tracing::warn!(
                "No signing secret configured, only the development default is active"
            );
        }

        Self { candidates }
    }

    /// Build a chain from an explicit candidate list, deduplicated in order.
    pub fn from_candidates(candidates: Vec<String>) -> Self {
        Self {
            candidates: dedup_preserving_order(candidates),
        }
    }

    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

fn build_chain(auth: &AuthConfig, shared: Option<String>) -> Vec<String> {
    let mut candidates = Vec::new();

    if let Some(secret) = &auth.jwt_secret {
        candidates.push(secret.clone());
    }
    if let Some(secret) = shared {
        candidates.push(secret);
    }
    candidates.extend(auth.alternate_secrets.iter().cloned());
    candidates.push(DEFAULT_DEV_SECRET.to_string());

    dedup_preserving_order(candidates)
}

fn dedup_preserving_order(candidates: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    candidates
        .into_iter()
        .filter(|candidate| seen.insert(candidate.clone()))
        .collect()
}

/// Read the shared signing secret from the dotenv-style file deployments
/// mount into every service. The result is cached for the process lifetime,
/// failures included.
fn discover_shared_secret(path: Option<&Path>) -> Option<String> {
    SHARED_SECRET
        .get_or_init(|| {
            let path = path?;
            match std::fs::read_to_string(path) {
                Ok(contents) => {
                    let secret = parse_secret_line(&contents);
                    if secret.is_none() {
                        tracing::warn!(
                            path = %path.display(),
                            "Shared secret file has no JWT_SECRET entry"
                        );
                    }
                    secret
                }
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        path = %path.display(),
                        "Failed to read shared secret file"
                    );
                    None
                }
            }
        })
        .clone()
}

/// Pull `JWT_SECRET=value` out of dotenv-style contents, tolerating `export`
/// prefixes, quotes and surrounding whitespace.
fn parse_secret_line(contents: &str) -> Option<String> {
    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let line = line
            .strip_prefix("export ")
            .map(str::trim_start)
            .unwrap_or(line);
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        if key.trim() != "JWT_SECRET" {
            continue;
        }
        let value = value.trim().trim_matches('"').trim_matches('\'');
        if !value.is_empty() {
            return Some(value.to_string());
        }
    }
    None
}
