// ============================================================================
// Authentication Flow Integration Tests
// ============================================================================
//
// Drives the admin service's token verification end to end: the candidate
// secret chain (primary, shared file, alternates), the role gate, the
// opt-in unverified fallback, and the counters tracking both outcomes.
//
// The shared-file discovery is memoized per process, so every service
// spawned in this binary points at the same file, written once below.
//
// ============================================================================


use std::path::PathBuf;

use chrono::Utc;
use once_cell::sync::Lazy;
use serde_json::{Value, json};
use test_utils::{
    TEST_SECRET, scrape_counter, seed_user, sign_token, spawn_admin_app_with, staff_token,
};
use workforce_server::config::AuthConfig;

const FILE_SECRET: &str = "file-discovered-secret";
const ALT_SECRET: &str = "legacy-rotation-secret";

static SHARED_SECRET_FILE: Lazy<PathBuf> = Lazy::new(|| {
    let path = std::env::temp_dir().join(format!("workforce-shared-{}.env", std::process::id()));
    std::fs::write(
        &path,
        format!("# written by deployment tooling\nexport JWT_SECRET=\"{}\"\n", FILE_SECRET),
    )
    .expect("Failed to write shared secret file");
    path
});

fn auth_config(allow_unverified: bool) -> AuthConfig {
    AuthConfig {
        jwt_secret: Some(TEST_SECRET.to_string()),
        alternate_secrets: vec![ALT_SECRET.to_string()],
        shared_secret_file: Some(SHARED_SECRET_FILE.clone()),
        allow_unverified,
    }
}

fn admin_claims() -> Value {
    json!({
        "id": "caller-1",
        "role": "admin",
        "exp": Utc::now().timestamp() + 3600,
    })
}

async fn list_with_token(token: Option<&str>, allow_unverified: bool) -> reqwest::Response {
    let app = spawn_admin_app_with(auth_config(allow_unverified)).await;
    seed_user(&app, json!({"id": "u1", "email": "a@example.com", "role": "staff"})).await;

    let mut request = reqwest::Client::new().get(app.employees_url());
    if let Some(token) = token {
        request = request.bearer_auth(token);
    }
    request.send().await.expect("Failed to call admin service")
}

#[tokio::test]
async fn test_primary_secret_token_is_accepted() {
    let token = sign_token(TEST_SECRET, &admin_claims());
    let response = list_with_token(Some(&token), false).await;
    assert_eq!(response.status(), reqwest::StatusCode::OK);
}

#[tokio::test]
async fn test_file_discovered_secret_token_is_accepted() {
    let token = sign_token(FILE_SECRET, &admin_claims());
    let response = list_with_token(Some(&token), false).await;
    assert_eq!(
        response.status(),
        reqwest::StatusCode::OK,
        "a token signed with the shared-file secret must verify"
    );
}

#[tokio::test]
async fn test_alternate_secret_token_is_accepted() {
    let token = sign_token(ALT_SECRET, &admin_claims());
    let response = list_with_token(Some(&token), false).await;
    assert_eq!(response.status(), reqwest::StatusCode::OK);
}

#[tokio::test]
async fn test_unknown_secret_token_is_rejected() {
    let token = sign_token("not-a-configured-secret", &admin_claims());
    let response = list_with_token(Some(&token), false).await;
    assert_eq!(response.status(), reqwest::StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_missing_token_is_401() {
    let response = list_with_token(None, false).await;
    assert_eq!(response.status(), reqwest::StatusCode::UNAUTHORIZED);

    let body: Value = response.json().await.expect("Failed to parse error body");
    assert_eq!(body["code"], "MISSING_TOKEN");
}

#[tokio::test]
async fn test_staff_role_is_403() {
    let response = list_with_token(Some(&staff_token()), false).await;
    assert_eq!(response.status(), reqwest::StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_missing_role_defaults_to_staff_and_fails_the_gate() {
    // Verified token with no role claim at all: the default is staff, which
    // the admin gate rejects as 403 (not 401, the token itself is fine).
    let token = sign_token(
        TEST_SECRET,
        &json!({"id": "caller-2", "exp": Utc::now().timestamp() + 3600}),
    );
    let response = list_with_token(Some(&token), false).await;
    assert_eq!(response.status(), reqwest::StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_claim_aliases_are_normalized() {
    let token = sign_token(
        TEST_SECRET,
        &json!({"sub": "caller-3", "user_role": "admin", "exp": Utc::now().timestamp() + 3600}),
    );
    let response = list_with_token(Some(&token), false).await;
    assert_eq!(response.status(), reqwest::StatusCode::OK);
}

#[tokio::test]
async fn test_unverified_token_rejected_by_default() {
    let token = sign_token("wrong-secret", &admin_claims());
    let response = list_with_token(Some(&token), false).await;
    assert_eq!(response.status(), reqwest::StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_unverified_token_accepted_when_enabled() {
    // Alias claims on purpose: the fallback normalizes the same way the
    // verified path does.
    let token = sign_token(
        "wrong-secret",
        &json!({"userId": "caller-4", "type": "admin"}),
    );
    let response = list_with_token(Some(&token), true).await;
    assert_eq!(response.status(), reqwest::StatusCode::OK);
}

#[tokio::test]
async fn test_unverified_token_without_role_is_rejected() {
    let token = sign_token("wrong-secret", &json!({"id": "caller-5"}));
    let response = list_with_token(Some(&token), true).await;
    assert_eq!(
        response.status(),
        reqwest::StatusCode::UNAUTHORIZED,
        "the fallback needs both id and role, no staff default applies"
    );
}

#[tokio::test]
async fn test_unverified_token_without_id_is_rejected() {
    let token = sign_token("wrong-secret", &json!({"role": "admin"}));
    let response = list_with_token(Some(&token), true).await;
    assert_eq!(response.status(), reqwest::StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_non_bearer_scheme_is_401() {
    let app = spawn_admin_app_with(auth_config(false)).await;

    let response = reqwest::Client::new()
        .get(app.employees_url())
        .header("authorization", "Basic dXNlcjpwYXNz")
        .send()
        .await
        .expect("Failed to call admin service");

    assert_eq!(response.status(), reqwest::StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_rejected_token_increments_the_rejection_counter() {
    let app = spawn_admin_app_with(auth_config(false)).await;
    let before = scrape_counter(&app.url(), "workforce_auth_rejections_total").await;

    let token = sign_token("not-a-configured-secret", &admin_claims());
    let response = reqwest::Client::new()
        .get(app.employees_url())
        .bearer_auth(token)
        .send()
        .await
        .expect("Failed to call admin service");
    assert_eq!(response.status(), reqwest::StatusCode::UNAUTHORIZED);

    // Counters are process-global and only grow, so a strict increase holds
    // even while other tests in this binary reject tokens concurrently.
    let after = scrape_counter(&app.url(), "workforce_auth_rejections_total").await;
    assert!(
        after > before,
        "a rejected token must increment the rejection counter ({} -> {})",
        before,
        after
    );
}

#[tokio::test]
async fn test_lenient_accept_increments_the_unverified_counter() {
    let app = spawn_admin_app_with(auth_config(true)).await;
    let before = scrape_counter(&app.url(), "workforce_unverified_accepts_total").await;

    let token = sign_token("wrong-secret", &json!({"id": "caller-6", "role": "admin"}));
    let response = reqwest::Client::new()
        .get(app.employees_url())
        .bearer_auth(token)
        .send()
        .await
        .expect("Failed to call admin service");
    assert_eq!(response.status(), reqwest::StatusCode::OK);

    let after = scrape_counter(&app.url(), "workforce_unverified_accepts_total").await;
    assert!(
        after > before,
        "a leniently accepted token must increment the unverified counter ({} -> {})",
        before,
        after
    );
}
