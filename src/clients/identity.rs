// ============================================================================
// Identity Service Client
// ============================================================================

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::clients::expect_json;
use crate::error::AppResult;

/// Account record owned by the identity service. Creation time and id are
/// kept opaque; unknown fields pass through in `extra`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityRecord {
    pub id: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, alias = "createdAt", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// REST client for the identity service (`/users`).
#[derive(Clone)]
pub struct IdentityClient {
    http: reqwest::Client,
    base_url: String,
}

impl IdentityClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    pub async fn list_users(&self, token: &str) -> AppResult<Vec<IdentityRecord>> {
        let response = self
            .http
            .get(format!("{}/users", self.base_url))
            .bearer_auth(token)
            .send()
            .await?;
        expect_json("user", response).await
    }

    pub async fn get_user(&self, token: &str, id: &str) -> AppResult<IdentityRecord> {
        let response = self
            .http
            .get(format!("{}/users/{}", self.base_url, id))
            .bearer_auth(token)
            .send()
            .await?;
        expect_json("user", response).await
    }

    pub async fn create_user(&self, token: &str, fields: &Map<String, Value>) -> AppResult<IdentityRecord> {
        let response = self
            .http
            .post(format!("{}/users", self.base_url))
            .bearer_auth(token)
            .json(fields)
            .send()
            .await?;
        expect_json("user", response).await
    }

    pub async fn update_user(
        &self,
        token: &str,
        id: &str,
        fields: &Map<String, Value>,
    ) -> AppResult<IdentityRecord> {
        let response = self
            .http
            .put(format!("{}/users/{}", self.base_url, id))
            .bearer_auth(token)
            .json(fields)
            .send()
            .await?;
        expect_json("user", response).await
    }

    pub async fn delete_user(&self, token: &str, id: &str) -> AppResult<Value> {
        let response = self
            .http
            .delete(format!("{}/users/{}", self.base_url, id))
            .bearer_auth(token)
            .send()
            .await?;
        expect_json("user", response).await
    }
}
