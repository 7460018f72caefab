// ============================================================================
// Profile Service Client
// ============================================================================

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::clients::expect_json;
use crate::error::AppResult;

/// HR profile document owned by the profile service. `user_id` is the
/// foreign key back to the identity record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(default, alias = "userId", skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, alias = "createdAt", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// REST client for the profile service (`/profiles`). Individual profiles
/// are addressed by their owning user id, not by the document id.
#[derive(Clone)]
pub struct ProfileClient {
    http: reqwest::Client,
    base_url: String,
}

impl ProfileClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    pub async fn list_profiles(&self, token: &str) -> AppResult<Vec<ProfileRecord>> {
        let response = self
            .http
            .get(format!("{}/profiles", self.base_url))
            .bearer_auth(token)
            .send()
            .await?;
        expect_json("profile", response).await
    }

    pub async fn get_profile(&self, token: &str, user_id: &str) -> AppResult<ProfileRecord> {
        let response = self
            .http
            .get(format!("{}/profiles/{}", self.base_url, user_id))
            .bearer_auth(token)
            .send()
            .await?;
        expect_json("profile", response).await
    }

    pub async fn create_profile(
        &self,
        token: &str,
        fields: &Map<String, Value>,
    ) -> AppResult<ProfileRecord> {
        let response = self
            .http
            .post(format!("{}/profiles", self.base_url))
            .bearer_auth(token)
            .json(fields)
            .send()
            .await?;
        expect_json("profile", response).await
    }

    pub async fn update_profile(
        &self,
        token: &str,
        user_id: &str,
        fields: &Map<String, Value>,
    ) -> AppResult<ProfileRecord> {
        let response = self
            .http
            .put(format!("{}/profiles/{}", self.base_url, user_id))
            .bearer_auth(token)
            .json(fields)
            .send()
            .await?;
        expect_json("profile", response).await
    }

    pub async fn delete_profile(&self, token: &str, user_id: &str) -> AppResult<Value> {
        let response = self
            .http
            .delete(format!("{}/profiles/{}", self.base_url, user_id))
            .bearer_auth(token)
            .send()
            .await?;
        expect_json("profile", response).await
    }
}
