// ============================================================================
// Employee Aggregation
// ============================================================================
//
// Pure merge and partition logic for the composed employee view:
// - merge_employee: identity record + optional profile -> Employee
// - index_profiles: profile list -> map keyed by owning user id
// - partition_fields: composed write payload -> (identity fields, profile fields)
//
// ============================================================================

use std::collections::HashMap;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::clients::{IdentityRecord, ProfileRecord};

/// Fields owned by the identity service in composed writes. `email` lives on
/// both sides so either service can answer address lookups on its own.
const IDENTITY_OWNED_FIELDS: [&str; 3] = ["email", "role", "password"];

/// Fields that must never reach the profile service.
const IDENTITY_ONLY_FIELDS: [&str; 2] = ["role", "password"];

/// Composed employee view: one identity record plus its optional profile.
/// Never persisted anywhere; recomputed on every read.
#[derive(Debug, Clone, Serialize)]
pub struct Employee {
    pub id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Earliest known start date: profile creation time first, identity
    /// creation time as the fallback.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub joined_at: Option<Value>,
    pub profile: Option<ProfileRecord>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

pub fn merge_employee(identity: IdentityRecord, profile: Option<ProfileRecord>) -> Employee {
    let joined_at = profile
        .as_ref()
        .and_then(|profile| profile.created_at.clone())
        .or_else(|| identity.created_at.clone());

    Employee {
        id: identity.id,
        email: identity.email,
        role: identity.role,
        joined_at,
        profile,
        extra: identity.extra,
    }
}

/// Stringify an id-like value so string and numeric ids compare equal when
/// joining the two collections.
pub fn id_key(value: &Value) -> Option<String> {
    match value {
        Value::String(value) if !value.is_empty() => Some(value.clone()),
        Value::Number(value) => Some(value.to_string()),
        _ => None,
    }
}

/// Index profiles by their owning user id. Profiles without one cannot be
/// joined and are dropped.
pub fn index_profiles(profiles: Vec<ProfileRecord>) -> HashMap<String, ProfileRecord> {
    let mut index = HashMap::with_capacity(profiles.len());
    for profile in profiles {
        if let Some(key) = profile.user_id.as_ref().and_then(id_key) {
            index.insert(key, profile);
        }
    }
    index
}

/// Split a composed write payload into the identity-service part and the
/// profile-service part. Unknown fields all belong to the profile.
pub fn partition_fields(payload: &Map<String, Value>) -> (Map<String, Value>, Map<String, Value>) {
    let mut identity = Map::new();
    let mut profile = Map::new();

    for (key, value) in payload {
        if IDENTITY_OWNED_FIELDS.contains(&key.as_str()) {
            identity.insert(key.clone(), value.clone());
        }
        if !IDENTITY_ONLY_FIELDS.contains(&key.as_str()) {
            profile.insert(key.clone(), value.clone());
        }
    }

    (identity, profile)
}
