// ============================================================================
// Admin HR Handlers
// ============================================================================
//
// Orchestrated CRUD over the identity and profile services. Reads fan out
// concurrently; writes run identity-first so the identity service stays the
// source of truth for account existence. No rollback across services: a
// failed second leg leaves the first leg's result in place.
//
// ============================================================================

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde_json::{Map, Value, json};

use crate::admin::{AdminServiceContext, employees};
use crate::auth::BearerToken;
use crate::error::{AppError, AppResult};
use crate::metrics;

/// GET /admin/employees
pub async fn list_employees(
    State(ctx): State<Arc<AdminServiceContext>>,
    Extension(token): Extension<BearerToken>,
) -> AppResult<Json<Vec<employees::Employee>>> {
    let (users, profiles) = tokio::try_join!(
        ctx.identity.list_users(token.as_str()),
        ctx.profiles.list_profiles(token.as_str()),
    )?;

    let mut index = employees::index_profiles(profiles);
    let merged: Vec<_> = users
        .into_iter()
        .map(|user| {
            let profile = employees::id_key(&user.id).and_then(|key| index.remove(&key));
            employees::merge_employee(user, profile)
        })
        .collect();

    metrics::EMPLOYEE_OPERATIONS_TOTAL.inc();
    Ok(Json(merged))
}

/// GET /admin/employees/:id
pub async fn get_employee(
    State(ctx): State<Arc<AdminServiceContext>>,
    Extension(token): Extension<BearerToken>,
    Path(id): Path<String>,
) -> AppResult<Json<employees::Employee>> {
    let (user, profile) = tokio::join!(
        ctx.identity.get_user(token.as_str(), &id),
        ctx.profiles.get_profile(token.as_str(), &id),
    );

    // The identity record is the aggregate root: without it there is no
    // employee. A missing profile just means a sparse aggregate.
    let user = user?;
    let profile = match profile {
        Ok(profile) => Some(profile),
        Err(AppError::NotFound(_)) => None,
        Err(e) => return Err(e),
    };

    metrics::EMPLOYEE_OPERATIONS_TOTAL.inc();
    Ok(Json(employees::merge_employee(user, profile)))
}

/// POST /admin/employees
pub async fn create_employee(
    State(ctx): State<Arc<AdminServiceContext>>,
    Extension(token): Extension<BearerToken>,
    Json(payload): Json<Map<String, Value>>,
) -> AppResult<(StatusCode, Json<employees::Employee>)> {
    let (identity_fields, mut profile_fields) = employees::partition_fields(&payload);

    let user = ctx.identity.create_user(token.as_str(), &identity_fields).await?;

    // Attach the created account to the profile document. If this leg fails
    // the identity stays in place and the operator retries the profile.
    profile_fields.insert("user_id".to_string(), user.id.clone());
    if let Some(email) = &user.email {
        profile_fields.insert("email".to_string(), json!(email));
    }
    let profile = ctx.profiles.create_profile(token.as_str(), &profile_fields).await?;

    metrics::EMPLOYEE_OPERATIONS_TOTAL.inc();
    Ok((
        StatusCode::CREATED,
        Json(employees::merge_employee(user, Some(profile))),
    ))
}

/// PUT /admin/employees/:id
pub async fn update_employee(
    State(ctx): State<Arc<AdminServiceContext>>,
    Extension(token): Extension<BearerToken>,
    Path(id): Path<String>,
    Json(payload): Json<Map<String, Value>>,
) -> AppResult<Json<employees::Employee>> {
    let (identity_fields, profile_fields) = employees::partition_fields(&payload);

    // Sequential on purpose: an identity update failure (404 included) must
    // leave the profile untouched.
    let user = ctx
        .identity
        .update_user(token.as_str(), &id, &identity_fields)
        .await?;
    let profile = ctx
        .profiles
        .update_profile(token.as_str(), &id, &profile_fields)
        .await?;

    metrics::EMPLOYEE_OPERATIONS_TOTAL.inc();
    Ok(Json(employees::merge_employee(user, Some(profile))))
}

/// DELETE /admin/employees/:id
pub async fn delete_employee(
    State(ctx): State<Arc<AdminServiceContext>>,
    Extension(token): Extension<BearerToken>,
    Path(id): Path<String>,
) -> AppResult<Json<Value>> {
    // Profile leg first: an identity must never disappear while a profile
    // still references it. A missing profile is fine; any other failure
    // aborts before the identity is touched.
    match ctx.profiles.delete_profile(token.as_str(), &id).await {
        Ok(_) => {}
        Err(AppError::NotFound(_)) => {
            tracing::info!(employee_id = %id, "No profile to delete, removing identity only");
        }
        Err(e) => return Err(e),
    }

    ctx.identity.delete_user(token.as_str(), &id).await?;

    metrics::EMPLOYEE_OPERATIONS_TOTAL.inc();
    Ok(Json(json!({"message": "Employee deleted"})))
}
