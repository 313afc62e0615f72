//! User API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;

use shared::error::{AppError, AppResult};
use shared::models::{UserCreate, UserProfile};

use crate::api::convert::{decode_document, decode_documents, store_error};
use crate::auth::{AdminUser, CurrentUser};
use crate::core::ServerState;
use crate::store::collections;
use crate::utils::time::now_millis;
use crate::utils::validation::{
    MAX_EMAIL_LEN, MAX_LIST_LIMIT, MAX_NAME_LEN, validate_required_text,
};

/// POST /api/users - create (or overwrite) a profile
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<UserCreate>,
) -> AppResult<(StatusCode, Json<UserProfile>)> {
    validate_required_text(&payload.user_id, "userId", MAX_NAME_LEN)?;
    validate_required_text(&payload.email, "email", MAX_EMAIL_LEN)?;

    let profile = UserProfile {
        user_id: payload.user_id,
        email: payload.email,
        display_name: payload.display_name,
        phone_numbers: payload.phone_numbers.unwrap_or_default(),
        device_token: payload.device_token,
        created_at: now_millis(),
    };

    let doc = serde_json::to_value(&profile).map_err(|e| AppError::internal(e.to_string()))?;
    state
        .store
        .set(collections::USERS, &profile.user_id, doc)
        .await
        .map_err(store_error)?;

    Ok((StatusCode::CREATED, Json(profile)))
}

/// GET /api/users/{id} - the caller's own profile
pub async fn get_profile(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<UserProfile>> {
    if id != user.user_id {
        return Err(AppError::forbidden("Profiles are self-only"));
    }

    let doc = state
        .store
        .get(collections::USERS, &id)
        .await
        .map_err(store_error)?
        .ok_or_else(|| AppError::not_found(format!("User {id}")))?;
    Ok(Json(decode_document(doc)?))
}

/// Query params for the admin user listing
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    MAX_LIST_LIMIT
}

/// GET /api/admin/users - all user profiles (bounded)
pub async fn admin_list(
    State(state): State<ServerState>,
    _admin: AdminUser,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<UserProfile>>> {
    let limit = query.limit.min(MAX_LIST_LIMIT);
    let docs = state
        .store
        .query(collections::USERS, &[], Some(limit))
        .await
        .map_err(store_error)?;

    let mut users: Vec<UserProfile> = decode_documents(docs);
    users.sort_by(|a, b| a.user_id.cmp(&b.user_id));
    Ok(Json(users))
}
