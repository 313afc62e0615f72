//! Bearer token extractors
//!
//! Use these in protected handlers to validate the caller before any work:
//! [`CurrentUser`] resolves an app-user token through the identity boundary,
//! [`AdminUser`] checks the token against the admin collection.

use axum::{extract::FromRequestParts, http::request::Parts};

use shared::error::AppError;

use crate::auth::{AdminUser, AuthError, CurrentUser, extract_bearer};
use crate::core::ServerState;
use crate::store::collections;

fn bearer_from_parts(parts: &Parts) -> Result<&str, AppError> {
    let header = parts
        .headers
        .get(http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or(AppError::Unauthorized)?;
    extract_bearer(header).ok_or(AppError::InvalidToken)
}

impl FromRequestParts<ServerState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        // Check if already extracted earlier in this request
        if let Some(user) = parts.extensions.get::<CurrentUser>() {
            return Ok(user.clone());
        }

        let token = bearer_from_parts(parts)?;
        let user_id = state.verifier.verify(token).await.map_err(|e| match e {
            AuthError::InvalidToken => {
                tracing::warn!(target: "security", uri = %parts.uri, "token verification failed");
                AppError::InvalidToken
            }
            AuthError::Unavailable(msg) => AppError::internal(msg),
        })?;

        let user = CurrentUser { user_id };
        parts.extensions.insert(user.clone());
        Ok(user)
    }
}

impl FromRequestParts<ServerState> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(admin) = parts.extensions.get::<AdminUser>() {
            return Ok(admin.clone());
        }

        // The admin token is the admin document id itself; it is valid as
        // long as the record exists.
        let token = bearer_from_parts(parts)?;
        let record = state
            .store
            .get(collections::ADMINS, token)
            .await
            .map_err(|e| AppError::database(e.to_string()))?;

        if record.is_none() {
            tracing::warn!(target: "security", uri = %parts.uri, "rejected non-admin token");
            return Err(AppError::forbidden("Admin access required"));
        }

        let admin = AdminUser {
            admin_id: token.to_string(),
        };
        parts.extensions.insert(admin.clone());
        Ok(admin)
    }
}
