//! Token verification boundary

use async_trait::async_trait;
use dashmap::DashMap;
use serde::Deserialize;
use thiserror::Error;

/// Identity check failure.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid or expired token")]
    InvalidToken,

    #[error("identity backend unreachable: {0}")]
    Unavailable(String),
}

/// Verifies a bearer token and returns the caller's stable user id.
///
/// The service trusts this id as the order owner and never the payload's own
/// user field.
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<String, AuthError>;
}

/// Defers verification to the auth backend over HTTP.
pub struct RemoteTokenVerifier {
    client: reqwest::Client,
    verify_url: String,
}

impl RemoteTokenVerifier {
    pub fn new(verify_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            verify_url: verify_url.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VerifyResponse {
    user_id: String,
}

#[async_trait]
impl TokenVerifier for RemoteTokenVerifier {
    async fn verify(&self, token: &str) -> Result<String, AuthError> {
        let response = self
            .client
            .post(&self.verify_url)
            .json(&serde_json::json!({ "token": token }))
            .send()
            .await
            .map_err(|e| AuthError::Unavailable(e.to_string()))?;

        if response.status() == reqwest::StatusCode::UNAUTHORIZED
            || response.status() == reqwest::StatusCode::FORBIDDEN
        {
            return Err(AuthError::InvalidToken);
        }
        if !response.status().is_success() {
            return Err(AuthError::Unavailable(format!(
                "verify endpoint returned HTTP {}",
                response.status()
            )));
        }

        response
            .json::<VerifyResponse>()
            .await
            .map(|v| v.user_id)
            .map_err(|e| AuthError::Unavailable(e.to_string()))
    }
}

/// Fixed token table for local development and tests, the same role the
/// auth mock plays for the production deployments' edge nodes.
#[derive(Debug, Default)]
pub struct StaticTokenVerifier {
    tokens: DashMap<String, String>,
}

impl StaticTokenVerifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `token` as belonging to `user_id`.
    pub fn insert(&self, token: impl Into<String>, user_id: impl Into<String>) {
        self.tokens.insert(token.into(), user_id.into());
    }
}

#[async_trait]
impl TokenVerifier for StaticTokenVerifier {
    async fn verify(&self, token: &str) -> Result<String, AuthError> {
        self.tokens
            .get(token)
            .map(|entry| entry.value().clone())
            .ok_or(AuthError::InvalidToken)
    }
}
