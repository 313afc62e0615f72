//! Push gateway clients

use async_trait::async_trait;
use serde_json::{Value, json};

use super::{PushError, PushGateway};

/// HTTP push client.
///
/// POSTs the device message to the configured gateway endpoint with the
/// server key in the Authorization header. Non-2xx responses are reported as
/// rejections; the caller decides whether that matters (it never does - push
/// is best-effort everywhere in this service).
pub struct HttpPushGateway {
    client: reqwest::Client,
    endpoint: String,
    server_key: String,
}

impl HttpPushGateway {
    pub fn new(endpoint: impl Into<String>, server_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            server_key: server_key.into(),
        }
    }
}

#[async_trait]
impl PushGateway for HttpPushGateway {
    async fn send(
        &self,
        device_token: &str,
        title: &str,
        body: &str,
        data: &Value,
    ) -> Result<(), PushError> {
        let payload = json!({
            "to": device_token,
            "notification": {
                "title": title,
                "body": body,
            },
            "data": data,
        });

        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("key={}", self.server_key))
            .json(&payload)
            .send()
            .await
            .map_err(|e| PushError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(PushError::Rejected(format!("HTTP {}", response.status())));
        }
        Ok(())
    }
}

/// Fallback gateway used when no push endpoint is configured. Logs the
/// message and reports success.
#[derive(Debug, Default)]
pub struct NoopPushGateway;

#[async_trait]
impl PushGateway for NoopPushGateway {
    async fn send(
        &self,
        device_token: &str,
        title: &str,
        _body: &str,
        _data: &Value,
    ) -> Result<(), PushError> {
        tracing::debug!(token = device_token, title, "push gateway disabled, dropping message");
        Ok(())
    }
}
