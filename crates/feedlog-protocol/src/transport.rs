use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;
use tracing::debug;

use crate::config::ClientConfig;
use crate::error::{ProtocolError, ProtocolResult};

/// The port through which every daemon request travels.
///
/// `path` is daemon-relative (`/feed/getFeedInfo`, `/probe`). An
/// implementation returns the decoded JSON body and reports network or
/// HTTP failures as errors; it does not interpret the `success` field.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn post_json(&self, path: &str, body: &Value) -> ProtocolResult<Value>;
    async fn get_json(&self, path: &str) -> ProtocolResult<Value>;
}

/// [`Transport`] over HTTP with `reqwest`.
#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: reqwest::Client,
    config: ClientConfig,
}

impl HttpTransport {
    pub fn new(config: ClientConfig) -> ProtocolResult<Self> {
        let mut headers = HeaderMap::new();
        for (name, value) in &config.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| ProtocolError::Config(format!("header {name:?}: {e}")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| ProtocolError::Config(format!("header {name}: {e}")))?;
            headers.insert(name, value);
        }
        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| ProtocolError::Config(e.to_string()))?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// The request timeout, stretched by the long-poll wait if the body
    /// carries one.
    fn timeout_for(&self, body: &Value) -> Duration {
        let wait = body.get("waitMsec").and_then(Value::as_u64).unwrap_or(0);
        self.config.request_timeout() + Duration::from_millis(wait)
    }

    async fn read_json(path: &str, response: reqwest::Response) -> ProtocolResult<Value> {
        let status = response.status();
        if !status.is_success() {
            return Err(ProtocolError::Http {
                endpoint: path.to_string(),
                status: status.as_u16(),
            });
        }
        response
            .json::<Value>()
            .await
            .map_err(|e| ProtocolError::MalformedResponse {
                endpoint: path.to_string(),
                reason: e.to_string(),
            })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post_json(&self, path: &str, body: &Value) -> ProtocolResult<Value> {
        let url = self.config.url_for(path);
        debug!(url = %url, "POST");
        let response = self
            .client
            .post(&url)
            .timeout(self.timeout_for(body))
            .json(body)
            .send()
            .await
            .map_err(|e| ProtocolError::Transport(e.to_string()))?;
        Self::read_json(path, response).await
    }

    async fn get_json(&self, path: &str) -> ProtocolResult<Value> {
        let url = self.config.url_for(path);
        debug!(url = %url, "GET");
        let response = self
            .client
            .get(&url)
            .timeout(self.config.request_timeout())
            .send()
            .await
            .map_err(|e| ProtocolError::Transport(e.to_string()))?;
        Self::read_json(path, response).await
    }
}
