use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ProtocolError, ProtocolResult};

/// Default daemon address.
pub const DEFAULT_DAEMON_URL: &str = "http://localhost:20431";

/// How to reach the daemon.
///
/// Passed explicitly to [`HttpTransport`](crate::HttpTransport); nothing in
/// the client reads ambient process state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL, without a trailing slash.
    pub daemon_url: String,
    /// Extra headers sent with every request (e.g. an auth code).
    pub headers: BTreeMap<String, String>,
    /// Per-request timeout. Long-polls add their `waitMsec` on top.
    pub request_timeout_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            daemon_url: DEFAULT_DAEMON_URL.to_string(),
            headers: BTreeMap::new(),
            request_timeout_ms: 30_000,
        }
    }
}

impl ClientConfig {
    pub fn new(daemon_url: impl Into<String>) -> Self {
        Self {
            daemon_url: daemon_url.into(),
            ..Self::default()
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Absolute URL of `path` on the daemon.
    pub fn url_for(&self, path: &str) -> String {
        format!("{}{}", self.daemon_url.trim_end_matches('/'), path)
    }

    pub fn from_toml_str(s: &str) -> ProtocolResult<Self> {
        toml::from_str(s).map_err(|e| ProtocolError::Config(e.to_string()))
    }

    /// Load from a TOML file. Missing keys take their defaults.
    pub fn load(path: &Path) -> ProtocolResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let c = ClientConfig::default();
        assert_eq!(c.daemon_url, DEFAULT_DAEMON_URL);
        assert!(c.headers.is_empty());
        assert_eq!(c.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn url_join_tolerates_trailing_slash() {
        let c = ClientConfig::new("http://host:1/");
        assert_eq!(c.url_for("/feed/createFeed"), "http://host:1/feed/createFeed");
    }

    #[test]
    fn partial_toml_uses_defaults() {
        let c = ClientConfig::from_toml_str(
            r#"
            daemon_url = "http://example:9"

            [headers]
            X-Client-Auth-Code = "secret"
            "#,
        )
        .unwrap();
        assert_eq!(c.daemon_url, "http://example:9");
        assert_eq!(c.headers["X-Client-Auth-Code"], "secret");
        assert_eq!(c.request_timeout_ms, 30_000);
    }

    #[test]
    fn bad_toml_is_config_error() {
        assert!(matches!(
            ClientConfig::from_toml_str("daemon_url = 3"),
            Err(ProtocolError::Config(_))
        ));
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("client.toml");
        std::fs::write(&path, "request_timeout_ms = 500\n").unwrap();
        let c = ClientConfig::load(&path).unwrap();
        assert_eq!(c.request_timeout(), Duration::from_millis(500));
    }
}
