use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Daemon endpoint names and paths.
///
/// Feed endpoints are `POST {daemon_url}/feed/<name>` with a JSON body.
pub mod endpoints {
    pub const FEED_PREFIX: &str = "/feed/";

    pub const GET_FEED_INFO: &str = "getFeedInfo";
    pub const GET_NUM_LOCAL_MESSAGES: &str = "getNumLocalMessages";
    pub const APPEND_MESSAGES: &str = "appendMessages";
    pub const WATCH_FOR_NEW_MESSAGES: &str = "watchForNewMessages";
    pub const CREATE_FEED: &str = "createFeed";
    pub const DELETE_FEED: &str = "deleteFeed";

    /// `GET` liveness probe.
    pub const PROBE: &str = "/probe";

    pub const ALL_FEED: [&str; 6] = [
        GET_FEED_INFO,
        GET_NUM_LOCAL_MESSAGES,
        APPEND_MESSAGES,
        WATCH_FOR_NEW_MESSAGES,
        CREATE_FEED,
        DELETE_FEED,
    ];

    /// Path of a feed endpoint, e.g. `/feed/getFeedInfo`.
    pub fn feed_path(name: &str) -> String {
        format!("{FEED_PREFIX}{name}")
    }
}

/// Probe response.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbeResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub daemon_version: Option<String>,
    /// Anything else the daemon reports.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl Default for ProbeResponse {
    fn default() -> Self {
        Self {
            success: true,
            daemon_version: Some(env!("CARGO_PKG_VERSION").into()),
            extra: serde_json::Map::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn probe_response_defaults() {
        let p = ProbeResponse::default();
        assert!(p.success);
        assert!(p.daemon_version.is_some());
    }

    #[test]
    fn probe_keeps_unknown_fields() {
        let p: ProbeResponse =
            serde_json::from_str(r#"{"success":true,"daemonVersion":"0.9","nodeId":"n1"}"#).unwrap();
        assert_eq!(p.daemon_version.as_deref(), Some("0.9"));
        assert_eq!(p.extra["nodeId"], "n1");
    }

    #[test]
    fn endpoint_paths() {
        assert_eq!(endpoints::feed_path(endpoints::GET_FEED_INFO), "/feed/getFeedInfo");
        assert_eq!(
            endpoints::feed_path(endpoints::WATCH_FOR_NEW_MESSAGES),
            "/feed/watchForNewMessages"
        );
        assert_eq!(endpoints::PROBE, "/probe");
    }
}
