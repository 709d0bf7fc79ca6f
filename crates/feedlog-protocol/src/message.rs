//! JSON request and response bodies of the feed endpoints.
//!
//! Field names are camelCase on the wire. Every response also carries
//! `success` and, on failure, `error`; that envelope is checked by
//! [`check_success`] before the typed body is decoded.

use std::collections::BTreeMap;

use feedlog_types::{Channel, FeedId, Message, SubfeedHash};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ProtocolError, ProtocolResult};

/// Body of `getFeedInfo` and `deleteFeed`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedIdRequest {
    pub feed_id: FeedId,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetFeedInfoResponse {
    pub is_writeable: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetNumLocalMessagesRequest {
    pub feed_id: FeedId,
    pub subfeed_hash: SubfeedHash,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetNumLocalMessagesResponse {
    pub num_messages: u64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppendMessagesRequest {
    pub feed_id: FeedId,
    pub subfeed_hash: SubfeedHash,
    pub messages: Vec<Message>,
}

/// Body of `createFeed`. The daemon requires no fields.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CreateFeedRequest {}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateFeedResponse {
    pub feed_id: FeedId,
}

/// One entry of a `watchForNewMessages` request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireSubfeedWatch {
    pub feed_id: FeedId,
    pub subfeed_hash: SubfeedHash,
    pub channel_name: Channel,
    pub position: u64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchForNewMessagesRequest {
    pub subfeed_watches: BTreeMap<String, WireSubfeedWatch>,
    pub wait_msec: u64,
    pub signed: bool,
    /// `0` means no limit.
    pub max_num_messages: u64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchForNewMessagesResponse {
    pub messages: BTreeMap<String, Vec<Message>>,
}

/// The `{success, error}` envelope shared by every response.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Envelope {
    pub fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(message.into()),
        }
    }
}

/// Fail with [`ProtocolError::Remote`] unless the response says `success: true`.
///
/// The daemon's `error` text is kept verbatim.
pub fn check_success(endpoint: &str, response: &Value) -> ProtocolResult<()> {
    if response.get("success").and_then(Value::as_bool) == Some(true) {
        return Ok(());
    }
    let message = match response.get("error") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => "unknown error".to_string(),
        Some(other) => other.to_string(),
    };
    Err(ProtocolError::Remote {
        endpoint: endpoint.to_string(),
        message,
    })
}

/// Decode a typed body from a successful response.
pub fn decode<T: serde::de::DeserializeOwned>(endpoint: &str, response: Value) -> ProtocolResult<T> {
    serde_json::from_value(response).map_err(|e| ProtocolError::MalformedResponse {
        endpoint: endpoint.to_string(),
        reason: e.to_string(),
    })
}

/// Encode a request body.
pub fn encode<T: Serialize>(request: &T) -> ProtocolResult<Value> {
    serde_json::to_value(request).map_err(|e| ProtocolError::Serialization(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn feed_id() -> FeedId {
        FeedId::new("f1").unwrap()
    }

    fn hash() -> SubfeedHash {
        SubfeedHash::parse(&"ab".repeat(20)).unwrap()
    }

    #[test]
    fn append_request_is_camel_case() {
        let req = AppendMessagesRequest {
            feed_id: feed_id(),
            subfeed_hash: hash(),
            messages: vec![json!({"a": 1})],
        };
        let v = encode(&req).unwrap();
        assert_eq!(v["feedId"], "f1");
        assert_eq!(v["subfeedHash"], "ab".repeat(20));
        assert_eq!(v["messages"][0]["a"], 1);
    }

    #[test]
    fn watch_request_shape() {
        let mut watches = BTreeMap::new();
        watches.insert(
            "watch".to_string(),
            WireSubfeedWatch {
                feed_id: feed_id(),
                subfeed_hash: hash(),
                channel_name: Channel::local(),
                position: 3,
            },
        );
        let req = WatchForNewMessagesRequest {
            subfeed_watches: watches,
            wait_msec: 10,
            signed: false,
            max_num_messages: 0,
        };
        let v = encode(&req).unwrap();
        assert_eq!(v["subfeedWatches"]["watch"]["channelName"], "*local*");
        assert_eq!(v["subfeedWatches"]["watch"]["position"], 3);
        assert_eq!(v["waitMsec"], 10);
        assert_eq!(v["maxNumMessages"], 0);
    }

    #[test]
    fn create_feed_request_is_empty_object() {
        assert_eq!(encode(&CreateFeedRequest::default()).unwrap(), json!({}));
    }

    #[test]
    fn check_success_passes_error_verbatim() {
        let err = check_success("appendMessages", &json!({"success": false, "error": "disk full"}))
            .unwrap_err();
        match err {
            ProtocolError::Remote { endpoint, message } => {
                assert_eq!(endpoint, "appendMessages");
                assert_eq!(message, "disk full");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn missing_success_is_failure() {
        assert!(check_success("x", &json!({})).is_err());
        assert!(check_success("x", &json!({"success": "yes"})).is_err());
        assert!(check_success("x", &json!({"success": true})).is_ok());
    }

    #[test]
    fn decode_reports_missing_field() {
        let err = decode::<GetFeedInfoResponse>("getFeedInfo", json!({"success": true})).unwrap_err();
        assert!(matches!(err, ProtocolError::MalformedResponse { .. }));
    }

    #[test]
    fn watch_response_without_messages_is_malformed() {
        let err = decode::<WatchForNewMessagesResponse>("w", json!({"success": true})).unwrap_err();
        assert!(matches!(err, ProtocolError::MalformedResponse { .. }));
        let r: WatchForNewMessagesResponse =
            decode("w", json!({"success": true, "messages": {}})).unwrap();
        assert!(r.messages.is_empty());
    }

    #[test]
    fn envelope_constructors() {
        assert_eq!(serde_json::to_value(Envelope::ok()).unwrap(), json!({"success": true}));
        assert_eq!(
            serde_json::to_value(Envelope::failure("nope")).unwrap(),
            json!({"success": false, "error": "nope"})
        );
    }
}
