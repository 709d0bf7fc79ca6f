use std::collections::BTreeMap;

use feedlog_types::{Message, SubfeedHash};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{FeedError, FeedResult};

/// Frozen message lists of a snapshot feed, keyed by subfeed hash.
///
/// Serialized as
/// `{"subfeeds": {"<hash>": {"subfeedHash": "<hash>", "messages": [...]}}}`
/// and stored as a content-addressed blob. Never changes once built.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SnapshotPayload {
    pub subfeeds: BTreeMap<SubfeedHash, SnapshotSubfeed>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotSubfeed {
    pub subfeed_hash: SubfeedHash,
    pub messages: Vec<Message>,
}

impl SnapshotPayload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, hash: SubfeedHash, messages: Vec<Message>) {
        self.subfeeds.insert(
            hash.clone(),
            SnapshotSubfeed {
                subfeed_hash: hash,
                messages,
            },
        );
    }

    /// Messages of one subfeed. A subfeed absent from the snapshot reads as
    /// empty.
    pub fn messages(&self, hash: &SubfeedHash) -> &[Message] {
        self.subfeeds
            .get(hash)
            .map(|s| s.messages.as_slice())
            .unwrap_or(&[])
    }

    pub fn contains(&self, hash: &SubfeedHash) -> bool {
        self.subfeeds.contains_key(hash)
    }

    pub fn to_value(&self) -> FeedResult<Value> {
        serde_json::to_value(self).map_err(|e| FeedError::InvalidOperation(e.to_string()))
    }

    /// Decode a stored blob. `uri` names the blob in the error.
    pub fn from_value(uri: &str, value: Value) -> FeedResult<Self> {
        serde_json::from_value(value).map_err(|e| FeedError::SnapshotLoad {
            uri: uri.to_string(),
            reason: format!("malformed snapshot: {e}"),
        })
    }
}
