//! Batched long-poll over one or more subfeed cursors.

use std::collections::BTreeMap;

use feedlog_crypto::derive_subfeed_hash;
use feedlog_protocol::{DaemonApi, WatchForNewMessagesRequest, WireSubfeedWatch};
use feedlog_types::{Channel, FeedId, Message, SubfeedHash, SubfeedName};
use tracing::trace;

use crate::error::FeedResult;

/// `max_messages` value meaning "no limit".
pub const UNBOUNDED: u64 = 0;

/// Which subfeed a watch entry targets.
#[derive(Clone, Debug, PartialEq)]
pub enum WatchTarget {
    Hash(SubfeedHash),
    /// Hashed with [`derive_subfeed_hash`] when the request is built.
    Name(SubfeedName),
}

impl WatchTarget {
    pub fn hash(&self) -> SubfeedHash {
        match self {
            Self::Hash(h) => h.clone(),
            Self::Name(n) => derive_subfeed_hash(n),
        }
    }
}

/// One cursor to poll.
#[derive(Clone, Debug, PartialEq)]
pub struct SubfeedWatch {
    pub feed_id: FeedId,
    pub target: WatchTarget,
    pub channel: Channel,
    pub position: u64,
}

/// Cursors to poll in one round trip, keyed by caller-chosen names.
pub type WatchSpec = BTreeMap<String, SubfeedWatch>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WatchOptions {
    /// How long the daemon may hold the request open. `0` never blocks.
    pub wait_msec: u64,
    pub signed: bool,
    /// Cap per entry; [`UNBOUNDED`] (`0`) means no limit.
    pub max_messages: u64,
}

impl Default for WatchOptions {
    fn default() -> Self {
        Self {
            wait_msec: 0,
            signed: false,
            max_messages: UNBOUNDED,
        }
    }
}

/// Poll every entry of `spec` in a single `watchForNewMessages` request.
///
/// Returns only the keys that received new messages. A daemon failure is
/// returned as [`FeedError::Protocol`](crate::FeedError::Protocol) with
/// the daemon's message intact.
pub async fn watch(
    api: &DaemonApi,
    spec: &WatchSpec,
    options: WatchOptions,
) -> FeedResult<BTreeMap<String, Vec<Message>>> {
    let subfeed_watches = spec
        .iter()
        .map(|(key, w)| {
            let wire = WireSubfeedWatch {
                feed_id: w.feed_id.clone(),
                subfeed_hash: w.target.hash(),
                channel_name: w.channel.clone(),
                position: w.position,
            };
            (key.clone(), wire)
        })
        .collect();
    let request = WatchForNewMessagesRequest {
        subfeed_watches,
        wait_msec: options.wait_msec,
        signed: options.signed,
        max_num_messages: options.max_messages,
    };

    let mut messages = api.watch_for_new_messages(&request).await?;
    messages.retain(|key, batch| !batch.is_empty() && spec.contains_key(key));
    trace!(
        entries = spec.len(),
        answered = messages.len(),
        wait_msec = options.wait_msec,
        "watch round trip"
    );
    Ok(messages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use feedlog_protocol::{ProtocolError, ProtocolResult, Transport};
    use serde_json::{json, Value};
    use std::sync::{Arc, Mutex};

    struct Canned {
        response: Value,
        last: Mutex<Option<Value>>,
    }

    #[async_trait]
    impl Transport for Canned {
        async fn post_json(&self, _path: &str, body: &Value) -> ProtocolResult<Value> {
            *self.last.lock().unwrap() = Some(body.clone());
            Ok(self.response.clone())
        }
        async fn get_json(&self, _path: &str) -> ProtocolResult<Value> {
            Ok(self.response.clone())
        }
    }

    fn canned(response: Value) -> Arc<Canned> {
        Arc::new(Canned {
            response,
            last: Mutex::new(None),
        })
    }

    fn entry(target: WatchTarget, position: u64) -> SubfeedWatch {
        SubfeedWatch {
            feed_id: FeedId::new("f").unwrap(),
            target,
            channel: Channel::local(),
            position,
        }
    }

    #[tokio::test]
    async fn names_are_hashed_on_the_wire() {
        let t = canned(json!({"success": true, "messages": {}}));
        let api = DaemonApi::new(t.clone());
        let mut spec = WatchSpec::new();
        spec.insert("a".into(), entry(WatchTarget::Name("events".into()), 4));
        watch(&api, &spec, WatchOptions::default()).await.unwrap();

        let sent = t.last.lock().unwrap().clone().unwrap();
        let expected = derive_subfeed_hash(&SubfeedName::from("events"));
        assert_eq!(sent["subfeedWatches"]["a"]["subfeedHash"], expected.as_str());
        assert_eq!(sent["subfeedWatches"]["a"]["position"], 4);
        assert_eq!(sent["waitMsec"], 0);
    }

    #[tokio::test]
    async fn only_keys_with_new_data_are_returned() {
        let t = canned(json!({
            "success": true,
            "messages": {"a": [1, 2], "b": [], "stray": [3]}
        }));
        let api = DaemonApi::new(t);
        let mut spec = WatchSpec::new();
        let h = SubfeedHash::parse(&"1".repeat(40)).unwrap();
        spec.insert("a".into(), entry(WatchTarget::Hash(h.clone()), 0));
        spec.insert("b".into(), entry(WatchTarget::Hash(h), 0));
        let got = watch(&api, &spec, WatchOptions::default()).await.unwrap();
        assert_eq!(got.len(), 1);
        assert_eq!(got["a"], vec![json!(1), json!(2)]);
    }

    #[tokio::test]
    async fn failure_keeps_daemon_message() {
        let t = canned(json!({"success": false, "error": "bad watch"}));
        let api = DaemonApi::new(t);
        let err = watch(&api, &WatchSpec::new(), WatchOptions::default())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("bad watch"));
    }

    #[tokio::test]
    async fn success_without_messages_is_malformed() {
        let t = canned(json!({"success": true}));
        let api = DaemonApi::new(t);
        let err = watch(&api, &WatchSpec::new(), WatchOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            crate::FeedError::Protocol(ProtocolError::MalformedResponse { .. })
        ));
    }
}
