use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use feedlog_crypto::{SignedMessage, SignedMessageBody, SigningKey};
use feedlog_protocol::{
    endpoints, AppendMessagesRequest, CreateFeedResponse, Envelope, FeedIdRequest,
    GetFeedInfoResponse, GetNumLocalMessagesRequest, GetNumLocalMessagesResponse, ProbeResponse,
    ProtocolError, ProtocolResult, Transport, WatchForNewMessagesRequest,
    WatchForNewMessagesResponse,
};
use feedlog_types::{FeedId, Message, SubfeedHash};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::Notify;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};

struct FeedState {
    /// `None` for feeds this daemon can read but not write.
    key: Option<SigningKey>,
    subfeeds: HashMap<SubfeedHash, Vec<SignedMessage>>,
}

struct Inner {
    config: ServerConfig,
    feeds: Mutex<HashMap<FeedId, FeedState>>,
    appended: Notify,
}

/// A complete feed daemon held in memory.
///
/// Implements every feed endpoint, including the long-poll watch, and
/// signs each appended message with the feed's key. Nothing is persisted.
/// All channels see the same local data.
///
/// Usable directly as a [`Transport`] for in-process clients, or served
/// over HTTP through [`build_router`](crate::router::build_router).
#[derive(Clone)]
pub struct MemoryDaemon {
    inner: Arc<Inner>,
}

impl MemoryDaemon {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                config,
                feeds: Mutex::new(HashMap::new()),
                appended: Notify::new(),
            }),
        }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    /// Register a feed that reports `isWriteable: false` and rejects
    /// appends.
    pub fn add_readonly_feed(&self) -> ServerResult<FeedId> {
        let feed_id = SigningKey::generate().verifying_key().to_feed_id();
        self.feeds()?.insert(
            feed_id.clone(),
            FeedState {
                key: None,
                subfeeds: HashMap::new(),
            },
        );
        Ok(feed_id)
    }

    pub fn feed_count(&self) -> ServerResult<usize> {
        Ok(self.feeds()?.len())
    }

    fn feeds(&self) -> ServerResult<MutexGuard<'_, HashMap<FeedId, FeedState>>> {
        self.inner.feeds.lock().map_err(poisoned)
    }

    /// Run one feed endpoint. `Err` is returned only for unknown
    /// endpoints; handler failures come back as a failure envelope.
    pub async fn handle(&self, endpoint: &str, body: Value) -> ServerResult<Value> {
        let result = match endpoint {
            endpoints::GET_FEED_INFO => decode(body).and_then(|r| self.get_feed_info(r)),
            endpoints::GET_NUM_LOCAL_MESSAGES => {
                decode(body).and_then(|r| self.get_num_local_messages(r))
            }
            endpoints::APPEND_MESSAGES => decode(body).and_then(|r| self.append_messages(r)),
            endpoints::WATCH_FOR_NEW_MESSAGES => match decode(body) {
                Ok(r) => self.watch_for_new_messages(r).await,
                Err(e) => Err(e),
            },
            endpoints::CREATE_FEED => self.create_feed(),
            endpoints::DELETE_FEED => decode(body).and_then(|r| self.delete_feed(r)),
            other => return Err(ServerError::UnknownEndpoint(other.to_string())),
        };
        Ok(match result {
            Ok(value) => value,
            Err(e) => {
                debug!(endpoint, error = %e, "request failed");
                to_value(&Envelope::failure(e.to_string()))
            }
        })
    }

    pub fn probe(&self) -> Value {
        to_value(&ProbeResponse::default())
    }

    fn get_feed_info(&self, req: FeedIdRequest) -> ServerResult<Value> {
        let feeds = self.feeds()?;
        let feed = feeds
            .get(&req.feed_id)
            .ok_or_else(|| ServerError::FeedNotFound(req.feed_id.to_string()))?;
        Ok(success(&GetFeedInfoResponse {
            is_writeable: feed.key.is_some(),
        }))
    }

    fn get_num_local_messages(&self, req: GetNumLocalMessagesRequest) -> ServerResult<Value> {
        let feeds = self.feeds()?;
        let feed = feeds
            .get(&req.feed_id)
            .ok_or_else(|| ServerError::FeedNotFound(req.feed_id.to_string()))?;
        let num_messages = feed
            .subfeeds
            .get(&req.subfeed_hash)
            .map_or(0, |log| log.len() as u64);
        Ok(success(&GetNumLocalMessagesResponse { num_messages }))
    }

    fn append_messages(&self, req: AppendMessagesRequest) -> ServerResult<Value> {
        let count = req.messages.len();
        {
            let mut feeds = self.feeds()?;
            let feed = feeds
                .get_mut(&req.feed_id)
                .ok_or_else(|| ServerError::FeedNotFound(req.feed_id.to_string()))?;
            let key = feed
                .key
                .as_ref()
                .ok_or_else(|| ServerError::ReadOnlyFeed(req.feed_id.to_string()))?;
            let log = feed.subfeeds.entry(req.subfeed_hash.clone()).or_default();
            for message in req.messages {
                let body = SignedMessageBody {
                    message,
                    message_number: log.len() as u64,
                    previous_signature: log.last().map(|m| m.signature.clone()),
                    timestamp: now_millis(),
                };
                let signed = SignedMessage::sign(key, body)
                    .map_err(|e| ServerError::Internal(e.to_string()))?;
                log.push(signed);
            }
        }
        debug!(feed = req.feed_id.short(), subfeed = ?req.subfeed_hash, count, "appended");
        self.inner.appended.notify_waiters();
        Ok(success(&Envelope::ok()))
    }

    fn collect(
        &self,
        req: &WatchForNewMessagesRequest,
    ) -> ServerResult<BTreeMap<String, Vec<Message>>> {
        let feeds = self.feeds()?;
        let mut found = BTreeMap::new();
        for (key, watch) in &req.subfeed_watches {
            let Some(log) = feeds
                .get(&watch.feed_id)
                .and_then(|f| f.subfeeds.get(&watch.subfeed_hash))
            else {
                continue;
            };
            let start = usize::try_from(watch.position).unwrap_or(usize::MAX);
            let available = log.get(start..).unwrap_or(&[]);
            let take = match req.max_num_messages {
                0 => available.len(),
                n => usize::try_from(n).unwrap_or(usize::MAX).min(available.len()),
            };
            if take == 0 {
                continue;
            }
            let batch = available[..take]
                .iter()
                .map(|m| {
                    if req.signed {
                        to_value(m)
                    } else {
                        m.body.message.clone()
                    }
                })
                .collect();
            found.insert(key.clone(), batch);
        }
        Ok(found)
    }

    async fn watch_for_new_messages(&self, req: WatchForNewMessagesRequest) -> ServerResult<Value> {
        let wait = req.wait_msec.min(self.inner.config.max_wait_msec);
        let deadline = Instant::now() + Duration::from_millis(wait);
        loop {
            // Registered before checking, so an append in between still wakes us.
            let appended = self.inner.appended.notified();
            let messages = self.collect(&req)?;
            if !messages.is_empty() || Instant::now() >= deadline {
                return Ok(success(&WatchForNewMessagesResponse { messages }));
            }
            if tokio::time::timeout_at(deadline, appended).await.is_err() {
                let messages = self.collect(&req)?;
                return Ok(success(&WatchForNewMessagesResponse { messages }));
            }
        }
    }

    fn create_feed(&self) -> ServerResult<Value> {
        let key = SigningKey::generate();
        let feed_id = key.verifying_key().to_feed_id();
        self.feeds()?.insert(
            feed_id.clone(),
            FeedState {
                key: Some(key),
                subfeeds: HashMap::new(),
            },
        );
        info!(feed = feed_id.short(), "feed created");
        Ok(success(&CreateFeedResponse { feed_id }))
    }

    fn delete_feed(&self, req: FeedIdRequest) -> ServerResult<Value> {
        if self.feeds()?.remove(&req.feed_id).is_none() {
            return Err(ServerError::FeedNotFound(req.feed_id.to_string()));
        }
        info!(feed = req.feed_id.short(), "feed deleted");
        Ok(success(&Envelope::ok()))
    }
}

impl std::fmt::Debug for MemoryDaemon {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryDaemon")
            .field("feeds", &self.feed_count().ok())
            .finish()
    }
}

#[async_trait]
impl Transport for MemoryDaemon {
    async fn post_json(&self, path: &str, body: &Value) -> ProtocolResult<Value> {
        let endpoint = path
            .strip_prefix(endpoints::FEED_PREFIX)
            .ok_or_else(|| not_found(path))?;
        self.handle(endpoint, body.clone())
            .await
            .map_err(|e| match e {
                ServerError::UnknownEndpoint(_) => not_found(path),
                other => ProtocolError::Transport(other.to_string()),
            })
    }

    async fn get_json(&self, path: &str) -> ProtocolResult<Value> {
        if path == endpoints::PROBE {
            Ok(self.probe())
        } else {
            Err(not_found(path))
        }
    }
}

fn not_found(path: &str) -> ProtocolError {
    ProtocolError::Http {
        endpoint: path.to_string(),
        status: 404,
    }
}

fn poisoned<E: std::fmt::Display>(e: E) -> ServerError {
    ServerError::Internal(format!("lock poisoned: {e}"))
}

fn decode<T: DeserializeOwned>(body: Value) -> ServerResult<T> {
    serde_json::from_value(body).map_err(|e| ServerError::BadRequest(e.to_string()))
}

fn to_value<T: Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}

/// A response body with `success: true` merged in.
fn success<T: Serialize>(body: &T) -> Value {
    let mut value = to_value(body);
    if let Value::Object(map) = &mut value {
        map.insert("success".into(), Value::Bool(true));
    }
    value
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
