use std::collections::BTreeMap;
use std::sync::Arc;

use feedlog_types::{FeedId, Message, SubfeedHash};
use serde_json::Value;
use tracing::debug;

use crate::endpoint::{endpoints, ProbeResponse};
use crate::error::ProtocolResult;
use crate::message::{
    check_success, decode, encode, AppendMessagesRequest, CreateFeedRequest, CreateFeedResponse,
    FeedIdRequest, GetFeedInfoResponse, GetNumLocalMessagesRequest, GetNumLocalMessagesResponse,
    WatchForNewMessagesRequest, WatchForNewMessagesResponse,
};
use crate::transport::Transport;

/// Typed calls to the daemon's feed endpoints.
///
/// Each call is one request through the [`Transport`]. A response with
/// `success: false` becomes [`ProtocolError::Remote`](crate::ProtocolError::Remote)
/// carrying the daemon's message.
#[derive(Clone)]
pub struct DaemonApi {
    transport: Arc<dyn Transport>,
}

impl DaemonApi {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    async fn call(&self, endpoint: &str, body: Value) -> ProtocolResult<Value> {
        let response = self
            .transport
            .post_json(&endpoints::feed_path(endpoint), &body)
            .await?;
        check_success(endpoint, &response)?;
        Ok(response)
    }

    pub async fn get_feed_info(&self, feed_id: &FeedId) -> ProtocolResult<GetFeedInfoResponse> {
        let body = encode(&FeedIdRequest {
            feed_id: feed_id.clone(),
        })?;
        let response = self.call(endpoints::GET_FEED_INFO, body).await?;
        decode(endpoints::GET_FEED_INFO, response)
    }

    pub async fn get_num_local_messages(
        &self,
        feed_id: &FeedId,
        subfeed_hash: &SubfeedHash,
    ) -> ProtocolResult<u64> {
        let body = encode(&GetNumLocalMessagesRequest {
            feed_id: feed_id.clone(),
            subfeed_hash: subfeed_hash.clone(),
        })?;
        let response = self.call(endpoints::GET_NUM_LOCAL_MESSAGES, body).await?;
        let decoded: GetNumLocalMessagesResponse =
            decode(endpoints::GET_NUM_LOCAL_MESSAGES, response)?;
        Ok(decoded.num_messages)
    }

    pub async fn append_messages(
        &self,
        feed_id: &FeedId,
        subfeed_hash: &SubfeedHash,
        messages: Vec<Message>,
    ) -> ProtocolResult<()> {
        let count = messages.len();
        let body = encode(&AppendMessagesRequest {
            feed_id: feed_id.clone(),
            subfeed_hash: subfeed_hash.clone(),
            messages,
        })?;
        self.call(endpoints::APPEND_MESSAGES, body).await?;
        debug!(feed = feed_id.short(), subfeed = ?subfeed_hash, count, "appended messages");
        Ok(())
    }

    pub async fn watch_for_new_messages(
        &self,
        request: &WatchForNewMessagesRequest,
    ) -> ProtocolResult<BTreeMap<String, Vec<Message>>> {
        let response = self
            .call(endpoints::WATCH_FOR_NEW_MESSAGES, encode(request)?)
            .await?;
        let decoded: WatchForNewMessagesResponse =
            decode(endpoints::WATCH_FOR_NEW_MESSAGES, response)?;
        Ok(decoded.messages)
    }

    pub async fn create_feed(&self) -> ProtocolResult<FeedId> {
        let body = encode(&CreateFeedRequest::default())?;
        let response = self.call(endpoints::CREATE_FEED, body).await?;
        let decoded: CreateFeedResponse = decode(endpoints::CREATE_FEED, response)?;
        debug!(feed = decoded.feed_id.short(), "created feed");
        Ok(decoded.feed_id)
    }

    pub async fn delete_feed(&self, feed_id: &FeedId) -> ProtocolResult<()> {
        let body = encode(&FeedIdRequest {
            feed_id: feed_id.clone(),
        })?;
        self.call(endpoints::DELETE_FEED, body).await?;
        debug!(feed = feed_id.short(), "deleted feed");
        Ok(())
    }

    /// `GET /probe`. Fails if the daemon is unreachable or not healthy.
    pub async fn probe(&self) -> ProtocolResult<ProbeResponse> {
        let response = self.transport.get_json(endpoints::PROBE).await?;
        check_success(endpoints::PROBE, &response)?;
        decode(endpoints::PROBE, response)
    }
}

impl std::fmt::Debug for DaemonApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DaemonApi").finish_non_exhaustive()
    }
}
