use std::sync::Arc;

use feedlog_crypto::SignedMessage;
use feedlog_protocol::ProtocolError;
use feedlog_types::{Channel, Message, SubfeedHash, SubfeedName};
use tracing::trace;

use crate::error::{FeedError, FeedResult};
use crate::feed::{Feed, FeedKind};
use crate::stream::MessageStream;
use crate::watch::{watch, SubfeedWatch, WatchOptions, WatchSpec, WatchTarget, UNBOUNDED};

/// Key of the single entry a subfeed puts in its watch requests.
const WATCH_KEY: &str = "watch";

/// Options for [`Subfeed::fetch_next`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FetchOptions {
    /// Long-poll wait for live feeds. Ignored for snapshots.
    pub wait_msec: u64,
    /// Most messages to return; [`UNBOUNDED`] (`0`) means no limit.
    pub max_messages: u64,
    /// Move the cursor past the returned messages.
    pub advance: bool,
    /// Ask the daemon for signed envelopes. Snapshots always return plain
    /// messages.
    pub signed: bool,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            wait_msec: 10,
            max_messages: UNBOUNDED,
            advance: true,
            signed: false,
        }
    }
}

impl FetchOptions {
    pub fn wait(wait_msec: u64) -> Self {
        Self {
            wait_msec,
            ..Self::default()
        }
    }

    pub fn max(mut self, max_messages: u64) -> Self {
        self.max_messages = max_messages;
        self
    }

    pub fn peek(mut self) -> Self {
        self.advance = false;
        self
    }

    pub fn signed(mut self) -> Self {
        self.signed = true;
        self
    }
}

/// One named stream within a feed, with its own read cursor.
///
/// Two `Subfeed` values over the same stream have independent positions.
/// Methods that move the cursor take `&mut self`.
#[derive(Debug)]
pub struct Subfeed {
    feed: Arc<Feed>,
    name: SubfeedName,
    hash: SubfeedHash,
    channel: Channel,
    pub(crate) position: u64,
}

impl Subfeed {
    pub(crate) fn new(
        feed: Arc<Feed>,
        name: SubfeedName,
        hash: SubfeedHash,
        channel: Channel,
        position: u64,
    ) -> Self {
        Self {
            feed,
            name,
            hash,
            channel,
            position,
        }
    }

    pub fn feed(&self) -> &Arc<Feed> {
        &self.feed
    }

    pub fn name(&self) -> &SubfeedName {
        &self.name
    }

    pub fn hash(&self) -> &SubfeedHash {
        &self.hash
    }

    pub fn channel(&self) -> &Channel {
        &self.channel
    }

    /// Number of messages this reader has consumed.
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Move the cursor. Positions past the end simply read nothing until
    /// the stream grows that far.
    pub fn set_position(&mut self, position: u64) {
        self.position = position;
    }

    pub fn is_snapshot(&self) -> bool {
        self.feed.is_snapshot()
    }

    pub async fn is_writeable(&self) -> FeedResult<bool> {
        self.feed.is_writeable().await
    }

    /// `feed://<id>/<name>` or `sha1://<digest>?subfeedName=<name>`.
    ///
    /// Structured names appear as `~<hash>`, which loads back to the same
    /// stream.
    pub fn uri(&self) -> String {
        self.feed
            .feed_uri()
            .with_subfeed(self.name.uri_form(&self.hash))
            .to_string()
    }

    /// Messages held for this subfeed, independent of the cursor.
    pub async fn num_local_messages(&self) -> FeedResult<u64> {
        self.feed.ensure_usable()?;
        match self.feed.kind() {
            FeedKind::Snapshot { payload, .. } => Ok(payload.messages(&self.hash).len() as u64),
            FeedKind::Live { feed_id, .. } => Ok(self
                .feed
                .client()
                .api()
                .get_num_local_messages(feed_id, &self.hash)
                .await?),
        }
    }

    /// Read messages after the cursor.
    ///
    /// Live feeds make one watch round trip that may wait up to
    /// `wait_msec`; snapshots slice their frozen list and never touch the
    /// network. Returns an empty vector when nothing is available.
    pub async fn fetch_next(&mut self, options: FetchOptions) -> FeedResult<Vec<Message>> {
        self.feed.ensure_usable()?;
        let messages = match self.feed.kind() {
            FeedKind::Snapshot { payload, .. } => {
                let all = payload.messages(&self.hash);
                let start = usize::try_from(self.position).unwrap_or(usize::MAX).min(all.len());
                let end = match options.max_messages {
                    UNBOUNDED => all.len(),
                    max => start.saturating_add(usize::try_from(max).unwrap_or(usize::MAX)).min(all.len()),
                };
                all[start..end].to_vec()
            }
            FeedKind::Live { feed_id, .. } => {
                let mut spec = WatchSpec::new();
                spec.insert(
                    WATCH_KEY.to_string(),
                    SubfeedWatch {
                        feed_id: feed_id.clone(),
                        target: WatchTarget::Hash(self.hash.clone()),
                        channel: self.channel.clone(),
                        position: self.position,
                    },
                );
                let watch_options = WatchOptions {
                    wait_msec: options.wait_msec,
                    signed: options.signed,
                    max_messages: options.max_messages,
                };
                let mut found = watch(self.feed.client().api(), &spec, watch_options).await?;
                found.remove(WATCH_KEY).unwrap_or_default()
            }
        };
        trace!(
            subfeed = ?self.hash,
            position = self.position,
            count = messages.len(),
            "fetched"
        );
        if options.advance {
            self.position += messages.len() as u64;
        }
        Ok(messages)
    }

    /// Fetch at most one message. `Ok(None)` means nothing was available.
    pub async fn fetch_one(&mut self, wait_msec: u64, advance: bool) -> FeedResult<Option<Message>> {
        let mut options = FetchOptions::wait(wait_msec).max(1);
        options.advance = advance;
        Ok(self.fetch_next(options).await?.into_iter().next())
    }

    /// Fetch signed envelopes from a live feed.
    ///
    /// Each envelope is decoded but not verified; use
    /// [`SignedMessage::verify`] with the feed's key for that.
    pub async fn fetch_next_signed(&mut self, options: FetchOptions) -> FeedResult<Vec<SignedMessage>> {
        if self.is_snapshot() {
            return Err(FeedError::InvalidOperation(
                "snapshot feeds hold no signatures".into(),
            ));
        }
        let raw = self.fetch_next(options.signed()).await?;
        raw.into_iter()
            .map(|m| {
                serde_json::from_value(m).map_err(|e| {
                    FeedError::Protocol(ProtocolError::MalformedResponse {
                        endpoint: "watchForNewMessages".into(),
                        reason: format!("bad signed envelope: {e}"),
                    })
                })
            })
            .collect()
    }

    /// Append messages in one request.
    ///
    /// Fails with [`FeedError::ReadOnlyFeed`] before sending anything if the
    /// feed is not writeable. Does not move this reader's cursor.
    pub async fn append(&self, messages: Vec<Message>) -> FeedResult<()> {
        let feed_id = match self.feed.kind() {
            FeedKind::Snapshot { .. } => {
                return Err(FeedError::ReadOnlyFeed { uri: self.uri() });
            }
            FeedKind::Live { feed_id, .. } => feed_id,
        };
        if !self.feed.is_writeable().await? {
            return Err(FeedError::ReadOnlyFeed { uri: self.uri() });
        }
        self.feed
            .client()
            .api()
            .append_messages(feed_id, &self.hash, messages)
            .await?;
        Ok(())
    }

    pub async fn append_one(&self, message: Message) -> FeedResult<()> {
        self.append(vec![message]).await
    }

    /// A blocking consumer starting at the current position.
    ///
    /// While the stream is alive it holds this subfeed mutably, so direct
    /// fetches cannot interleave with it.
    pub fn stream(&mut self, signed: bool) -> MessageStream<'_> {
        MessageStream::new(self, signed)
    }
}
