use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use feedlog_crypto::derive_subfeed_hash;
use feedlog_types::{Channel, FeedId, FeedUri, Sha1Digest, SubfeedName};
use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::client::FeedClient;
use crate::error::{FeedError, FeedResult};
use crate::snapshot::SnapshotPayload;
use crate::subfeed::{FetchOptions, Subfeed};

/// What a [`Feed`] is backed by.
#[derive(Debug)]
pub enum FeedKind {
    /// A mutable feed held by the daemon. Writability is asked once and
    /// cached.
    Live {
        feed_id: FeedId,
        writeable: OnceCell<bool>,
    },
    /// An immutable snapshot blob. Never writeable.
    Snapshot {
        digest: Sha1Digest,
        manifest: Option<Sha1Digest>,
        payload: SnapshotPayload,
    },
}

/// One logical log: a live daemon feed or a frozen snapshot.
///
/// Shared by its subfeeds through `Arc`. After [`Feed::delete`] every
/// operation on the feed or its subfeeds fails with
/// [`FeedError::FeedDeleted`].
pub struct Feed {
    kind: FeedKind,
    client: FeedClient,
    deleted: AtomicBool,
}

impl Feed {
    pub(crate) fn live(client: FeedClient, feed_id: FeedId) -> Arc<Self> {
        Arc::new(Self {
            kind: FeedKind::Live {
                feed_id,
                writeable: OnceCell::new(),
            },
            client,
            deleted: AtomicBool::new(false),
        })
    }

    pub(crate) fn snapshot(
        client: FeedClient,
        digest: Sha1Digest,
        manifest: Option<Sha1Digest>,
        payload: SnapshotPayload,
    ) -> Arc<Self> {
        Arc::new(Self {
            kind: FeedKind::Snapshot {
                digest,
                manifest,
                payload,
            },
            client,
            deleted: AtomicBool::new(false),
        })
    }

    pub fn kind(&self) -> &FeedKind {
        &self.kind
    }

    pub fn client(&self) -> &FeedClient {
        &self.client
    }

    /// The feed id of a live feed.
    pub fn feed_id(&self) -> Option<&FeedId> {
        match &self.kind {
            FeedKind::Live { feed_id, .. } => Some(feed_id),
            FeedKind::Snapshot { .. } => None,
        }
    }

    pub fn is_snapshot(&self) -> bool {
        matches!(self.kind, FeedKind::Snapshot { .. })
    }

    pub fn snapshot_payload(&self) -> Option<&SnapshotPayload> {
        match &self.kind {
            FeedKind::Snapshot { payload, .. } => Some(payload),
            FeedKind::Live { .. } => None,
        }
    }

    pub fn feed_uri(&self) -> FeedUri {
        match &self.kind {
            FeedKind::Live { feed_id, .. } => FeedUri::Live {
                feed_id: feed_id.clone(),
                subfeed: None,
            },
            FeedKind::Snapshot {
                digest, manifest, ..
            } => FeedUri::Snapshot {
                digest: *digest,
                subfeed: None,
                manifest: *manifest,
            },
        }
    }

    /// `feed://<id>` or `sha1://<digest>`.
    pub fn uri(&self) -> String {
        self.feed_uri().to_string()
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted.load(Ordering::Acquire)
    }

    pub(crate) fn ensure_usable(&self) -> FeedResult<()> {
        if self.is_deleted() {
            return Err(FeedError::FeedDeleted {
                feed_id: self.uri(),
            });
        }
        Ok(())
    }

    /// Whether messages can be appended.
    ///
    /// Snapshots answer `false` without I/O. Live feeds ask the daemon once
    /// (`getFeedInfo`) and cache the answer; if that request fails the error
    /// is returned and nothing is cached.
    pub async fn is_writeable(&self) -> FeedResult<bool> {
        self.ensure_usable()?;
        match &self.kind {
            FeedKind::Snapshot { .. } => Ok(false),
            FeedKind::Live { feed_id, writeable } => {
                let value = writeable
                    .get_or_try_init(|| async {
                        let info = self.client.api().get_feed_info(feed_id).await?;
                        debug!(feed = feed_id.short(), writeable = info.is_writeable, "resolved writability");
                        Ok::<_, FeedError>(info.is_writeable)
                    })
                    .await?;
                Ok(*value)
            }
        }
    }

    /// Delete a live feed on the daemon. Irreversible; the feed and all its
    /// subfeeds become unusable.
    pub async fn delete(&self) -> FeedResult<()> {
        self.ensure_usable()?;
        let feed_id = match &self.kind {
            FeedKind::Live { feed_id, .. } => feed_id,
            FeedKind::Snapshot { .. } => {
                return Err(FeedError::InvalidOperation(
                    "cannot delete a snapshot feed".into(),
                ))
            }
        };
        self.client.delete_feed_by_id(feed_id).await?;
        self.deleted.store(true, Ordering::Release);
        Ok(())
    }

    /// A subfeed of this feed, cursor at 0, on the local channel.
    pub fn load_subfeed(self: &Arc<Self>, name: impl Into<SubfeedName>) -> FeedResult<Subfeed> {
        self.load_subfeed_with(name, 0, Channel::local())
    }

    /// A subfeed with an explicit starting position and channel.
    pub fn load_subfeed_with(
        self: &Arc<Self>,
        name: impl Into<SubfeedName>,
        position: u64,
        channel: Channel,
    ) -> FeedResult<Subfeed> {
        self.ensure_usable()?;
        let name = name.into();
        let hash = derive_subfeed_hash(&name);
        Ok(Subfeed::new(Arc::clone(self), name, hash, channel, position))
    }

    /// Freeze the named subfeeds into a snapshot feed.
    ///
    /// Each subfeed is read from position 0 with one unbounded zero-wait
    /// fetch on the local channel, so this never blocks on the daemon and
    /// finishes even while other writers append. The payload is stored as a
    /// blob and returned as a new snapshot feed; later appends to this feed
    /// do not affect it.
    pub async fn create_snapshot(self: &Arc<Self>, names: &[SubfeedName]) -> FeedResult<Arc<Feed>> {
        self.ensure_usable()?;
        let mut payload = SnapshotPayload::new();
        for name in names {
            let mut subfeed = self.load_subfeed(name.clone())?;
            let messages = subfeed.fetch_next(FetchOptions::wait(0)).await?;
            debug!(subfeed = %name, count = messages.len(), "captured subfeed");
            payload.insert(subfeed.hash().clone(), messages);
        }

        let digest = self.client.blobs().store_json(&payload.to_value()?)?;
        info!(source = %self.uri(), digest = %digest, subfeeds = names.len(), "created snapshot");
        Ok(Feed::snapshot(self.client.clone(), digest, None, payload))
    }
}

impl std::fmt::Debug for Feed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Feed")
            .field("uri", &self.uri())
            .field("deleted", &self.is_deleted())
            .finish()
    }
}
