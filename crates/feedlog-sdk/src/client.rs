use std::collections::BTreeMap;
use std::sync::Arc;

use feedlog_protocol::{ClientConfig, DaemonApi, HttpTransport, ProbeResponse, Transport};
use feedlog_registry::{validate_feed_name, InMemoryRegistry, NameRegistry};
use feedlog_store::{BlobStore, InMemoryBlobStore};
use feedlog_types::{
    parse_feed_uri, Channel, FeedId, FeedUri, Message, Sha1Digest, TypeError,
};
use tracing::{debug, info};

use crate::error::{FeedError, FeedResult};
use crate::feed::Feed;
use crate::snapshot::SnapshotPayload;
use crate::subfeed::Subfeed;
use crate::watch::{watch, WatchOptions, WatchSpec};

/// Options for [`FeedClient::load_feed`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LoadOptions {
    /// Create and register the feed if a name is not yet registered.
    pub create: bool,
}

impl LoadOptions {
    pub fn create() -> Self {
        Self { create: true }
    }
}

/// Entry point: resolves names and URIs into feeds.
///
/// Carries its collaborators explicitly, so several clients with different
/// daemons, stores or registries can coexist in one process. Cheap to clone.
#[derive(Clone)]
pub struct FeedClient {
    api: DaemonApi,
    blobs: Arc<dyn BlobStore>,
    registry: Arc<dyn NameRegistry>,
}

impl FeedClient {
    pub fn new(
        transport: Arc<dyn Transport>,
        blobs: Arc<dyn BlobStore>,
        registry: Arc<dyn NameRegistry>,
    ) -> Self {
        Self {
            api: DaemonApi::new(transport),
            blobs,
            registry,
        }
    }

    /// A client talking HTTP to the daemon described by `config`.
    pub fn connect(
        config: ClientConfig,
        blobs: Arc<dyn BlobStore>,
        registry: Arc<dyn NameRegistry>,
    ) -> FeedResult<Self> {
        let transport = HttpTransport::new(config)?;
        Ok(Self::new(Arc::new(transport), blobs, registry))
    }

    /// A client with in-memory blob store and registry.
    pub fn with_transport(transport: Arc<dyn Transport>) -> Self {
        Self::new(
            transport,
            Arc::new(InMemoryBlobStore::new()),
            Arc::new(InMemoryRegistry::new()),
        )
    }

    pub fn api(&self) -> &DaemonApi {
        &self.api
    }

    pub fn blobs(&self) -> &Arc<dyn BlobStore> {
        &self.blobs
    }

    pub fn registry(&self) -> &Arc<dyn NameRegistry> {
        &self.registry
    }

    /// Resolve a `feed://` URI, a `sha1://` snapshot URI, or a registered
    /// feed name.
    ///
    /// URIs are loaded directly; `create` is rejected for them. A name that
    /// is not registered fails with [`FeedError::FeedNotFound`] unless
    /// `create` is set, in which case a new feed is created and recorded.
    pub async fn load_feed(&self, uri_or_name: &str, options: LoadOptions) -> FeedResult<Arc<Feed>> {
        if !FeedUri::has_scheme(uri_or_name) {
            let feed_id = self.get_feed_id(uri_or_name, options.create).await?;
            return Ok(self.open_live(feed_id));
        }
        match FeedUri::parse(uri_or_name)? {
            FeedUri::Live { feed_id, subfeed } => {
                if options.create {
                    return Err(FeedError::InvalidOperation(
                        "cannot create a feed that is addressed by id".into(),
                    ));
                }
                if subfeed.is_some() {
                    return Err(not_a_feed_uri(uri_or_name));
                }
                Ok(self.open_live(feed_id))
            }
            FeedUri::Snapshot {
                digest, manifest, ..
            } => {
                if options.create {
                    return Err(FeedError::InvalidOperation(
                        "cannot create a snapshot feed".into(),
                    ));
                }
                self.open_snapshot(digest, manifest)
            }
        }
    }

    /// Load one subfeed from `feed://<id>/<name>` or
    /// `sha1://<digest>?subfeedName=<name>`, cursor at 0.
    pub async fn load_subfeed(&self, subfeed_uri: &str, channel: Channel) -> FeedResult<Subfeed> {
        let uri = FeedUri::parse(subfeed_uri)?;
        let name = uri
            .subfeed()
            .ok_or_else(|| {
                FeedError::InvalidUri(TypeError::InvalidUri {
                    uri: subfeed_uri.to_string(),
                    reason: "no subfeed name".into(),
                })
            })?
            .to_string();
        let feed = match uri {
            FeedUri::Live { feed_id, .. } => self.open_live(feed_id),
            FeedUri::Snapshot {
                digest, manifest, ..
            } => self.open_snapshot(digest, manifest)?,
        };
        feed.load_subfeed_with(name, 0, channel)
    }

    /// A handle on a live feed. No request is made.
    pub fn open_live(&self, feed_id: FeedId) -> Arc<Feed> {
        Feed::live(self.clone(), feed_id)
    }

    /// Load a snapshot feed from the blob store.
    pub fn open_snapshot(
        &self,
        digest: Sha1Digest,
        manifest: Option<Sha1Digest>,
    ) -> FeedResult<Arc<Feed>> {
        let uri = self.blobs.uri_for(&digest);
        let value = self
            .blobs
            .load_json(&digest)
            .map_err(|e| FeedError::SnapshotLoad {
                uri: uri.clone(),
                reason: e.to_string(),
            })?
            .ok_or_else(|| FeedError::SnapshotLoad {
                uri: uri.clone(),
                reason: "blob not found".into(),
            })?;
        let payload = SnapshotPayload::from_value(&uri, value)?;
        debug!(uri = %uri, subfeeds = payload.subfeeds.len(), "loaded snapshot");
        Ok(Feed::snapshot(self.clone(), digest, manifest, payload))
    }

    /// Create a new live feed, optionally recording it under `name`.
    pub async fn create_feed(&self, name: Option<&str>) -> FeedResult<Arc<Feed>> {
        if let Some(name) = name {
            validate_feed_name(name)?;
        }
        let feed_id = self.api.create_feed().await?;
        if let Some(name) = name {
            self.registry.set_feed_id_for_name(name, &feed_id)?;
        }
        info!(feed = feed_id.short(), name = name.unwrap_or(""), "created feed");
        Ok(self.open_live(feed_id))
    }

    /// The id registered for `name`, creating the feed if allowed.
    pub async fn get_feed_id(&self, name: &str, create: bool) -> FeedResult<FeedId> {
        if let Some(feed_id) = self.registry.feed_id_for_name(name)? {
            return Ok(feed_id);
        }
        if !create {
            return Err(FeedError::FeedNotFound {
                name: name.to_string(),
            });
        }
        let feed = self.create_feed(Some(name)).await?;
        feed.feed_id()
            .cloned()
            .ok_or_else(|| FeedError::InvalidOperation("created feed has no id".into()))
    }

    /// Delete a live feed given as `feed://<id>` or a registered name.
    pub async fn delete_feed(&self, uri_or_name: &str) -> FeedResult<()> {
        let feed_id = if FeedUri::has_scheme(uri_or_name) {
            let (feed_id, subfeed) = parse_feed_uri(uri_or_name)?;
            if subfeed.is_some() {
                return Err(not_a_feed_uri(uri_or_name));
            }
            feed_id
        } else {
            self.get_feed_id(uri_or_name, false).await?
        };
        self.delete_feed_by_id(&feed_id).await
    }

    /// Delete on the daemon, then forget any names pointing at the feed.
    pub(crate) async fn delete_feed_by_id(&self, feed_id: &FeedId) -> FeedResult<()> {
        self.api.delete_feed(feed_id).await?;
        for (name, id) in self.registry.feed_names()? {
            if id == feed_id.as_str() {
                self.registry.remove_feed_name(&name)?;
            }
        }
        info!(feed = feed_id.short(), "deleted feed");
        Ok(())
    }

    /// Poll several cursors in one round trip.
    pub async fn watch(
        &self,
        spec: &WatchSpec,
        options: WatchOptions,
    ) -> FeedResult<BTreeMap<String, Vec<Message>>> {
        watch(&self.api, spec, options).await
    }

    pub async fn probe(&self) -> FeedResult<ProbeResponse> {
        Ok(self.api.probe().await?)
    }
}

impl std::fmt::Debug for FeedClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeedClient").finish_non_exhaustive()
    }
}

fn not_a_feed_uri(uri: &str) -> FeedError {
    FeedError::InvalidUri(TypeError::InvalidUri {
        uri: uri.to_string(),
        reason: "expected a feed URI without a subfeed".into(),
    })
}
