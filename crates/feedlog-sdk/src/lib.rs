//! Client SDK for feedlog.
//!
//! A feed is an append-only log made of named subfeeds. This crate resolves
//! feeds by id, by registered name, or from an immutable snapshot blob;
//! reads subfeeds through position cursors; and follows them with the
//! daemon's long-poll watch protocol.
//!
//! ```no_run
//! # async fn demo() -> feedlog_sdk::FeedResult<()> {
//! use feedlog_sdk::{ClientConfig, FeedClient, FetchOptions, LoadOptions};
//! use std::sync::Arc;
//!
//! let client = FeedClient::connect(
//!     ClientConfig::default(),
//!     Arc::new(feedlog_store::InMemoryBlobStore::new()),
//!     Arc::new(feedlog_registry::InMemoryRegistry::new()),
//! )?;
//! let feed = client.load_feed("alerts", LoadOptions::create()).await?;
//! let mut events = feed.load_subfeed("events")?;
//! events.append_one(serde_json::json!({"t": 1})).await?;
//! let messages = events.fetch_next(FetchOptions::default()).await?;
//! # let _ = messages;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod error;
pub mod feed;
pub mod snapshot;
pub mod stream;
pub mod subfeed;
pub mod watch;

pub use client::{FeedClient, LoadOptions};
pub use error::{FeedError, FeedResult};
pub use feed::{Feed, FeedKind};
pub use snapshot::{SnapshotPayload, SnapshotSubfeed};
pub use stream::{MessageStream, StreamState, EMPTY_POLL_BACKOFF, STREAM_WAIT_MSEC};
pub use subfeed::{FetchOptions, Subfeed};
pub use watch::{watch, SubfeedWatch, WatchOptions, WatchSpec, WatchTarget, UNBOUNDED};

// Re-export key types
pub use feedlog_crypto::{derive_subfeed_hash, SignedMessage};
pub use feedlog_protocol::{ClientConfig, Transport};
pub use feedlog_types::{Channel, FeedId, FeedUri, Message, SubfeedHash, SubfeedName};
