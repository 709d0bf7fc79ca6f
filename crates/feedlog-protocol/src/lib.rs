//! Daemon wire protocol for feedlog.
//!
//! Defines the endpoint table, the camelCase JSON bodies exchanged with the
//! daemon, client configuration, and the [`Transport`] port that every
//! request goes through. [`DaemonApi`] layers typed calls on top of any
//! transport; [`HttpTransport`] is the production implementation.

pub mod api;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod message;
pub mod transport;

pub use api::DaemonApi;
pub use config::{ClientConfig, DEFAULT_DAEMON_URL};
pub use endpoint::{endpoints, ProbeResponse};
pub use error::{ProtocolError, ProtocolResult};
pub use message::{
    check_success, AppendMessagesRequest, CreateFeedRequest, CreateFeedResponse, Envelope,
    FeedIdRequest, GetFeedInfoResponse, GetNumLocalMessagesRequest, GetNumLocalMessagesResponse,
    WatchForNewMessagesRequest, WatchForNewMessagesResponse, WireSubfeedWatch,
};
pub use transport::{HttpTransport, Transport};
