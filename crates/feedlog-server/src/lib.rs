//! Development daemon for feedlog.
//!
//! [`MemoryDaemon`] keeps feeds in memory, signs appended messages, and
//! answers the long-poll watch. Clients can use it directly as a
//! `Transport`, or reach it over HTTP through [`FeedServer`].

pub mod config;
pub mod daemon;
pub mod error;
pub mod handler;
pub mod router;
pub mod server;

pub use config::ServerConfig;
pub use daemon::MemoryDaemon;
pub use error::{ServerError, ServerResult};
pub use router::build_router;
pub use server::FeedServer;
