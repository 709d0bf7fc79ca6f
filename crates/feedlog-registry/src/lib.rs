//! Local naming registry for feedlog.
//!
//! Feeds are identified by opaque daemon-assigned ids. The registry is a
//! small local key/value store that maps human-readable feed names to those
//! ids, so callers can say `alerts` instead of a 64-character key.
//!
//! # Modules
//!
//! - [`error`]: Error types for registry operations
//! - [`traits`]: The [`NameRegistry`] trait defining the storage interface
//! - [`names`]: Feed name validation
//! - [`memory`]: In-memory [`InMemoryRegistry`] for tests
//! - [`file`]: JSON-file [`FileRegistry`] for the CLI

pub mod error;
pub mod file;
pub mod memory;
pub mod names;
pub mod traits;

pub use error::{RegistryError, Result};
pub use file::FileRegistry;
pub use memory::InMemoryRegistry;
pub use names::validate_feed_name;
pub use traits::{feed_name_key, NameRegistry, FEED_NAME_PREFIX};
