//! Content-addressed blob storage for feedlog.
//!
//! Snapshots are JSON documents stored under the SHA-1 of their canonical
//! encoding and named `sha1://<digest>`. This crate holds those documents.
//!
//! # Storage Backends
//!
//! All backends implement the [`BlobStore`] trait:
//!
//! - [`InMemoryBlobStore`] -- `HashMap`-based store for tests and embedding
//! - [`LocalBlobStore`] -- directory tree with atomic writes and verified reads
//!
//! # Design Rules
//!
//! 1. Blobs are immutable once written (content addressing guarantees this).
//! 2. The store never interprets blob contents beyond optional JSON parsing.
//! 3. All I/O errors are propagated, never silently ignored.

pub mod error;
pub mod local;
pub mod memory;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use local::LocalBlobStore;
pub use memory::InMemoryBlobStore;
pub use traits::BlobStore;
