//! The [`NameRegistry`] trait defining the registry storage interface.

use feedlog_types::FeedId;

use crate::error::{RegistryError, Result};
use crate::names::validate_feed_name;

/// Key prefix under which feed names are recorded.
pub const FEED_NAME_PREFIX: &str = "feed_id_for_name/";

/// Storage backend for the local key/value naming registry.
///
/// Implementations must be thread-safe (`Send + Sync`) and provide atomic
/// get/set/remove operations. Feed names are stored under
/// `feed_id_for_name/<name>`; other prefixes are free for other uses.
pub trait NameRegistry: Send + Sync {
    /// Read the value at `key`. Returns `Ok(None)` if absent.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write (create or replace) the value at `key`.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Delete `key`. Returns `Ok(true)` if it existed.
    fn remove(&self, key: &str) -> Result<bool>;

    /// List all entries whose key starts with `prefix`, sorted by key.
    fn list(&self, prefix: &str) -> Result<Vec<(String, String)>>;

    /// The feed id recorded for `name`, if any.
    fn feed_id_for_name(&self, name: &str) -> Result<Option<FeedId>> {
        validate_feed_name(name)?;
        let key = feed_name_key(name);
        match self.get(&key)? {
            Some(value) => FeedId::new(value.as_str())
                .map(Some)
                .map_err(|_| RegistryError::CorruptEntry { key, value }),
            None => Ok(None),
        }
    }

    /// Record that `name` refers to `feed_id`.
    fn set_feed_id_for_name(&self, name: &str, feed_id: &FeedId) -> Result<()> {
        validate_feed_name(name)?;
        self.set(&feed_name_key(name), feed_id.as_str())
    }

    /// Forget `name`. Returns `Ok(true)` if it was recorded.
    fn remove_feed_name(&self, name: &str) -> Result<bool> {
        validate_feed_name(name)?;
        self.remove(&feed_name_key(name))
    }

    /// All recorded feed names with their ids.
    fn feed_names(&self) -> Result<Vec<(String, String)>> {
        Ok(self
            .list(FEED_NAME_PREFIX)?
            .into_iter()
            .filter_map(|(k, v)| Some((k.strip_prefix(FEED_NAME_PREFIX)?.to_string(), v)))
            .collect())
    }
}

/// Registry key for a feed name.
pub fn feed_name_key(name: &str) -> String {
    format!("{FEED_NAME_PREFIX}{name}")
}
