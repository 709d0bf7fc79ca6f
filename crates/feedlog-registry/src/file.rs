//! JSON-file registry that persists across processes.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use tracing::debug;

use crate::error::{RegistryError, Result};
use crate::traits::NameRegistry;

/// A [`NameRegistry`] backed by a single JSON object file.
///
/// The file is read once on open and rewritten in full on every change,
/// through a temporary file renamed over the original.
#[derive(Debug)]
pub struct FileRegistry {
    path: PathBuf,
    entries: RwLock<BTreeMap<String, String>>,
}

impl FileRegistry {
    /// Open the registry at `path`. A missing file is an empty registry.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let entries = match std::fs::read(&path) {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map_err(|e| RegistryError::Serialization(e.to_string()))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        Ok(Self {
            path,
            entries: RwLock::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir)?;
        let json = serde_json::to_vec_pretty(entries)
            .map_err(|e| RegistryError::Serialization(e.to_string()))?;
        let mut tmp = tempfile::NamedTempFile::new_in(&dir)?;
        tmp.write_all(&json)?;
        tmp.persist(&self.path).map_err(|e| RegistryError::Io(e.error))?;
        debug!(path = %self.path.display(), entries = entries.len(), "registry saved");
        Ok(())
    }
}

fn poisoned<E: std::fmt::Display>(e: E) -> RegistryError {
    RegistryError::Serialization(format!("lock poisoned: {e}"))
}

impl NameRegistry for FileRegistry {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self.entries.read().map_err(poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.write().map_err(poisoned)?;
        entries.insert(key.to_string(), value.to_string());
        self.persist(&entries)
    }

    fn remove(&self, key: &str) -> Result<bool> {
        let mut entries = self.entries.write().map_err(poisoned)?;
        if entries.remove(key).is_none() {
            return Ok(false);
        }
        self.persist(&entries)?;
        Ok(true)
    }

    fn list(&self, prefix: &str) -> Result<Vec<(String, String)>> {
        let entries = self.entries.read().map_err(poisoned)?;
        Ok(entries
            .range(prefix.to_string()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use feedlog_types::FeedId;

    #[test]
    fn missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let reg = FileRegistry::open(dir.path().join("registry.json")).unwrap();
        assert!(reg.list("").unwrap().is_empty());
    }

    #[test]
    fn entries_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("registry.json");
        let id = FeedId::new("feed42").unwrap();
        {
            let reg = FileRegistry::open(&path).unwrap();
            reg.set_feed_id_for_name("alerts", &id).unwrap();
        }
        let reg = FileRegistry::open(&path).unwrap();
        assert_eq!(reg.feed_id_for_name("alerts").unwrap(), Some(id));
    }

    #[test]
    fn remove_is_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("registry.json");
        let reg = FileRegistry::open(&path).unwrap();
        reg.set("k", "v").unwrap();
        assert!(reg.remove("k").unwrap());
        assert!(!reg.remove("k").unwrap());
        drop(reg);
        assert_eq!(FileRegistry::open(&path).unwrap().get("k").unwrap(), None);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("registry.json");
        std::fs::write(&path, b"not json").unwrap();
        assert!(matches!(
            FileRegistry::open(&path),
            Err(RegistryError::Serialization(_))
        ));
    }

    #[test]
    fn list_uses_prefix() {
        let dir = tempfile::tempdir().unwrap();
        let reg = FileRegistry::open(dir.path().join("r.json")).unwrap();
        reg.set("feed_id_for_name/a", "1").unwrap();
        reg.set("other", "2").unwrap();
        assert_eq!(reg.feed_names().unwrap(), vec![("a".to_string(), "1".to_string())]);
    }
}
