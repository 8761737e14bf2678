//! Persisted local key-value state
//!
//! A small JSON file holding string values (currently just the auth token).
//! Reads are served from memory; every mutation is written through to disk.
//!
//! # Example
//!
//! ```rust,ignore
//! use notebook_core::storage::LocalStore;
//!
//! let store = LocalStore::open("/tmp/notebook/state.json")?;
//! store.set("token", "abc123")?;
//! assert_eq!(store.get("token")?.as_deref(), Some("abc123"));
//! store.remove("token")?;
//! ```

use crate::error::{Error, Result};
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

/// File-backed key-value store
#[derive(Debug)]
pub struct LocalStore {
    path: PathBuf,
    entries: RwLock<BTreeMap<String, String>>,
}

impl LocalStore {
    /// Open the store at `path`, loading existing entries if the file exists
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        let entries = if path.exists() {
            let content = fs::read_to_string(&path)?;
            if content.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&content)
                    .map_err(|e| Error::state_corrupted(&path).with_source(e))?
            }
        } else {
            BTreeMap::new()
        };

        Ok(Self {
            path,
            entries: RwLock::new(entries),
        })
    }

    /// Location of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get a value
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        let guard = self.entries.read().map_err(|_| Error::state_locked())?;
        Ok(guard.get(key).cloned())
    }

    /// Set a value and persist
    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut guard = self.entries.write().map_err(|_| Error::state_locked())?;
        guard.insert(key.to_string(), value.to_string());
        self.persist(&guard)
    }

    /// Remove a value and persist; returns whether it existed
    pub fn remove(&self, key: &str) -> Result<bool> {
        let mut guard = self.entries.write().map_err(|_| Error::state_locked())?;
        if guard.remove(key).is_none() {
            return Ok(false);
        }
        self.persist(&guard)?;
        Ok(true)
    }

    fn persist(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        // Write to a sibling file first so a crash never leaves half a document.
        let tmp = self.path.with_extension("json.tmp");
        let mut file = private_file(&tmp)?;
        file.write_all(serde_json::to_string_pretty(entries)?.as_bytes())?;
        file.sync_all()?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

/// Create or truncate a file readable only by its owner
#[cfg(unix)]
fn private_file(path: &Path) -> Result<fs::File> {
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    let file = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    // mode() only applies on creation; a leftover temp file keeps its bits
    file.set_permissions(fs::Permissions::from_mode(0o600))?;
    Ok(file)
}

#[cfg(not(unix))]
fn private_file(path: &Path) -> Result<fs::File> {
    Ok(fs::File::create(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn test_set_get_remove() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::open(dir.path().join("state.json")).unwrap();

        assert_eq!(store.get("token").unwrap(), None);

        store.set("token", "abc").unwrap();
        assert_eq!(store.get("token").unwrap().as_deref(), Some("abc"));

        assert!(store.remove("token").unwrap());
        assert!(!store.remove("token").unwrap());
        assert_eq!(store.get("token").unwrap(), None);
    }

    #[test]
    fn test_values_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("state.json");

        LocalStore::open(&path).unwrap().set("token", "persisted").unwrap();

        let reopened = LocalStore::open(&path).unwrap();
        assert_eq!(reopened.get("token").unwrap().as_deref(), Some("persisted"));
    }

    #[cfg(unix)]
    #[test]
    fn test_state_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, "{}").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();

        LocalStore::open(&path).unwrap().set("token", "secret").unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_corrupted_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, "{not json").unwrap();

        let err = LocalStore::open(&path).unwrap_err();
        assert_eq!(err.code, ErrorCode::StateCorrupted);
        assert!(err.suggestion.is_some());
    }

    #[test]
    fn test_empty_file_is_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, "").unwrap();

        let store = LocalStore::open(&path).unwrap();
        assert_eq!(store.get("token").unwrap(), None);
    }
}
