// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Durable key/value storage backing the credential store.
//!
//! Writes are batched so that a credential (access token, refresh token,
//! cached user) is stored or removed as a unit.

use crate::error::ClientError;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

/// Minimal persistent key/value interface.
pub trait KeyValueStorage: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, ClientError>;

    /// Write all entries as one atomic update.
    fn set_many(&self, entries: &[(&str, &str)]) -> Result<(), ClientError>;

    /// Remove all keys as one atomic update.
    fn remove_many(&self, keys: &[&str]) -> Result<(), ClientError>;
}

fn lock(entries: &Mutex<HashMap<String, String>>) -> MutexGuard<'_, HashMap<String, String>> {
    entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Process-local storage. Nothing survives a restart.
#[derive(Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, ClientError> {
        Ok(lock(&self.entries).get(key).cloned())
    }

    fn set_many(&self, entries: &[(&str, &str)]) -> Result<(), ClientError> {
        let mut map = lock(&self.entries);
        for (key, value) in entries {
            map.insert((*key).to_string(), (*value).to_string());
        }
        Ok(())
    }

    fn remove_many(&self, keys: &[&str]) -> Result<(), ClientError> {
        let mut map = lock(&self.entries);
        for key in keys {
            map.remove(*key);
        }
        Ok(())
    }
}

/// JSON file storage with an in-memory mirror.
///
/// The file is rewritten through a temporary sibling and renamed into place,
/// so a crash mid-write leaves the previous contents intact. The mirror is
/// updated before the file, so a failed write never leaves the process
/// believing it holds a credential it asked to remove.
pub struct FileStorage {
    path: PathBuf,
    entries: Mutex<HashMap<String, String>>,
}

impl FileStorage {
    /// Open (or lazily create) the storage file at `path`.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, ClientError> {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(contents) if contents.trim().is_empty() => HashMap::new(),
            Ok(contents) => serde_json::from_str(&contents).map_err(|e| {
                ClientError::Storage(format!("corrupt storage file {}: {e}", path.display()))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => {
                return Err(ClientError::Storage(format!(
                    "failed to read {}: {e}",
                    path.display()
                )))
            }
        };

        tracing::debug!(path = %path.display(), keys = entries.len(), "Opened credential storage");

        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, entries: &HashMap<String, String>) -> Result<(), ClientError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                ClientError::Storage(format!("failed to create {}: {e}", parent.display()))
            })?;
        }

        let json = serde_json::to_string_pretty(entries)
            .map_err(|e| ClientError::Storage(e.to_string()))?;
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, json)
            .and_then(|_| fs::rename(&tmp, &self.path))
            .map_err(|e| {
                ClientError::Storage(format!("failed to write {}: {e}", self.path.display()))
            })
    }
}

impl KeyValueStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, ClientError> {
        Ok(lock(&self.entries).get(key).cloned())
    }

    fn set_many(&self, entries: &[(&str, &str)]) -> Result<(), ClientError> {
        let mut map = lock(&self.entries);
        for (key, value) in entries {
            map.insert((*key).to_string(), (*value).to_string());
        }
        self.persist(&map)
    }

    fn remove_many(&self, keys: &[&str]) -> Result<(), ClientError> {
        let mut map = lock(&self.entries);
        for key in keys {
            map.remove(*key);
        }
        self.persist(&map)
    }
}
