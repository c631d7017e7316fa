//! Filesystem-backed storage area.
//!
//! Stores one JSON document per key under a base directory. Keys may contain
//! `/`, which maps to nested directories; `..`, root, and empty segments are
//! rejected so every document stays inside the area. Operations run on
//! spawned tasks and fire their callback on completion, so the area requires
//! a running tokio runtime. Mutating operations are serialized internally;
//! the area owns its quota enforcement like any backend.

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use serde_json::Value;
use tokio::fs;
use tracing::debug;

use crate::area::{AreaCallback, Entries, KeySelection, StorageArea};
use crate::bytes;
use crate::memory::DEFAULT_QUOTA_BYTES;
use crate::{Result, StoreError};

/// Configuration for [`FsArea`].
#[derive(Debug, Clone)]
pub struct FsAreaConfig {
    /// Directory the area stores its documents under.
    pub base_path: PathBuf,
    /// Maximum total bytes the area will hold.
    pub quota_bytes: u64,
}

impl FsAreaConfig {
    /// Config rooted at `base_path` with the default quota.
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            quota_bytes: DEFAULT_QUOTA_BYTES,
        }
    }
}

/// Filesystem-backed quota-enforcing storage area.
#[derive(Debug, Clone)]
pub struct FsArea {
    config: Arc<FsAreaConfig>,
    /// Serializes mutations: the quota walk and the writes it admits must be
    /// atomic with respect to other writers.
    write_lock: Arc<tokio::sync::Mutex<()>>,
}

fn io_error(context: &str, err: std::io::Error) -> StoreError {
    StoreError::Backend {
        message: format!("{context}: {err}"),
    }
}

impl FsArea {
    /// Create an area rooted at the configured directory.
    ///
    /// The directory is created lazily on first write.
    #[must_use]
    pub fn new(config: FsAreaConfig) -> Self {
        debug!("filesystem area rooted at {:?}", config.base_path);
        Self {
            config: Arc::new(config),
            write_lock: Arc::new(tokio::sync::Mutex::new(())),
        }
    }

    /// Document path for `key`. Every component of the key must be a plain
    /// path segment, so documents can never resolve outside the base
    /// directory (and the directory walk sees everything that was stored).
    fn key_path(&self, key: &str) -> Result<PathBuf> {
        let plain_segments = !key.is_empty()
            && Path::new(key)
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !plain_segments {
            return Err(StoreError::InvalidArgument {
                reason: format!("key '{key}' would resolve outside the storage area"),
            });
        }
        Ok(self.config.base_path.join(format!("{key}.json")))
    }

    /// Every stored key with the path of its document.
    async fn list_key_paths(&self) -> Result<Vec<(String, PathBuf)>> {
        let base = &self.config.base_path;
        let mut found = Vec::new();
        let mut stack = vec![base.clone()];

        while let Some(dir) = stack.pop() {
            let mut entries = match fs::read_dir(&dir).await {
                Ok(entries) => entries,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => return Err(io_error("failed to read area directory", e)),
            };

            while let Some(entry) = entries
                .next_entry()
                .await
                .map_err(|e| io_error("failed to read directory entry", e))?
            {
                let file_type = entry
                    .file_type()
                    .await
                    .map_err(|e| io_error("failed to stat directory entry", e))?;
                let path = entry.path();

                if file_type.is_dir() {
                    stack.push(path);
                    continue;
                }
                if !file_type.is_file() {
                    continue;
                }
                if path.extension().and_then(|e| e.to_str()) != Some("json") {
                    continue;
                }

                let rel = path.strip_prefix(base).map_err(|e| StoreError::Backend {
                    message: format!("failed to compute key from document path: {e}"),
                })?;
                let rel = rel.with_extension("");
                let mut key = rel.to_string_lossy().to_string();
                if std::path::MAIN_SEPARATOR != '/' {
                    key = key.replace(std::path::MAIN_SEPARATOR, "/");
                }
                found.push((key, path));
            }
        }

        Ok(found)
    }

    async fn read_value(&self, key: &str) -> Result<Option<Value>> {
        let path = self.key_path(key)?;
        let data = match fs::read(&path).await {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(io_error("failed to read stored document", e)),
        };
        let value = serde_json::from_slice(&data).map_err(|e| StoreError::Backend {
            message: format!("stored document for key '{key}' is corrupt: {e}"),
        })?;
        Ok(Some(value))
    }

    async fn load_selected(&self, keys: &KeySelection) -> Result<Entries> {
        // Single-key reads skip the directory walk.
        if let KeySelection::One(key) = keys {
            let mut out = Entries::new();
            if let Some(value) = self.read_value(key).await? {
                out.insert(key.clone(), value);
            }
            return Ok(out);
        }

        let mut out = Entries::new();
        for (key, path) in self.list_key_paths().await? {
            if !keys.contains(&key) {
                continue;
            }
            let data = fs::read(&path)
                .await
                .map_err(|e| io_error("failed to read stored document", e))?;
            let value = serde_json::from_slice(&data).map_err(|e| StoreError::Backend {
                message: format!("stored document for key '{key}' is corrupt: {e}"),
            })?;
            out.insert(key, value);
        }
        Ok(out)
    }

    async fn store_entries(&self, new_entries: Entries) -> Result<()> {
        // Validate every key before any document is touched, so a bad key
        // cannot leave a partial write behind.
        for key in new_entries.keys() {
            self.key_path(key)?;
        }

        let current = self.load_selected(&KeySelection::All).await?;
        let mut usage = bytes::selected_bytes(&current, &KeySelection::All);
        for (key, value) in &new_entries {
            if let Some(old) = current.get(key) {
                usage = usage.saturating_sub(bytes::entry_bytes(key, old));
            }
            usage += bytes::entry_bytes(key, value);
        }
        if usage > self.config.quota_bytes {
            return Err(StoreError::QuotaExceeded {
                needed: usage,
                quota: self.config.quota_bytes,
            });
        }

        for (key, value) in new_entries {
            let path = self.key_path(&key)?;
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)
                    .await
                    .map_err(|e| io_error("failed to create document directory", e))?;
            }
            let data =
                serde_json::to_vec(&value).map_err(|e| StoreError::Serialization(e.to_string()))?;
            fs::write(&path, data)
                .await
                .map_err(|e| io_error("failed to write stored document", e))?;
        }
        Ok(())
    }

    async fn remove_one(&self, key: &str) -> Result<()> {
        match fs::remove_file(self.key_path(key)?).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_error("failed to remove stored document", e)),
        }
    }

    async fn remove_selected(&self, keys: KeySelection) -> Result<()> {
        match keys {
            KeySelection::All => self.clear_all().await,
            KeySelection::One(key) => self.remove_one(&key).await,
            KeySelection::Many(many) => {
                for key in many {
                    self.remove_one(&key).await?;
                }
                Ok(())
            }
        }
    }

    async fn clear_all(&self) -> Result<()> {
        match fs::remove_dir_all(&self.config.base_path).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(io_error("failed to clear area directory", e)),
        }
        fs::create_dir_all(&self.config.base_path)
            .await
            .map_err(|e| io_error("failed to recreate area directory", e))
    }
}

impl StorageArea for FsArea {
    fn get(&self, keys: KeySelection, done: AreaCallback<Entries>) {
        let area = self.clone();
        tokio::spawn(async move {
            done(area.load_selected(&keys).await);
        });
    }

    fn set(&self, entries: Entries, done: AreaCallback<()>) {
        let area = self.clone();
        tokio::spawn(async move {
            let _guard = area.write_lock.lock().await;
            done(area.store_entries(entries).await);
        });
    }

    fn remove(&self, keys: KeySelection, done: AreaCallback<()>) {
        let area = self.clone();
        tokio::spawn(async move {
            let _guard = area.write_lock.lock().await;
            done(area.remove_selected(keys).await);
        });
    }

    fn clear(&self, done: AreaCallback<()>) {
        let area = self.clone();
        tokio::spawn(async move {
            let _guard = area.write_lock.lock().await;
            done(area.clear_all().await);
        });
    }

    fn bytes_in_use(&self, keys: KeySelection, done: AreaCallback<u64>) {
        let area = self.clone();
        tokio::spawn(async move {
            let outcome = area
                .load_selected(&keys)
                .await
                .map(|entries| bytes::selected_bytes(&entries, &KeySelection::All));
            done(outcome);
        });
    }

    fn quota_bytes(&self) -> u64 {
        self.config.quota_bytes
    }
}
