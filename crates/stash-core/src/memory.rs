//! In-memory storage area.
//!
//! Callbacks fire synchronously on the caller's thread, so the area is
//! usable without a runtime and behaves deterministically in tests.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;

use crate::area::{AreaCallback, Entries, KeySelection, StorageArea};
use crate::bytes;
use crate::StoreError;

/// Default quota: the classic 5 MiB host-local storage allowance.
pub const DEFAULT_QUOTA_BYTES: u64 = 5_242_880;

/// Configuration for [`MemoryArea`].
#[derive(Debug, Clone)]
pub struct MemoryAreaConfig {
    /// Maximum total bytes the area will hold.
    pub quota_bytes: u64,
}

impl Default for MemoryAreaConfig {
    fn default() -> Self {
        Self {
            quota_bytes: DEFAULT_QUOTA_BYTES,
        }
    }
}

/// In-memory quota-enforcing storage area.
///
/// Cloning is cheap; clones share the same underlying map.
#[derive(Debug, Clone)]
pub struct MemoryArea {
    entries: Arc<Mutex<HashMap<String, Value>>>,
    quota_bytes: u64,
}

impl MemoryArea {
    /// Create an area with the given configuration.
    #[must_use]
    pub fn new(config: MemoryAreaConfig) -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            quota_bytes: config.quota_bytes,
        }
    }
}

impl Default for MemoryArea {
    fn default() -> Self {
        Self::new(MemoryAreaConfig::default())
    }
}

impl StorageArea for MemoryArea {
    fn get(&self, keys: KeySelection, done: AreaCallback<Entries>) {
        let selected: Entries = {
            let entries = self.entries.lock();
            entries
                .iter()
                .filter(|(key, _)| keys.contains(key))
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect()
        };
        done(Ok(selected));
    }

    fn set(&self, new_entries: Entries, done: AreaCallback<()>) {
        let outcome = {
            let mut entries = self.entries.lock();
            let mut usage = bytes::selected_bytes(&entries, &KeySelection::All);
            for (key, value) in &new_entries {
                if let Some(old) = entries.get(key) {
                    usage = usage.saturating_sub(bytes::entry_bytes(key, old));
                }
                usage += bytes::entry_bytes(key, value);
            }
            if usage > self.quota_bytes {
                Err(StoreError::QuotaExceeded {
                    needed: usage,
                    quota: self.quota_bytes,
                })
            } else {
                for (key, value) in new_entries {
                    entries.insert(key, value);
                }
                Ok(())
            }
        };
        done(outcome);
    }

    fn remove(&self, keys: KeySelection, done: AreaCallback<()>) {
        {
            let mut entries = self.entries.lock();
            match keys {
                KeySelection::All => entries.clear(),
                KeySelection::One(key) => {
                    entries.remove(&key);
                }
                KeySelection::Many(many) => {
                    for key in many {
                        entries.remove(&key);
                    }
                }
            }
        }
        done(Ok(()));
    }

    fn clear(&self, done: AreaCallback<()>) {
        self.entries.lock().clear();
        done(Ok(()));
    }

    fn bytes_in_use(&self, keys: KeySelection, done: AreaCallback<u64>) {
        let usage = bytes::selected_bytes(&self.entries.lock(), &keys);
        done(Ok(usage));
    }

    fn quota_bytes(&self) -> u64 {
        self.quota_bytes
    }
}
