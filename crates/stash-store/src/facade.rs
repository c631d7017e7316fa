//! The storage facade.
//!
//! Wraps a [`StorageArea`] with future-style operations, a debugging mirror,
//! and the two fallback-population policies (`get_or_else`, `force_get`).

use std::future::Future;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use stash_core::{Entries, KeySelection, Result, StorageArea, StoreError};

use crate::bridge::PendingOp;
use crate::mirror::DebugMirror;

/// Asynchronous facade over a quota-limited key-value storage area.
///
/// Cloning is cheap; clones share the same backend and debugging mirror.
/// The mirror belongs to the facade instance rather than living in ambient
/// global state, so callers thread the facade through instead of reaching
/// for a singleton.
pub struct StorageFacade<A: StorageArea> {
    area: Arc<A>,
    mirror: Arc<DebugMirror>,
}

impl<A: StorageArea> Clone for StorageFacade<A> {
    fn clone(&self) -> Self {
        Self {
            area: Arc::clone(&self.area),
            mirror: Arc::clone(&self.mirror),
        }
    }
}

impl<A: StorageArea> StorageFacade<A> {
    /// Wrap `area` with an empty debugging mirror.
    pub fn new(area: A) -> Self {
        Self {
            area: Arc::new(area),
            mirror: Arc::new(DebugMirror::default()),
        }
    }

    /// Look up `key`.
    ///
    /// Never fails: a backend error is logged and reported as absence, so a
    /// caller cannot distinguish "missing" from "unreadable" through this
    /// operation. That mirrors the backend contract this facade wraps;
    /// operations that do surface errors (`set`, `drop_key`, `clear`,
    /// `bytes_in_use`) are the place to probe backend health.
    pub async fn get(&self, key: &str) -> Option<Value> {
        let area = Arc::clone(&self.area);
        let selection = KeySelection::One(key.to_string());
        let outcome = PendingOp::start(move |done| area.get(selection, done))
            .settled()
            .await;
        match outcome {
            Ok(mut entries) => entries.remove(key),
            Err(e) => {
                debug!("read of key '{key}' failed, treating as absent: {e}");
                None
            }
        }
    }

    /// Write `value` at `key`.
    ///
    /// Fails with [`StoreError::InvalidArgument`] before any backend call if
    /// `key` is empty or `value` is `null` (the absence marker).
    pub async fn set(&self, key: &str, value: Value) -> Result<()> {
        Self::validate(key, &value)?;
        let area = Arc::clone(&self.area);
        let mut entries = Entries::new();
        entries.insert(key.to_string(), value);
        PendingOp::start(move |done| area.set(entries, done))
            .settled()
            .await
    }

    /// Remove `key`. Removing an absent key succeeds.
    pub async fn drop_key(&self, key: &str) -> Result<()> {
        let area = Arc::clone(&self.area);
        let selection = KeySelection::One(key.to_string());
        PendingOp::start(move |done| area.remove(selection, done))
            .settled()
            .await
    }

    /// Remove every key in the area.
    pub async fn clear(&self) -> Result<()> {
        let area = Arc::clone(&self.area);
        PendingOp::start(move |done| area.clear(done))
            .settled()
            .await
    }

    /// Byte usage of the selected entries.
    ///
    /// Logs the outcome either way; the log line is diagnostic only and not
    /// part of the contract.
    pub async fn bytes_in_use(&self, keys: KeySelection) -> Result<u64> {
        let area = Arc::clone(&self.area);
        let selection = keys.clone();
        let outcome = PendingOp::start(move |done| area.bytes_in_use(selection, done))
            .settled()
            .await;
        match &outcome {
            Ok(n) => debug!("retrieved bytes in use for {keys:?}: {n}"),
            Err(e) => debug!("error retrieving bytes in use for {keys:?}: {e}"),
        }
        outcome
    }

    /// Quota-byte ceiling of the underlying area.
    pub fn quota(&self) -> u64 {
        self.area.quota_bytes()
    }

    /// Read-through cache: return the stored value, or compute and cache it.
    ///
    /// When `key` holds a value the fallback never runs. When it is absent
    /// the fallback runs exactly once, its value is returned immediately,
    /// and the write-back happens on a spawned task — a write-back failure
    /// is logged, never surfaced. Concurrent calls on the same absent key
    /// are not coordinated: both fallbacks may run, and whichever write-back
    /// completes last wins.
    pub async fn get_or_else<F, Fut>(&self, key: &str, fallback: F) -> Result<Value>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Value>>,
    {
        if let Some(existing) = self.get(key).await {
            return Ok(existing);
        }
        debug!("no cached value for key '{key}', using fallback");
        let value = fallback().await?;
        self.write_back(key, value.clone());
        Ok(value)
    }

    /// Always recompute: run the fallback unconditionally, overwrite the
    /// cache, return the fresh value.
    ///
    /// Any existing value at `key` is ignored. The write-back is
    /// fire-and-forget, exactly as in [`Self::get_or_else`].
    pub async fn force_get<F, Fut>(&self, key: &str, fallback: F) -> Result<Value>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Value>>,
    {
        let value = fallback().await?;
        self.write_back(key, value.clone());
        Ok(value)
    }

    /// Typed read through [`Self::get`]. Deserialization failures are
    /// surfaced, unlike backend failures.
    pub async fn get_typed<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.get(key).await {
            Some(value) => serde_json::from_value(value)
                .map(Some)
                .map_err(|e| StoreError::Serialization(e.to_string())),
            None => Ok(None),
        }
    }

    /// Typed write through [`Self::set`].
    pub async fn set_typed<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let value =
            serde_json::to_value(value).map_err(|e| StoreError::Serialization(e.to_string()))?;
        self.set(key, value).await
    }

    /// Re-fetch the entire backend content into the debugging mirror.
    ///
    /// On failure the previous snapshot is retained and the error is only
    /// logged.
    pub async fn refresh_debug_cache(&self) {
        let area = Arc::clone(&self.area);
        let outcome = PendingOp::start(move |done| area.get(KeySelection::All, done))
            .settled()
            .await;
        match outcome {
            Ok(entries) => self.mirror.replace_cache(entries),
            Err(e) => debug!("debug cache refresh failed, keeping previous snapshot: {e}"),
        }
    }

    /// Re-fetch the total byte usage into the debugging mirror.
    ///
    /// On failure the previous value is retained and the error is only
    /// logged.
    pub async fn refresh_debug_total_bytes(&self) {
        match self.bytes_in_use(KeySelection::All).await {
            Ok(total) => {
                debug!("total bytes in use: {total}");
                self.mirror.replace_total_bytes(total);
            }
            Err(e) => debug!("debug total-bytes refresh failed, keeping previous value: {e}"),
        }
    }

    /// Last-refreshed mirror of the backend content. Stale by construction:
    /// it reflects the last [`Self::refresh_debug_cache`] call, not the
    /// current backend state. Empty before the first refresh.
    pub fn debug_cache(&self) -> Entries {
        self.mirror.cache()
    }

    /// Last-refreshed total byte count. `None` before the first
    /// [`Self::refresh_debug_total_bytes`] call.
    pub fn debug_total_bytes_in_use(&self) -> Option<u64> {
        self.mirror.total_bytes()
    }

    /// Quota usage as a fraction in [0, 1], or NaN before the first
    /// total-bytes refresh. Callers must treat NaN as "not yet known".
    pub fn debug_percent_used(&self) -> f64 {
        self.mirror.percent_used(self.quota())
    }

    /// Serialized byte length of the mirrored value at `key` — reflects the
    /// mirror, not the live backend.
    pub fn debug_size_of(&self, key: &str) -> Option<u64> {
        self.mirror.size_of(key)
    }

    /// Fire-and-forget cache population after a fallback produced `value`.
    /// The outer operation has already resolved; failure here is logged only.
    fn write_back(&self, key: &str, value: Value) {
        let facade = self.clone();
        let key = key.to_string();
        tokio::spawn(async move {
            if let Err(e) = facade.set(&key, value).await {
                warn!("write-back of key '{key}' failed: {e}");
            }
        });
    }

    fn validate(key: &str, value: &Value) -> Result<()> {
        if key.is_empty() {
            return Err(StoreError::InvalidArgument {
                reason: "key must not be empty".to_string(),
            });
        }
        if value.is_null() {
            return Err(StoreError::InvalidArgument {
                reason: "null is reserved as the absence marker".to_string(),
            });
        }
        Ok(())
    }
}
