//! Debugging mirror of backend content.
//!
//! The mirror is never authoritative: it holds whatever the last explicit
//! refresh observed, and nothing keeps it in sync with the backend in
//! between. Accessors are synchronous so diagnostics never touch the
//! backend.

use parking_lot::RwLock;

use stash_core::{bytes, Entries};

/// Last-refreshed snapshot of backend content and total byte usage.
#[derive(Debug, Default)]
pub(crate) struct DebugMirror {
    cache: RwLock<Entries>,
    total_bytes: RwLock<Option<u64>>,
}

impl DebugMirror {
    pub(crate) fn replace_cache(&self, entries: Entries) {
        *self.cache.write() = entries;
    }

    pub(crate) fn replace_total_bytes(&self, total: u64) {
        *self.total_bytes.write() = Some(total);
    }

    /// Clone of the mirrored entries. Empty before the first refresh.
    pub(crate) fn cache(&self) -> Entries {
        self.cache.read().clone()
    }

    /// Mirrored total byte count. `None` before the first refresh.
    pub(crate) fn total_bytes(&self) -> Option<u64> {
        *self.total_bytes.read()
    }

    /// Usage as a fraction of `quota`. NaN until a total-bytes refresh has
    /// completed, so callers can tell "unknown" from "empty".
    pub(crate) fn percent_used(&self, quota: u64) -> f64 {
        match *self.total_bytes.read() {
            Some(total) => total as f64 / quota as f64,
            None => f64::NAN,
        }
    }

    /// Serialized size of the mirrored value at `key`, if mirrored.
    pub(crate) fn size_of(&self, key: &str) -> Option<u64> {
        self.cache.read().get(key).map(bytes::value_bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_until_refreshed() {
        let mirror = DebugMirror::default();
        assert!(mirror.cache().is_empty());
        assert_eq!(mirror.total_bytes(), None);
        assert!(mirror.percent_used(100).is_nan());
        assert_eq!(mirror.size_of("k"), None);
    }

    #[test]
    fn snapshot_replacement() {
        let mirror = DebugMirror::default();
        let mut entries = Entries::new();
        entries.insert("k".into(), json!("xy"));
        mirror.replace_cache(entries);
        mirror.replace_total_bytes(25);

        assert_eq!(mirror.cache().get("k"), Some(&json!("xy")));
        assert_eq!(mirror.total_bytes(), Some(25));
        assert!((mirror.percent_used(100) - 0.25).abs() < f64::EPSILON);
        assert_eq!(mirror.size_of("k"), Some(4)); // "\"xy\""
    }
}
