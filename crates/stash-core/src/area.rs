//! Storage area abstraction
//!
//! The backend boundary of the facade: a callback-style key-value store with
//! a fixed byte quota. The facade never talks to a backend any other way, so
//! swapping areas (in-memory, filesystem, a real host store) is a matter of
//! implementing this trait.

use std::collections::HashMap;

use serde_json::Value;

use crate::Result;

/// Selects which keys a backend operation applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeySelection {
    /// Every key currently stored in the area.
    All,
    /// A single key.
    One(String),
    /// An explicit set of keys.
    Many(Vec<String>),
}

impl KeySelection {
    /// Whether `key` is covered by this selection.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        match self {
            KeySelection::All => true,
            KeySelection::One(k) => k == key,
            KeySelection::Many(keys) => keys.iter().any(|k| k == key),
        }
    }
}

/// Entry map passed to `set` and returned by `get`.
pub type Entries = HashMap<String, Value>;

/// Completion callback for one backend call.
///
/// Invoked exactly once with the operation's outcome; there is no
/// out-of-band error channel.
pub type AreaCallback<T> = Box<dyn FnOnce(Result<T>) + Send + 'static>;

/// Callback-style key-value storage area with a fixed byte quota.
///
/// Every operation is asynchronous from the caller's point of view: the call
/// returns immediately and the outcome arrives through the `done` callback,
/// possibly on another thread. Implementations must invoke each callback
/// exactly once.
pub trait StorageArea: Send + Sync + 'static {
    /// Read the selected entries. Absent keys are simply missing from the
    /// returned map.
    fn get(&self, keys: KeySelection, done: AreaCallback<Entries>);

    /// Write every entry in `entries`, replacing existing values at the same
    /// keys.
    fn set(&self, entries: Entries, done: AreaCallback<()>);

    /// Remove the selected keys. Removing an absent key is not an error.
    fn remove(&self, keys: KeySelection, done: AreaCallback<()>);

    /// Remove every key in the area.
    fn clear(&self, done: AreaCallback<()>);

    /// Byte usage of the selected entries, per the accounting rules in
    /// [`crate::bytes`].
    fn bytes_in_use(&self, keys: KeySelection, done: AreaCallback<u64>);

    /// Fixed byte quota of this area.
    fn quota_bytes(&self) -> u64;
}
