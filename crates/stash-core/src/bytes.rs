//! Byte-usage accounting.
//!
//! An entry costs its key length plus the length of its serialized JSON
//! form; an area's usage is the sum over stored entries. Both shipped areas
//! and the facade's debugging mirror use the same rules, so quota math and
//! diagnostics agree.

use serde_json::Value;

use crate::area::{Entries, KeySelection};

/// Serialized JSON length of a single value, in bytes.
#[must_use]
pub fn value_bytes(value: &Value) -> u64 {
    serde_json::to_string(value)
        .map(|s| s.len() as u64)
        .unwrap_or(0)
}

/// Cost of one stored entry.
#[must_use]
pub fn entry_bytes(key: &str, value: &Value) -> u64 {
    key.len() as u64 + value_bytes(value)
}

/// Usage of the entries covered by `keys`. Absent keys contribute nothing.
#[must_use]
pub fn selected_bytes(entries: &Entries, keys: &KeySelection) -> u64 {
    entries
        .iter()
        .filter(|(key, _)| keys.contains(key))
        .map(|(key, value)| entry_bytes(key, value))
        .sum()
}
