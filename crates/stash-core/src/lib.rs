//! # Stash Core — storage area abstraction
//!
//! Defines the callback-style [`StorageArea`] boundary that the facade in
//! `stash-store` wraps, the shared error taxonomy, the byte-usage accounting
//! rules, and two shipped areas:
//!
//! - [`MemoryArea`]: in-memory, synchronous callbacks, quota-enforcing.
//! - [`FsArea`]: one JSON document per key under a base directory, driven by
//!   spawned tokio tasks.
//!
//! The boundary is deliberately callback-shaped: a host-provided store hands
//! results to a completion callback rather than returning a future, and the
//! facade owns the bridge from one world to the other. Implementations must
//! invoke each callback exactly once; failures travel in the callback
//! argument, never out-of-band.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

/// Storage area trait and the key/entry shapes of its operations.
pub mod area;

/// Byte-usage accounting shared by areas and diagnostics.
pub mod bytes;

/// Error taxonomy.
pub mod error;

/// Filesystem-backed area.
pub mod filesystem;

/// In-memory area.
pub mod memory;

pub use area::{AreaCallback, Entries, KeySelection, StorageArea};
pub use error::{Result, StoreError};
pub use filesystem::{FsArea, FsAreaConfig};
pub use memory::{MemoryArea, MemoryAreaConfig, DEFAULT_QUOTA_BYTES};
