//! # Stash Store — asynchronous facade over a quota-limited storage area
//!
//! A thin facade ([`StorageFacade`]) over a callback-style key-value storage
//! area, adding:
//!
//! - an async bridge: every backend operation returns exactly one future
//!   that settles once;
//! - a debugging mirror: an explicitly-refreshed, never-authoritative
//!   snapshot of backend content and total byte usage;
//! - two fallback-population policies: [`StorageFacade::get_or_else`]
//!   (use the cached value or compute-and-cache) and
//!   [`StorageFacade::force_get`] (always recompute and overwrite).
//!
//! ```no_run
//! use serde_json::json;
//! use stash_store::{MemoryArea, StorageFacade};
//!
//! # async fn demo() -> stash_store::Result<()> {
//! let facade = StorageFacade::new(MemoryArea::default());
//! facade.set("greeting", json!("hello")).await?;
//!
//! let greeting = facade
//!     .get_or_else("greeting", || async { Ok(json!("computed")) })
//!     .await?;
//! assert_eq!(greeting, json!("hello"));
//! # Ok(())
//! # }
//! ```
//!
//! The facade does not coordinate concurrent callers: two `get_or_else`
//! calls racing on the same absent key may both invoke their fallbacks, and
//! the last write-back wins.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod bridge;
mod facade;
mod mirror;

pub use facade::StorageFacade;

// Re-export the backend surface so most callers only need this crate.
pub use stash_core::{
    Entries, FsArea, FsAreaConfig, KeySelection, MemoryArea, MemoryAreaConfig, Result,
    StorageArea, StoreError, DEFAULT_QUOTA_BYTES,
};
