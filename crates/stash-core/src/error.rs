//! Error types shared across the stash crates.

use thiserror::Error;

/// Errors surfaced by storage areas and the facade built on top of them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Caller handed the facade an argument the backend must never see.
    /// Raised before any backend call is issued.
    #[error("invalid argument: {reason}")]
    InvalidArgument {
        /// What was wrong with the argument.
        reason: String,
    },

    /// The backend reported a failure through its completion callback.
    #[error("backend error: {message}")]
    Backend {
        /// The backend's error message, verbatim.
        message: String,
    },

    /// A write would push the area past its byte quota.
    #[error("quota exceeded: {needed} bytes needed, quota is {quota}")]
    QuotaExceeded {
        /// Total usage the rejected write would have produced.
        needed: u64,
        /// The area's fixed quota.
        quota: u64,
    },

    /// A typed value could not be converted to or from its stored form.
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Result alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, StoreError>;
