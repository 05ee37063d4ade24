//! Error taxonomy for the whole workspace.
//!
//! Sub-errors per layer (storage, remote), folded into one top-level
//! `CpdError` so callers can use a single result alias end to end.

mod remote_error;
mod storage_error;

pub use remote_error::RemoteError;
pub use storage_error::StorageError;

/// Result alias used across all cpd crates.
pub type CpdResult<T> = Result<T, CpdError>;

/// Top-level error for the cost-per-day tracker.
#[derive(Debug, thiserror::Error)]
pub enum CpdError {
    #[error("asset not found: {id}")]
    AssetNotFound { id: String },

    #[error("subscription not found: {id}")]
    SubscriptionNotFound { id: String },

    #[error("invalid asset role: {reason}")]
    InvalidRole { reason: String },

    #[error("storage error: {0}")]
    StorageError(#[from] StorageError),

    #[error("remote error: {0}")]
    RemoteError(#[from] RemoteError),

    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}
