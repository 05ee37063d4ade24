/// Remote-adapter errors.
///
/// Each variant maps to a different sync-engine decision: continue the
/// batch, halt the batch early, or abort before any network call.
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    #[error("remote backend is not configured")]
    NotConfigured,

    #[error("unauthorized: {reason}")]
    Unauthorized { reason: String },

    #[error("network error: {reason}")]
    Network { reason: String },

    #[error("validation error: {reason}")]
    Validation { reason: String },

    #[error("remote collection missing: {collection}")]
    MissingCollection { collection: String },
}

impl RemoteError {
    /// Whether this failure would repeat identically for every record
    /// in a batch. When true, the upload loop halts early instead of
    /// producing one copy of the same error per record.
    pub fn halts_batch(&self) -> bool {
        matches!(
            self,
            RemoteError::NotConfigured | RemoteError::MissingCollection { .. }
        )
    }
}
