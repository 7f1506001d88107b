//! Error types for sync operations.

use thiserror::Error;

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors that can occur during sync operations.
///
/// Remote-capability failures are transient by contract: the coordinator
/// captures them into the pending queue instead of raising them to the
/// mutation caller.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Network or transport error reported by the remote store.
    #[error("transport error: {message}")]
    Transport {
        /// Error message.
        message: String,
    },

    /// The remote store is not reachable.
    #[error("remote store unavailable")]
    Unavailable,

    /// Local engine error during sync.
    #[error("core error: {0}")]
    Core(#[from] expensedb_core::CoreError),
}

impl SyncError {
    /// Creates a transport error.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }
}
