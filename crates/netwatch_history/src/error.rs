//! Error types for the history engine.

use crate::types::SnapshotId;
use thiserror::Error;

/// Result type for history operations.
pub type HistoryResult<T> = Result<T, HistoryError>;

/// Errors that can occur in history engine operations.
///
/// Nothing here is fatal to a reconciliation batch: the engine isolates
/// failures per identity and continues, so these errors surface per entity
/// and never abort a cycle.
#[derive(Debug, Error)]
pub enum HistoryError {
    /// A stored chain violates an invariant, e.g. two simultaneously
    /// active snapshots for one identity. Treated as a data-quality alarm
    /// requiring out-of-band repair.
    #[error("integrity violation: {message}")]
    IntegrityViolation {
        /// Description of the violation.
        message: String,
    },

    /// The referenced snapshot does not exist in the store.
    #[error("snapshot not found: {id}")]
    SnapshotNotFound {
        /// The snapshot id that was not found.
        id: SnapshotId,
    },

    /// Close or close-and-open targeted a snapshot that is already closed.
    #[error("snapshot already closed: {id}")]
    SnapshotClosed {
        /// The snapshot id that was already closed.
        id: SnapshotId,
    },

    /// A snapshot handed to the store is malformed, e.g. a chain head with
    /// `valid_to` already set, or a replacement whose interval would
    /// regress behind its predecessor.
    #[error("invalid snapshot: {message}")]
    InvalidSnapshot {
        /// Description of what is malformed.
        message: String,
    },

    /// Persistence backend failure.
    ///
    /// The in-memory reference store never produces this; it exists for
    /// store implementations backed by real persistence.
    #[error("storage error: {message}")]
    Storage {
        /// Description of the failure.
        message: String,
    },
}

impl HistoryError {
    /// Creates an integrity violation error.
    pub fn integrity_violation(message: impl Into<String>) -> Self {
        Self::IntegrityViolation {
            message: message.into(),
        }
    }

    /// Creates an invalid snapshot error.
    pub fn invalid_snapshot(message: impl Into<String>) -> Self {
        Self::InvalidSnapshot {
            message: message.into(),
        }
    }

    /// Creates a storage error.
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }
}
