//! Error types for vigil-tracker.

use thiserror::Error;

/// Result type for tracker operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in tracker operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Attribute store failure
    #[error("store error: {0}")]
    Store(#[from] vigil_store::Error),

    /// Manual readiness entry outside the accepted range
    #[error(transparent)]
    ManualEntry(#[from] vigil_readiness::ManualEntryError),

    /// Proposed display order is not a permutation of the displayed set
    #[error("invalid reorder: {0}")]
    InvalidReorder(String),

    /// Pip index outside the fixed row
    #[error("pip index {0} outside the fixed row")]
    PipIndex(usize),

    /// Per-participant write mailbox has shut down
    #[error("participant writer stopped: {0}")]
    Mailbox(String),
}
