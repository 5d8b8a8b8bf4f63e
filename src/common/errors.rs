//! Error taxonomy surfaced to callers of the workflow and library.
//!
//! Lookup failures are not errors: an unknown identifier is reported
//! through [`crate::workflow::types::Outcome::Ignored`] and a log line.

use std::path::PathBuf;

/// Errors returned at the boundary of the crate.
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    /// A required input field was missing or malformed
    #[error("Invalid input: {0}")]
    Validation(String),

    /// A rejection was submitted without reviewer feedback
    #[error("Rejection feedback must not be empty")]
    EmptyFeedback,

    /// The asset file could not be read
    #[error("Failed to read asset {path:?}: {source}")]
    AssetRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Storage could not be opened
    #[error("Storage error: {0:#}")]
    Storage(#[from] anyhow::Error),
}

/// Convenience type alias for Results with WorkflowError.
pub type WorkflowResult<T> = Result<T, WorkflowError>;
