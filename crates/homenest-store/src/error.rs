//! # Store Errors
//!
//! Every failure a [`DocumentStore`](crate::DocumentStore) can report.
//! The HTTP layer maps all of them to a 500 with a generic message and
//! logs the variant's detail server-side.

use std::time::Duration;

use thiserror::Error;

/// Failure raised by a document store backend.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The identifier is not a 24-hex-character ObjectId.
    #[error("invalid document id: {0:?}")]
    InvalidId(String),

    /// The database driver reported an error.
    #[error("database error: {0}")]
    Backend(#[from] mongodb::error::Error),

    /// The operation did not complete within the configured bound.
    #[error("database operation timed out after {0:?}")]
    Timeout(Duration),

    /// The backend cannot serve requests.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}
