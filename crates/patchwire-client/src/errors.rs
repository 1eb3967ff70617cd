//! Client error types.
//!
//! Transport failures never surface as errors: a dropped or refused
//! connection collapses into the disconnected state and resets the mirror.
//! Only operations with a caller waiting on a result return `ClientError`.

use thiserror::Error;

/// Errors returned by client operations.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The product endpoint could not be reached or returned bad data.
    #[error("product fetch failed: {0}")]
    ProductFetch(#[from] reqwest::Error),
}
