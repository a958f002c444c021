//! Error types for the list store.

use thiserror::Error;

/// Errors that can occur during list store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A list with this id already exists for the user.
    ///
    /// The expected outcome of a conditional create losing its race
    /// (e.g. a duplicate tap); the existing header is left untouched.
    #[error("list '{0}' already exists")]
    AlreadyExists(String),

    /// A conditional write failed its condition check.
    ///
    /// Raised by the table layer; [`crate::store::ListStore`] maps it to
    /// [`StoreError::AlreadyExists`] where the condition guards creation.
    #[error("conditional write failed")]
    ConditionFailed,

    /// Identifier is empty or contains the `#` key delimiter.
    #[error("invalid identifier {0:?}: must be non-empty and free of '#'")]
    InvalidId(String),

    /// The backend throttled a batch and left writes unapplied.
    #[error("backend left {0} writes unprocessed")]
    Throttled(usize),

    /// A single batch call exceeded the backend write limit.
    #[error(
        "batch of {0} exceeds the write limit of {limit}",
        limit = crate::schema::BATCH_WRITE_LIMIT
    )]
    BatchTooLarge(usize),

    /// Backend request failed (network, service error, timeout).
    #[error("backend error: {0}")]
    Backend(String),
}

impl StoreError {
    /// Check if this error is worth retrying from the caller's side.
    ///
    /// The store itself never retries; any retry/backoff policy belongs
    /// to the caller.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Throttled(_) | Self::Backend(_))
    }

    /// Suggested retry delay in seconds, if applicable.
    #[must_use]
    pub const fn retry_delay(&self) -> Option<u64> {
        match self {
            Self::Throttled(_) => Some(1),
            Self::Backend(_) => Some(2),
            _ => None,
        }
    }
}

/// Result type for list store operations.
pub type StoreResult<T> = Result<T, StoreError>;
