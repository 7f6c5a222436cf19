// src/error.rs
use std::time::Duration;

/// Failures surfaced by the recommendation core.
///
/// An empty recommendation list is a legitimate terminal state and is
/// represented as `Ok(vec![])`, never as an error.
#[derive(Debug, thiserror::Error)]
pub enum RecommendError {
    /// Target user does not exist in the rating store.
    #[error("user {0} not found")]
    UserNotFound(i64),

    /// A spot referenced by surviving ratings has no catalog entry.
    #[error("parking spot {0} not found")]
    SpotNotFound(i64),

    /// Rejected before any store query is issued.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// The rating store could not be reached or a query failed. Retryable
    /// by the caller; the core never retries on its own.
    #[error("rating store unavailable: {0}")]
    Store(#[from] sqlx::Error),

    /// The request-level deadline around store I/O and scoring elapsed.
    #[error("recommendation timed out after {0:?}")]
    Timeout(Duration),
}
