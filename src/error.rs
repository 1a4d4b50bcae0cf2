//! Crate-wide error type.
//!
//! Mirrors the error taxonomy of the original system: a caller-visible
//! `DomainError` with a handful of kinds, plus a `DomainResult` alias kept
//! for continuity with the rest of the crate's naming.

use thiserror::Error;

/// Errors surfaced by any public operation in this crate.
#[derive(Debug, Error)]
pub enum DomainError {
    /// Malformed input: bad date, non-positive depth, empty required field.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A referenced person or organization id does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The store is unreachable or the pool is exhausted.
    #[error("dependency unavailable: {0}")]
    DependencyUnavailable(String),

    /// The caller cancelled the operation before it completed.
    #[error("cancelled")]
    Cancelled,

    /// Wraps a lower-level store error that doesn't map to a more specific kind.
    #[error("store error: {0}")]
    Store(#[from] sqlx::Error),
}

/// Convenience alias used throughout the crate.
pub type DomainResult<T> = Result<T, DomainError>;

impl DomainError {
    /// True if the underlying `sqlx::Error` looks like a connection-level
    /// failure (pool exhaustion, closed connection, network error) rather
    /// than a query-level failure (constraint violation, bad SQL).
    ///
    /// Used by the retry helper (§7: `DependencyUnavailable` is retried once
    /// with backoff; other kinds are not).
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            DomainError::DependencyUnavailable(_)
                | DomainError::Store(sqlx::Error::PoolTimedOut)
                | DomainError::Store(sqlx::Error::Io(_))
                | DomainError::Store(sqlx::Error::PoolClosed)
        )
    }
}
