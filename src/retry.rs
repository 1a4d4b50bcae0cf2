//! Retry-once-with-backoff for store round-trips.
//!
//! Generalizes the teacher's NATS reconnect backoff (`infrastructure::retry`)
//! to the store-wrapper layer: a `DependencyUnavailable` failure is retried
//! exactly once after a short delay, then surfaced (§7).

use std::time::Duration;
use tracing::warn;

use crate::error::{DomainError, DomainResult};

/// Backoff applied between the first attempt and the single retry.
const RETRY_BACKOFF: Duration = Duration::from_millis(200);

/// Runs `operation` once; if it fails with a connection-level error, waits
/// [`RETRY_BACKOFF`] and tries exactly once more before giving up.
pub async fn with_retry<F, Fut, T>(context: &str, operation: F) -> DomainResult<T>
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = DomainResult<T>>,
{
    match operation().await {
        Ok(value) => Ok(value),
        Err(err) if err.is_connection_error() => {
            warn!(context, error = %err, "store round-trip failed, retrying once");
            tokio::time::sleep(RETRY_BACKOFF).await;
            operation().await.map_err(|err| {
                warn!(context, error = %err, "retry also failed, giving up");
                err
            })
        }
        Err(err) => Err(err),
    }
}

/// Maps a raw `sqlx::Error` into the taxonomy's `DependencyUnavailable` kind
/// when it looks connection-related, otherwise into the generic `Store` kind.
pub fn classify(err: sqlx::Error) -> DomainError {
    match &err {
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            DomainError::DependencyUnavailable(err.to_string())
        }
        _ => DomainError::Store(err),
    }
}
