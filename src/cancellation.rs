//! Cooperative cancellation for public operations (§5: "Every public
//! operation must accept a cancellation signal; store round-trips and long
//! graph builds must honor it... cancellation must free any pool connection
//! promptly").
//!
//! [`tokio_util::sync::CancellationToken`] is the crate's cancellation
//! signal; [`cancellable`] races a future against it and maps a firing
//! token to [`DomainError::Cancelled`]. Dropping the losing future on
//! cancellation (what [`tokio::select!`] does) drops any pooled connection
//! it was holding, which is what "frees the connection promptly" means in
//! practice for `sqlx`.

pub use tokio_util::sync::CancellationToken;

use crate::error::{DomainError, DomainResult};

/// Runs `fut` to completion unless `cancel` fires first, in which case the
/// in-flight future is dropped and `Cancelled` is returned without any
/// partial commit (§7 "Cancelled... propagated without partial commits").
pub async fn cancellable<T>(
    cancel: &CancellationToken,
    fut: impl std::future::Future<Output = DomainResult<T>>,
) -> DomainResult<T> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(DomainError::Cancelled),
        result = fut => result,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn completes_normally_when_not_cancelled() {
        let cancel = CancellationToken::new();
        let result = cancellable(&cancel, async { Ok::<_, DomainError>(42) }).await;
        assert!(matches!(result, Ok(42)));
    }

    #[tokio::test]
    async fn reports_cancelled_when_token_already_fired() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let result = cancellable(&cancel, async {
            // Never resolves on its own; only the cancellation branch can win.
            std::future::pending::<DomainResult<i32>>().await
        })
        .await;
        assert!(matches!(result, Err(DomainError::Cancelled)));
    }
}
