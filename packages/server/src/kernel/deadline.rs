//! Request-deadline enforcement.
//!
//! Every operation accepts cancellation from the originating request; the
//! thin HTTP layer wraps calls into this crate with `with_deadline` so that
//! in-flight storage calls and concurrent URL resolutions are dropped (and
//! thereby cancelled) on timeout instead of finishing in the background.

use std::future::Future;
use std::time::Duration;

use crate::common::{AppError, AppResult};

/// Run `fut` under a deadline, mapping expiry to `AppError::Timeout`.
pub async fn with_deadline<F, T>(limit: Duration, fut: F) -> AppResult<T>
where
    F: Future<Output = AppResult<T>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(AppError::Timeout),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_completes_within_deadline() {
        let result = with_deadline(Duration::from_secs(1), async { Ok(42) }).await;
        assert_eq!(result.unwrap(), 42);
    }

    #[tokio::test(start_paused = true)]
    async fn test_expiry_maps_to_timeout() {
        let slow = async {
            tokio::time::sleep(Duration::from_secs(10)).await;
            Ok(42)
        };
        let result = with_deadline(Duration::from_millis(50), slow).await;
        assert!(matches!(result, Err(AppError::Timeout)));
    }
}
