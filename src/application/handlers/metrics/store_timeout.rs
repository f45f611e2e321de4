//! Bounding store calls with a deadline.

use std::future::Future;
use std::time::Duration;

use crate::domain::metrics::MetricsError;

/// Default deadline for a single repository call.
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(5);

/// Runs `call`, failing with a store error when it does not finish within
/// `limit`.
pub(crate) async fn bounded<T, F>(limit: Duration, call: F) -> Result<T, MetricsError>
where
    F: Future<Output = Result<T, MetricsError>>,
{
    tokio::time::timeout(limit, call)
        .await
        .map_err(|_| MetricsError::store("store operation timed out"))?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn passes_through_result_within_deadline() {
        let result = bounded(Duration::from_secs(1), async { Ok::<_, MetricsError>(7) }).await;
        assert_eq!(result.unwrap(), 7);
    }

    #[tokio::test(start_paused = true)]
    async fn expiry_is_store_failure() {
        let result = bounded(Duration::from_millis(10), async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok::<_, MetricsError>(())
        })
        .await;

        assert_eq!(result.unwrap_err(), MetricsError::store("store operation timed out"));
    }
}
