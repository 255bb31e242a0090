use std::{fmt::Display, future::Future, time::Duration};

use futures::future::join_all;
use tracing::{debug, warn};

use crate::error::Error;

/// Default per-call timeout for external reads.
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(12);

/// Bounds a single external call without affecting its siblings.
pub async fn with_timeout<T, E, F>(
    operation: &'static str,
    after: Duration,
    call: F,
) -> Result<T, Error>
where
    F: Future<Output = Result<T, E>>,
    E: Into<Error>,
{
    match tokio::time::timeout(after, call).await {
        Ok(result) => result.map_err(Into::into),
        Err(_) => Err(Error::Timeout { operation, after }),
    }
}

/// Runs every job concurrently and keeps the ones that produced a value.
///
/// Jobs resolving to `Ok(None)` are dropped silently (the record is not eligible);
/// errors and timeouts are dropped with a warning. Never fails as a whole.
pub async fn settle_all<K, T, F>(label: &'static str, after: Duration, jobs: Vec<(K, F)>) -> Vec<T>
where
    K: Display,
    F: Future<Output = Result<Option<T>, Error>>,
{
    let settled = join_all(jobs.into_iter().map(|(key, job)| async move {
        let outcome = match tokio::time::timeout(after, job).await {
            Ok(result) => result,
            Err(_) => Err(Error::Timeout {
                operation: label,
                after,
            }),
        };
        (key, outcome)
    }))
    .await;

    settled
        .into_iter()
        .filter_map(|(key, outcome)| match outcome {
            Ok(Some(value)) => Some(value),
            Ok(None) => {
                debug!(batch = label, %key, "record not eligible, skipped");
                None
            }
            Err(error) => {
                warn!(batch = label, %key, %error, "dropping record from batch");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PreflightError;
    use futures::future::BoxFuture;
    use futures::FutureExt;

    #[tokio::test]
    async fn keeps_fulfilled_and_drops_failures_and_hangs() {
        let jobs: Vec<(u32, BoxFuture<'static, Result<Option<u32>, Error>>)> = vec![
            (1, async { Ok(Some(1)) }.boxed()),
            (2, async { Err(PreflightError::BidTooLow.into()) }.boxed()),
            (
                3,
                async {
                    tokio::time::sleep(Duration::from_secs(30)).await;
                    Ok(Some(3))
                }
                .boxed(),
            ),
            (4, async { Ok(None) }.boxed()),
            (5, async { Ok(Some(5)) }.boxed()),
        ];

        let kept = settle_all("test", Duration::from_millis(50), jobs).await;
        assert_eq!(kept, vec![1, 5]);
    }

    #[tokio::test]
    async fn timeout_is_reported_with_operation_name() {
        let err = with_timeout("slow read", Duration::from_millis(10), async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok::<_, Error>(())
        })
        .await
        .unwrap_err();

        assert!(matches!(err, Error::Timeout { operation: "slow read", .. }));
    }
}
