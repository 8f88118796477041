use core::fmt::Display;
use core::future::Future;
use core::time::Duration;

/// Retries an async operation with exponential backoff (500ms, 1s, 2s, ...).
///
/// Used for the static-asset endpoints where the only sensible reaction to a
/// failure is to try again; the rate-limited Riot fetcher has its own
/// `Retry-After`-aware loop.
pub async fn retry_with_backoff<F, Fut, T, E>(max_retries: u32, operation: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    tryhard::retry_fn(operation)
        .retries(max_retries)
        .exponential_backoff(Duration::from_millis(500))
        .on_retry(|attempt, _, error: &E| {
            tracing::warn!(attempt, error = %error, "operation failed, retrying");
            core::future::ready(())
        })
        .await
        .inspect_err(|e| tracing::error!(max_retries, error = %e, "operation failed for good"))
}
