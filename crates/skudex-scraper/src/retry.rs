//! Retry utilities for outbound fetches.
//!
//! Provides exponential backoff retry logic for transient HTTP errors such as
//! 429 responses and dropped connections. Non-transient errors (404s, other
//! HTTP statuses) are propagated immediately without retrying.

use std::future::Future;
use std::time::Duration;

use crate::error::FetchError;

/// Returns `true` if `err` represents a transient condition that should be
/// retried after a backoff delay.
///
/// Retriable errors:
/// - [`FetchError::Timeout`] — the request may succeed on a quieter link.
/// - [`FetchError::ConnectionFailed`] — network-level failure (reset, DNS blip).
/// - [`FetchError::Status`] with 429 — the server has asked us to back off.
///
/// Non-retriable errors (propagated immediately):
/// - [`FetchError::NotFound`] — 404; retrying would return the same result.
/// - [`FetchError::Status`] with any other code (e.g., 403, 500).
fn is_retriable(err: &FetchError) -> bool {
    matches!(
        err,
        FetchError::Timeout { .. }
            | FetchError::ConnectionFailed { .. }
            | FetchError::Status { status: 429, .. }
    )
}

/// Executes `operation` with exponential backoff retries on transient errors.
///
/// On success the result is returned immediately.
///
/// On a retriable error the function sleeps for `backoff_base_secs * 2^attempt`
/// seconds and tries again, up to `max_retries` additional attempts after the
/// first try. If all retries are exhausted the last error is returned.
///
/// Non-retriable errors are returned immediately without sleeping or retrying.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_secs: u64,
    mut operation: F,
) -> Result<T, FetchError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, FetchError>>,
{
    let mut last_err;
    let mut attempt = 0u32;

    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || attempt >= max_retries {
                    return Err(err);
                }
                last_err = err;
            }
        }

        // Exponential backoff: base * 2^attempt seconds.
        // Cap at u64::MAX to prevent overflow on extreme configs.
        let delay_secs = backoff_base_secs.saturating_mul(1u64 << attempt.min(62));
        tracing::warn!(
            attempt,
            max_retries,
            delay_secs,
            error = %last_err,
            "transient fetch error — retrying after backoff"
        );
        tokio::time::sleep(Duration::from_secs(delay_secs)).await;
        attempt += 1;
    }
}
