//! Retry with exponential back-off and jitter for object store requests.
//!
//! Only transport-level trouble is retried: timeouts, connection failures,
//! HTTP 429, and 5xx responses. Store-level rejections (bad query,
//! permissions, missing object) come back immediately.

use std::future::Future;
use std::time::Duration;

use crate::error::StoreError;

/// Returns `true` for errors that are worth retrying after a back-off delay.
pub(crate) fn is_retriable(err: &StoreError) -> bool {
    match err {
        StoreError::Http(e) => {
            e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
        }
        StoreError::Api { status, .. } => *status == 429 || *status >= 500,
        StoreError::Deserialize { .. }
        | StoreError::InvalidBaseUrl { .. }
        | StoreError::InvalidCredentials(_)
        | StoreError::MissingId => false,
    }
}

/// Back-off ceiling for a single wait.
const MAX_DELAY_MS: u64 = 30_000;

/// Delay before retry number `retry` (1-based): `base_ms * 2^(retry-1)`,
/// capped, then scaled by `jitter` (expected in `0.75..=1.25`).
fn backoff_delay(retry: u32, base_ms: u64, jitter: f64) -> Duration {
    let exponent = retry.saturating_sub(1).min(10);
    let capped = base_ms.saturating_mul(1u64 << exponent).min(MAX_DELAY_MS);
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    let jittered = (capped as f64 * jitter) as u64;
    Duration::from_millis(jittered)
}

/// Runs `operation`, retrying transient failures up to `max_retries` times
/// with ±25 % jittered exponential back-off. Anything else is returned as-is.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, StoreError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, StoreError>>,
{
    let mut retries = 0u32;
    loop {
        let err = match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };
        if retries >= max_retries || !is_retriable(&err) {
            return Err(err);
        }
        retries += 1;
        let delay = backoff_delay(retries, backoff_base_ms, 0.75 + rand::random::<f64>() * 0.5);
        tracing::warn!(
            retry = retries,
            max_retries,
            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            error = %err,
            "object store request failed; backing off"
        );
        tokio::time::sleep(delay).await;
    }
}
