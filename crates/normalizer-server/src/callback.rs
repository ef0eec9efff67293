//! `/asyncquery`'s background normalization + callback POST with retry
//! (spec.md §6): 3 total attempts, exponential backoff factor 3, retried on
//! 429 and 5xx. Grounded on `examples/petrsovadina-biomcp`'s
//! `reqwest-middleware` + `reqwest-retry` dependency pair.

use std::time::Duration;

use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::policies::ExponentialBackoff;
use reqwest_retry::RetryTransientMiddleware;

/// Builds the HTTP client used to POST results back to a caller-supplied
/// callback URL. Exponential backoff with factor 3, three total attempts
/// (the initial attempt plus two retries), on 429 and 5xx responses —
/// `reqwest-retry`'s default transient-error classification already treats
/// those as retryable.
pub fn callback_client() -> ClientWithMiddleware {
    let retry_policy = ExponentialBackoff::builder()
        .retry_bounds(Duration::from_millis(100), Duration::from_secs(30))
        .base(3)
        .build_with_max_retries(2);

    ClientBuilder::new(reqwest::Client::new())
        .with(RetryTransientMiddleware::new_with_policy(retry_policy))
        .build()
}
