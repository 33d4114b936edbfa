// src/checker/http.rs
// =============================================================================
// This module checks if a URL is alive by making one HTTP GET request.
//
// Key functionality:
// - Follows redirects and reports the terminal URL and status code
// - Races the request against a deadline; whichever finishes first wins
// - Measures time until response headers arrive (the body is never read)
// - Folds every transport error into Timeout or Network
//
// Rust concepts:
// - async/await: The request and the deadline are both futures
// - tokio::time::timeout: Drops the request future when the deadline fires,
//   which closes its connection
// - Instant: Monotonic clock for measuring elapsed time
// =============================================================================

use chrono::Utc;
use reqwest::{redirect::Policy, Client};
use std::time::{Duration, Instant};
use tracing::{debug, info};

use super::error::CheckFailure;
use super::normalize::{normalize, NormalizedUrl};
use super::outcome::{CheckRequest, CheckResult};
use super::timeout::{resolve_timeout, validate_timeout_ms};

/// Redirect hops followed before giving up
const MAX_REDIRECTS: usize = 10;

// Runs checks against remote URLs
//
// Holds an HTTP client and the default timeout. Cloning is cheap (the
// client is reference counted internally), so one Checker can be shared by
// every request handler.
#[derive(Debug, Clone)]
pub struct Checker {
    client: Client,
    default_timeout_ms: u64,
}

impl Checker {
    // Creates a checker with the given default timeout
    //
    // Fails if the default is outside [500, 20000] ms or the HTTP client
    // cannot be built (e.g. TLS backend initialization failed).
    pub fn new(default_timeout_ms: u64) -> anyhow::Result<Self> {
        let default_timeout_ms = validate_timeout_ms(default_timeout_ms)
            .map_err(|e| anyhow::anyhow!("invalid default timeout {}ms: {}", default_timeout_ms, e))?;

        // No idle connections are kept, so a finished or abandoned check
        // leaves no socket behind
        let client = Client::builder()
            .redirect(Policy::limited(MAX_REDIRECTS))
            .pool_max_idle_per_host(0)
            .build()?;

        Ok(Self {
            client,
            default_timeout_ms,
        })
    }

    pub fn default_timeout_ms(&self) -> u64 {
        self.default_timeout_ms
    }

    // Checks the URL described by a request
    //
    // Order of operations:
    // 1. Normalize the URL (may fail with Validation)
    // 2. Resolve the timeout (may fail with Validation)
    // 3. Fetch (may fail with Timeout or Network)
    //
    // Steps 1 and 2 never touch the network.
    pub async fn check(&self, request: &CheckRequest) -> Result<CheckResult, CheckFailure> {
        let url = normalize(request.url.as_deref().unwrap_or_default())?;
        let timeout = resolve_timeout(request.timeout_ms, self.default_timeout_ms)?;
        self.fetch(&url, timeout).await
    }

    // Issues one GET to `url` with a hard deadline
    //
    // Returns:
    //   Ok(CheckResult) when response headers arrived in time
    //   Err(Timeout) when the deadline elapsed first
    //   Err(Network) for any other failure
    pub async fn fetch(&self, url: &NormalizedUrl, timeout: Duration) -> Result<CheckResult, CheckFailure> {
        debug!(url = %url, timeout_ms = timeout.as_millis() as u64, "dispatching check");

        let start = Instant::now();
        let request = self.client.get(url.as_str()).send();

        // Dropping the losing future here cancels the connection attempt or
        // the transfer in progress
        let response = match tokio::time::timeout(timeout, request).await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                let failure = CheckFailure::from(e);
                info!(url = %url, outcome = ?failure.kind(), "check failed");
                return Err(failure);
            }
            Err(_) => {
                info!(url = %url, timeout_ms = timeout.as_millis() as u64, "check timed out");
                return Err(CheckFailure::Timeout);
            }
        };
        let elapsed_ms = round_millis(start.elapsed());

        let result = CheckResult {
            requested_url: url.clone(),
            final_url: response.url().to_string(),
            status_code: response.status().as_u16(),
            elapsed_ms,
            checked_at: Utc::now(),
        };

        info!(
            url = %result.requested_url,
            final_url = %result.final_url,
            status = result.status_code,
            elapsed_ms = result.elapsed_ms,
            "check completed"
        );

        Ok(result)
    }
}

// Rounds a duration to the nearest whole millisecond
fn round_millis(elapsed: Duration) -> u64 {
    (elapsed.as_secs_f64() * 1000.0).round() as u64
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. What does tokio::time::timeout return?
//    - Ok(output) if the inner future finished first
//    - Err(Elapsed) if the deadline fired first
//    - Here the inner output is itself a Result, hence Ok(Ok(..)) / Ok(Err(..))
//
// 2. How is the request cancelled?
//    - A Rust future does nothing unless polled
//    - When timeout() gives up it drops the send() future, and dropping it
//      closes the socket reqwest opened for it
//    - The timer is dropped on the other paths the same way
//
// 3. Why is a 404 not an error?
//    - The URL answered; the check reports the status it got
//    - Only "no answer" (timeout, refused, DNS, TLS) is a failure
// -----------------------------------------------------------------------------
