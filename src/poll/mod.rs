//! Polling and retry wrappers around long-running external operations.

pub mod domain;
pub mod retry;

use std::future::Future;
use std::time::Duration;

use tokio::time::{sleep, Instant};
use tracing::debug;

use crate::config::PollingConfig;
use crate::error::ApiError;

pub use domain::{wait_for_domain, DnsResolver, DomainResolver};
pub use retry::{retry, RetryPolicy};

/// How often to check and how long to keep trying.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollOptions {
    pub interval: Duration,
    pub timeout: Duration,
}

impl PollOptions {
    pub fn new(interval: Duration, timeout: Duration) -> Self {
        Self { interval, timeout }
    }
}

impl From<&PollingConfig> for PollOptions {
    fn from(config: &PollingConfig) -> Self {
        Self {
            interval: Duration::from_millis(config.interval_ms),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }
}

/// Result of a single poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollStep<T> {
    Pending,
    Done(T),
}

/// Run `check` until it reports [`PollStep::Done`], sleeping `interval` between
/// attempts. Errors from `check` end polling immediately. The last check happens
/// no later than `timeout` after the first.
pub async fn poll_until<T, F, Fut>(
    operation: &str,
    options: PollOptions,
    mut check: F,
) -> Result<T, ApiError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<PollStep<T>, ApiError>>,
{
    let started = Instant::now();
    let mut attempt = 0u64;
    loop {
        attempt += 1;
        if let PollStep::Done(value) = check().await? {
            debug!(operation = %operation, attempt, "poll finished");
            return Ok(value);
        }
        let elapsed = started.elapsed();
        if elapsed >= options.timeout {
            return Err(ApiError::PollTimeout {
                operation: operation.to_string(),
                elapsed,
            });
        }
        let wait = options.interval.min(options.timeout - elapsed);
        debug!(
            operation = %operation,
            attempt,
            wait_ms = wait.as_millis() as u64,
            "operation pending, waiting"
        );
        sleep(wait).await;
    }
}
