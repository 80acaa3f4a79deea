//! Fixed-delay retry for flaky operations.

use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, warn};

use crate::error::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(attempts: u32, delay: Duration) -> Self {
        Self { attempts, delay }
    }

    /// Enough attempts, `delay` apart, to cover roughly `window`.
    pub fn within(window: Duration, delay: Duration) -> Self {
        let attempts = if delay.is_zero() {
            1
        } else {
            (window.as_millis() / delay.as_millis()).clamp(1, u128::from(u32::MAX)) as u32
        };
        Self { attempts, delay }
    }
}

/// Run `op` until it succeeds or `policy.attempts` runs out (at least one attempt).
pub async fn retry<T, F, Fut>(operation: &str, policy: RetryPolicy, mut op: F) -> Result<T, ApiError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ApiError>>,
{
    let attempts = policy.attempts.max(1);
    let mut last_error = String::new();
    for attempt in 1..=attempts {
        match op().await {
            Ok(value) => {
                debug!(operation = %operation, attempt, "operation succeeded");
                return Ok(value);
            }
            Err(err) => {
                debug!(operation = %operation, attempt, error = %err, "attempt failed");
                last_error = err.to_string();
                if attempt < attempts {
                    sleep(policy.delay).await;
                }
            }
        }
    }
    warn!(operation = %operation, attempts, error = %last_error, "giving up");
    Err(ApiError::RetryExhausted {
        attempts,
        last_error,
    })
}
