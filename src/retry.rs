// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Retry policy for probes refused before reaching the server.
//!
//! A refused connection is the only failure that is resent: nothing arrived,
//! so a second attempt cannot apply a state change twice. Timeouts and every
//! HTTP response are final.

use rand::Rng;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

use crate::errors::TransportError;

const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(200);

/// Ceiling for a single wait, jitter excluded
const MAX_DELAY: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Resends after the first attempt
    pub retries: u32,
    /// Wait before the first resend; doubles for each one after
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(2)
    }
}

impl RetryPolicy {
    pub fn new(retries: u32) -> Self {
        Self {
            retries,
            base_delay: DEFAULT_BASE_DELAY,
        }
    }

    pub fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    /// Wait before resend number `retry` (1-based)
    pub fn delay(&self, retry: u32) -> Duration {
        let doublings = retry.saturating_sub(1).min(31);
        self.base_delay.saturating_mul(1 << doublings).min(MAX_DELAY)
    }
}

/// Run `send` until it gets through or fails with anything but a refused
/// connection, resending at most `policy.retries` times.
pub async fn retry_refused<F, Fut, T>(
    policy: &RetryPolicy,
    url: &str,
    mut send: F,
) -> Result<T, TransportError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, TransportError>>,
{
    let mut retry = 0;

    loop {
        match send().await {
            Err(TransportError::ConnectionFailed { reason, .. }) if retry < policy.retries => {
                retry += 1;
                let wait = spread(policy.delay(retry));
                warn!(
                    url = url,
                    retry = retry,
                    max_retries = policy.retries,
                    wait_ms = wait.as_millis() as u64,
                    reason = %reason,
                    "Connection refused, resending"
                );
                tokio::time::sleep(wait).await;
            }
            outcome => return outcome,
        }
    }
}

/// Add up to a quarter of `delay` so roles refused together do not resend in lockstep
fn spread(delay: Duration) -> Duration {
    let quarter = (delay.as_millis() / 4) as u64;
    if quarter == 0 {
        return delay;
    }
    delay + Duration::from_millis(rand::rng().random_range(0..=quarter))
}
