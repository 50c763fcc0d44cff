// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Exponential backoff for fabric controller calls.
//!
//! Rate limiting (429), gateway and server errors (500, 502, 503, 504) and
//! transport failures are retried. Every other failure, including not-found,
//! is returned on the first attempt.
//!
//! # Controller Schedule
//!
//! 50ms, 100ms, 200ms, ... doubling up to 10s per wait, each wait jittered by
//! ±10%, until two minutes have passed since the first attempt.

use std::future::Future;
use std::time::{Duration, Instant};

use rand::Rng;
use tracing::{debug, error, warn};

use super::ControllerError;

/// Wait before the first retry
const CONTROLLER_INITIAL_WAIT: Duration = Duration::from_millis(50);

/// Longest single wait
const CONTROLLER_MAX_WAIT: Duration = Duration::from_secs(10);

/// Give up once this much time has passed since the first attempt
const CONTROLLER_RETRY_BUDGET: Duration = Duration::from_secs(120);

/// Shape of a backoff schedule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Wait before the first retry
    pub initial_wait: Duration,
    /// Upper bound of a single wait
    pub max_wait: Duration,
    /// Total time after which no further retry is scheduled
    pub budget: Duration,
    /// Growth factor between consecutive waits
    pub multiplier: f64,
    /// Relative jitter applied to every wait (0.1 = ±10%)
    pub jitter: f64,
}

impl RetryPolicy {
    /// Schedule used for every controller request.
    #[must_use]
    pub const fn controller() -> Self {
        Self {
            initial_wait: CONTROLLER_INITIAL_WAIT,
            max_wait: CONTROLLER_MAX_WAIT,
            budget: CONTROLLER_RETRY_BUDGET,
            multiplier: 2.0,
            jitter: 0.1,
        }
    }

    /// Start a fresh schedule; the budget is measured from now.
    #[must_use]
    pub fn schedule(&self) -> Backoff {
        Backoff {
            policy: *self,
            next_wait: self.initial_wait,
            started: Instant::now(),
        }
    }
}

/// Running backoff schedule. Yields waits until the budget is spent.
#[derive(Debug, Clone)]
pub struct Backoff {
    policy: RetryPolicy,
    next_wait: Duration,
    started: Instant,
}

impl Iterator for Backoff {
    type Item = Duration;

    fn next(&mut self) -> Option<Duration> {
        if self.started.elapsed() >= self.policy.budget {
            return None;
        }

        let wait = self.next_wait;
        self.next_wait = wait.mul_f64(self.policy.multiplier).min(self.policy.max_wait);
        Some(jittered(wait, self.policy.jitter))
    }
}

fn jittered(wait: Duration, jitter: f64) -> Duration {
    if jitter <= 0.0 {
        return wait;
    }
    let factor = rand::rng().random_range((1.0 - jitter)..=(1.0 + jitter));
    wait.mul_f64(factor.max(0.0))
}

/// True for HTTP statuses that signal a transient controller condition.
#[must_use]
pub fn is_transient_status(status: u16) -> bool {
    matches!(status, 429 | 500 | 502 | 503 | 504)
}

/// Run `call` until it succeeds, fails permanently or the schedule runs out.
///
/// # Errors
///
/// Returns the first error that is not [`ControllerError::is_retryable`], or
/// the last retryable one once the schedule is exhausted.
pub async fn with_retry<T, F, Fut>(
    policy: &RetryPolicy,
    operation: &str,
    mut call: F,
) -> Result<T, ControllerError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ControllerError>>,
{
    let mut schedule = policy.schedule();
    let mut attempt: u32 = 1;

    loop {
        let err = match call().await {
            Ok(value) => {
                if attempt > 1 {
                    debug!(operation, attempt, "Controller call recovered");
                }
                return Ok(value);
            }
            Err(err) => err,
        };

        if !err.is_retryable() {
            if !err.is_not_found() {
                error!(operation, error = %err, "Controller call failed");
            }
            return Err(err);
        }

        let Some(wait) = schedule.next() else {
            error!(operation, attempt, error = %err, "Controller retries exhausted");
            return Err(err);
        };
        warn!(operation, attempt, wait = ?wait, error = %err, "Controller call failed, retrying");
        tokio::time::sleep(wait).await;
        attempt += 1;
    }
}

#[cfg(test)]
#[path = "retry_tests.rs"]
mod retry_tests;
