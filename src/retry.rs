// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2025 Michael Dippery <michael@monkey-robot.com>

//! Retry policies for rate-limited requests.
//!
//! Reddit answers with HTTP 429 when a client asks for too much too
//! quickly. Rather than giving up, fetchers wait a little and try the same
//! request again. A [`RetryPolicy`] decides how long to wait and when to
//! stop trying.

use std::time::Duration;

/// Decides how long to wait between attempts and how many attempts to make.
///
/// Delays grow exponentially from `base_delay`, doubling after every
/// attempt, and never exceed `max_delay`. When jitter is enabled, up to half
/// of the computed delay is added at random so that many concurrent fetches
/// throttled at the same moment do not all retry in lockstep.
#[derive(Clone, Debug, PartialEq)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
    max_delay: Duration,
    jitter: bool,
}

impl RetryPolicy {
    /// Creates a new exponential backoff policy with jitter.
    ///
    /// `max_attempts` counts the first attempt, so a policy with
    /// `max_attempts` of 1 never retries. A value of 0 is treated as 1.
    pub fn new(max_attempts: u32, base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            max_delay: max_delay.max(base_delay),
            jitter: true,
        }
    }

    /// Creates a policy that always waits exactly `delay` between attempts.
    ///
    /// # Examples
    ///
    /// ```
    /// use redditstream::retry::RetryPolicy;
    /// use std::time::Duration;
    ///
    /// let policy = RetryPolicy::fixed(Duration::from_millis(500), 3);
    /// assert_eq!(policy.delay_for(1), Duration::from_millis(500));
    /// assert_eq!(policy.delay_for(2), Duration::from_millis(500));
    /// ```
    pub fn fixed(delay: Duration, max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay: delay,
            max_delay: delay,
            jitter: false,
        }
    }

    /// Turns random jitter on or off.
    pub fn jitter(self, jitter: bool) -> Self {
        Self { jitter, ..self }
    }

    /// Sets the maximum number of attempts, including the first.
    pub fn max_attempts(self, max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            ..self
        }
    }

    /// Total number of attempts allowed, including the first.
    pub fn attempts(&self) -> u32 {
        self.max_attempts
    }

    /// True if another attempt may be made after `attempt` attempts have
    /// already failed.
    pub fn should_retry(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }

    /// How long to wait after the given (1-based) failed `attempt`.
    ///
    /// # Examples
    ///
    /// ```
    /// use redditstream::retry::RetryPolicy;
    /// use std::time::Duration;
    ///
    /// let policy = RetryPolicy::new(5, Duration::from_millis(100), Duration::from_secs(1))
    ///     .jitter(false);
    /// assert_eq!(policy.delay_for(1), Duration::from_millis(100));
    /// assert_eq!(policy.delay_for(2), Duration::from_millis(200));
    /// assert_eq!(policy.delay_for(3), Duration::from_millis(400));
    /// assert_eq!(policy.delay_for(5), Duration::from_secs(1));
    /// ```
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        let delay = self
            .base_delay
            .saturating_mul(1 << exponent)
            .min(self.max_delay);

        if self.jitter {
            let extra = delay.as_millis() as u64 / 2;
            delay + Duration::from_millis(fastrand::u64(0..=extra))
        } else {
            delay
        }
    }
}

impl Default for RetryPolicy {
    /// Five attempts, starting at half a second and capped at eight seconds.
    fn default() -> Self {
        Self::new(5, Duration::from_millis(500), Duration::from_secs(8))
    }
}
