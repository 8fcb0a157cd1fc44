// src/policy.rs
//! Backoff and rate-limit policy.
//!
//! Pure computation: given how many attempts have failed and what the
//! server said about its rate limit, decide how long to wait before the
//! next attempt. "Now" is always passed in so results are reproducible.

use crate::constants::{DEFAULT_MAX_ATTEMPTS, DEFAULT_RETRY_WAIT_MAX, DEFAULT_RETRY_WAIT_MIN};
use crate::types::ValidationError;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

pub const RATE_LIMIT_REMAINING: &str = "x-ratelimit-remaining";
pub const RATE_LIMIT_RESET: &str = "x-ratelimit-reset";

/// Rate-limit snapshot derived from one response's headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimit {
    /// Requests left in the current window, if advertised.
    pub remaining: Option<u32>,
    /// When the window resets, if advertised.
    pub reset_at: Option<SystemTime>,
}

impl RateLimit {
    /// Reads `X-RateLimit-Remaining`, `X-RateLimit-Reset` (Unix seconds) and
    /// `Retry-After` (delta seconds, used when no reset timestamp is given).
    ///
    /// Missing or malformed values count as absent, and so do times the
    /// system clock cannot represent. Returns `None` when the
    /// response carries no usable rate-limit information at all.
    pub fn from_headers(headers: &HeaderMap, now: SystemTime) -> Option<Self> {
        let remaining = header_number(headers, RATE_LIMIT_REMAINING)
            .and_then(|value| u32::try_from(value).ok());

        let reset_at = header_number(headers, RATE_LIMIT_RESET)
            .and_then(|secs| UNIX_EPOCH.checked_add(Duration::from_secs(secs)))
            .or_else(|| {
                header_number(headers, RETRY_AFTER.as_str())
                    .and_then(|secs| now.checked_add(Duration::from_secs(secs)))
            });

        if remaining.is_none() && reset_at.is_none() {
            return None;
        }

        Some(Self {
            remaining,
            reset_at,
        })
    }

    /// Time left until the window resets, or `None` if it is not in the future.
    pub fn until_reset(&self, now: SystemTime) -> Option<Duration> {
        self.reset_at
            .and_then(|reset| reset.duration_since(now).ok())
            .filter(|wait| !wait.is_zero())
    }
}

fn header_number(headers: &HeaderMap, name: &str) -> Option<u64> {
    headers
        .get(name)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
}

/// Attempt budget plus exponential backoff bounds for one logical call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffPolicy {
    max_attempts: u32,
    wait_min: Duration,
    wait_max: Duration,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            wait_min: DEFAULT_RETRY_WAIT_MIN,
            wait_max: DEFAULT_RETRY_WAIT_MAX,
        }
    }
}

impl BackoffPolicy {
    /// A budget of zero attempts is raised to one: every call sends at least once.
    pub fn new(
        max_attempts: u32,
        wait_min: Duration,
        wait_max: Duration,
    ) -> Result<Self, ValidationError> {
        if wait_min > wait_max {
            return Err(ValidationError::InvalidBackoff {
                min: wait_min,
                max: wait_max,
            });
        }
        Ok(Self {
            max_attempts: max_attempts.max(1),
            wait_min,
            wait_max,
        })
    }

    pub fn with_max_attempts(self, max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            ..self
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn wait_min(&self) -> Duration {
        self.wait_min
    }

    pub fn wait_max(&self) -> Duration {
        self.wait_max
    }

    /// Whether another physical send is allowed after `attempts_made` sends.
    pub fn has_attempts_remaining(&self, attempts_made: u32) -> bool {
        attempts_made < self.max_attempts
    }

    /// `min(wait_min * 2^retry, wait_max)`, saturating at `wait_max`.
    pub fn exponential(&self, retry: u32) -> Duration {
        2u32.checked_pow(retry)
            .and_then(|factor| self.wait_min.checked_mul(factor))
            .map_or(self.wait_max, |wait| wait.min(self.wait_max))
    }

    /// How long to wait before retry number `retry` (0 for the first retry).
    ///
    /// A rate-limit reset strictly in the future wins and is returned as is;
    /// otherwise exponential backoff applies.
    pub fn wait_time(
        &self,
        retry: u32,
        rate_limit: Option<&RateLimit>,
        now: SystemTime,
    ) -> Duration {
        rate_limit
            .and_then(|limit| limit.until_reset(now))
            .unwrap_or_else(|| self.exponential(retry))
    }
}
