//! Retry policies for API calls.

use crate::{FetchError, Method};
use std::time::Duration;

/// Delay between attempts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackoffStrategy {
    None,
    Fixed(Duration),
    /// `base * 2^attempt`, capped at `max`.
    Exponential { base: Duration, max: Duration },
}

impl BackoffStrategy {
    /// Delay before retrying after attempt `attempt` (0-indexed).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        match self {
            Self::None => Duration::ZERO,
            Self::Fixed(d) => *d,
            Self::Exponential { base, max } => {
                let multiplier = 2u32.saturating_pow(attempt);
                base.saturating_mul(multiplier).min(*max)
            }
        }
    }
}

impl Default for BackoffStrategy {
    fn default() -> Self {
        Self::Exponential {
            base: Duration::from_millis(200),
            max: Duration::from_secs(2),
        }
    }
}

/// Failures worth another attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryCondition {
    StatusCode(u16),
    /// Any 5xx.
    ServerError,
    Timeout,
    ConnectionError,
}

impl RetryCondition {
    fn matches(&self, error: &FetchError) -> bool {
        match (self, error) {
            (Self::Timeout, FetchError::Timeout) => true,
            (Self::ConnectionError, FetchError::Connection(_)) => true,
            (Self::StatusCode(code), e) => e.status() == Some(*code),
            (Self::ServerError, e) => e.status().map(|s| (500..600).contains(&s)).unwrap_or(false),
            _ => false,
        }
    }
}

/// When and how often to resend a request.
///
/// Only idempotent requests are retried; an order POST is never resent
/// behind the shopper's back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_attempts: u32,
    pub backoff: BackoffStrategy,
    pub retry_on: Vec<RetryCondition>,
}

impl RetryPolicy {
    /// Retry server errors and transport failures up to `max_attempts` times.
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            backoff: BackoffStrategy::default(),
            retry_on: vec![
                RetryCondition::ServerError,
                RetryCondition::Timeout,
                RetryCondition::ConnectionError,
            ],
        }
    }

    pub fn none() -> Self {
        Self {
            max_attempts: 0,
            backoff: BackoffStrategy::None,
            retry_on: Vec::new(),
        }
    }

    pub fn with_backoff(mut self, strategy: BackoffStrategy) -> Self {
        self.backoff = strategy;
        self
    }

    /// Decide whether attempt number `attempt` (0-indexed) may be followed
    /// by another one after `error`.
    pub fn should_retry(&self, method: Method, error: &FetchError, attempt: u32) -> bool {
        if attempt >= self.max_attempts || !method.is_idempotent() {
            return false;
        }
        self.retry_on.iter().any(|c| c.matches(error))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(2)
    }
}
