//! Exponential backoff state machine used by the connector worker.

use std::time::{Duration, Instant};

use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::config::{
    BackoffConfig, DEFAULT_BACKOFF_BASE, DEFAULT_BACKOFF_CAP, DEFAULT_BACKOFF_DEADLINE,
    DEFAULT_BACKOFF_RESET,
};

/// Exponential backoff policy for reconnection attempts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BackoffPolicy {
    pub base: Duration,
    pub cap: Duration,
    pub reset_after: Duration,
    pub deadline: Duration,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            base: DEFAULT_BACKOFF_BASE,
            cap: DEFAULT_BACKOFF_CAP,
            reset_after: DEFAULT_BACKOFF_RESET,
            deadline: DEFAULT_BACKOFF_DEADLINE,
        }
    }
}

impl From<&BackoffConfig> for BackoffPolicy {
    fn from(config: &BackoffConfig) -> Self {
        Self {
            base: Duration::from_millis(config.base_ms),
            cap: Duration::from_millis(config.cap_ms),
            reset_after: Duration::from_millis(config.reset_after_ms),
            deadline: Duration::from_millis(config.deadline_ms),
        }
    }
}

/// Tracks reconnection attempts and produces jittered delays.
pub struct BackoffState {
    policy: BackoffPolicy,
    current: Duration,
    failure_since: Option<Instant>,
    rng: StdRng,
    last_success: Option<Instant>,
}

impl BackoffState {
    /// Create a new state machine from the supplied policy.
    pub fn new(policy: BackoffPolicy) -> Self {
        Self {
            current: policy.base,
            failure_since: None,
            rng: StdRng::from_entropy(),
            last_success: None,
            policy,
        }
    }

    /// Record a successful connection.
    ///
    /// Ends the current failure window, so the deadline for the next outage
    /// is measured from that outage's first failure.
    pub fn record_success(&mut self, now: Instant) {
        self.last_success = Some(now);
        self.failure_since = None;
    }

    /// Reset the delay after a link stayed healthy for `reset_after`.
    pub fn reset_after_idle(&mut self, now: Instant) {
        if let Some(success) = self.last_success
            && now.duration_since(success) >= self.policy.reset_after
        {
            self.current = self.policy.base;
            self.last_success = None;
        }
    }

    /// Calculate the next jittered sleep duration following a failure.
    ///
    /// Returns `None` once failures have persisted past the deadline.
    pub fn next_sleep(&mut self, now: Instant) -> Option<Duration> {
        let start = *self.failure_since.get_or_insert(now);

        if now.duration_since(start) >= self.policy.deadline {
            return None;
        }

        if now != start {
            self.current = self.current.saturating_mul(2).min(self.policy.cap);
        }

        const MIN_SLEEP_MS: u64 = 10;

        let max_ms = u64::try_from(self.current.as_millis()).unwrap_or(u64::MAX);
        let sleep_ms = match max_ms {
            0 => MIN_SLEEP_MS,
            1..=MIN_SLEEP_MS => max_ms,
            _ => self.rng.gen_range(MIN_SLEEP_MS..=max_ms),
        };
        Some(Duration::from_millis(sleep_ms))
    }
}
