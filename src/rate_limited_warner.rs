//! Throttled reporting of lost events.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Default interval between dropped-event warnings.
pub const DEFAULT_WARN_INTERVAL: Duration = Duration::from_secs(5);

/// Millisecond clock used to decide when a warning is due.
pub type ClockFn = Box<dyn Fn() -> u64 + Send + Sync>;

fn wall_clock_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or_default()
}

/// Aggregates drops and emits at most one warning per interval.
///
/// Callers count each lost event with [`record_drop`] and then call
/// [`warn_if_due`], which hands the number of drops since the previous
/// warning to the callback once the interval has passed. [`flush`] reports
/// pending drops regardless of the interval, e.g. on shutdown.
///
/// [`record_drop`]: RateLimitedWarner::record_drop
/// [`warn_if_due`]: RateLimitedWarner::warn_if_due
/// [`flush`]: RateLimitedWarner::flush
pub struct RateLimitedWarner {
    interval_ms: u64,
    clock: ClockFn,
    /// [`NEVER`] until the first warning, which is never delayed.
    last_warn: AtomicU64,
    pending: AtomicU64,
    total: AtomicU64,
}

const NEVER: u64 = u64::MAX;

impl Default for RateLimitedWarner {
    fn default() -> Self {
        Self::new(DEFAULT_WARN_INTERVAL)
    }
}

impl RateLimitedWarner {
    pub fn new(interval: Duration) -> Self {
        Self::with_clock(interval, Box::new(wall_clock_millis))
    }

    /// Create a warner reading time from `clock`.
    pub fn with_clock(interval: Duration, clock: ClockFn) -> Self {
        Self {
            interval_ms: u64::try_from(interval.as_millis()).unwrap_or(u64::MAX),
            clock,
            last_warn: AtomicU64::new(NEVER),
            pending: AtomicU64::new(0),
            total: AtomicU64::new(0),
        }
    }

    pub fn record_drop(&self) {
        self.pending.fetch_add(1, Ordering::Relaxed);
        self.total.fetch_add(1, Ordering::Relaxed);
    }

    /// Drops recorded over the warner's lifetime.
    pub fn total_dropped(&self) -> u64 {
        self.total.load(Ordering::Relaxed)
    }

    /// Call `warn` with the pending drop count if the interval has elapsed.
    pub fn warn_if_due(&self, warn: impl FnOnce(u64)) {
        let now = (self.clock)();
        let last = self.last_warn.load(Ordering::Relaxed);
        let due = last == NEVER || now.saturating_sub(last) >= self.interval_ms;
        if !due {
            return;
        }
        // Only the thread that wins the swap reports this interval.
        if self
            .last_warn
            .compare_exchange(last, now, Ordering::AcqRel, Ordering::Relaxed)
            .is_err()
        {
            return;
        }
        let count = self.pending.swap(0, Ordering::Relaxed);
        if count > 0 {
            warn(count);
        } else {
            self.last_warn.store(last, Ordering::Relaxed);
        }
    }

    /// Call `warn` with any pending drops immediately.
    pub fn flush(&self, warn: impl FnOnce(u64)) {
        let count = self.pending.swap(0, Ordering::Relaxed);
        if count > 0 {
            warn(count);
            self.last_warn.store((self.clock)(), Ordering::Relaxed);
        }
    }
}
