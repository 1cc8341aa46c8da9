//! Time source used by [`DelayQueue`](crate::scheduler::DelayQueue) to wait
//! before each action.
//!
//! `SystemClock` really blocks the calling thread. `ManualClock` only moves a
//! virtual timestamp forward, which keeps tests and `--instant` runs fast and
//! deterministic.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Capability to wait for a relative amount of time.
pub trait Clock {
    fn sleep(&self, duration: Duration);
}

impl<C: Clock + ?Sized> Clock for &C {
    fn sleep(&self, duration: Duration) {
        (**self).sleep(duration)
    }
}

// ---------------------------------------------------------------------------
// SystemClock
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn sleep(&self, duration: Duration) {
        if !duration.is_zero() {
            std::thread::sleep(duration);
        }
    }
}

// ---------------------------------------------------------------------------
// ManualClock
// ---------------------------------------------------------------------------

/// Virtual clock. `sleep` returns immediately and advances `elapsed`.
#[derive(Debug, Default)]
pub struct ManualClock {
    elapsed_nanos: AtomicU64,
    sleeps: AtomicU64,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total virtual time slept so far.
    pub fn elapsed(&self) -> Duration {
        Duration::from_nanos(self.elapsed_nanos.load(Ordering::Relaxed))
    }

    /// Number of `sleep` calls observed, zero-length ones included.
    pub fn sleep_count(&self) -> u64 {
        self.sleeps.load(Ordering::Relaxed)
    }
}

impl Clock for ManualClock {
    fn sleep(&self, duration: Duration) {
        let nanos = u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX);
        self.elapsed_nanos.fetch_add(nanos, Ordering::Relaxed);
        self.sleeps.fetch_add(1, Ordering::Relaxed);
    }
}
