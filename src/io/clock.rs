//! Time sources and periodic timers
//!
//! Analysis never reads the wall clock itself; every operation takes the
//! current `Instant` from its caller. Hosts obtain that instant from a
//! [`Clock`], which tests replace with a [`ManualClock`].

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Source of the current instant
pub trait Clock {
    /// Current instant
    fn now(&self) -> Instant;
}

/// Monotonic system clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to
///
/// Clones share the same time, so a test can hold one handle while a
/// scheduler reads another.
#[derive(Debug, Clone)]
pub struct ManualClock {
    origin: Instant,
    elapsed_nanos: Arc<AtomicU64>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(Instant::now())
    }
}

impl ManualClock {
    /// Clock frozen at `origin`
    pub fn new(origin: Instant) -> Self {
        Self {
            origin,
            elapsed_nanos: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Instant the clock started at
    pub fn origin(&self) -> Instant {
        self.origin
    }

    /// Time elapsed since `origin`
    pub fn elapsed(&self) -> Duration {
        Duration::from_nanos(self.elapsed_nanos.load(Ordering::SeqCst))
    }

    /// Move the clock forward
    pub fn advance(&self, by: Duration) {
        let nanos = u64::try_from(by.as_nanos()).unwrap_or(u64::MAX);
        let _ = self
            .elapsed_nanos
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |current| {
                Some(current.saturating_add(nanos))
            });
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + self.elapsed()
    }
}

/// Fixed-period timer polled with the current instant
///
/// The first poll arms the timer; it first fires one period later. Deadlines
/// advance by exactly one period per firing, so a late poller catches up on
/// subsequent polls instead of drifting.
#[derive(Debug, Clone)]
pub struct PeriodicTimer {
    period: Duration,
    next_due: Option<Instant>,
}

impl PeriodicTimer {
    /// Create an unarmed timer
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            next_due: None,
        }
    }

    /// Timer period
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Next deadline, once armed
    pub fn next_due(&self) -> Option<Instant> {
        self.next_due
    }

    /// Arm the timer so it first fires one period after `now`
    pub fn arm(&mut self, now: Instant) {
        self.next_due = Some(now + self.period);
    }

    /// Forget the deadline; the next poll re-arms the timer
    pub fn reset(&mut self) {
        self.next_due = None;
    }

    /// Returns `true` when a deadline has been reached at `now`
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.next_due {
            None => {
                self.arm(now);
                false
            }
            Some(due) if now >= due => {
                self.next_due = Some(due + self.period);
                true
            }
            Some(_) => false,
        }
    }
}
