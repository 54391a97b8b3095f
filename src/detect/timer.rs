//! Deadline-based one-shot timers
//!
//! The detector never sleeps or spawns. A timer is a deadline that the owner
//! checks against the current time, either when the next event arrives or when
//! the host calls `check_timers`.

use std::time::{Duration, Instant};

/// Identifies one arming of a timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(u64);

/// A single pending deadline; arming replaces whatever was pending
#[derive(Debug, Default)]
pub struct OneShotTimer {
    pending: Option<(TimerHandle, Instant)>,
    armed_count: u64,
}

impl OneShotTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule the timer `delay` after `now`, cancelling any pending arming
    pub fn arm(&mut self, now: Instant, delay: Duration) -> TimerHandle {
        self.armed_count += 1;
        let handle = TimerHandle(self.armed_count);
        self.pending = Some((handle, now + delay));
        handle
    }

    /// Cancel a specific arming.
    ///
    /// Stale handles (already fired, cancelled, or replaced by a later arming)
    /// are ignored. Returns whether something was cancelled.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        match self.pending {
            Some((pending, _)) if pending == handle => {
                self.pending = None;
                true
            }
            _ => false,
        }
    }

    /// Cancel whatever is pending
    pub fn cancel_pending(&mut self) {
        self.pending = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.pending.map(|(_, deadline)| deadline)
    }

    /// Consume the pending arming if its deadline has passed
    pub fn fire_if_due(&mut self, now: Instant) -> Option<TimerHandle> {
        match self.pending {
            Some((handle, deadline)) if deadline <= now => {
                self.pending = None;
                Some(handle)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS: Duration = Duration::from_millis(1);

    #[test]
    fn fires_once_after_deadline() {
        let t0 = Instant::now();
        let mut timer = OneShotTimer::new();
        let handle = timer.arm(t0, 100 * MS);

        assert_eq!(timer.fire_if_due(t0 + 99 * MS), None);
        assert_eq!(timer.fire_if_due(t0 + 100 * MS), Some(handle));
        assert_eq!(timer.fire_if_due(t0 + 200 * MS), None);
        assert!(!timer.is_pending());
    }

    #[test]
    fn rearming_replaces_pending_deadline() {
        let t0 = Instant::now();
        let mut timer = OneShotTimer::new();
        let first = timer.arm(t0, 100 * MS);
        let second = timer.arm(t0 + 50 * MS, 100 * MS);

        assert_ne!(first, second);
        assert_eq!(timer.deadline(), Some(t0 + 150 * MS));
        assert_eq!(timer.fire_if_due(t0 + 120 * MS), None);
        assert_eq!(timer.fire_if_due(t0 + 150 * MS), Some(second));
    }

    #[test]
    fn cancel_is_idempotent_and_ignores_stale_handles() {
        let t0 = Instant::now();
        let mut timer = OneShotTimer::new();
        let stale = timer.arm(t0, 10 * MS);
        let live = timer.arm(t0, 10 * MS);

        assert!(!timer.cancel(stale));
        assert!(timer.is_pending());
        assert!(timer.cancel(live));
        assert!(!timer.cancel(live));
        assert!(!timer.is_pending());
    }

    #[test]
    fn cancel_after_fire_is_harmless() {
        let t0 = Instant::now();
        let mut timer = OneShotTimer::new();
        let handle = timer.arm(t0, 10 * MS);
        assert!(timer.fire_if_due(t0 + 10 * MS).is_some());
        assert!(!timer.cancel(handle));
    }
}
