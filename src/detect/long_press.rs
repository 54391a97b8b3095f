//! Long press tracking for a dedicated scan trigger key

use super::timer::OneShotTimer;
use std::time::{Duration, Instant};

/// Tracks how long the scan trigger key is held
#[derive(Debug)]
pub struct LongPressTracker {
    threshold: Duration,
    holding: bool,
    timer: OneShotTimer,
}

impl LongPressTracker {
    pub fn new(threshold: Duration) -> Self {
        Self {
            threshold,
            holding: false,
            timer: OneShotTimer::new(),
        }
    }

    /// Trigger pressed. Auto-repeat presses while held are ignored.
    ///
    /// Returns true when this press started a new hold.
    pub fn key_down(&mut self, now: Instant) -> bool {
        if self.holding {
            return false;
        }
        self.holding = true;
        self.timer.arm(now, self.threshold);
        true
    }

    /// Trigger released
    pub fn key_up(&mut self) {
        self.timer.cancel_pending();
        self.holding = false;
    }

    /// Returns true once per hold, when the threshold has been reached
    pub fn check(&mut self, now: Instant) -> bool {
        self.timer.fire_if_due(now).is_some()
    }

    pub fn is_holding(&self) -> bool {
        self.holding
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.timer.deadline()
    }

    /// Forget the current hold without firing
    pub fn cancel(&mut self) {
        self.key_up();
    }
}
