//! Combo counter and double-score window
//!
//! Collections inside the combo timeout chain together. Reaching the
//! threshold opens a double-score window; letting the timeout lapse drops
//! the combo back to zero.

use super::timer::{TimerEvent, TimerHandle, Timers};
use crate::consts::{COMBO_THRESHOLD, COMBO_TIMEOUT_MS, DOUBLE_SCORE_MS};
use crate::ms_to_ticks;

/// Points and side effects of one collection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComboAward {
    pub points: u32,
    /// Set when this collection opened the double-score window
    pub double_until: Option<u64>,
}

#[derive(Debug, Clone, Default)]
pub struct Combo {
    pub count: u32,
    /// Double score applies while `now < double_until`
    pub double_until: u64,
    timer: Option<TimerHandle>,
}

impl Combo {
    /// Register a collection at `now`
    pub fn register(&mut self, now: u64, timers: &mut Timers) -> ComboAward {
        self.count += 1;
        timers.replace(
            &mut self.timer,
            now,
            ms_to_ticks(COMBO_TIMEOUT_MS),
            TimerEvent::ComboTimeout,
        );

        let points = if self.is_double_at(now) { 2 } else { 1 };

        let double_until = if self.count == COMBO_THRESHOLD {
            self.double_until = now + ms_to_ticks(DOUBLE_SCORE_MS);
            Some(self.double_until)
        } else {
            None
        };

        ComboAward {
            points,
            double_until,
        }
    }

    /// Timeout fired. Stale handles (already replaced) are ignored.
    /// Returns true if the combo was reset.
    pub fn on_timeout(&mut self, handle: TimerHandle) -> bool {
        if self.timer != Some(handle) {
            return false;
        }
        self.timer = None;
        self.count = 0;
        true
    }

    pub fn is_double_at(&self, now: u64) -> bool {
        now < self.double_until
    }

    /// Tick the combo will expire at, if one is running
    pub fn expires_at(&self, timers: &Timers) -> Option<u64> {
        self.timer.and_then(|h| timers.due_of(h))
    }

    /// Forget the pending timeout (the registry is being cleared)
    pub fn detach_timer(&mut self) {
        self.timer = None;
    }
}
