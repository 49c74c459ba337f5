//! Delayed callbacks keyed by handle
//!
//! Everything that "fires later" (spawn ticks, fire gate phase flips, combo
//! timeout) is a pending entry here. Owners keep the handle so they can cancel
//! and replace; the run clears the whole registry on death.

/// Handle to a pending timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerHandle(u32);

/// What to do when a timer fires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    /// Spawn the next obstacle pair
    Spawn,
    /// Flip a fire gate between inactive and active
    HazardPhase { gate: u32 },
    /// Combo window elapsed without a collection
    ComboTimeout,
}

#[derive(Debug, Clone)]
struct Pending {
    handle: TimerHandle,
    due: u64,
    event: TimerEvent,
}

/// Per-run timer registry
#[derive(Debug, Clone, Default)]
pub struct Timers {
    pending: Vec<Pending>,
    next_handle: u32,
}

impl Timers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `event` to fire `delay` ticks after `now`
    pub fn schedule(&mut self, now: u64, delay: u64, event: TimerEvent) -> TimerHandle {
        let handle = TimerHandle(self.next_handle);
        self.next_handle = self.next_handle.wrapping_add(1);
        self.pending.push(Pending {
            handle,
            due: now + delay,
            event,
        });
        handle
    }

    /// Cancel a pending timer. Returns false if it already fired or was cancelled.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        let before = self.pending.len();
        self.pending.retain(|p| p.handle != handle);
        self.pending.len() != before
    }

    /// Cancel whatever `slot` holds and schedule a replacement into it
    pub fn replace(
        &mut self,
        slot: &mut Option<TimerHandle>,
        now: u64,
        delay: u64,
        event: TimerEvent,
    ) {
        if let Some(old) = slot.take() {
            self.cancel(old);
        }
        *slot = Some(self.schedule(now, delay, event));
    }

    /// Remove and return the earliest timer due at or before `now`.
    ///
    /// Ties fire in scheduling order.
    pub fn pop_due(&mut self, now: u64) -> Option<(TimerHandle, TimerEvent)> {
        let idx = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, p)| p.due <= now)
            .min_by_key(|(_, p)| (p.due, p.handle))
            .map(|(i, _)| i)?;
        let fired = self.pending.swap_remove(idx);
        Some((fired.handle, fired.event))
    }

    /// Due tick of a pending timer
    pub fn due_of(&self, handle: TimerHandle) -> Option<u64> {
        self.pending.iter().find(|p| p.handle == handle).map(|p| p.due)
    }

    pub fn is_pending(&self, handle: TimerHandle) -> bool {
        self.due_of(handle).is_some()
    }

    /// Cancel everything
    pub fn clear(&mut self) {
        self.pending.clear();
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
