use crate::core::clock::{TimeT, elapsed_since};
use std::fmt;
use uuid::Uuid;

/// A Universally Unique Identifier (UUID) for Timers.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub struct TimerId(pub Uuid);

impl TimerId {
    pub fn new() -> Self {
        TimerId(Uuid::new_v4())
    }

    pub fn uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for TimerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Longest accepted interval. Elapsed ticks are compared as `i32`, and half that range
/// leaves room for a loop that wakes late.
pub const MAX_INTERVAL_MS: TimeT = (i32::MAX / 2) as TimeT;

/// Receives the current interval and returns the next one. Returning `0` retires the timer.
pub type TimerCallback = Box<dyn FnMut(TimeT) -> TimeT + Send>;

/// Round `interval` up to a whole number of `resolution` units, never below one unit.
pub fn round_to_resolution(interval: TimeT, resolution: TimeT) -> TimeT {
    let resolution = resolution.max(1);
    let units = interval.div_ceil(resolution).max(1);
    units
        .checked_mul(resolution)
        .unwrap_or(TimeT::MAX / resolution * resolution)
}

pub struct Timer {
    pub id: TimerId,
    interval: TimeT,
    last_fire: TimeT,
    // None while the scheduler loop is running it with the store unlocked.
    callback: Option<TimerCallback>,
}

impl Timer {
    pub fn new(id: TimerId, interval: TimeT, last_fire: TimeT, callback: TimerCallback) -> Self {
        Self {
            id,
            interval,
            last_fire,
            callback: Some(callback),
        }
    }

    pub fn interval(&self) -> TimeT {
        self.interval
    }

    pub fn last_fire(&self) -> TimeT {
        self.last_fire
    }

    pub fn set_interval(&mut self, interval: TimeT) {
        self.interval = interval;
    }

    /// Due once less than one resolution unit remains, since the wait itself is that coarse.
    pub fn is_due(&self, now: TimeT, resolution: TimeT) -> bool {
        let threshold = self.interval as i64 - resolution as i64;
        elapsed_since(now, self.last_fire) > threshold
    }

    /// Move the baseline forward one interval, or snap to `now` when the timer is a whole
    /// interval or more overdue so a stall never triggers a burst.
    pub fn advance(&mut self, now: TimeT) {
        if elapsed_since(now, self.last_fire) < 2 * self.interval as i64 {
            self.last_fire = self.last_fire.wrapping_add(self.interval);
        } else {
            self.last_fire = now;
        }
    }

    /// Milliseconds until the timer is due, zero when overdue.
    pub fn remaining(&self, now: TimeT) -> TimeT {
        let dist = self.interval as i64 - elapsed_since(now, self.last_fire);
        dist.clamp(0, TimeT::MAX as i64) as TimeT
    }

    pub fn take_callback(&mut self) -> Option<TimerCallback> {
        self.callback.take()
    }

    pub fn restore_callback(&mut self, callback: TimerCallback) {
        self.callback = Some(callback);
    }
}

impl fmt::Debug for Timer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Timer")
            .field("id", &self.id)
            .field("interval", &self.interval)
            .field("last_fire", &self.last_fire)
            .field("running", &self.callback.is_none())
            .finish()
    }
}
