use std::time::Instant;

/// The 32-bit unsigned integer type used to store ticks in ms. Wraps after ~49.7 days.
pub type TimeT = u32;

pub trait Clock: Send + Sync {
    fn now(&self) -> TimeT;
}

/// Monotonic millisecond clock measured from its own construction.
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> TimeT {
        // Truncation is the wrap.
        self.origin.elapsed().as_millis() as TimeT
    }
}

/// Milliseconds elapsed from `then` to `now`, tolerant of tick wrap-around.
///
/// Negative when `then` lies slightly ahead of `now`, which happens after a timer
/// has been advanced by a whole interval while it was still up to one resolution early.
pub fn elapsed_since(now: TimeT, then: TimeT) -> i64 {
    now.wrapping_sub(then) as i32 as i64
}
