use parking_lot::{Condvar, Mutex};
use std::time::{Duration, Instant};

/// What the waiting side found when it drained the channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    None,
    Recompute,
    Terminate,
}

#[derive(Default)]
struct Pending {
    recompute: bool,
    terminate: bool,
}

impl Pending {
    fn any(&self) -> bool {
        self.recompute || self.terminate
    }
}

/// Interrupts a blocking wait from any thread.
///
/// Recompute requests coalesce into a single flag. A terminate request stays pending
/// until one `drain` hands it out.
#[derive(Default)]
pub struct WakeupChannel {
    pending: Mutex<Pending>,
    signal: Condvar,
}

impl WakeupChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// The schedule may have changed.
    pub fn notify(&self) {
        self.pending.lock().recompute = true;
        self.signal.notify_all();
    }

    pub fn terminate(&self) {
        self.pending.lock().terminate = true;
        self.signal.notify_all();
    }

    /// Consume everything pending. Terminate wins over recompute.
    pub fn drain(&self) -> Signal {
        let mut pending = self.pending.lock();
        let signal = if pending.terminate {
            Signal::Terminate
        } else if pending.recompute {
            Signal::Recompute
        } else {
            Signal::None
        };
        *pending = Pending::default();
        signal
    }

    /// Block until a signal is pending or `timeout` elapses; `None` waits indefinitely.
    /// Returns whether a signal is pending. Nothing is consumed.
    pub fn wait(&self, timeout: Option<Duration>) -> bool {
        let mut pending = self.pending.lock();
        match timeout {
            None => {
                while !pending.any() {
                    self.signal.wait(&mut pending);
                }
                true
            }
            Some(timeout) => {
                let deadline = Instant::now() + timeout;
                while !pending.any() {
                    if self.signal.wait_until(&mut pending, deadline).timed_out() {
                        return pending.any();
                    }
                }
                true
            }
        }
    }
}
