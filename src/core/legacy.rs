//! Single-timer mode that hands the waiting to a periodic alarm instead of the
//! scheduler thread.

use crate::{
    core::{clock::TimeT, error::TimerError, wakeup::WakeupChannel},
    utils::Logger,
};
use parking_lot::Mutex;
use std::{
    sync::Arc,
    thread::{self, JoinHandle},
    time::Duration,
};

/// Invoked by the alarm facility every time the alarm goes off.
pub type AlarmHandler = Arc<dyn Fn() + Send + Sync>;

/// Receives the alarm interval; always re-armed at the same interval.
pub type AlarmCallback = Box<dyn FnMut(TimeT) + Send>;

/// A periodic alarm provided by the platform. At most one alarm is armed at a time.
pub trait AlarmFacility: Send + Sync {
    fn start_single_alarm(&self, interval: TimeT, handler: AlarmHandler)
    -> Result<(), TimerError>;

    fn stop_single_alarm(&self);
}

pub struct LegacyAlarmAdapter {
    facility: Arc<dyn AlarmFacility>,
    active: Mutex<Option<TimeT>>,
    logger: Arc<dyn Logger>,
}

impl LegacyAlarmAdapter {
    pub fn new(facility: Arc<dyn AlarmFacility>, logger: Arc<dyn Logger>) -> Self {
        Self {
            facility,
            active: Mutex::new(None),
            logger,
        }
    }

    /// Replace the armed alarm. An interval of 0 only clears it.
    ///
    /// The facility is stopped and started without `active` held, since stopping waits
    /// for a handler that may itself be asking for `interval`.
    pub fn set(&self, interval: TimeT, callback: AlarmCallback) -> Result<(), TimerError> {
        let previous = self.active.lock().take();
        if previous.is_some() {
            self.facility.stop_single_alarm();
        }
        if interval == 0 {
            return Ok(());
        }

        let callback = Mutex::new(callback);
        let trampoline: AlarmHandler = Arc::new(move || {
            let mut callback = callback.lock();
            (*callback)(interval)
        });
        self.facility.start_single_alarm(interval, trampoline)?;

        *self.active.lock() = Some(interval);
        self.logger
            .debug(&format!("Legacy alarm armed every {interval} ms"));
        Ok(())
    }

    pub fn clear(&self) {
        let previous = self.active.lock().take();
        if previous.is_some() {
            self.facility.stop_single_alarm();
            self.logger.debug("Legacy alarm cleared");
        }
    }

    pub fn interval(&self) -> Option<TimeT> {
        *self.active.lock()
    }
}

struct AlarmThread {
    wakeup: Arc<WakeupChannel>,
    handle: JoinHandle<()>,
}

/// Portable alarm that sleeps on a helper thread between firings.
#[derive(Default)]
pub struct ThreadAlarm {
    running: Mutex<Option<AlarmThread>>,
}

impl ThreadAlarm {
    pub fn new() -> Self {
        Self::default()
    }

    fn halt(alarm: AlarmThread) {
        alarm.wakeup.terminate();
        // From inside the handler the thread exits on its own once the handler returns.
        if alarm.handle.thread().id() != thread::current().id() {
            let _ = alarm.handle.join();
        }
    }
}

impl AlarmFacility for ThreadAlarm {
    fn start_single_alarm(
        &self,
        interval: TimeT,
        handler: AlarmHandler,
    ) -> Result<(), TimerError> {
        let previous = self.running.lock().take();
        if let Some(previous) = previous {
            Self::halt(previous);
        }

        let wakeup = Arc::new(WakeupChannel::new());
        let period = Duration::from_millis(interval.into());
        let handle = {
            let wakeup = wakeup.clone();
            thread::Builder::new()
                .name("legacy-alarm".to_owned())
                .spawn(move || {
                    while !wakeup.wait(Some(period)) {
                        handler();
                    }
                })
                .map_err(|source| TimerError::Resource {
                    what: "alarm thread",
                    source,
                })?
        };

        let displaced = self.running.lock().replace(AlarmThread { wakeup, handle });
        if let Some(displaced) = displaced {
            Self::halt(displaced);
        }
        Ok(())
    }

    fn stop_single_alarm(&self) {
        let previous = self.running.lock().take();
        if let Some(previous) = previous {
            Self::halt(previous);
        }
    }
}
