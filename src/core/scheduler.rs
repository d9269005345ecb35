use crate::{
    core::{
        clock::{Clock, SystemClock, TimeT},
        config::SchedulerConfig,
        error::{ConfigError, TimerError},
        legacy::{AlarmFacility, LegacyAlarmAdapter, ThreadAlarm},
        scheduler_loop::{SchedulerLoop, Shared},
        store::TimerStore,
        timer::TimerId,
    },
    utils::{Logger, StdoutLogger},
};
use parking_lot::Mutex;
use std::{
    sync::Arc,
    thread::{self, JoinHandle},
};

enum Mode {
    Stopped,
    Threaded(Threaded),
    Legacy(Arc<LegacyAlarmAdapter>),
}

struct Threaded {
    shared: Arc<Shared>,
    thread: JoinHandle<()>,
    // Registered through `set_legacy_alarm`, replaced on the next call.
    legacy_timer: Option<TimerId>,
}

/// A timer subsystem instance.
///
/// Created stopped. `init` picks threaded mode (any number of timers, fired from a
/// dedicated thread) or legacy mode (one alarm, delegated to an [`AlarmFacility`]).
/// `shutdown` returns it to stopped, after which it may be initialised again. Every
/// method takes `&self`, so callbacks holding an `Arc<TimerScheduler>` may add and
/// remove timers themselves.
pub struct TimerScheduler {
    config: SchedulerConfig,
    clock: Arc<dyn Clock>,
    alarm: Arc<dyn AlarmFacility>,
    logger: Arc<dyn Logger>,
    mode: Mutex<Mode>,
}

impl TimerScheduler {
    pub fn new(config: SchedulerConfig) -> Self {
        Self {
            config,
            clock: Arc::new(SystemClock::new()),
            alarm: Arc::new(ThreadAlarm::new()),
            logger: Arc::new(StdoutLogger::new()),
            mode: Mutex::new(Mode::Stopped),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_alarm(mut self, alarm: Arc<dyn AlarmFacility>) -> Self {
        self.alarm = alarm;
        self
    }

    pub fn with_logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub fn init(&self, threaded: bool) -> Result<(), TimerError> {
        if self.config.resolution_ms == 0 {
            return Err(ConfigError::InvalidResolution.into());
        }

        let mut mode = self.mode.lock();
        if !matches!(*mode, Mode::Stopped) {
            return Err(ConfigError::AlreadyInitialized.into());
        }

        *mode = if threaded {
            Mode::Threaded(self.spawn_loop()?)
        } else {
            Mode::Legacy(Arc::new(LegacyAlarmAdapter::new(
                self.alarm.clone(),
                self.logger.clone(),
            )))
        };

        self.logger.info(&format!(
            "Timer subsystem started ({} mode, {} ms resolution)",
            if threaded { "threaded" } else { "legacy" },
            self.config.resolution_ms
        ));
        Ok(())
    }

    fn spawn_loop(&self) -> Result<Threaded, TimerError> {
        let store = TimerStore::new(self.clock.clone(), self.config.resolution_ms);
        let shared = Arc::new(Shared::new(store));
        let scheduler_loop =
            SchedulerLoop::new(shared.clone(), self.clock.clone(), self.logger.clone());

        let thread = thread::Builder::new()
            .name(self.config.thread_name.clone())
            .spawn(move || scheduler_loop.run())
            .map_err(|source| TimerError::Resource {
                what: "scheduler thread",
                source,
            })?;

        Ok(Threaded {
            shared,
            thread,
            legacy_timer: None,
        })
    }

    /// Stop the scheduler thread or the legacy alarm and drop every timer. Idempotent.
    pub fn shutdown(&self) {
        let mode = std::mem::replace(&mut *self.mode.lock(), Mode::Stopped);
        match mode {
            Mode::Stopped => {}
            Mode::Threaded(threaded) => self.stop_loop(threaded),
            Mode::Legacy(adapter) => {
                adapter.clear();
                self.logger.info("Timer subsystem shut down");
            }
        }
    }

    fn stop_loop(&self, threaded: Threaded) {
        let discarded = threaded.shared.store.lock().clear();
        threaded.shared.wakeup.terminate();

        let handle = threaded.thread;
        if handle.thread().id() == thread::current().id() {
            self.logger
                .warn("Shutdown requested from a timer callback, scheduler thread left to exit");
        } else if handle.join().is_err() {
            self.logger.error("Scheduler thread panicked");
        }

        self.logger.info(&format!(
            "Timer subsystem shut down, {discarded} timer(s) discarded"
        ));
    }

    /// Register `callback` to run every `interval` ms, first after one interval.
    ///
    /// The callback receives the current interval and returns the next one, or 0 to
    /// stop. It runs on the scheduler thread with no lock held. A panicking callback
    /// takes the scheduler thread down with it; nothing fires afterwards and the
    /// panic is reported by `shutdown`.
    ///
    /// Intervals above [`MAX_INTERVAL_MS`](crate::core::MAX_INTERVAL_MS) (about 12 days)
    /// are rejected, since elapsed ticks are compared as signed 32-bit values. Intervals
    /// returned by the callback are clamped to it.
    pub fn add_timer<F>(&self, interval: TimeT, callback: F) -> Result<TimerId, TimerError>
    where
        F: FnMut(TimeT) -> TimeT + Send + 'static,
    {
        let shared = self.threaded()?;
        let id = shared.store.lock().add(interval, Box::new(callback))?;
        shared.wakeup.notify();

        self.logger
            .debug(&format!("Timer {id} added, interval {interval} ms"));
        Ok(id)
    }

    /// Whether a timer with this id was registered and is now gone.
    pub fn remove_timer(&self, id: &TimerId) -> bool {
        let Ok(shared) = self.threaded() else {
            return false;
        };

        let removed = shared.store.lock().remove(id);
        if removed {
            shared.wakeup.notify();
            self.logger.debug(&format!("Timer {id} removed"));
        }
        removed
    }

    /// Replace the single legacy alarm with one firing every `interval` ms.
    /// An interval of 0 clears it.
    ///
    /// Threaded mode runs it as an ordinary timer next to the others.
    pub fn set_legacy_alarm<F>(&self, interval: TimeT, callback: F) -> Result<(), TimerError>
    where
        F: FnMut(TimeT) + Send + 'static,
    {
        let adapter = match &mut *self.mode.lock() {
            Mode::Stopped => return Err(ConfigError::NotInitialized.into()),
            Mode::Threaded(threaded) => return Self::replace_legacy_timer(threaded, interval, callback),
            Mode::Legacy(adapter) => adapter.clone(),
        };

        // The alarm thread may call back into the scheduler, so it is stopped unlocked.
        adapter.set(interval, Box::new(callback))
    }

    fn replace_legacy_timer<F>(
        threaded: &mut Threaded,
        interval: TimeT,
        mut callback: F,
    ) -> Result<(), TimerError>
    where
        F: FnMut(TimeT) + Send + 'static,
    {
        let mut store = threaded.shared.store.lock();
        if let Some(previous) = threaded.legacy_timer.take() {
            store.remove(&previous);
        }
        if interval != 0 {
            let id = store.add(
                interval,
                Box::new(move |ms| {
                    callback(ms);
                    ms
                }),
            )?;
            threaded.legacy_timer = Some(id);
        }
        drop(store);

        threaded.shared.wakeup.notify();
        Ok(())
    }

    /// Registered timers; in legacy mode 1 while the alarm is armed.
    pub fn timer_count(&self) -> usize {
        match &*self.mode.lock() {
            Mode::Stopped => 0,
            Mode::Threaded(threaded) => threaded.shared.store.lock().len(),
            Mode::Legacy(adapter) => usize::from(adapter.interval().is_some()),
        }
    }

    pub fn is_initialized(&self) -> bool {
        !matches!(*self.mode.lock(), Mode::Stopped)
    }

    pub fn is_threaded(&self) -> bool {
        matches!(*self.mode.lock(), Mode::Threaded(_))
    }

    fn threaded(&self) -> Result<Arc<Shared>, TimerError> {
        match &*self.mode.lock() {
            Mode::Stopped => Err(ConfigError::NotInitialized.into()),
            Mode::Legacy(_) => Err(TimerError::NotSupported),
            Mode::Threaded(threaded) => Ok(threaded.shared.clone()),
        }
    }
}

impl Drop for TimerScheduler {
    fn drop(&mut self) {
        self.shutdown();
    }
}
