use crate::{
    core::{
        clock::{Clock, TimeT},
        store::TimerStore,
        timer::{MAX_INTERVAL_MS, TimerCallback, TimerId},
        wakeup::{Signal, WakeupChannel},
    },
    utils::Logger,
};
use parking_lot::{Mutex, MutexGuard};
use std::{sync::Arc, time::Duration};

/// State shared between caller threads and the scheduler thread.
pub struct Shared {
    pub store: Mutex<TimerStore>,
    pub wakeup: WakeupChannel,
}

impl Shared {
    pub fn new(store: TimerStore) -> Self {
        Self {
            store: Mutex::new(store),
            wakeup: WakeupChannel::new(),
        }
    }
}

/// Fires due timers and sleeps until the next one, on its own thread.
pub struct SchedulerLoop {
    shared: Arc<Shared>,
    clock: Arc<dyn Clock>,
    logger: Arc<dyn Logger>,
}

impl SchedulerLoop {
    pub fn new(shared: Arc<Shared>, clock: Arc<dyn Clock>, logger: Arc<dyn Logger>) -> Self {
        Self {
            shared,
            clock,
            logger,
        }
    }

    pub fn run(self) {
        self.logger.debug("Scheduler loop started");
        while self.iterate() {}
        self.logger.debug("Scheduler loop terminated");
    }

    /// One drain, sweep, wait cycle. Returns false once terminate has been received.
    pub fn iterate(&self) -> bool {
        if self.shared.wakeup.drain() == Signal::Terminate {
            return false;
        }

        let wait = self.sweep();
        self.shared
            .wakeup
            .wait(wait.map(|ms| Duration::from_millis(ms.into())));
        true
    }

    /// Fire every due timer and return how long until the next one.
    pub fn sweep(&self) -> Option<TimeT> {
        let mut store = self.shared.store.lock();
        let mut epoch = store.epoch();
        let now = self.clock.now();
        let resolution = store.resolution();

        for id in store.ids() {
            let Some(timer) = store.get_mut(&id) else {
                continue;
            };
            if !timer.is_due(now, resolution) {
                continue;
            }

            timer.advance(now);
            let interval = timer.interval();
            let Some(mut callback) = timer.take_callback() else {
                continue;
            };

            // Callbacks may add or remove timers, so they run unlocked.
            let next = MutexGuard::unlocked(&mut store, || callback(interval));

            let stale = store.epoch() != epoch;
            self.settle(&mut store, &id, callback, next);
            if stale {
                self.logger.debug("Timer set changed during callback, sweep aborted");
                break;
            }
            epoch = store.epoch();
        }

        store.next_wait(self.clock.now())
    }

    /// Hand the callback back to its timer and apply the interval it returned. A timer
    /// removed while its callback ran is gone already; the callback drops here.
    fn settle(
        &self,
        store: &mut TimerStore,
        id: &TimerId,
        callback: TimerCallback,
        next: TimeT,
    ) {
        let rounded = store.round(next.min(MAX_INTERVAL_MS));
        let Some(timer) = store.get_mut(id) else {
            return;
        };
        timer.restore_callback(callback);

        if next == 0 {
            store.remove(id);
            self.logger.debug(&format!("Timer {id} retired by its callback"));
        } else {
            timer.set_interval(rounded);
        }
    }
}
