use crate::core::{
    clock::{Clock, TimeT},
    error::TimerError,
    timer::{MAX_INTERVAL_MS, Timer, TimerCallback, TimerId, round_to_resolution},
};
use std::{collections::HashMap, sync::Arc};

/// Every registered timer, keyed by id.
///
/// `epoch` changes on each structural mutation so a sweep that dropped the lock can tell
/// whether its snapshot of ids is still current.
pub struct TimerStore {
    clock: Arc<dyn Clock>,
    resolution: TimeT,
    epoch: u64,
    lookup: HashMap<TimerId, Timer>,
}

impl TimerStore {
    pub fn new(clock: Arc<dyn Clock>, resolution: TimeT) -> Self {
        Self {
            clock,
            resolution: resolution.max(1),
            epoch: 0,
            lookup: HashMap::new(),
        }
    }

    pub fn resolution(&self) -> TimeT {
        self.resolution
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn len(&self) -> usize {
        self.lookup.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lookup.is_empty()
    }

    pub fn round(&self, interval: TimeT) -> TimeT {
        round_to_resolution(interval, self.resolution)
    }

    pub fn add(&mut self, interval: TimeT, callback: TimerCallback) -> Result<TimerId, TimerError> {
        if interval > MAX_INTERVAL_MS {
            return Err(TimerError::IntervalTooLong {
                interval,
                max: MAX_INTERVAL_MS,
            });
        }
        self.lookup
            .try_reserve(1)
            .map_err(|_| TimerError::AllocationFailure)?;

        let mut id = TimerId::new();
        while self.lookup.contains_key(&id) {
            id = TimerId::new();
        }

        let timer = Timer::new(id, self.round(interval), self.clock.now(), callback);
        self.lookup.insert(id, timer);
        self.epoch += 1;
        Ok(id)
    }

    pub fn remove(&mut self, id: &TimerId) -> bool {
        if self.lookup.remove(id).is_some() {
            self.epoch += 1;
            true
        } else {
            false
        }
    }

    /// Drop every timer, returning how many there were.
    pub fn clear(&mut self) -> usize {
        let removed = self.lookup.len();
        self.lookup.clear();
        self.epoch += 1;
        removed
    }

    pub fn get(&self, id: &TimerId) -> Option<&Timer> {
        self.lookup.get(id)
    }

    pub fn get_mut(&mut self, id: &TimerId) -> Option<&mut Timer> {
        self.lookup.get_mut(id)
    }

    /// Snapshot of the current ids, safe to walk while the store mutates.
    pub fn ids(&self) -> Vec<TimerId> {
        self.lookup.keys().copied().collect()
    }

    /// Time until the earliest timer is due, `None` when there is nothing to wait for.
    pub fn next_wait(&self, now: TimeT) -> Option<TimeT> {
        self.lookup.values().map(|timer| timer.remaining(now)).min()
    }
}
