use crate::core::clock::TimeT;

pub const DEFAULT_RESOLUTION_MS: TimeT = 10;
pub const DEFAULT_THREAD_NAME: &str = "timer-scheduler";

/// Settings fixed for the lifetime of a scheduler instance.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Granularity every interval is rounded up to.
    pub resolution_ms: TimeT,
    pub thread_name: String,
}

impl SchedulerConfig {
    pub fn with_resolution(mut self, resolution_ms: TimeT) -> Self {
        self.resolution_ms = resolution_ms;
        self
    }

    pub fn with_thread_name(mut self, name: impl Into<String>) -> Self {
        self.thread_name = name.into();
        self
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            resolution_ms: DEFAULT_RESOLUTION_MS,
            thread_name: DEFAULT_THREAD_NAME.to_owned(),
        }
    }
}
