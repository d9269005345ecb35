//! Repeating software timers, fired either from a dedicated scheduler thread or,
//! for a single timer, from a platform alarm.

pub mod core;
pub mod utils;

pub use crate::core::{
    ConfigError, SchedulerConfig, TimeT, TimerError, TimerId, TimerScheduler,
};
