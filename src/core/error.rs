//! Error types for the timer subsystem

use crate::core::clock::TimeT;
use thiserror::Error;

/// Operations called out of order, or with an unusable configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("timer subsystem is not initialized")]
    NotInitialized,

    #[error("timer subsystem is already initialized")]
    AlreadyInitialized,

    #[error("timer resolution must be at least 1 ms")]
    InvalidResolution,
}

#[derive(Debug, Error)]
pub enum TimerError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("multiple timers require threaded mode")]
    NotSupported,

    #[error("failed to create {what}")]
    Resource {
        what: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to allocate timer")]
    AllocationFailure,

    #[error("interval of {interval} ms exceeds the {max} ms limit")]
    IntervalTooLong { interval: TimeT, max: TimeT },
}
