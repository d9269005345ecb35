mod clock;
pub use clock::{Clock, SystemClock, TimeT};

mod config;
pub use config::{DEFAULT_RESOLUTION_MS, SchedulerConfig};

mod error;
pub use error::{ConfigError, TimerError};

mod legacy;
pub use legacy::{AlarmCallback, AlarmFacility, AlarmHandler, LegacyAlarmAdapter, ThreadAlarm};

mod scheduler;
pub use scheduler::TimerScheduler;

mod scheduler_loop;

mod store;
pub use store::TimerStore;

mod timer;
pub use timer::{MAX_INTERVAL_MS, Timer, TimerCallback, TimerId, round_to_resolution};

mod wakeup;
pub use wakeup::{Signal, WakeupChannel};
