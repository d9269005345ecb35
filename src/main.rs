use anyhow::{Context, Result};
use cuckoo_sched::{
    SchedulerConfig, TimerScheduler,
    utils::{LogLevel, Logger, StdoutLogger},
};
use std::{
    sync::{
        Arc,
        atomic::{AtomicU32, Ordering},
    },
    thread::sleep,
    time::Duration,
};

fn main() -> Result<()> {
    let logger = Arc::new(StdoutLogger::new().with_level(LogLevel::Debug));
    logger.info(&format!("cuckoo-sched - version {}", env!("CARGO_PKG_VERSION")));

    let scheduler =
        TimerScheduler::new(SchedulerConfig::default()).with_logger(logger.clone());

    scheduler
        .init(true)
        .context("Failed to start threaded scheduler")?;

    let fired = Arc::new(AtomicU32::new(0));
    let counter = fired.clone();
    let id = scheduler
        .add_timer(100, move |interval| {
            counter.fetch_add(1, Ordering::SeqCst);
            interval
        })
        .context("Failed to add timer")?;

    scheduler
        .add_timer(250, |_| 0)
        .context("Failed to add one-shot timer")?;

    sleep(Duration::from_millis(550));
    scheduler.remove_timer(&id);
    logger.info(&format!(
        "timer {id} fired {} times",
        fired.load(Ordering::SeqCst)
    ));
    scheduler.shutdown();

    scheduler
        .init(false)
        .context("Failed to start legacy scheduler")?;

    let ticks = Arc::new(AtomicU32::new(0));
    let counter = ticks.clone();
    scheduler
        .set_legacy_alarm(100, move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .context("Failed to arm legacy alarm")?;

    sleep(Duration::from_millis(350));
    scheduler.shutdown();
    logger.info(&format!(
        "legacy alarm fired {} times",
        ticks.load(Ordering::SeqCst)
    ));

    Ok(())
}
