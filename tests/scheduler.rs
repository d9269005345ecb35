use cuckoo_sched::{SchedulerConfig, TimeT, TimerError, TimerId, TimerScheduler};
use parking_lot::Mutex;
use std::{
    sync::{
        Arc,
        atomic::{AtomicU32, Ordering},
        mpsc,
    },
    thread,
    time::{Duration, Instant},
};

fn threaded() -> Arc<TimerScheduler> {
    let scheduler = Arc::new(TimerScheduler::new(SchedulerConfig::default()));
    scheduler.init(true).unwrap();
    scheduler
}

fn counter(returns: TimeT) -> (Arc<AtomicU32>, impl FnMut(TimeT) -> TimeT + Send + 'static) {
    let count = Arc::new(AtomicU32::new(0));
    let counter = count.clone();
    (count, move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
        returns
    })
}

#[test]
fn repeating_timer_fires_at_its_interval() {
    let scheduler = threaded();
    let (count, callback) = counter(100);
    scheduler.add_timer(100, callback).unwrap();

    thread::sleep(Duration::from_millis(550));
    let fired = count.load(Ordering::SeqCst);
    scheduler.shutdown();

    assert!((5..=6).contains(&fired), "fired {fired} times");
}

#[test]
fn stopping_callback_leaves_store_empty() {
    let scheduler = threaded();
    let (count, callback) = counter(0);
    let id = scheduler.add_timer(50, callback).unwrap();

    thread::sleep(Duration::from_millis(200));
    assert_eq!(1, count.load(Ordering::SeqCst));
    assert_eq!(0, scheduler.timer_count());
    assert!(!scheduler.remove_timer(&id));
}

#[test]
fn returned_interval_takes_over() {
    let scheduler = threaded();
    let (tx, rx) = mpsc::channel();
    let started = Instant::now();
    scheduler
        .add_timer(50, move |_| {
            let _ = tx.send(started.elapsed());
            300
        })
        .unwrap();

    let first = rx.recv_timeout(Duration::from_secs(2)).unwrap();
    let second = rx.recv_timeout(Duration::from_secs(2)).unwrap();
    scheduler.shutdown();

    let gap = second - first;
    assert!(gap >= Duration::from_millis(280), "gap {gap:?}");
}

#[test]
fn removed_timer_stops_firing() {
    let scheduler = threaded();
    let (count, callback) = counter(20);
    let id = scheduler.add_timer(20, callback).unwrap();

    thread::sleep(Duration::from_millis(100));
    assert!(scheduler.remove_timer(&id));
    let fired = count.load(Ordering::SeqCst);
    assert!(fired >= 1);

    thread::sleep(Duration::from_millis(100));
    assert_eq!(fired, count.load(Ordering::SeqCst));
}

#[test]
fn shutdown_is_prompt_with_nothing_scheduled() {
    let scheduler = threaded();
    thread::sleep(Duration::from_millis(20));

    let started = Instant::now();
    scheduler.shutdown();
    assert!(started.elapsed() < Duration::from_millis(100));
}

#[test]
fn shutdown_is_prompt_with_distant_timer() {
    let scheduler = threaded();
    scheduler.add_timer(3_600_000, |ms| ms).unwrap();
    thread::sleep(Duration::from_millis(20));

    let started = Instant::now();
    scheduler.shutdown();
    assert!(started.elapsed() < Duration::from_millis(100));
}

#[test]
fn new_timer_cuts_a_long_wait_short() {
    let scheduler = threaded();
    scheduler.add_timer(3_600_000, |ms| ms).unwrap();
    thread::sleep(Duration::from_millis(20));

    let (count, callback) = counter(0);
    scheduler.add_timer(30, callback).unwrap();
    thread::sleep(Duration::from_millis(200));
    assert_eq!(1, count.load(Ordering::SeqCst));
}

#[test]
fn callbacks_can_reschedule_each_other() {
    let scheduler = threaded();
    let spawned = Arc::new(AtomicU32::new(0));

    let handle = scheduler.clone();
    let counter = spawned.clone();
    scheduler
        .add_timer(20, move |_| {
            let counter = counter.clone();
            handle
                .add_timer(20, move |_| {
                    counter.fetch_add(1, Ordering::SeqCst);
                    0
                })
                .unwrap();
            0
        })
        .unwrap();

    thread::sleep(Duration::from_millis(200));
    assert_eq!(1, spawned.load(Ordering::SeqCst));
    assert_eq!(0, scheduler.timer_count());
}

#[test]
fn concurrent_add_and_remove_stay_consistent() {
    const THREADS: usize = 8;
    const PER_THREAD: usize = 200;

    let scheduler = threaded();
    let kept: Arc<Mutex<Vec<TimerId>>> = Arc::default();

    let workers: Vec<_> = (0..THREADS)
        .map(|_| {
            let scheduler = scheduler.clone();
            let kept = kept.clone();
            thread::spawn(move || {
                for i in 0..PER_THREAD {
                    let id = scheduler.add_timer(10, |ms| ms).unwrap();
                    if i % 2 == 0 {
                        assert!(scheduler.remove_timer(&id));
                    } else {
                        kept.lock().push(id);
                    }
                }
            })
        })
        .collect();

    for worker in workers {
        worker.join().unwrap();
    }

    let kept = kept.lock();
    assert_eq!(THREADS * PER_THREAD / 2, scheduler.timer_count());

    let mut unique = kept.clone();
    unique.sort_by_key(|id| id.uuid());
    unique.dedup();
    assert_eq!(kept.len(), unique.len());

    for id in kept.iter() {
        assert!(scheduler.remove_timer(id));
    }
    assert_eq!(0, scheduler.timer_count());
}

#[test]
fn legacy_mode_uses_alarm_thread() {
    let scheduler = TimerScheduler::new(SchedulerConfig::default());
    scheduler.init(false).unwrap();
    assert!(matches!(
        scheduler.add_timer(100, |ms| ms),
        Err(TimerError::NotSupported)
    ));

    let ticks = Arc::new(AtomicU32::new(0));
    let counter = ticks.clone();
    scheduler
        .set_legacy_alarm(30, move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();

    thread::sleep(Duration::from_millis(200));
    scheduler.shutdown();
    let fired = ticks.load(Ordering::SeqCst);
    assert!(fired >= 3, "fired {fired} times");

    thread::sleep(Duration::from_millis(100));
    assert_eq!(fired, ticks.load(Ordering::SeqCst));
}

#[test]
fn threaded_legacy_alarm_repeats() {
    let scheduler = threaded();
    let ticks = Arc::new(AtomicU32::new(0));
    let counter = ticks.clone();
    scheduler
        .set_legacy_alarm(30, move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();

    thread::sleep(Duration::from_millis(200));
    scheduler.set_legacy_alarm(0, |_| {}).unwrap();
    assert!(ticks.load(Ordering::SeqCst) >= 3);
    assert_eq!(0, scheduler.timer_count());
}
