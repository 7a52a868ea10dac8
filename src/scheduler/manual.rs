use super::{Scheduler, TickCallback};
use crate::utils::lock;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Scheduler driven by the host's own event loop.
///
/// Nothing fires on its own: call [`ManualScheduler::tick`] whenever the loop
/// decides a period has passed.
#[derive(Default)]
pub struct ManualScheduler {
    callback: Mutex<Option<TickCallback>>,
    interval: Mutex<Option<Duration>>,
    schedule_count: AtomicUsize,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }
    /// Fires the installed callback, returns `false` if nothing is scheduled yet.
    pub fn tick(&self) -> bool {
        let callback = lock(&self.callback).clone();
        match callback {
            Some(callback) => {
                callback();
                true
            }
            None => false,
        }
    }
    pub fn interval(&self) -> Option<Duration> {
        *lock(&self.interval)
    }
    pub fn schedule_count(&self) -> usize {
        self.schedule_count.load(Ordering::Acquire)
    }
}

impl Scheduler for ManualScheduler {
    fn schedule_repeating(&self, interval: Duration, callback: TickCallback) {
        *lock(&self.interval) = Some(interval);
        *lock(&self.callback) = Some(callback);
        self.schedule_count.fetch_add(1, Ordering::AcqRel);
    }
    fn fire_now(&self) {
        self.tick();
    }
}
