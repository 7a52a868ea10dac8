use super::{Scheduler, TickCallback};
use crate::utils::lock;
use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;
use tokio::runtime::{Builder, Handle, Runtime};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

/// Scheduler backed by a tokio interval task.
///
/// The task runs on the ambient runtime when there is one. Without a current
/// runtime (or when built with [`TokioScheduler::dedicated`]) a one-worker
/// background runtime is started on demand and kept for the scheduler's
/// lifetime.
pub struct TokioScheduler {
    callback: Mutex<Option<TickCallback>>,
    task: Mutex<Option<JoinHandle<()>>>,
    runtime: Mutex<Option<Runtime>>,
    dedicated: bool,
}

impl TokioScheduler {
    pub fn new() -> Self {
        Self::build(false)
    }
    /// Always ticks on a private runtime, independent of whichever runtime
    /// happens to be current when scheduling.
    pub fn dedicated() -> Self {
        Self::build(true)
    }
    fn build(dedicated: bool) -> Self {
        Self {
            callback: Mutex::new(None),
            task: Mutex::new(None),
            runtime: Mutex::new(None),
            dedicated,
        }
    }
    pub fn is_running(&self) -> bool {
        lock(&self.task)
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }
    fn spawn<F>(&self, future: F) -> Option<JoinHandle<()>>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        if !self.dedicated {
            if let Ok(handle) = Handle::try_current() {
                return Some(handle.spawn(future));
            }
        }
        let mut runtime = lock(&self.runtime);
        if runtime.is_none() {
            let built = Builder::new_multi_thread()
                .worker_threads(1)
                .thread_name("datelabel-ticker")
                .enable_time()
                .build();
            match built {
                Ok(it) => *runtime = Some(it),
                Err(err) => {
                    tracing::error!("Failed to start ticker runtime, periodic ticks disabled: {err}");
                    return None;
                }
            }
        }
        runtime.as_ref().map(|it| it.spawn(future))
    }
}

impl Default for TokioScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler for TokioScheduler {
    fn schedule_repeating(&self, interval: Duration, callback: TickCallback) {
        *lock(&self.callback) = Some(callback.clone());
        let task = self.spawn(async move {
            // the immediate tick comes from `fire_now`
            let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                callback();
            }
        });
        if let Some(previous) = std::mem::replace(&mut *lock(&self.task), task) {
            previous.abort();
        }
        tracing::debug!("Ticker scheduled every {:?}", interval);
    }
    fn fire_now(&self) {
        let callback = lock(&self.callback).clone();
        if let Some(callback) = callback {
            callback();
        }
    }
}

impl Drop for TokioScheduler {
    fn drop(&mut self) {
        if let Some(task) = lock(&self.task).take() {
            task.abort();
        }
        if let Some(runtime) = lock(&self.runtime).take() {
            runtime.shutdown_background();
        }
    }
}
