use std::sync::Arc;
use std::time::Duration;

mod manual;
mod tokio_scheduler;

pub use manual::ManualScheduler;
pub use tokio_scheduler::TokioScheduler;

/// Callback invoked on every tick.
pub type TickCallback = Arc<dyn Fn() + Send + Sync + 'static>;

/// Periodic timer consumed by the registry.
///
/// `schedule_repeating` is called once per scheduler; `fire_now` runs the
/// installed callback synchronously and is a no-op before scheduling.
pub trait Scheduler: Send + Sync {
    fn schedule_repeating(&self, interval: Duration, callback: TickCallback);
    fn fire_now(&self);
}
