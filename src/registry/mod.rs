use crate::scheduler::{Scheduler, TickCallback, TokioScheduler};
use crate::utils::{WeakHandle, lock};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, LazyLock, Mutex, MutexGuard, OnceLock, Weak};
use std::time::Duration;

/// Default refresh period of the shared registry.
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(500);

static SHARED_INTERVAL: OnceLock<Duration> = OnceLock::new();
static SHARED_REGISTRY: LazyLock<Arc<BroadcastRegistry>> = LazyLock::new(|| {
    let interval = *SHARED_INTERVAL.get_or_init(|| DEFAULT_INTERVAL);
    BroadcastRegistry::new(Arc::new(TokioScheduler::dedicated()), interval)
});

/// Something that wants to be refreshed on every tick.
///
/// `on_tick` may be called redundantly and must not assume any minimum time
/// since the previous call.
pub trait Subscriber: Send + Sync {
    fn on_tick(&self);
}

/// Token returned by [`BroadcastRegistry::register`].
///
/// Removal is driven by the identity of the token itself, so keep the one you
/// got back rather than building a new one.
#[derive(Clone)]
pub struct Handle(Arc<WeakHandle<dyn Subscriber>>);

impl Handle {
    fn new(subscriber: Weak<dyn Subscriber>) -> Self {
        Self(Arc::new(WeakHandle::from_weak(subscriber)))
    }
    pub fn is_alive(&self) -> bool {
        !self.0.is_empty()
    }
    pub fn same_as(&self, other: &Handle) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
    fn subscriber(&self) -> Option<Arc<dyn Subscriber>> {
        self.0.get()
    }
}

impl fmt::Debug for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Handle").field(&self.0).finish()
    }
}

/// Ordered list of weakly held subscribers sharing one periodic clock.
///
/// The clock is started by the first registration and never stopped. Entries
/// whose subscriber died are skipped by ticks but stay in the list until their
/// token is deregistered.
pub struct BroadcastRegistry {
    handles: Mutex<Vec<Handle>>,
    scheduler: Arc<dyn Scheduler>,
    interval: Duration,
    started: AtomicBool,
    this: Weak<BroadcastRegistry>,
}

impl BroadcastRegistry {
    pub fn new(scheduler: Arc<dyn Scheduler>, interval: Duration) -> Arc<Self> {
        Arc::new_cyclic(|this| Self {
            handles: Mutex::new(Vec::new()),
            scheduler,
            interval,
            started: AtomicBool::new(false),
            this: this.clone(),
        })
    }

    /// The process-wide registry, created on first use and kept until exit.
    pub fn shared() -> &'static Arc<BroadcastRegistry> {
        &SHARED_REGISTRY
    }

    /// Sets the period of the shared registry. Only effective before the shared
    /// registry is first used; returns `false` once the period is fixed.
    pub fn configure_shared(interval: Duration) -> bool {
        SHARED_INTERVAL.set(interval).is_ok()
    }

    pub fn register<S>(&self, subscriber: &Arc<S>) -> Handle
    where
        S: Subscriber + 'static,
    {
        let subscriber: Arc<dyn Subscriber> = subscriber.clone();
        let handle = {
            let mut handles = self.handles();
            let existing = handles
                .iter()
                .find(|it| it.0.refers_to(&subscriber))
                .cloned();
            match existing {
                Some(handle) => {
                    tracing::debug!("Subscriber already registered, reusing its handle");
                    handle
                }
                None => {
                    let handle = Handle::new(Arc::downgrade(&subscriber));
                    handles.push(handle.clone());
                    tracing::debug!("Subscriber registered, total = {}", handles.len());
                    handle
                }
            }
        };
        // no lock may be held here: the first tick calls back into subscribers
        drop(subscriber);
        self.start();
        handle
    }

    pub fn deregister(&self, handle: &Handle) -> bool {
        let mut handles = self.handles();
        match handles.iter().position(|it| it.same_as(handle)) {
            Some(index) => {
                handles.remove(index);
                tracing::debug!("Subscriber deregistered, total = {}", handles.len());
                true
            }
            None => false,
        }
    }

    /// Notifies every live subscriber in registration order and returns how
    /// many were reached.
    pub fn tick(&self) -> usize {
        let snapshot = self.handles().clone();
        let mut notified = 0;
        for handle in &snapshot {
            if let Some(subscriber) = handle.subscriber() {
                subscriber.on_tick();
                notified += 1;
            }
        }
        tracing::trace!("Tick: notified = {}, total = {}", notified, snapshot.len());
        notified
    }

    pub fn len(&self) -> usize {
        self.handles().len()
    }
    pub fn is_empty(&self) -> bool {
        self.handles().is_empty()
    }
    pub fn live_count(&self) -> usize {
        self.handles().iter().filter(|it| it.is_alive()).count()
    }
    pub fn is_started(&self) -> bool {
        self.started.load(Ordering::Acquire)
    }
    pub fn interval(&self) -> Duration {
        self.interval
    }

    fn handles(&self) -> MutexGuard<'_, Vec<Handle>> {
        lock(&self.handles)
    }

    fn start(&self) {
        if self.started.swap(true, Ordering::AcqRel) {
            return;
        }
        let this = self.this.clone();
        let callback: TickCallback = Arc::new(move || {
            if let Some(registry) = this.upgrade() {
                registry.tick();
            }
        });
        self.scheduler.schedule_repeating(self.interval, callback);
        tracing::debug!("Broadcast clock started, interval = {:?}", self.interval);
        self.scheduler.fire_now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::ManualScheduler;

    type Journal = Arc<Mutex<Vec<&'static str>>>;

    struct Recorder {
        name: &'static str,
        journal: Journal,
    }

    impl Subscriber for Recorder {
        fn on_tick(&self) {
            self.journal.lock().unwrap().push(self.name);
        }
    }

    fn recorder(name: &'static str, journal: &Journal) -> Arc<Recorder> {
        Arc::new(Recorder {
            name,
            journal: journal.clone(),
        })
    }

    fn manual() -> (Arc<ManualScheduler>, Arc<BroadcastRegistry>) {
        let scheduler = Arc::new(ManualScheduler::new());
        let registry = BroadcastRegistry::new(scheduler.clone(), DEFAULT_INTERVAL);
        (scheduler, registry)
    }

    fn take(journal: &Journal) -> Vec<&'static str> {
        std::mem::take(&mut *journal.lock().unwrap())
    }

    #[test]
    fn test_first_register_fires_immediately() {
        let (scheduler, registry) = manual();
        let journal = Journal::default();
        let a = recorder("a", &journal);
        assert!(!registry.is_started());

        registry.register(&a);
        assert!(registry.is_started());
        assert_eq!(scheduler.interval(), Some(DEFAULT_INTERVAL));
        assert_eq!(take(&journal), vec!["a"]);
    }

    #[test]
    fn test_scheduler_started_once() {
        let (scheduler, registry) = manual();
        let journal = Journal::default();
        let a = recorder("a", &journal);
        let b = recorder("b", &journal);
        registry.register(&a);
        registry.register(&b);
        assert_eq!(scheduler.schedule_count(), 1);
        // only the first registration triggers the immediate fire
        assert_eq!(take(&journal), vec!["a"]);
    }

    #[test]
    fn test_ticks_in_registration_order() {
        let (scheduler, registry) = manual();
        let journal = Journal::default();
        let a = recorder("a", &journal);
        let b = recorder("b", &journal);
        let handle_a = registry.register(&a);
        registry.register(&b);
        take(&journal);

        assert!(scheduler.tick());
        assert_eq!(take(&journal), vec!["a", "b"]);
        assert!(scheduler.tick());
        assert_eq!(take(&journal), vec!["a", "b"]);

        assert!(registry.deregister(&handle_a));
        scheduler.tick();
        assert_eq!(take(&journal), vec!["b"]);
    }

    #[test]
    fn test_deregister_twice_is_noop() {
        let (_, registry) = manual();
        let journal = Journal::default();
        let a = recorder("a", &journal);
        let b = recorder("b", &journal);
        let handle = registry.register(&a);
        registry.register(&b);
        assert_eq!(registry.len(), 2);

        assert!(registry.deregister(&handle));
        assert_eq!(registry.len(), 1);
        assert!(!registry.deregister(&handle));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_deregister_dead_handle_removes_its_own_entry() {
        let (scheduler, registry) = manual();
        let journal = Journal::default();
        let a = recorder("a", &journal);
        let b = recorder("b", &journal);
        let c = recorder("c", &journal);
        let handle_a = registry.register(&a);
        let handle_b = registry.register(&b);
        registry.register(&c);
        drop(a);
        drop(b);
        assert!(!handle_a.is_alive());
        assert_eq!(registry.len(), 3);
        assert_eq!(registry.live_count(), 1);

        // both entries are empty now; only b's token may go away
        assert!(registry.deregister(&handle_b));
        assert_eq!(registry.len(), 2);
        assert!(!registry.deregister(&handle_b));
        assert!(registry.deregister(&handle_a));
        assert!(!registry.is_empty());
        assert_eq!(registry.len(), 1);

        take(&journal);
        scheduler.tick();
        assert_eq!(take(&journal), vec!["c"]);
    }

    #[test]
    fn test_dead_entries_are_skipped_not_compacted() {
        let (scheduler, registry) = manual();
        let journal = Journal::default();
        let a = recorder("a", &journal);
        let b = recorder("b", &journal);
        registry.register(&a);
        registry.register(&b);
        drop(a);
        take(&journal);

        assert_eq!(registry.tick(), 1);
        assert!(scheduler.tick());
        assert_eq!(take(&journal), vec!["b", "b"]);
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.live_count(), 1);
    }

    #[test]
    fn test_registry_does_not_own_subscribers() {
        let (_, registry) = manual();
        let journal = Journal::default();
        let a = recorder("a", &journal);
        registry.register(&a);
        assert_eq!(Arc::strong_count(&a), 1);
        let weak = Arc::downgrade(&a);
        drop(a);
        assert!(weak.upgrade().is_none());
    }

    #[test]
    fn test_register_same_subscriber_twice() {
        let (_, registry) = manual();
        let journal = Journal::default();
        let a = recorder("a", &journal);
        let first = registry.register(&a);
        let second = registry.register(&a);
        assert!(first.same_as(&second));
        assert_eq!(registry.len(), 1);
        assert!(registry.deregister(&second));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_live_count_follows_interleaved_operations() {
        let (_, registry) = manual();
        let journal = Journal::default();
        let mut alive: Vec<(Arc<Recorder>, Handle)> = Vec::new();
        let mut orphans: Vec<Handle> = Vec::new();
        for round in 0..12 {
            let subscriber = recorder("x", &journal);
            let handle = registry.register(&subscriber);
            alive.push((subscriber, handle));
            match round % 4 {
                // drop without deregistering
                1 => {
                    let (_, handle) = alive.remove(0);
                    orphans.push(handle);
                }
                // proper teardown
                2 => {
                    let (subscriber, handle) = alive.remove(0);
                    registry.deregister(&handle);
                    drop(subscriber);
                }
                // late deregistration of a dead entry
                3 => {
                    if let Some(handle) = orphans.pop() {
                        registry.deregister(&handle);
                    }
                }
                _ => {}
            }
            assert_eq!(registry.tick(), alive.len());
            assert_eq!(registry.live_count(), alive.len());
            assert_eq!(registry.len(), alive.len() + orphans.len());
        }
    }

    struct Reentrant {
        registry: Arc<BroadcastRegistry>,
        child: Arc<Recorder>,
        own: Mutex<Option<Handle>>,
    }

    impl Subscriber for Reentrant {
        fn on_tick(&self) {
            self.registry.register(&self.child);
            if let Some(handle) = self.own.lock().unwrap().take() {
                self.registry.deregister(&handle);
            }
        }
    }

    #[test]
    fn test_reentrant_mutation_during_tick() {
        let (scheduler, registry) = manual();
        let journal = Journal::default();
        let parent = Arc::new(Reentrant {
            registry: registry.clone(),
            child: recorder("child", &journal),
            own: Mutex::new(None),
        });
        // the immediate fire already registers the child
        let handle = registry.register(&parent);
        assert_eq!(registry.len(), 2);
        *parent.own.lock().unwrap() = Some(handle);

        scheduler.tick();
        // parent removed itself mid-tick; child was in the snapshot
        assert_eq!(registry.len(), 1);
        assert_eq!(take(&journal), vec!["child"]);
        scheduler.tick();
        assert_eq!(take(&journal), vec!["child"]);
    }

    #[test]
    fn test_scheduler_callback_outliving_registry() {
        let (scheduler, registry) = manual();
        let journal = Journal::default();
        let a = recorder("a", &journal);
        registry.register(&a);
        drop(registry);
        take(&journal);
        assert!(scheduler.tick());
        assert!(take(&journal).is_empty());
    }
}
