//! Self-refreshing "time ago" label.
//!
//! A [`DateLabel`] registers with a [`BroadcastRegistry`] when built and
//! deregisters when dropped, so its owner never deals with timers.

use crate::registry::{BroadcastRegistry, Handle, Subscriber};
use crate::utils::lock;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

mod format;
mod text;

pub use format::{AttributedFormat, Clock, TextFormat, seconds_ago};
pub use text::{AttributedText, Attributes, LabelText, TextSink};

#[derive(Default, Clone)]
struct Inputs {
    date: Option<DateTime<Utc>>,
    text_format: Option<TextFormat>,
    attributed_format: Option<AttributedFormat>,
    clock: Option<Clock>,
}

struct LabelState {
    inputs: Mutex<Inputs>,
    /// Held across render and sink write so writes land in input order.
    write: Mutex<()>,
    retired: AtomicBool,
    sink: Box<dyn TextSink>,
}

impl LabelState {
    fn update_text(&self) {
        let _write = lock(&self.write);
        self.write_text();
    }
    fn update<F: FnOnce(&mut Inputs)>(&self, f: F) {
        let _write = lock(&self.write);
        f(&mut *lock(&self.inputs));
        self.write_text();
    }
    /// Stops all further sink writes, waiting out one in flight.
    fn retire(&self) {
        let _write = lock(&self.write);
        self.retired.store(true, Ordering::Release);
    }
    // caller holds `write`; user closures run without the inputs lock
    fn write_text(&self) {
        if self.retired.load(Ordering::Acquire) {
            return;
        }
        let inputs = lock(&self.inputs).clone();
        let now = || inputs.clock.as_ref().map_or_else(Utc::now, |clock| clock());
        let text = format::render(
            inputs.date,
            now,
            inputs.text_format.as_ref(),
            inputs.attributed_format.as_ref(),
        );
        self.sink.set_text(text);
    }
}

impl Subscriber for LabelState {
    fn on_tick(&self) {
        self.update_text();
    }
}

pub struct DateLabel {
    state: Arc<LabelState>,
    handle: Handle,
    registry: Arc<BroadcastRegistry>,
}

impl DateLabel {
    /// Label refreshed by the process-wide registry.
    pub fn new(sink: impl TextSink + 'static) -> Self {
        Self::with_registry(BroadcastRegistry::shared(), sink)
    }

    pub fn with_registry(registry: &Arc<BroadcastRegistry>, sink: impl TextSink + 'static) -> Self {
        let state = Arc::new(LabelState {
            inputs: Mutex::new(Inputs::default()),
            write: Mutex::new(()),
            retired: AtomicBool::new(false),
            sink: Box::new(sink),
        });
        let handle = registry.register(&state);
        Self {
            state,
            handle,
            registry: registry.clone(),
        }
    }

    /// Replaces the time source used by the default format.
    pub fn with_clock(self, clock: impl Fn() -> DateTime<Utc> + Send + Sync + 'static) -> Self {
        let clock: Clock = Arc::new(clock);
        self.state.update(|inputs| inputs.clock = Some(clock));
        self
    }

    pub fn date(&self) -> Option<DateTime<Utc>> {
        lock(&self.state.inputs).date
    }

    pub fn set_date(&self, date: Option<DateTime<Utc>>) {
        self.state.update(|inputs| inputs.date = date);
    }

    pub fn set_text_format(&self, format: impl Fn(DateTime<Utc>) -> String + Send + Sync + 'static) {
        let format: TextFormat = Arc::new(format);
        self.state.update(|inputs| inputs.text_format = Some(format));
    }

    /// Takes precedence over the plain text format while set.
    pub fn set_attributed_format(
        &self,
        format: impl Fn(DateTime<Utc>) -> AttributedText + Send + Sync + 'static,
    ) {
        let format: AttributedFormat = Arc::new(format);
        self.state.update(|inputs| inputs.attributed_format = Some(format));
    }

    pub fn clear_formats(&self) {
        self.state.update(|inputs| {
            inputs.text_format = None;
            inputs.attributed_format = None;
        });
    }

    pub fn refresh(&self) {
        self.state.update_text();
    }

    pub fn handle(&self) -> &Handle {
        &self.handle
    }
}

impl Drop for DateLabel {
    fn drop(&mut self) {
        self.registry.deregister(&self.handle);
        self.state.retire();
    }
}
