//! Relative "time ago" labels kept fresh by one shared ticking clock.
//!
//! Labels hold themselves in a [`BroadcastRegistry`] only weakly: dropping a
//! [`DateLabel`] is all it takes to stop its refreshes.

pub mod config;
pub mod errors;
pub mod label;
pub mod logging;
pub mod registry;
pub mod runner;
pub mod scheduler;
pub mod utils;

pub use label::{AttributedText, DateLabel, LabelText, TextSink};
pub use registry::{BroadcastRegistry, Handle, Subscriber};
pub use scheduler::{ManualScheduler, Scheduler, TokioScheduler};
