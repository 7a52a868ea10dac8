use crate::logging::format::Formatter;
use tracing::Level;
use tracing_subscriber::Layer;
use tracing_subscriber::{filter, layer::SubscriberExt, util::SubscriberInitExt};

mod format;

/// Installs the global subscriber: crate events at `level`, everything else
/// from WARN up.
pub fn registry_logs(level: Level, colored: bool) -> anyhow::Result<()> {
    let crate_layer = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .event_format(Formatter::new(colored))
        .with_filter(filter::filter_fn(move |metadata| {
            is_crate_target(metadata.target()) && metadata.level() <= &level
        }));
    let general_layer = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .event_format(Formatter::new(colored))
        .with_filter(filter::filter_fn(|metadata| {
            !is_crate_target(metadata.target()) && metadata.level() <= &Level::WARN
        }));
    tracing_subscriber::registry()
        .with(crate_layer)
        .with(general_layer)
        .with(tracing_error::ErrorLayer::default())
        .try_init()?;
    Ok(())
}

fn is_crate_target(target: &str) -> bool {
    target == "datelabel" || target.starts_with("datelabel::")
}
