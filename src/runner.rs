use crate::config::{Config, DemoLabel};
use crate::label::{DateLabel, LabelText, TextSink};
use crate::registry::BroadcastRegistry;
use chrono::{DateTime, TimeDelta, Utc};
use tokio::{signal, task::JoinSet};
use tokio_util::sync::CancellationToken;

/// Prints every refresh of one label to stdout.
pub struct StdoutSink {
    name: String,
}

impl StdoutSink {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
    fn line(&self, text: Option<&LabelText>) -> String {
        match text {
            Some(text) => format!("{:>12} | {}", self.name, text.plain()),
            None => format!("{:>12} | -", self.name),
        }
    }
}

impl TextSink for StdoutSink {
    fn set_text(&self, text: Option<LabelText>) {
        println!("{}", self.line(text.as_ref()));
    }
}

fn label_date(now: DateTime<Utc>, label: &DemoLabel) -> DateTime<Utc> {
    TimeDelta::try_seconds(label.offset_secs)
        .and_then(|offset| now.checked_sub_signed(offset))
        .unwrap_or_else(|| {
            tracing::warn!(
                "Offset of label '{}' is out of range, using current time",
                label.name
            );
            now
        })
}

/// Builds the configured labels on the shared registry and keeps them alive
/// until the configured run time elapses or a shutdown signal arrives.
pub async fn run_until_done(config: &Config) -> anyhow::Result<()> {
    let interval = config.tick.parse_interval()?;
    if !BroadcastRegistry::configure_shared(interval) {
        tracing::warn!("Shared registry already configured, ignoring interval {:?}", interval);
    }
    let now = Utc::now();
    let labels = config
        .demo
        .labels
        .iter()
        .map(|it| {
            let label = DateLabel::new(StdoutSink::new(&it.name));
            label.set_date(Some(label_date(now, it)));
            label
        })
        .collect::<Vec<_>>();
    tracing::info!(
        "{} labels refreshing every {:?}",
        labels.len(),
        BroadcastRegistry::shared().interval()
    );

    let mut join_set: JoinSet<anyhow::Result<()>> = JoinSet::new();
    let shutdown_signal = CancellationToken::new();
    // register ctrl+c signal
    {
        let shutdown_signal = shutdown_signal.clone();
        join_set.spawn(async move {
            signal::ctrl_c().await?;
            tracing::debug!("Received Ctrl+C, shutting down");
            shutdown_signal.cancel();
            Ok::<_, anyhow::Error>(())
        });
    }
    #[cfg(unix)]
    {
        let shutdown_signal = shutdown_signal.clone();
        join_set.spawn(async move {
            let mut sigterm = signal::unix::signal(signal::unix::SignalKind::terminate())?;
            sigterm.recv().await;
            tracing::debug!("Received SIGTERM signal, start terminating");
            shutdown_signal.cancel();
            Ok::<_, anyhow::Error>(())
        });
    }
    if let Some(run_for) = config.demo.run_for() {
        let shutdown_signal = shutdown_signal.clone();
        join_set.spawn(async move {
            tokio::time::sleep(run_for).await;
            tracing::debug!("Run time of {:?} elapsed", run_for);
            shutdown_signal.cancel();
            Ok::<_, anyhow::Error>(())
        });
    }
    while let Some(r) = join_set.join_next().await {
        if shutdown_signal.is_cancelled() {
            join_set.shutdown().await;
            break;
        }
        match r {
            Ok(Ok(_)) => (),
            Ok(Err(e)) => return Err(e),
            Err(e) => anyhow::bail!("Internal error in spawn: {e}"),
        }
    }
    drop(labels);
    tracing::info!(
        "Stopped, {} entries left in registry",
        BroadcastRegistry::shared().len()
    );
    Ok(())
}
