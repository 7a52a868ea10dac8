use colored::Color;
use std::fmt;
use std::fmt::{Debug, Display, Write};
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;

/// `[12:00:01.250 DBG] dl::registry: Subscriber registered, total = 1`
pub(super) struct Formatter {
    use_colors: bool,
}

impl Formatter {
    pub(super) fn new(use_colors: bool) -> Self {
        Self { use_colors }
    }
}

impl<S, N> FormatEvent<S, N> for Formatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let meta = event.metadata();
        let now = chrono::Local::now().format("%X%.3f");
        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);
        let target = shorten_target(meta.target());
        let level = LevelLabel::new(meta.level(), self.use_colors);
        if self.use_colors {
            write!(
                writer,
                "[{} {}] {} {}",
                Painted(now, Color::BrightBlack),
                level,
                Painted(format!("{target}:"), Color::BrightBlack),
                visitor.message.trim_end()
            )?;
        } else {
            write!(
                writer,
                "[{} {}] {}: {}",
                now,
                level,
                target,
                visitor.message.trim_end()
            )?;
        }
        writeln!(writer)
    }
}

fn shorten_target(target: &str) -> String {
    match target.strip_prefix("datelabel") {
        Some(rest) => format!("dl{rest}"),
        None => target.to_string(),
    }
}

#[derive(Default)]
struct MessageVisitor {
    message: String,
}

impl Visit for MessageVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn Debug) {
        if field.name() == "message" {
            write!(self.message, "{:?} ", value).ok();
        } else {
            write!(self.message, "{}={:?} ", field.name(), value).ok();
        }
    }
}

struct LevelLabel {
    label: &'static str,
    color: Option<Color>,
}

impl LevelLabel {
    fn new(level: &Level, use_colors: bool) -> Self {
        let (label, color) = match *level {
            Level::ERROR => ("ERR", Color::BrightRed),
            Level::WARN => ("WRN", Color::BrightYellow),
            Level::INFO => ("INF", Color::BrightBlue),
            Level::DEBUG => ("DBG", Color::BrightMagenta),
            Level::TRACE => ("TRC", Color::BrightWhite),
        };
        Self {
            label,
            color: use_colors.then_some(color),
        }
    }
}

impl Display for LevelLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.color {
            Some(color) => Painted(self.label, color).fmt(f),
            None => f.write_str(self.label),
        }
    }
}

struct Painted<T>(T, Color);

impl<T: Display> Display for Painted<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\x1B[{}m{}\x1B[0m", self.1.to_fg_str(), self.0)
    }
}
