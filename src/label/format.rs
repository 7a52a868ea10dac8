use super::text::{AttributedText, LabelText};
use chrono::{DateTime, Utc};
use std::sync::Arc;

pub type TextFormat = Arc<dyn Fn(DateTime<Utc>) -> String + Send + Sync>;
pub type AttributedFormat = Arc<dyn Fn(DateTime<Utc>) -> AttributedText + Send + Sync>;
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Default rendering: whole seconds between `date` and `now`, in either
/// direction, e.g. `"42s ago"`.
pub fn seconds_ago(date: DateTime<Utc>, now: DateTime<Utc>) -> String {
    format!("{}s ago", (now - date).num_seconds().abs())
}

/// Resolves the text for `date`. The attributed format wins over the plain one,
/// and without any the default is used.
pub(crate) fn render(
    date: Option<DateTime<Utc>>,
    now: impl FnOnce() -> DateTime<Utc>,
    text_format: Option<&TextFormat>,
    attributed_format: Option<&AttributedFormat>,
) -> Option<LabelText> {
    let date = date?;
    let text = match (attributed_format, text_format) {
        (Some(format), _) => LabelText::Attributed(format(date)),
        (None, Some(format)) => LabelText::Plain(format(date)),
        (None, None) => LabelText::Plain(seconds_ago(date, now())),
    };
    Some(text)
}
