use std::collections::BTreeMap;

pub type Attributes = BTreeMap<String, String>;

/// Text made of runs, each carrying free-form attributes for the host to
/// interpret.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributedText {
    runs: Vec<(String, Attributes)>,
}

impl AttributedText {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn push(&mut self, text: impl Into<String>, attributes: Attributes) {
        self.runs.push((text.into(), attributes));
    }
    pub fn with_run(mut self, text: impl Into<String>, attributes: Attributes) -> Self {
        self.push(text, attributes);
        self
    }
    pub fn runs(&self) -> &[(String, Attributes)] {
        &self.runs
    }
    /// Concatenation of every run, attributes dropped.
    pub fn plain(&self) -> String {
        self.runs.iter().map(|(text, _)| text.as_str()).collect()
    }
}

/// What a label pushes into its sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LabelText {
    Plain(String),
    Attributed(AttributedText),
}

impl LabelText {
    pub fn plain(&self) -> String {
        match self {
            LabelText::Plain(text) => text.clone(),
            LabelText::Attributed(text) => text.plain(),
        }
    }
}

/// Rendering surface of a label. `None` clears the displayed text.
pub trait TextSink: Send + Sync {
    fn set_text(&self, text: Option<LabelText>);
}

impl<T: TextSink + ?Sized> TextSink for std::sync::Arc<T> {
    fn set_text(&self, text: Option<LabelText>) {
        (**self).set_text(text)
    }
}
