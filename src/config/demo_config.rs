use serde::Deserialize;
use std::time::Duration;

#[derive(Deserialize, Debug, Clone, Default)]
pub struct DemoConfig {
    /// Absent means run until Ctrl+C.
    pub run_secs: Option<u64>,
    #[serde(default)]
    pub labels: Vec<DemoLabel>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct DemoLabel {
    pub name: String,
    /// How long before startup the label's date lies.
    #[serde(default)]
    pub offset_secs: i64,
}

impl DemoConfig {
    pub fn run_for(&self) -> Option<Duration> {
        self.run_secs.map(Duration::from_secs)
    }
}
