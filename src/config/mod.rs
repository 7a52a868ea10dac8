use crate::errors::ConfigError;
use anyhow::Context;
use serde::Deserialize;
use std::path::{Path, PathBuf};

mod demo_config;
mod logs_config;
mod tick_config;

pub use demo_config::*;
pub use logs_config::*;
pub use tick_config::*;

#[derive(Deserialize, Debug, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub tick: TickConfig,
    #[serde(default)]
    pub logs: LogsConfig,
    #[serde(default)]
    pub demo: DemoConfig,
}

impl Config {
    pub fn from_toml(content: &str) -> anyhow::Result<Config> {
        let config: Config = toml::from_str(content).with_context(|| {
            "Error: Failed to parse configuration file.\n\
            Please check the file syntax is valid TOML syntax"
        })?;
        config.tick.parse_interval()?;
        Ok(config)
    }
}

/// Looks for `-c <path>` / `--config <path>` in `args`, program name excluded.
pub fn parse_config_path<I>(args: I) -> Result<PathBuf, ConfigError>
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        if arg == "-c" || arg == "--config" {
            return args
                .next()
                .map(PathBuf::from)
                .ok_or(ConfigError::MissingConfigArgument);
        }
    }
    Err(ConfigError::MissingConfigArgument)
}

pub fn load(path: &Path) -> anyhow::Result<Config> {
    if !path.is_file() {
        return Err(ConfigError::ConfigNotFound {
            path: path.to_path_buf(),
        }
        .into());
    }
    let content = std::fs::read_to_string(path).with_context(|| {
        "Error: Failed to read configuration file.\n\
        Please check the file path and file permissions, and make sure the file is valid accessible"
    })?;
    Config::from_toml(&content)
}
