use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Tick interval must be greater than zero")]
    InvalidInterval,

    #[error("Please specify configuration file argument. Usage: -c <config_file>")]
    MissingConfigArgument,

    #[error(
        "Configuration file not found or invalid, expected file path: {path:?}. \
        Please make sure that the configuration file exists and is a valid TOML file"
    )]
    ConfigNotFound { path: PathBuf },
}
