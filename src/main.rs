use datelabel::{config, logging, runner};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let path = config::parse_config_path(std::env::args().skip(1))?;
    let config = config::load(&path)?;
    logging::registry_logs(config.logs.level, config.logs.colored)?;
    runner::run_until_done(&config).await
}
