//! Boot: logging init and config load.

use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::conf::MinerConfig;
use crate::error::{MinerError, MinerResult};

/// Initialise the tracing / logging subsystem.
///
/// Logs go to stderr so stdout carries only the report.
pub fn init_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "miner=info,drain=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Load and validate the configuration.
///
/// The first command-line argument, when present, overrides the input path.
pub fn boot() -> MinerResult<MinerConfig> {
    info!("Starting drain miner v{}", env!("CARGO_PKG_VERSION"));

    let config = MinerConfig::load()?;
    let config = with_cli_input(config, std::env::args().nth(1));

    config.validate().map_err(|e| {
        error!("Invalid configuration: {}", e);
        MinerError::Config(e)
    })?;

    info!(
        "Loaded configuration: input={}, output={}, strip_prefix={}",
        config.input_path.as_deref().unwrap_or("stdin"),
        config.output,
        config.strip_prefix
    );
    info!(
        "Template engine: depth={}, sim_th={}, max_children={}, max_clusters={}",
        config.drain.depth,
        config.drain.similarity_threshold,
        config.drain.max_children,
        config.drain.max_clusters
    );

    Ok(config)
}

fn with_cli_input(mut config: MinerConfig, arg: Option<String>) -> MinerConfig {
    if let Some(path) = arg {
        config.input_path = Some(path);
    }
    config
}
