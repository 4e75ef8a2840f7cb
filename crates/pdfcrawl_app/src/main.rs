mod cli;
mod config;
mod driver;

use anyhow::{Context, Result};
use clap::Parser;
use engine_logging::{engine_info, LogDestination};

use crate::cli::Args;

fn main() -> Result<()> {
    let args = Args::parse();
    engine_logging::initialize(
        LogDestination::Both(args.log_file.clone()),
        args.log_level(),
    );

    let mut config = config::load_config(args.config.as_deref())?;
    args.apply_overrides(&mut config);
    config.validate().map_err(config::ConfigLoadError::from)?;
    engine_info!("Starting crawl from {}", config.seed_url);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    let summary = runtime.block_on(driver::run(&config, args.discover_only))?;
    engine_info!("Run complete: {}", summary);
    Ok(())
}
