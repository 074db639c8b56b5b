mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;
use tracing::warn;

use autoreg_core::AppConfig;

use crate::cli::{Cli, Commands};

fn main() -> Result<()> {
    // One scheduling loop; a small runtime is plenty
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()?;

    runtime.block_on(async_main())
}

async fn async_main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let config_str = std::fs::read_to_string(&cli.config).unwrap_or_else(|_| {
        warn!(path = %cli.config, "config file not found, using defaults");
        include_str!("../config/default.toml").to_string()
    });
    let mut config = AppConfig::from_toml_str(&config_str)?;
    apply_env_overrides(&mut config);

    match cli.command {
        Commands::Run { json } => {
            commands::run::run(config, json).await?;
        }
        Commands::Resolve { url } => {
            commands::resolve::run(&config, &url);
        }
        Commands::Stats => {
            commands::stats::run(&config);
        }
    }

    Ok(())
}

fn apply_env_overrides(config: &mut AppConfig) {
    if let Ok(v) = std::env::var("AUTOREG_SPEED") {
        match v.parse::<u32>() {
            Ok(n) => config.registration.speed = n,
            Err(_) => warn!(value = %v, "ignoring invalid AUTOREG_SPEED"),
        }
    }
    if let Ok(v) = std::env::var("AUTOREG_MAX_RETRIES") {
        match v.parse::<u32>() {
            Ok(n) => config.registration.max_retries = n,
            Err(_) => warn!(value = %v, "ignoring invalid AUTOREG_MAX_RETRIES"),
        }
    }
    // Window bounds are validated when a run starts
    if let Ok(v) = std::env::var("AUTOREG_START_TIME") {
        config.registration.start_time = v;
    }
    if let Ok(v) = std::env::var("AUTOREG_END_TIME") {
        config.registration.end_time = v;
    }
}
