//! The binary entry point for the Halcyon backdrop engine.

use std::path::PathBuf;

use clap::Parser;
use halcyon_config::{CliArgs, Config};

fn main() {
    let args = CliArgs::parse();

    let config_dir = args
        .config
        .clone()
        .or_else(Config::default_config_dir)
        .unwrap_or_else(|| PathBuf::from("."));

    let mut config = match Config::load_or_create(&config_dir) {
        Ok(config) => config,
        Err(err) => {
            // Logging is not up yet; stderr is all we have.
            eprintln!("Failed to load config ({err}), using defaults");
            Config::default()
        }
    };
    config.apply_cli_overrides(&args);

    halcyon_log::init_logging(
        Some(&config_dir.join("logs")),
        cfg!(debug_assertions),
        Some(&config),
    );
    tracing::info!("Halcyon starting, config dir {}", config_dir.display());

    if let Err(err) = halcyon_app::run(config, config_dir) {
        tracing::error!("Event loop failed: {err}");
        std::process::exit(1);
    }
}
