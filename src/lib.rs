//! GMX v2 market discovery and live position monitoring.
//!
//! Shared by the monitor binary and `build_archive`.

pub mod config;
pub mod error;
pub mod infra;
pub mod markets;
pub mod notify;
pub mod onchain;

use config::{Config, LoggingConfig};
use std::path::Path;

const DEFAULT_CONFIG_PATH: &str = "gmxwatch.toml";

/// Resolve config from `--config <path>` (default `gmxwatch.toml` if it
/// exists, else env only) and apply `--chain <name>`.
pub fn config_from_args(args: &[String]) -> Result<Config, config::ConfigError> {
    let flag = |name: &str| {
        args.iter()
            .position(|a| a == name)
            .and_then(|i| args.get(i + 1))
            .map(String::as_str)
    };

    let config = match flag("--config") {
        Some(path) => Config::load(Path::new(path))?,
        None if Path::new(DEFAULT_CONFIG_PATH).exists() => Config::load(Path::new(DEFAULT_CONFIG_PATH))?,
        None => Config::from_env(),
    };

    Ok(match flag("--chain") {
        Some(chain) => config.with_chain(chain),
        None => config,
    })
}

/// Install the tracing subscriber. `RUST_LOG` overrides the configured level.
pub fn init_tracing(logging: &LoggingConfig) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&logging.level));

    if logging.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .init();
    }
}
