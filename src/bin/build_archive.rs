//! Rebuild the market archive (`store/markets.json`) from live chain data.
//!
//! Usage:
//!   cargo run --bin build_archive
//!   cargo run --bin build_archive -- --chain arbitrum --config gmxwatch.toml

use anyhow::{Context, Result};
use gmxwatch::markets::MarketSource;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("failed to install rustls crypto provider");

    let _ = dotenvy::dotenv();

    let args: Vec<String> = std::env::args().collect();
    let config = gmxwatch::config_from_args(&args)?;
    gmxwatch::init_tracing(&config.logging);

    let source = MarketSource::new(&config, reqwest::Client::new());
    let registry = source
        .refresh_and_persist()
        .await
        .context("building market archive")?;

    println!("=== {} markets on {} ===", registry.len(), config.chain.name);
    for market in registry.iter() {
        println!(
            "{}  {:<28} synthetic={}",
            market.market_address, market.symbol, market.is_synthetic
        );
    }
    info!(path = %source.archive_path().display(), "archive ready");

    Ok(())
}
