//! Live GMX position monitor.
//!
//! Loads the market archive (build it first with `build_archive`), fetches
//! the token directory, then prints an alert for every position increase
//! or decrease seen on the EventEmitter.
//!
//! Usage:
//!   cargo run --bin gmxwatch                       # arbitrum
//!   cargo run --bin gmxwatch -- --chain avalanche
//!
//! The process exits when the node drops the log filter; run it under a
//! supervisor that restarts it.

use anyhow::{Context, Result};
use gmxwatch::infra::TokenDirectory;
use gmxwatch::markets::MarketSource;
use gmxwatch::onchain::PositionMonitor;
use tokio::sync::mpsc;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    // Install rustls crypto provider before any TLS usage.
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("failed to install rustls crypto provider");

    let _ = dotenvy::dotenv();

    let args: Vec<String> = std::env::args().collect();
    let config = gmxwatch::config_from_args(&args)?;
    gmxwatch::init_tracing(&config.logging);

    info!(
        chain = %config.chain.name,
        chain_id = config.chain.chain_id,
        "gmxwatch v{} starting",
        env!("CARGO_PKG_VERSION")
    );

    // --- INIT ---
    let http = reqwest::Client::new();
    let markets = MarketSource::new(&config, http.clone())
        .load_or_refresh(true)
        .await
        .context("loading market archive (run build_archive first)")?;
    let tokens = TokenDirectory::fetch(&http, &config.api_base())
        .await
        .context("fetching token directory")?;

    // --- SUBSCRIBED / POLLING ---
    let (alert_tx, mut alert_rx) = mpsc::unbounded_channel();
    let monitor = PositionMonitor::new(&config, markets, tokens, alert_tx)?;
    let handle = monitor.start();

    while let Some(alert) = alert_rx.recv().await {
        println!("{}", alert.text);
    }

    match handle.await? {
        Ok(()) => Ok(()),
        Err(e) => {
            error!(error = %e, "position monitor stopped");
            Err(e.into())
        }
    }
}
