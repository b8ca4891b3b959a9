//! Market registry operations: live refresh, archive load, persist.

use super::{archive, decode_markets, reader, MarketRegistry, RawMarket};
use crate::config::Config;
use crate::error::{RegistryError, TransportError};
use crate::infra::{QuotedTokens, TokenDirectory};
use alloy::providers::{Provider, ProviderBuilder};
use chrono::Utc;
use reqwest::Client;
use std::path::PathBuf;
use tracing::{info, warn};

/// Builds `MarketRegistry` snapshots for one chain.
pub struct MarketSource<'a> {
    config: &'a Config,
    http: Client,
}

impl<'a> MarketSource<'a> {
    pub fn new(config: &'a Config, http: Client) -> Self {
        Self { config, http }
    }

    pub fn archive_path(&self) -> PathBuf {
        self.config.archive_path()
    }

    /// Call the reader contract over HTTP RPC.
    pub async fn fetch_raw_markets(&self) -> Result<Vec<RawMarket>, RegistryError> {
        let reader_address = self.config.reader()?;
        let data_store = self.config.data_store()?;
        let rpc_url = self.config.require_rpc_url()?;

        let provider = ProviderBuilder::new()
            .connect(rpc_url)
            .await
            .map_err(TransportError::from)?;
        let chain_id = provider
            .get_chain_id()
            .await
            .map_err(TransportError::from)?;
        if self.config.chain.chain_id != 0 && chain_id != self.config.chain.chain_id {
            warn!(
                expected = self.config.chain.chain_id,
                actual = chain_id,
                "rpc endpoint reports a different chain id"
            );
        }

        Ok(reader::fetch_raw_markets(&provider, reader_address, data_store).await?)
    }

    /// Fetch everything live and decode. Nothing is written.
    pub async fn refresh(&self) -> Result<MarketRegistry, RegistryError> {
        let api_base = self.config.api_base();
        let tokens = TokenDirectory::fetch(&self.http, &api_base).await?;
        let quoted = QuotedTokens::fetch(&self.http, &api_base).await?;
        let raw = self.fetch_raw_markets().await?;

        let markets = decode_markets(&raw, &tokens, &quoted);
        info!(
            chain = %self.config.chain.name,
            raw = raw.len(),
            decoded = markets.len(),
            "market registry refreshed"
        );
        Ok(MarketRegistry::new(markets))
    }

    /// `use_archive = false`: live refresh, nothing written.
    /// `use_archive = true`: the archive as written; missing archive is an error.
    pub async fn load_or_refresh(&self, use_archive: bool) -> Result<MarketRegistry, RegistryError> {
        if !use_archive {
            return self.refresh().await;
        }
        let snapshot = archive::read_archive(&self.archive_path(), Utc::now())?;
        info!(
            markets = snapshot.markets.len(),
            age_days = snapshot.age.num_days(),
            "market registry loaded from archive"
        );
        Ok(MarketRegistry::new(snapshot.markets))
    }

    /// Live refresh, then overwrite the archive with the result.
    pub async fn refresh_and_persist(&self) -> Result<MarketRegistry, RegistryError> {
        info!(path = %self.archive_path().display(), "creating market archive");
        let registry = self.refresh().await?;
        archive::write_archive(&self.archive_path(), registry.as_map())?;
        Ok(registry)
    }
}
