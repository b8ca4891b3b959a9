//! GMX v2 market registry.
//!
//! Markets are enumerated from the on-chain Reader contract as raw
//! `(marketToken, indexToken, longToken, shortToken)` tuples and decoded
//! into keyed `Market` records using the token directory and the signed
//! price feed. The decoded set can be archived to `store/markets.json` so
//! the monitor can start without touching the chain.
//!
//! - `reader`: contract binding and the paginated `getMarkets` call
//! - `decode`: tuple → `Market` rules (liveness gate, swap markets,
//!   single-side suffix, legacy overrides)
//! - `archive`: snapshot read/write with staleness check
//! - `source`: the operations tying the above together

pub mod archive;
mod checksum;
pub mod decode;
pub mod reader;
pub mod source;

pub use decode::decode_markets;
pub use source::MarketSource;

use crate::error::LookupMiss;
use crate::infra::TokenInfo;
use alloy::primitives::Address;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// One `getMarkets` entry before any enrichment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawMarket {
    pub market_token: Address,
    pub index_token: Address,
    pub long_token: Address,
    pub short_token: Address,
}

/// Token metadata as stored on a market. Usually a copy of a directory
/// entry; swap markets get a synthetic record carrying only a symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenMetadata {
    pub symbol: String,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "checksum::opt_address"
    )]
    pub address: Option<Address>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decimals: Option<u8>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TokenMetadata {
    pub fn synthetic(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            address: None,
            decimals: None,
            extra: Map::new(),
        }
    }
}

impl From<&TokenInfo> for TokenMetadata {
    fn from(t: &TokenInfo) -> Self {
        Self {
            symbol: t.symbol.clone(),
            address: Some(t.address),
            decimals: Some(t.decimals),
            extra: t.extra.clone(),
        }
    }
}

/// A tradable GMX market. Field names on the wire match the archive format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Market {
    #[serde(rename = "gmx_market_address", serialize_with = "checksum::address")]
    pub market_address: Address,
    #[serde(rename = "market_symbol")]
    pub symbol: String,
    /// Zero address for swap-only markets.
    #[serde(serialize_with = "checksum::address")]
    pub index_token_address: Address,
    #[serde(rename = "market_metadata")]
    pub index_token_metadata: TokenMetadata,
    pub long_token_metadata: TokenMetadata,
    #[serde(serialize_with = "checksum::address")]
    pub long_token_address: Address,
    pub short_token_metadata: TokenMetadata,
    #[serde(serialize_with = "checksum::address")]
    pub short_token_address: Address,
    #[serde(default)]
    pub is_synthetic: bool,
}

impl Market {
    pub fn is_swap_only(&self) -> bool {
        self.index_token_address == Address::ZERO
    }
}

/// Immutable keyed snapshot of decoded markets. Replaced wholesale on refresh.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarketRegistry {
    markets: BTreeMap<Address, Market>,
}

impl MarketRegistry {
    pub fn new(markets: BTreeMap<Address, Market>) -> Self {
        Self { markets }
    }

    pub fn get(&self, market: &Address) -> Result<&Market, LookupMiss> {
        self.markets.get(market).ok_or(LookupMiss::market(*market))
    }

    pub fn symbol_of(&self, market: &Address) -> Result<&str, LookupMiss> {
        self.get(market).map(|m| m.symbol.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Market> {
        self.markets.values()
    }

    pub fn len(&self) -> usize {
        self.markets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markets.is_empty()
    }

    pub fn as_map(&self) -> &BTreeMap<Address, Market> {
        &self.markets
    }
}
