//! Token directory: the canonical GMX token list for one chain.

use crate::error::{LookupMiss, TransportError};
use alloy::primitives::Address;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use tracing::info;

/// One entry of the `/tokens` response. Fields we don't interpret are kept
/// verbatim in `extra` so archived metadata is a faithful copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenInfo {
    pub address: Address,
    pub symbol: String,
    pub decimals: u8,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TokenInfo {
    pub fn new(address: Address, symbol: impl Into<String>, decimals: u8) -> Self {
        Self {
            address,
            symbol: symbol.into(),
            decimals,
            extra: Map::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokensResponse {
    tokens: Vec<TokenInfo>,
}

/// Address-keyed, read-only view of the token list.
#[derive(Debug, Clone, Default)]
pub struct TokenDirectory {
    by_address: HashMap<Address, TokenInfo>,
}

impl TokenDirectory {
    /// Fetch `{api_base}/tokens`. A failed request or non-2xx status is an
    /// error, never an empty directory.
    pub async fn fetch(http: &Client, api_base: &str) -> Result<Self, TransportError> {
        let url = format!("{}/tokens", api_base);
        let resp: TokensResponse = super::get_json(http, &url).await?;
        let directory = Self::from_tokens(resp.tokens);
        info!(tokens = directory.len(), "token directory loaded");
        Ok(directory)
    }

    pub fn from_tokens(tokens: impl IntoIterator<Item = TokenInfo>) -> Self {
        Self {
            by_address: tokens.into_iter().map(|t| (t.address, t)).collect(),
        }
    }

    pub fn get(&self, address: &Address) -> Result<&TokenInfo, LookupMiss> {
        self.by_address
            .get(address)
            .ok_or(LookupMiss::token(*address))
    }

    pub fn symbol(&self, address: &Address) -> Result<&str, LookupMiss> {
        self.get(address).map(|t| t.symbol.as_str())
    }

    pub fn decimals(&self, address: &Address) -> Result<u8, LookupMiss> {
        self.get(address).map(|t| t.decimals)
    }

    pub fn len(&self) -> usize {
        self.by_address.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_address.is_empty()
    }
}
