//! Price liveness: which tokens the GMX oracle is currently quoting.
//!
//! Only membership is consulted. A market whose index token has no signed
//! price is not live yet and is left out of the registry.

use crate::error::TransportError;
use alloy::primitives::Address;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashSet;
use tracing::info;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignedPrice {
    token_address: Address,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignedPricesResponse {
    signed_prices: Vec<SignedPrice>,
}

/// Snapshot of token addresses with a current signed price.
#[derive(Debug, Clone, Default)]
pub struct QuotedTokens {
    tokens: HashSet<Address>,
}

impl QuotedTokens {
    pub async fn fetch(http: &Client, api_base: &str) -> Result<Self, TransportError> {
        let url = format!("{}/signed_prices/latest", api_base);
        let resp: SignedPricesResponse = super::get_json(http, &url).await?;
        let quoted = Self::from_addresses(resp.signed_prices.into_iter().map(|p| p.token_address));
        info!(quoted = quoted.len(), "signed price snapshot loaded");
        Ok(quoted)
    }

    pub fn from_addresses(addresses: impl IntoIterator<Item = Address>) -> Self {
        Self {
            tokens: addresses.into_iter().collect(),
        }
    }

    pub fn is_quoted(&self, token: &Address) -> bool {
        self.tokens.contains(token)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}
