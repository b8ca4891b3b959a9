//! Raw reader tuples → `Market` records.

use super::{Market, RawMarket, TokenMetadata};
use crate::error::LookupMiss;
use crate::infra::{QuotedTokens, TokenDirectory};
use alloy::primitives::{address, Address};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

const SINGLE_SIDE_SUFFIX: &str = " (Single Side)";

/// A fixed correction for one specific market, applied after decoding.
#[derive(Debug, Clone, Copy)]
pub struct MarketOverride {
    pub market: Address,
    pub symbol: &'static str,
    pub index_token: Address,
}

/// Known data corrections, keyed by market address.
pub const MARKET_OVERRIDES: &[MarketOverride] = &[
    // wstETH market was listed against a placeholder index token.
    MarketOverride {
        market: address!("0x0Cf1fb4d1FF67A3D8Ca92c9d6643F8F9be8e03E5"),
        symbol: "wstETH",
        index_token: address!("0x5979D7b546E38E414F7E9822514be443A4800529"),
    },
];

/// Decode every raw tuple into a keyed set of markets.
///
/// Tuples whose index token is not quoted (and not the zero sentinel) are
/// skipped, as are tuples whose long/short tokens are unknown. Neither
/// fails the batch.
pub fn decode_markets(
    raw_markets: &[RawMarket],
    tokens: &TokenDirectory,
    quoted: &QuotedTokens,
) -> BTreeMap<Address, Market> {
    let mut decoded = BTreeMap::new();

    for raw in raw_markets {
        if !is_live(&raw.index_token, quoted) {
            info!(
                market = %raw.market_token,
                index_token = %raw.index_token,
                "index token not quoted yet, market skipped"
            );
            continue;
        }

        let mut market = match decode_market(raw, tokens) {
            Ok(m) => m,
            Err(miss) => {
                warn!(market = %raw.market_token, error = %miss, "market skipped");
                continue;
            }
        };
        apply_overrides(&mut market, MARKET_OVERRIDES);

        info!(market = %market.market_address, symbol = %market.symbol, "processed market");
        decoded.insert(market.market_address, market);
    }

    decoded
}

fn is_live(index_token: &Address, quoted: &QuotedTokens) -> bool {
    *index_token == Address::ZERO || quoted.is_quoted(index_token)
}

fn decode_market(raw: &RawMarket, tokens: &TokenDirectory) -> Result<Market, LookupMiss> {
    let long = tokens.get(&raw.long_token)?;
    let short = tokens.get(&raw.short_token)?;

    // An index token the directory doesn't know marks a swap-only market.
    let (symbol, index_token_metadata) = match tokens.get(&raw.index_token) {
        Ok(index) => {
            let mut symbol = index.symbol.clone();
            if raw.long_token == raw.short_token {
                symbol.push_str(SINGLE_SIDE_SUFFIX);
            }
            (symbol, TokenMetadata::from(index))
        }
        Err(_) => {
            let symbol = format!("SWAP {}-{}", long.symbol, short.symbol);
            debug!(market = %raw.market_token, symbol = %symbol, "swap market");
            (symbol.clone(), TokenMetadata::synthetic(symbol))
        }
    };

    Ok(Market {
        market_address: raw.market_token,
        symbol,
        index_token_address: raw.index_token,
        index_token_metadata,
        long_token_metadata: TokenMetadata::from(long),
        long_token_address: raw.long_token,
        short_token_metadata: TokenMetadata::from(short),
        short_token_address: raw.short_token,
        is_synthetic: raw.index_token != raw.long_token,
    })
}

fn apply_overrides(market: &mut Market, overrides: &[MarketOverride]) {
    if let Some(o) = overrides.iter().find(|o| o.market == market.market_address) {
        debug!(market = %market.market_address, symbol = o.symbol, "applying market override");
        market.symbol = o.symbol.to_string();
        market.index_token_address = o.index_token;
    }
}
