//! Reader contract binding.
//!
//! `getMarkets` is called with a fixed window of `[0, 100)`. Markets past
//! the 100th are not retrieved; a full page is logged as possible truncation.

use super::RawMarket;
use crate::error::TransportError;
use alloy::primitives::{Address, U256};
use alloy::providers::Provider;
use alloy::sol;
use tracing::{info, warn};

pub const MARKET_PAGE_START: u64 = 0;
pub const MARKET_PAGE_LIMIT: u64 = 100;

sol! {
    #[sol(rpc)]
    interface IReader {
        struct MarketProps {
            address marketToken;
            address indexToken;
            address longToken;
            address shortToken;
        }

        function getMarkets(address dataStore, uint256 start, uint256 end)
            external
            view
            returns (MarketProps[]);
    }
}

impl From<IReader::MarketProps> for RawMarket {
    fn from(p: IReader::MarketProps) -> Self {
        Self {
            market_token: p.marketToken,
            index_token: p.indexToken,
            long_token: p.longToken,
            short_token: p.shortToken,
        }
    }
}

/// Enumerate raw market tuples from the reader contract.
pub async fn fetch_raw_markets<P: Provider>(
    provider: &P,
    reader: Address,
    data_store: Address,
) -> Result<Vec<RawMarket>, TransportError> {
    let contract = IReader::new(reader, provider);
    let props = contract
        .getMarkets(
            data_store,
            U256::from(MARKET_PAGE_START),
            U256::from(MARKET_PAGE_LIMIT),
        )
        .call()
        .await?;

    let count = props.len();
    if count as u64 >= MARKET_PAGE_LIMIT {
        warn!(
            limit = MARKET_PAGE_LIMIT,
            "reader returned a full page, markets beyond it are not fetched"
        );
    }
    info!(markets = count, reader = %reader, "raw markets fetched");

    Ok(props.into_iter().map(RawMarket::from).collect())
}
