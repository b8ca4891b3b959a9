//! Error taxonomy shared by the registry, the decoder and the monitor loop.
//!
//! The split matters more than the messages:
//! - `TransportError` is fatal to whatever operation raised it.
//! - `LookupMiss` is an expected signal (e.g. "this index token is not in the
//!   directory, so the market is a swap market") and never a transport fault.
//! - `DecodeError` is scoped to a single event and never leaves the loop.

use crate::config::ConfigError;
use alloy::primitives::Address;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("rpc error: {0}")]
    Rpc(#[from] alloy::transports::TransportError),
    #[error("contract call failed: {0}")]
    Contract(#[from] alloy::contract::Error),
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{url} returned status {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },
    #[error("log subscription closed by the node")]
    SubscriptionClosed,
}

/// An address that is not present in a keyed snapshot.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("{kind} {address} not found")]
pub struct LookupMiss {
    pub kind: &'static str,
    pub address: Address,
}

impl LookupMiss {
    pub fn token(address: Address) -> Self {
        Self { kind: "token", address }
    }

    pub fn market(address: Address) -> Self {
        Self { kind: "market", address }
    }
}

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("abi decode failed: {0}")]
    Abi(#[from] alloy::sol_types::Error),
    #[error("{list}[{index}] missing from event payload")]
    MissingItem { list: &'static str, index: usize },
    #[error("{list}[{index}] expected key `{expected}`, found `{found}`")]
    UnexpectedKey {
        list: &'static str,
        index: usize,
        expected: &'static str,
        found: String,
    },
    #[error(transparent)]
    Lookup(#[from] LookupMiss),
    #[error("token decimals {0} exceed the 30-decimal price scale")]
    DecimalsOutOfRange(u8),
    #[error("{0} does not fit a decimal")]
    Overflow(&'static str),
    #[error("collateral value is zero, leverage undefined")]
    ZeroCollateral,
}

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("market archive not found at {0}")]
    NotFound(PathBuf),
    #[error("archive io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("archive is not valid json: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("no {contract} address configured for chain {chain}")]
    MissingContract {
        chain: String,
        contract: &'static str,
    },
}

impl From<alloy::contract::Error> for RegistryError {
    fn from(e: alloy::contract::Error) -> Self {
        Self::Transport(e.into())
    }
}

impl From<reqwest::Error> for RegistryError {
    fn from(e: reqwest::Error) -> Self {
        Self::Transport(e.into())
    }
}
