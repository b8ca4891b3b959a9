//! Built-in per-chain constants: contract addresses, API host, explorer.

use alloy::primitives::{address, Address};

/// Static description of a chain GMX v2 is deployed on.
#[derive(Debug, Clone, Copy)]
pub struct ChainProfile {
    pub name: &'static str,
    pub chain_id: u64,
    pub api_base: &'static str,
    pub explorer_tx_base: &'static str,
    pub event_emitter: Address,
    pub reader: Option<Address>,
    pub data_store: Option<Address>,
}

pub const ARBITRUM: ChainProfile = ChainProfile {
    name: "arbitrum",
    chain_id: 42161,
    api_base: "https://arbitrum-api.gmxinfra.io",
    explorer_tx_base: "https://arbiscan.io/tx/",
    event_emitter: address!("0xC8ee91A54287DB53897056e12D9819156D3822Fb"),
    reader: Some(address!("0x5Ca84c34a381434786738735265b9f3FD814b824")),
    data_store: Some(address!("0xFD70de6b91282D8017aA4E741e9Ae325CAb992d8")),
};

pub const AVALANCHE: ChainProfile = ChainProfile {
    name: "avalanche",
    chain_id: 43114,
    api_base: "https://avalanche-api.gmxinfra.io",
    explorer_tx_base: "https://snowtrace.io/tx/",
    event_emitter: address!("0xDb17B211c34240B014ab6d61d4A31FA0C0e20c26"),
    // Reader and data store must come from [contracts] in the config file.
    reader: None,
    data_store: None,
};

static KNOWN: [ChainProfile; 2] = [ARBITRUM, AVALANCHE];

/// Look up a chain profile by (case-insensitive) name.
pub fn profile(name: &str) -> Option<&'static ChainProfile> {
    KNOWN.iter().find(|p| p.name.eq_ignore_ascii_case(name))
}

/// Explorer transaction URL prefix for a chain. Unknown chains get `#`.
pub fn explorer_tx_base(chain: &str) -> &'static str {
    profile(chain).map(|p| p.explorer_tx_base).unwrap_or("#")
}
