//! Position events decoded from the GMX event emitter.

use crate::error::DecodeError;
use alloy::primitives::{Address, B256};
use rust_decimal::Decimal;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionKind {
    Increase,
    Decrease,
}

impl PositionKind {
    /// Classify an emitter `eventName`. Anything else is not a position event.
    pub fn from_event_name(name: &str) -> Option<Self> {
        match name {
            super::abi::POSITION_INCREASE => Some(Self::Increase),
            super::abi::POSITION_DECREASE => Some(Self::Decrease),
            _ => None,
        }
    }
}

impl std::fmt::Display for PositionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Increase => write!(f, "increase"),
            Self::Decrease => write!(f, "decrease"),
        }
    }
}

/// A decoded `PositionIncrease`/`PositionDecrease`. Ephemeral, never stored.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionEvent {
    pub kind: PositionKind,
    pub account: Address,
    pub market: Address,
    pub collateral_token: Address,
    pub collateral_decimals: u8,
    pub size_usd: Decimal,
    pub collateral_amount: Decimal,
    pub collateral_price: Decimal,
    pub collateral_usd: Decimal,
    /// Set for increases only.
    pub leverage: Option<Decimal>,
    pub is_long: bool,
    pub tx_hash: B256,
}

impl PositionEvent {
    pub fn direction(&self) -> &'static str {
        if self.is_long {
            "Long"
        } else {
            "Short"
        }
    }
}

/// A rendered, ready-to-deliver notification.
#[derive(Debug, Clone)]
pub struct PositionAlert {
    pub event: PositionEvent,
    pub market_symbol: String,
    pub chain: String,
    pub text: String,
}

/// What happened to one log entry.
#[derive(Debug)]
pub enum EventOutcome {
    Alert(Box<PositionAlert>),
    /// Not a position event; dropped without error.
    Ignored { event_name: String },
    /// `event_name` and `topic1` are unset when the log itself failed ABI
    /// decoding.
    Failed {
        event_name: Option<String>,
        topic1: Option<B256>,
        error: DecodeError,
    },
}

impl EventOutcome {
    fn failed(event: Option<&super::abi::EventLog1>, error: impl Into<DecodeError>) -> Self {
        Self::Failed {
            event_name: event.map(|e| e.eventName.clone()),
            topic1: event.map(|e| e.topic1),
            error: error.into(),
        }
    }

    pub(crate) fn undecodable(error: impl Into<DecodeError>) -> Self {
        Self::failed(None, error)
    }

    pub(crate) fn rejected(event: &super::abi::EventLog1, error: impl Into<DecodeError>) -> Self {
        Self::failed(Some(event), error)
    }
}
