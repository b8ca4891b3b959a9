//! Position monitor.
//!
//! Polls a log filter on the GMX EventEmitter for `EventLog1` entries and
//! turns `PositionIncrease`/`PositionDecrease` events into rendered alerts
//! sent over a tokio channel.
//!
//! Lifecycle:
//! - INIT: the caller loads the market archive and token directory
//! - SUBSCRIBED: one log filter on the emitter, starting at the latest block
//! - POLLING: batches are processed strictly in arrival order
//!
//! A bad event is logged, followed by a fixed backoff, and the loop moves
//! on. A dropped filter or transport failure ends `run` with an error;
//! restarting is left to whatever supervises the process.

use crate::config::Config;
use crate::error::{DecodeError, RegistryError, TransportError};
use crate::infra::TokenDirectory;
use crate::markets::MarketRegistry;
use crate::notify;
use crate::onchain::abi::EventLog1;
use crate::onchain::events::decode_position;
use crate::onchain::types::{EventOutcome, PositionAlert, PositionKind};

use alloy::eips::BlockNumberOrTag;
use alloy::primitives::{Address, B256};
use alloy::providers::{Provider, ProviderBuilder, WsConnect};
use alloy::rpc::types::{Filter, Log};
use alloy::sol_types::SolEvent;
use futures_util::StreamExt;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Counters for one processed batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchStats {
    pub alerts: usize,
    pub ignored: usize,
    pub failed: usize,
    /// Alerts built after the receiver was dropped.
    pub undelivered: usize,
}

pub struct PositionMonitor {
    chain: String,
    ws_url: String,
    emitter: Address,
    markets: MarketRegistry,
    tokens: TokenDirectory,
    alert_tx: mpsc::UnboundedSender<PositionAlert>,
    poll_interval: Duration,
    failure_backoff: Duration,
}

impl PositionMonitor {
    pub fn new(
        config: &Config,
        markets: MarketRegistry,
        tokens: TokenDirectory,
        alert_tx: mpsc::UnboundedSender<PositionAlert>,
    ) -> Result<Self, RegistryError> {
        Ok(Self {
            chain: config.chain.name.clone(),
            ws_url: config.require_ws_url()?.to_string(),
            emitter: config.event_emitter()?,
            markets,
            tokens,
            alert_tx,
            poll_interval: config.poll_interval(),
            failure_backoff: config.failure_backoff(),
        })
    }

    /// Start the monitor in a background task.
    pub fn start(self) -> tokio::task::JoinHandle<Result<(), TransportError>> {
        tokio::spawn(async move { self.run().await })
    }

    /// Subscribe and poll until the transport fails. Returns `Ok` only when
    /// the alert receiver has been dropped.
    pub async fn run(&self) -> Result<(), TransportError> {
        let provider = ProviderBuilder::new()
            .connect_ws(WsConnect::new(self.ws_url.as_str()))
            .await?;
        info!(chain = %self.chain, "websocket connected");

        let filter = Filter::new()
            .address(self.emitter)
            .event_signature(EventLog1::SIGNATURE_HASH)
            .from_block(BlockNumberOrTag::Latest);

        let poller = provider
            .watch_logs(&filter)
            .await?
            .with_poll_interval(self.poll_interval);
        let mut batches = Box::pin(poller.into_stream());

        info!(
            emitter = %self.emitter,
            markets = self.markets.len(),
            "listening for position events"
        );

        while let Some(batch) = batches.next().await {
            let stats = self.process_batch(&batch).await;
            if !batch.is_empty() {
                debug!(
                    entries = batch.len(),
                    alerts = stats.alerts,
                    ignored = stats.ignored,
                    failed = stats.failed,
                    "batch processed"
                );
            }
            if self.alert_tx.is_closed() {
                warn!(
                    undelivered = stats.undelivered,
                    "alert receiver dropped, stopping position monitor"
                );
                return Ok(());
            }
        }

        Err(TransportError::SubscriptionClosed)
    }

    /// Handle a batch sequentially. A failed entry costs one backoff and
    /// does not stop the rest of the batch.
    pub async fn process_batch(&self, logs: &[Log]) -> BatchStats {
        let mut stats = BatchStats::default();

        for log in logs {
            match self.handle_log(log) {
                EventOutcome::Alert(alert) => {
                    stats.alerts += 1;
                    info!(
                        kind = %alert.event.kind,
                        market = %alert.market_symbol,
                        size_usd = %alert.event.size_usd,
                        tx = %alert.event.tx_hash,
                        "position event"
                    );
                    if self.alert_tx.send(*alert).is_err() {
                        stats.undelivered += 1;
                    }
                }
                EventOutcome::Ignored { event_name } => {
                    stats.ignored += 1;
                    debug!(event = %event_name, "not a position event");
                }
                EventOutcome::Failed {
                    event_name,
                    topic1,
                    error,
                } => {
                    stats.failed += 1;
                    warn!(
                        event = event_name.as_deref().unwrap_or("<undecodable>"),
                        emitter = %log.address(),
                        topic1 = ?topic1,
                        tx = ?log.transaction_hash,
                        block = ?log.block_number,
                        error = %error,
                        "failed to decode event"
                    );
                    tokio::time::sleep(self.failure_backoff).await;
                }
            }
        }

        stats
    }

    /// Classify and decode one log entry.
    pub fn handle_log(&self, log: &Log) -> EventOutcome {
        let decoded = match log.log_decode::<EventLog1>() {
            Ok(d) => d,
            Err(e) => return EventOutcome::undecodable(e),
        };
        let event = decoded.inner.data;

        let Some(kind) = PositionKind::from_event_name(&event.eventName) else {
            return EventOutcome::Ignored {
                event_name: event.eventName,
            };
        };

        let tx_hash = log.transaction_hash.unwrap_or(B256::ZERO);
        match self.build_alert(kind, &event, tx_hash) {
            Ok(alert) => EventOutcome::Alert(Box::new(alert)),
            Err(e) => EventOutcome::rejected(&event, e),
        }
    }

    fn build_alert(
        &self,
        kind: PositionKind,
        event: &EventLog1,
        tx_hash: B256,
    ) -> Result<PositionAlert, DecodeError> {
        let position = decode_position(kind, &event.eventData, tx_hash, &self.tokens)?;
        let market_symbol = self.markets.symbol_of(&position.market)?.to_string();
        let text = notify::render(&position, &market_symbol, &self.chain);

        Ok(PositionAlert {
            event: position,
            market_symbol,
            chain: self.chain.clone(),
            text,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::TokenInfo;
    use crate::markets::{Market, TokenMetadata};
    use crate::onchain::abi::EventLogData;
    use crate::onchain::events::fixtures::{eth_long_payload, position_payload};
    use alloy::primitives::{address, keccak256, U256};
    use rust_decimal_macros::dec;
    use std::collections::BTreeMap;

    const WETH: Address = address!("0x82aF49447D8a07e3bd95BD0d56f35241523fBab1");
    const USDC: Address = address!("0xaf88d065e77c8cC2239327C5EDb3A432268e5831");
    const ETH_MARKET: Address = address!("0x70d95587d40A2caf56bd97485aB3Eec10Bee6336");
    const EMITTER: Address = address!("0xC8ee91A54287DB53897056e12D9819156D3822Fb");

    fn monitor(tx: mpsc::UnboundedSender<PositionAlert>) -> PositionMonitor {
        let eth = TokenInfo::new(WETH, "WETH", 18);
        let usdc = TokenInfo::new(USDC, "USDC", 6);
        let market = Market {
            market_address: ETH_MARKET,
            symbol: "ETH".to_string(),
            index_token_address: WETH,
            index_token_metadata: TokenMetadata::from(&eth),
            long_token_metadata: TokenMetadata::from(&eth),
            long_token_address: WETH,
            short_token_metadata: TokenMetadata::from(&usdc),
            short_token_address: USDC,
            is_synthetic: false,
        };

        PositionMonitor {
            chain: "arbitrum".to_string(),
            ws_url: String::new(),
            emitter: EMITTER,
            markets: MarketRegistry::new(BTreeMap::from([(ETH_MARKET, market)])),
            tokens: TokenDirectory::from_tokens([eth, usdc]),
            alert_tx: tx,
            poll_interval: Duration::from_millis(10),
            failure_backoff: Duration::from_millis(1),
        }
    }

    fn emitter_log(event_name: &str, data: EventLogData, tx: u8) -> Log {
        account_log(event_name, data, B256::ZERO, tx)
    }

    fn account_log(event_name: &str, data: EventLogData, topic1: B256, tx: u8) -> Log {
        let event = EventLog1 {
            msgSender: Address::with_last_byte(0x42),
            eventName: event_name.to_string(),
            eventNameHash: keccak256(event_name.as_bytes()),
            topic1,
            eventData: data,
        };
        Log {
            inner: alloy::primitives::Log {
                address: EMITTER,
                data: event.encode_log_data(),
            },
            transaction_hash: Some(B256::with_last_byte(tx)),
            ..Default::default()
        }
    }

    fn eth_long() -> EventLogData {
        eth_long_payload(Address::with_last_byte(1), ETH_MARKET, WETH)
    }

    #[test]
    fn test_increase_produces_alert() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let m = monitor(tx);

        match m.handle_log(&emitter_log("PositionIncrease", eth_long(), 1)) {
            EventOutcome::Alert(alert) => {
                assert_eq!(alert.market_symbol, "ETH");
                assert_eq!(alert.event.size_usd, dec!(12000));
                assert_eq!(alert.event.leverage, Some(dec!(2)));
                assert_eq!(alert.event.tx_hash, B256::with_last_byte(1));
                assert!(alert.text.contains("Long x2.00"));
            }
            other => panic!("expected alert, got {other:?}"),
        }
    }

    #[test]
    fn test_other_event_names_ignored() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let m = monitor(tx);

        // Payload that would fail to decode as a position: must not be looked at.
        let empty = position_payload(
            Address::ZERO,
            Address::ZERO,
            Address::ZERO,
            U256::ZERO,
            U256::ZERO,
            U256::ZERO,
            false,
        );
        assert!(matches!(
            m.handle_log(&emitter_log("OrderCreated", empty, 2)),
            EventOutcome::Ignored { event_name } if event_name == "OrderCreated"
        ));
    }

    #[test]
    fn test_unknown_market_fails() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let m = monitor(tx);
        let data = eth_long_payload(Address::with_last_byte(1), Address::with_last_byte(9), WETH);

        assert!(matches!(
            m.handle_log(&emitter_log("PositionDecrease", data, 3)),
            EventOutcome::Failed {
                event_name: Some(name),
                error: DecodeError::Lookup(miss),
                ..
            } if name == "PositionDecrease" && miss.kind == "market"
        ));
    }

    #[test]
    fn test_failure_keeps_event_name_and_account_topic() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let m = monitor(tx);
        let mut broken = eth_long();
        broken.uintItems.items.truncate(5);
        let log = account_log("PositionIncrease", broken, B256::with_last_byte(7), 1);

        match m.handle_log(&log) {
            EventOutcome::Failed {
                event_name,
                topic1,
                error,
            } => {
                assert_eq!(event_name.as_deref(), Some("PositionIncrease"));
                assert_eq!(topic1, Some(B256::with_last_byte(7)));
                assert!(matches!(error, DecodeError::MissingItem { index: 10, .. }));
            }
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[test]
    fn test_undecodable_log_has_no_event_name() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let m = monitor(tx);
        let mut log = emitter_log("PositionIncrease", eth_long(), 1);
        log.inner.data = alloy::primitives::LogData::new_unchecked(
            vec![EventLog1::SIGNATURE_HASH],
            alloy::primitives::Bytes::from_static(&[0xde, 0xad]),
        );

        assert!(matches!(
            m.handle_log(&log),
            EventOutcome::Failed {
                event_name: None,
                topic1: None,
                error: DecodeError::Abi(_),
            }
        ));
    }

    #[tokio::test]
    async fn test_failure_does_not_stop_batch() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let m = monitor(tx);

        let mut broken = eth_long();
        broken.uintItems.items.truncate(5);

        let batch = vec![
            emitter_log("PositionIncrease", broken, 1),
            emitter_log("OrderExecuted", eth_long(), 2),
            emitter_log("PositionDecrease", eth_long(), 3),
            emitter_log("PositionIncrease", eth_long(), 4),
        ];
        let stats = m.process_batch(&batch).await;

        assert_eq!(
            stats,
            BatchStats {
                alerts: 2,
                ignored: 1,
                failed: 1,
                undelivered: 0,
            }
        );

        // Arrival order is preserved.
        let first = rx.recv().await.unwrap();
        let second = rx.recv().await.unwrap();
        assert_eq!(first.event.kind, PositionKind::Decrease);
        assert_eq!(first.event.tx_hash, B256::with_last_byte(3));
        assert_eq!(second.event.kind, PositionKind::Increase);
        assert!(first.event.leverage.is_none());
    }

    #[tokio::test]
    async fn test_dropped_receiver_counts_undelivered() {
        let (tx, rx) = mpsc::unbounded_channel();
        let m = monitor(tx);
        drop(rx);

        let batch = vec![
            emitter_log("PositionIncrease", eth_long(), 1),
            emitter_log("PositionDecrease", eth_long(), 2),
        ];
        let stats = m.process_batch(&batch).await;

        assert_eq!(stats.alerts, 2);
        assert_eq!(stats.undelivered, 2);
        assert!(m.alert_tx.is_closed());
    }
}
