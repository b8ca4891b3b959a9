//! On-chain position monitoring for GMX v2.
//!
//! Watches the GMX EventEmitter for `PositionIncrease`/`PositionDecrease`
//! events, decodes their key/value payloads and emits rendered alerts.
//!
//! Architecture:
//! - `abi`: `EventLog1` and the `EventLogData` item structs
//! - `events`: positional payload schema and fixed-point decoding
//! - `monitor`: log filter polling and per-event dispatch
//! - Alerts are sent over a `tokio::sync::mpsc` channel as `PositionAlert`s

pub mod abi;
pub mod events;
pub mod monitor;
pub mod types;

pub use monitor::PositionMonitor;
pub use types::{PositionAlert, PositionEvent, PositionKind};
