pub mod chains;

use crate::error::RegistryError;
use alloy::primitives::Address;
use chains::ChainProfile;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("missing required setting: {0}")]
    MissingEnv(&'static str),
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub chain: ChainConfig,
    #[serde(default)]
    pub contracts: ContractsConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub monitor: MonitorConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Chain-scoped connection parameters. Built once at startup and handed by
/// reference to every component; nothing mutates it afterwards.
#[derive(Debug, Clone, Deserialize)]
pub struct ChainConfig {
    /// Chain name, e.g. "arbitrum" or "avalanche".
    #[serde(default = "default_chain")]
    pub name: String,
    /// HTTP JSON-RPC endpoint (reader contract calls).
    #[serde(default)]
    pub rpc_url: String,
    /// WebSocket JSON-RPC endpoint (event log polling).
    #[serde(default)]
    pub ws_url: String,
    /// 0 means "take it from the built-in chain table".
    #[serde(default)]
    pub chain_id: u64,
}

/// Optional overrides for the built-in contract table.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContractsConfig {
    #[serde(default)]
    pub event_emitter: Option<Address>,
    #[serde(default)]
    pub reader: Option<Address>,
    #[serde(default)]
    pub data_store: Option<Address>,
    /// GMX infra API base URL (token list, signed prices).
    #[serde(default)]
    pub api_base: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// Directory holding `markets.json`.
    #[serde(default = "default_store_dir")]
    pub dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MonitorConfig {
    /// How often the log filter is polled for new entries.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Pause after a per-event decode failure.
    #[serde(default = "default_failure_backoff_ms")]
    pub failure_backoff_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub json: bool,
}

fn default_chain() -> String {
    "arbitrum".to_string()
}
fn default_store_dir() -> PathBuf {
    PathBuf::from("store")
}
fn default_poll_interval_ms() -> u64 {
    1000
}
fn default_failure_backoff_ms() -> u64 {
    1000
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            name: default_chain(),
            rpc_url: String::new(),
            ws_url: String::new(),
            chain_id: 0,
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            dir: default_store_dir(),
        }
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            failure_backoff_ms: default_failure_backoff_ms(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl Config {
    /// Load config from a TOML file, then overlay environment variables.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&contents)?;
        config.apply_env();
        config.fill_chain_id();
        Ok(config)
    }

    /// Build a config purely from environment variables and defaults.
    pub fn from_env() -> Self {
        let mut config = Config {
            chain: ChainConfig::default(),
            contracts: ContractsConfig::default(),
            store: StoreConfig::default(),
            monitor: MonitorConfig::default(),
            logging: LoggingConfig::default(),
        };
        config.apply_env();
        config.fill_chain_id();
        config
    }

    /// Switch the target chain (CLI `--chain`). The chain id is re-derived.
    pub fn with_chain(mut self, name: &str) -> Self {
        if !self.chain.name.eq_ignore_ascii_case(name) {
            self.chain.name = name.to_lowercase();
            self.chain.chain_id = 0;
            self.fill_chain_id();
        }
        self
    }

    fn apply_env(&mut self) {
        self.overlay(|key| std::env::var(key).ok());
    }

    /// Apply `GMX_*` overrides from `lookup`. A changed chain clears the
    /// chain id so `fill_chain_id` derives it again.
    fn overlay(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(chain) = lookup("GMX_CHAIN") {
            self.chain.name = chain.to_lowercase();
            self.chain.chain_id = 0;
        }
        if let Some(url) = lookup("GMX_RPC_URL") {
            self.chain.rpc_url = url;
        }
        if let Some(url) = lookup("GMX_WS_URL") {
            self.chain.ws_url = url;
        }
        if let Some(dir) = lookup("GMX_STORE_DIR") {
            self.store.dir = PathBuf::from(dir);
        }
    }

    fn fill_chain_id(&mut self) {
        if self.chain.chain_id == 0 {
            if let Some(p) = self.profile() {
                self.chain.chain_id = p.chain_id;
            }
        }
    }

    pub fn profile(&self) -> Option<&'static ChainProfile> {
        chains::profile(&self.chain.name)
    }

    pub fn api_base(&self) -> String {
        if let Some(base) = &self.contracts.api_base {
            return base.trim_end_matches('/').to_string();
        }
        match self.profile() {
            Some(p) => p.api_base.to_string(),
            None => format!("https://{}-api.gmxinfra.io", self.chain.name),
        }
    }

    pub fn event_emitter(&self) -> Result<Address, RegistryError> {
        self.contracts
            .event_emitter
            .or_else(|| self.profile().map(|p| p.event_emitter))
            .ok_or_else(|| self.missing("event emitter"))
    }

    pub fn reader(&self) -> Result<Address, RegistryError> {
        self.contracts
            .reader
            .or_else(|| self.profile().and_then(|p| p.reader))
            .ok_or_else(|| self.missing("reader"))
    }

    pub fn data_store(&self) -> Result<Address, RegistryError> {
        self.contracts
            .data_store
            .or_else(|| self.profile().and_then(|p| p.data_store))
            .ok_or_else(|| self.missing("data store"))
    }

    pub fn archive_path(&self) -> PathBuf {
        self.store.dir.join("markets.json")
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.monitor.poll_interval_ms)
    }

    pub fn failure_backoff(&self) -> Duration {
        Duration::from_millis(self.monitor.failure_backoff_ms)
    }

    pub fn require_rpc_url(&self) -> Result<&str, ConfigError> {
        non_empty(&self.chain.rpc_url).ok_or(ConfigError::MissingEnv("GMX_RPC_URL"))
    }

    pub fn require_ws_url(&self) -> Result<&str, ConfigError> {
        non_empty(&self.chain.ws_url).ok_or(ConfigError::MissingEnv("GMX_WS_URL"))
    }

    fn missing(&self, contract: &'static str) -> RegistryError {
        RegistryError::MissingContract {
            chain: self.chain.name.clone(),
            contract,
        }
    }
}

fn non_empty(s: &str) -> Option<&str> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::address;

    #[test]
    fn test_parse_minimal_toml() {
        let config: Config = toml::from_str(
            r#"
            [chain]
            name = "avalanche"
            rpc_url = "https://api.avax.network/ext/bc/C/rpc"

            [contracts]
            reader = "0x1111111111111111111111111111111111111111"
            data_store = "0x2222222222222222222222222222222222222222"
            "#,
        )
        .unwrap();

        assert_eq!(config.chain.name, "avalanche");
        assert_eq!(config.monitor.failure_backoff_ms, 1000);
        assert_eq!(config.store.dir, PathBuf::from("store"));
        assert_eq!(
            config.reader().unwrap(),
            address!("0x1111111111111111111111111111111111111111")
        );
        assert_eq!(
            config.event_emitter().unwrap(),
            chains::AVALANCHE.event_emitter
        );
    }

    #[test]
    fn test_missing_contract_for_avalanche() {
        let config = Config::from_env().with_chain("avalanche");
        assert_eq!(config.chain.chain_id, 43114);
        assert!(matches!(
            config.data_store(),
            Err(RegistryError::MissingContract { contract: "data store", .. })
        ));
    }

    #[test]
    fn test_arbitrum_defaults() {
        let config = Config::from_env().with_chain("arbitrum");
        assert_eq!(config.chain.chain_id, 42161);
        assert_eq!(config.api_base(), "https://arbitrum-api.gmxinfra.io");
        assert!(config.reader().is_ok());
        assert_eq!(config.archive_path(), config.store.dir.join("markets.json"));
    }

    #[test]
    fn test_unknown_chain_api_base() {
        let config = Config::from_env().with_chain("botanix");
        assert_eq!(config.api_base(), "https://botanix-api.gmxinfra.io");
        assert!(config.event_emitter().is_err());
    }

    #[test]
    fn test_env_overlay_on_file_config() {
        let mut config: Config = toml::from_str(
            r#"
            [chain]
            name = "arbitrum"
            rpc_url = "https://file.example/rpc"
            ws_url = "wss://file.example/ws"
            chain_id = 42161

            [store]
            dir = "from-file"
            "#,
        )
        .unwrap();

        let env = std::collections::HashMap::from([
            ("GMX_CHAIN", "Avalanche"),
            ("GMX_RPC_URL", "https://env.example/rpc"),
            ("GMX_WS_URL", "wss://env.example/ws"),
            ("GMX_STORE_DIR", "/var/lib/gmxwatch"),
        ]);
        config.overlay(|key| env.get(key).map(|v| v.to_string()));
        config.fill_chain_id();

        assert_eq!(config.chain.name, "avalanche");
        assert_eq!(config.chain.chain_id, 43114);
        assert_eq!(config.require_rpc_url().unwrap(), "https://env.example/rpc");
        assert_eq!(config.require_ws_url().unwrap(), "wss://env.example/ws");
        assert_eq!(config.archive_path(), PathBuf::from("/var/lib/gmxwatch/markets.json"));
        assert_eq!(config.event_emitter().unwrap(), chains::AVALANCHE.event_emitter);
    }

    #[test]
    fn test_env_overlay_leaves_unset_keys() {
        let mut config: Config = toml::from_str(
            r#"
            [chain]
            name = "arbitrum"
            rpc_url = "https://file.example/rpc"
            chain_id = 42161
            "#,
        )
        .unwrap();

        config.overlay(|key| (key == "GMX_WS_URL").then(|| "wss://env.example/ws".to_string()));
        config.fill_chain_id();

        assert_eq!(config.chain.name, "arbitrum");
        assert_eq!(config.chain.chain_id, 42161);
        assert_eq!(config.require_rpc_url().unwrap(), "https://file.example/rpc");
        assert_eq!(config.require_ws_url().unwrap(), "wss://env.example/ws");
        assert_eq!(config.store.dir, PathBuf::from("store"));
    }
}
