//! Configuration schema definitions.
//!
//! `GatewayConfig` is the resolved, immutable settings record. The `File*`
//! types mirror what may appear in a config file; every field there is
//! optional so a partial (or absent) file still resolves.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Placeholder public endpoint used when no RPC URL is configured.
pub const DEFAULT_RPC_URL: &str = "https://ethereum-rpc.publicnode.com";

/// Gas limit of a plain value transfer.
pub const DEFAULT_GAS_LIMIT: u64 = 21_000;

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Keystore directory settings.
    pub keystore: KeystoreConfig,

    /// Chain parameters used for signing and submission.
    pub chain: ChainSettings,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Request size limits.
    pub limits: LimitsConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:3000").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".to_string(),
        }
    }
}

/// Where encrypted key files live.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct KeystoreConfig {
    pub dir: PathBuf,
}

impl Default for KeystoreConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("keystores"),
        }
    }
}

/// Chain parameters. Immutable after load.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ChainSettings {
    /// Name of the selected chain entry, if one was selected.
    pub name: Option<String>,

    /// JSON-RPC endpoint URL of the upstream node.
    pub rpc_url: String,

    /// EIP-155 chain ID.
    pub chain_id: u64,

    /// Gas limit applied to every transfer.
    pub gas_limit: u64,

    /// Floor for the node-reported gas price, in wei.
    pub min_gas_price: Option<u64>,
}

impl Default for ChainSettings {
    fn default() -> Self {
        Self {
            name: None,
            rpc_url: DEFAULT_RPC_URL.to_string(),
            chain_id: 1,
            gas_limit: DEFAULT_GAS_LIMIT,
            min_gas_price: None,
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Inbound request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 60 }
    }
}

/// Request size limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum body size in bytes.
    pub max_body_size: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_body_size: 1024 * 1024,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Chain keys as they may appear at the top level, under `global`, or under
/// a named entry of `chains`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FileChainSettings {
    #[serde(alias = "quicknode_url")]
    pub rpc_url: Option<String>,
    pub chain_id: Option<u64>,
    pub gas_limit: Option<u64>,
    pub min_gas_price: Option<u64>,
}

/// Raw contents of a config file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    #[serde(alias = "quicknode_url")]
    pub rpc_url: Option<String>,
    pub chain_id: Option<u64>,
    pub gas_limit: Option<u64>,
    pub min_gas_price: Option<u64>,

    /// Settings shared by every named chain.
    pub global: FileChainSettings,

    /// Named chain entries.
    pub chains: BTreeMap<String, FileChainSettings>,

    pub listener: Option<ListenerConfig>,
    pub keystore: Option<KeystoreConfig>,
    pub timeouts: Option<TimeoutConfig>,
    pub limits: Option<LimitsConfig>,
    pub observability: Option<ObservabilityConfig>,
}

impl FileConfig {
    /// Chain keys given at the top level of the file.
    pub fn top_level(&self) -> FileChainSettings {
        FileChainSettings {
            rpc_url: self.rpc_url.clone(),
            chain_id: self.chain_id,
            gas_limit: self.gas_limit,
            min_gas_price: self.min_gas_price,
        }
    }

    /// Names of configured chain entries, sorted.
    pub fn available_chains(&self) -> Vec<String> {
        self.chains.keys().cloned().collect()
    }
}
