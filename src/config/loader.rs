//! Configuration loading from disk and environment.
//!
//! Resolution order for every setting is: environment variable, then the
//! selected `chains.<name>` entry, then `global`, then top-level file keys,
//! then the built-in default.
//!
//! Loading is two steps so the binary can install its subscriber in between:
//! [`read_file_config`] parses the file silently, then [`build_config`]
//! resolves, validates and logs. Only an unreadable or unparsable file and an
//! unknown chain name are fatal; bad env values and out-of-range settings
//! are logged at warn.

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use thiserror::Error;

use crate::config::schema::{ChainSettings, FileChainSettings, FileConfig, GatewayConfig};
use crate::config::validation::validate_config;

/// Config file read when neither `GATEWAY_CONFIG` nor `--config` is given.
pub const DEFAULT_CONFIG_PATH: &str = "/opt/config/config.yml";

pub const ENV_CONFIG_PATH: &str = "GATEWAY_CONFIG";
pub const ENV_CHAIN: &str = "GATEWAY_CHAIN";
pub const ENV_PORT: &str = "PORT";
pub const ENV_RPC_URL: &str = "ETH_RPC_URL";
pub const ENV_CHAIN_ID: &str = "CHAIN_ID";
pub const ENV_GAS_LIMIT: &str = "GAS_LIMIT";
pub const ENV_MIN_GAS_PRICE: &str = "MIN_GAS_PRICE";
pub const ENV_KEYSTORE_DIR: &str = "KEYSTORE_DIR";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Parse error in {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Chain not configured: {name} (available: {})", list_or_none(.available))]
    UnknownChain { name: String, available: Vec<String> },
}

fn list_or_none(names: &[String]) -> String {
    if names.is_empty() {
        "none".to_string()
    } else {
        names.join(", ")
    }
}

/// Pick the config file path: `GATEWAY_CONFIG`, then the CLI flag, then the default.
pub fn config_path(cli_path: Option<&Path>) -> PathBuf {
    std::env::var(ENV_CONFIG_PATH)
        .ok()
        .filter(|p| !p.is_empty())
        .map(PathBuf::from)
        .or_else(|| cli_path.map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

/// Read a config file. A missing file yields `Ok(None)`.
///
/// Emits no log events; [`build_config`] reports what was found.
pub fn read_file_config(path: &Path) -> Result<Option<FileConfig>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let parse_error = |message: String| ConfigError::Parse {
        path: path.to_path_buf(),
        message,
    };

    let file = match path.extension().and_then(|e| e.to_str()) {
        Some("toml") => toml::from_str(&content).map_err(|e| parse_error(e.to_string()))?,
        _ => parse_yaml(&content).map_err(|e| parse_error(e.to_string()))?,
    };

    Ok(Some(file))
}

// An empty YAML document deserializes as unit, not as an empty mapping.
fn parse_yaml(content: &str) -> Result<FileConfig, serde_yaml::Error> {
    if content.trim().is_empty() {
        return Ok(FileConfig::default());
    }
    serde_yaml::from_str(content)
}

/// Merge file contents, environment and defaults into a `GatewayConfig`.
///
/// `env` abstracts variable lookup so resolution can be exercised without
/// touching the process environment.
pub fn resolve_config<F>(
    file: Option<&FileConfig>,
    chain_name: Option<&str>,
    env: F,
) -> Result<GatewayConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let empty = FileConfig::default();
    let file = file.unwrap_or(&empty);

    let selected = match chain_name {
        Some(name) => Some(
            file.chains
                .get(name)
                .cloned()
                .ok_or_else(|| ConfigError::UnknownChain {
                    name: name.to_string(),
                    available: file.available_chains(),
                })?,
        ),
        None => None,
    };

    let mut layers: Vec<FileChainSettings> = Vec::with_capacity(3);
    layers.extend(selected);
    layers.push(file.global.clone());
    layers.push(file.top_level());

    let defaults = ChainSettings::default();
    let first = |pick: fn(&FileChainSettings) -> Option<u64>| layers.iter().find_map(pick);

    let chain = ChainSettings {
        name: chain_name.map(str::to_string),
        rpc_url: env_string(&env, ENV_RPC_URL)
            .or_else(|| layers.iter().find_map(|l| l.rpc_url.clone()))
            .unwrap_or(defaults.rpc_url),
        chain_id: env_parse(&env, ENV_CHAIN_ID)
            .or_else(|| first(|l| l.chain_id))
            .unwrap_or(defaults.chain_id),
        gas_limit: env_parse(&env, ENV_GAS_LIMIT)
            .or_else(|| first(|l| l.gas_limit))
            .unwrap_or(defaults.gas_limit),
        min_gas_price: env_parse(&env, ENV_MIN_GAS_PRICE).or_else(|| first(|l| l.min_gas_price)),
    };

    let mut config = GatewayConfig {
        listener: file.listener.clone().unwrap_or_default(),
        keystore: file.keystore.clone().unwrap_or_default(),
        chain,
        timeouts: file.timeouts.clone().unwrap_or_default(),
        limits: file.limits.clone().unwrap_or_default(),
        observability: file.observability.clone().unwrap_or_default(),
    };

    if let Some(port) = env_parse::<u16, _>(&env, ENV_PORT) {
        config.listener.bind_address = with_port(&config.listener.bind_address, port);
    }
    if let Some(dir) = env_string(&env, ENV_KEYSTORE_DIR) {
        config.keystore.dir = PathBuf::from(dir);
    }

    Ok(config)
}

/// Resolve a file read by [`read_file_config`] against the process environment.
///
/// Call after logging is initialised: this is where the loader reports.
pub fn build_config(
    path: &Path,
    file: Option<&FileConfig>,
    chain_name: Option<&str>,
) -> Result<GatewayConfig, ConfigError> {
    build_config_with(path, file, chain_name, |key| std::env::var(key).ok())
}

fn build_config_with<F>(
    path: &Path,
    file: Option<&FileConfig>,
    chain_name: Option<&str>,
    env: F,
) -> Result<GatewayConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match file {
        Some(_) => tracing::info!(path = %path.display(), "Loaded config file"),
        None => tracing::info!(path = %path.display(), "No config file found, using environment variables"),
    }

    let config = resolve_config(file, chain_name, env)?;
    if let Err(errors) = validate_config(&config) {
        for error in &errors {
            tracing::warn!(field = error.field, problem = %error.message, "Suspicious configuration value");
        }
    }

    log_config(&config);
    Ok(config)
}

fn log_config(config: &GatewayConfig) {
    tracing::info!(
        bind_address = %config.listener.bind_address,
        keystore_dir = %config.keystore.dir.display(),
        chain = config.chain.name.as_deref().unwrap_or("default"),
        rpc_url = %config.chain.rpc_url,
        chain_id = config.chain.chain_id,
        gas_limit = config.chain.gas_limit,
        min_gas_price = ?config.chain.min_gas_price,
        "Configuration loaded"
    );
}

fn env_string<F>(env: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    env(key).filter(|v| !v.trim().is_empty())
}

// An unparsable value is ignored so the file or default applies.
fn env_parse<T, F>(env: &F, key: &'static str) -> Option<T>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    let value = env_string(env, key)?;
    match value.trim().parse() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            tracing::warn!(key = key, value = %value, "Ignoring unparsable environment variable");
            None
        }
    }
}

fn with_port(bind_address: &str, port: u16) -> String {
    let host = bind_address
        .rsplit_once(':')
        .map(|(host, _)| host)
        .filter(|h| !h.is_empty())
        .unwrap_or("0.0.0.0");
    format!("{}:{}", host, port)
}
