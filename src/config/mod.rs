//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (YAML/TOML, optional)
//!     → loader.rs read_file_config (parse only, silent)
//!     → logging initialised from the file's observability section
//!     → loader.rs build_config (select chain, apply env overrides, log)
//!     → validation.rs (semantic checks, reported as warnings)
//!     → GatewayConfig (validated, immutable)
//!     → shared via Arc to all subsystems
//! ```
//!
//! # Design Decisions
//! - Config is loaded once before the listener binds; there is no reload
//! - Every setting has a default so a missing file is valid
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{build_config, read_file_config, ConfigError};
pub use schema::{
    ChainSettings, GatewayConfig, KeystoreConfig, LimitsConfig, ListenerConfig, LogFormat,
    ObservabilityConfig, TimeoutConfig,
};
