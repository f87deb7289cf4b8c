//! Keystore-backed Ethereum signing gateway.
//!
//! Creates accounts as encrypted keystore files and submits signed value
//! transfers through a remote JSON-RPC node, behind a small REST and
//! JSON-RPC HTTP front end.

pub mod blockchain;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;

pub use blockchain::{GatewayError, TransferSigner};
pub use config::GatewayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
