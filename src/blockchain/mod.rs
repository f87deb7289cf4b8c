//! Keystore-backed signing subsystem.
//!
//! # Data Flow
//! ```text
//! create_account(password)
//!     → keystore.rs (generate key, encrypt, write UTC--<ts>--<address>)
//!
//! send_transaction(address, password, to, amount)
//!     → transaction.rs (validate, assemble, sign)
//!     → keystore.rs (locate + decrypt sender key)
//!     → client.rs (nonce, gas price, eth_sendRawTransaction)
//! ```
//!
//! # Security Constraints
//! - Keys exist decrypted only for the lifetime of one request
//! - Never log passwords or key material
//! - Node errors, transport errors and signing errors stay distinct

pub mod client;
pub mod keystore;
pub mod transaction;
pub mod types;

pub use client::{HttpTransport, RpcTransport};
pub use keystore::{KeystoreEntry, KeystoreStore};
pub use transaction::TransferSigner;
pub use types::{GatewayError, GatewayResult};
