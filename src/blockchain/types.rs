//! Error definitions and request types shared by the signing flow.

use alloy::primitives::{Address, U256};
use thiserror::Error;

/// Errors that can occur while creating accounts or submitting transfers.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Input failed shape checks before any work was done.
    #[error("{0}")]
    Validation(String),

    /// No keystore file exists for the requested address.
    #[error("Keystore not found for address {0}")]
    KeystoreNotFound(String),

    /// Wrong password or corrupt keystore file.
    #[error("Failed to load keystore: {0}")]
    Decryption(String),

    /// Filesystem failure while reading or writing keystores.
    #[error("Keystore IO error: {0}")]
    Keystore(#[from] std::io::Error),

    /// The node answered with a JSON-RPC error object.
    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    /// Network or HTTP failure talking to the node.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Building or signing the transaction failed.
    #[error("Failed to sign transaction: {0}")]
    Signing(String),

    /// The node returned something that is not what the method promises.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl GatewayError {
    /// Stable tag used for metric labels and structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::KeystoreNotFound(_) => "keystore_not_found",
            Self::Decryption(_) => "decryption",
            Self::Keystore(_) => "keystore_io",
            Self::Rpc { .. } => "rpc",
            Self::Transport(_) => "transport",
            Self::Signing(_) => "signing",
            Self::InvalidResponse(_) => "invalid_response",
        }
    }

    pub(crate) fn invalid_recipient() -> Self {
        Self::Validation("invalid recipient".to_string())
    }

    pub(crate) fn invalid_amount() -> Self {
        Self::Validation("invalid amount".to_string())
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(e: reqwest::Error) -> Self {
        Self::Transport(e.to_string())
    }
}

/// Result type for gateway operations.
pub type GatewayResult<T> = Result<T, GatewayError>;

/// A validated value transfer, ready for the signing engine.
#[derive(Debug, Clone)]
pub struct Transfer {
    /// Sender address as given by the caller; resolved against the keystore.
    pub from: String,
    pub to: Address,
    pub value_wei: U256,
}
