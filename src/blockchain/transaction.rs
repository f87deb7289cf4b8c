//! Transaction assembly, signing and submission.
//!
//! # Flow
//! ```text
//! validate recipient → validate amount
//!     → resolve keystore file → decrypt
//!     → nonce + gas price from the node (gas price clamped to the floor)
//!     → legacy EIP-155 transaction → sign → 2718/RLP encode
//!     → eth_sendRawTransaction → check the returned hash
//! ```
//!
//! Transfers from one sender are serialized in-process from nonce lookup to
//! submission; different senders run in parallel.

use alloy::consensus::{SignableTransaction, TxEnvelope, TxLegacy};
use alloy::eips::eip2718::Encodable2718;
use alloy::network::TxSignerSync;
use alloy::primitives::{hex, Address, Bytes, TxKind, U256};
use alloy::signers::local::PrivateKeySigner;
use dashmap::DashMap;
use regex::Regex;
use std::sync::{Arc, LazyLock};
use tokio::sync::Mutex;

use crate::blockchain::client::RpcTransport;
use crate::blockchain::keystore::KeystoreStore;
use crate::blockchain::types::{GatewayError, GatewayResult, Transfer};
use crate::config::ChainSettings;
use crate::observability::metrics;

/// Wei per ether, as a count of decimal places.
const ETHER_DECIMALS: usize = 18;

static RECIPIENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^0x[0-9a-fA-F]{40}$").expect("static regex"));
static AMOUNT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+(\.\d+)?$").expect("static regex"));
static TX_HASH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^0x[0-9a-fA-F]{64}$").expect("static regex"));

/// Check a recipient address string.
pub fn parse_recipient(to: &str) -> GatewayResult<Address> {
    if !RECIPIENT.is_match(to) {
        return Err(GatewayError::invalid_recipient());
    }
    to.parse().map_err(|_| GatewayError::invalid_recipient())
}

/// Convert a decimal ether amount to wei, truncating past 18 decimals.
///
/// Rejects anything that is not a plain non-negative decimal, zero, and
/// amounts too small to be worth one wei.
pub fn parse_ether_amount(amount: &str) -> GatewayResult<U256> {
    if !AMOUNT.is_match(amount) {
        return Err(GatewayError::invalid_amount());
    }

    let (whole, fraction) = amount.split_once('.').unwrap_or((amount, ""));
    let mut fraction: String = fraction.chars().take(ETHER_DECIMALS).collect();
    while fraction.len() < ETHER_DECIMALS {
        fraction.push('0');
    }

    let digits = format!("{}{}", whole, fraction);
    let wei = U256::from_str_radix(&digits, 10).map_err(|_| GatewayError::invalid_amount())?;
    if wei.is_zero() {
        return Err(GatewayError::invalid_amount());
    }
    Ok(wei)
}

/// Raise `gas_price` to the configured floor, if any.
pub fn clamp_gas_price(gas_price: u128, min_gas_price: Option<u64>) -> u128 {
    match min_gas_price {
        Some(floor) => gas_price.max(u128::from(floor)),
        None => gas_price,
    }
}

/// Signing engine: builds, signs and submits value transfers.
#[derive(Clone)]
pub struct TransferSigner {
    keystore: KeystoreStore,
    rpc: Arc<dyn RpcTransport>,
    chain: ChainSettings,
    sender_locks: Arc<DashMap<Address, Arc<Mutex<()>>>>,
}

impl TransferSigner {
    pub fn new(keystore: KeystoreStore, rpc: Arc<dyn RpcTransport>, chain: ChainSettings) -> Self {
        Self {
            keystore,
            rpc,
            chain,
            sender_locks: Arc::new(DashMap::new()),
        }
    }

    pub fn keystore(&self) -> &KeystoreStore {
        &self.keystore
    }

    pub fn rpc(&self) -> &Arc<dyn RpcTransport> {
        &self.rpc
    }

    /// Send `amount_eth` (decimal string) from `address` to `to`.
    pub async fn send_transaction(
        &self,
        address: &str,
        password: &str,
        to: &str,
        amount_eth: &str,
    ) -> GatewayResult<String> {
        let to = parse_recipient(to)?;
        let value_wei = parse_ether_amount(amount_eth)?;
        self.submit(
            Transfer {
                from: address.to_string(),
                to,
                value_wei,
            },
            password,
        )
        .await
    }

    /// Send an exact wei amount; used by the JSON-RPC `eth_sendTransaction` path.
    pub async fn send_transaction_wei(
        &self,
        address: &str,
        password: &str,
        to: &str,
        value_wei: U256,
    ) -> GatewayResult<String> {
        let to = parse_recipient(to)?;
        if value_wei.is_zero() {
            return Err(GatewayError::invalid_amount());
        }
        self.submit(
            Transfer {
                from: address.to_string(),
                to,
                value_wei,
            },
            password,
        )
        .await
    }

    async fn submit(&self, transfer: Transfer, password: &str) -> GatewayResult<String> {
        let result = self.sign_and_send(&transfer, password).await;
        match &result {
            Ok(_) => metrics::record_transaction("submitted"),
            Err(e) => {
                tracing::warn!(from = %transfer.from, to = %transfer.to, error = %e, "Transfer failed");
                metrics::record_transaction(e.kind());
            }
        }
        result
    }

    async fn sign_and_send(&self, transfer: &Transfer, password: &str) -> GatewayResult<String> {
        let path = self.keystore.find_file_for(&transfer.from)?;
        let signer = self.keystore.decrypt(path, password).await?;
        let sender = signer.address();

        let lock = self.sender_lock(sender);
        let _guard = lock.lock().await;

        let nonce = self.rpc.transaction_count(sender).await?;
        let node_gas_price = self.rpc.gas_price().await?;
        let gas_price = clamp_gas_price(node_gas_price, self.chain.min_gas_price);
        if gas_price != node_gas_price {
            tracing::debug!(node_gas_price, gas_price, "Gas price raised to configured minimum");
        }

        let tx = TxLegacy {
            chain_id: Some(self.chain.chain_id),
            nonce,
            gas_price,
            gas_limit: self.chain.gas_limit,
            to: TxKind::Call(transfer.to),
            value: transfer.value_wei,
            input: Bytes::new(),
        };

        let raw = sign_legacy(&signer, tx)?;
        let result = self.rpc.send_raw_transaction(&raw).await?;

        match result.as_str() {
            Some(hash) if TX_HASH.is_match(hash) => {
                tracing::info!(
                    from = %sender,
                    to = %transfer.to,
                    nonce,
                    gas_price,
                    tx_hash = hash,
                    "Transaction submitted"
                );
                Ok(hash.to_string())
            }
            _ => {
                // The node may already have broadcast it; keep enough to trace it.
                tracing::error!(from = %sender, nonce, response = %result, "Invalid transaction hash format");
                Err(GatewayError::InvalidResponse(format!(
                    "Invalid transaction hash format: {}",
                    result
                )))
            }
        }
    }

    fn sender_lock(&self, sender: Address) -> Arc<Mutex<()>> {
        self.sender_locks
            .entry(sender)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}

/// Sign a legacy transaction and return it as `0x`-prefixed RLP hex.
pub fn sign_legacy(signer: &PrivateKeySigner, mut tx: TxLegacy) -> GatewayResult<String> {
    let signature = signer
        .sign_transaction_sync(&mut tx)
        .map_err(|e| GatewayError::Signing(e.to_string()))?;
    let envelope = TxEnvelope::from(tx.into_signed(signature));
    Ok(hex::encode_prefixed(envelope.encoded_2718()))
}

impl std::fmt::Debug for TransferSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransferSigner")
            .field("keystore_dir", &self.keystore.dir())
            .field("chain_id", &self.chain.chain_id)
            .field("gas_limit", &self.chain.gas_limit)
            .finish()
    }
}
