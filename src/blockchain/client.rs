//! JSON-RPC client for the upstream Ethereum node.
//!
//! # Responsibilities
//! - Wrap calls in a JSON-RPC 2.0 envelope and POST them to the node
//! - Surface node-reported errors (`RpcError`) separately from transport failures
//! - Decode the hex quantities the signing flow needs
//!
//! No retries and no timeout beyond the HTTP client default.

use alloy::primitives::Address;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::blockchain::types::{GatewayError, GatewayResult};
use crate::observability::metrics;

/// Anything that can answer a JSON-RPC call.
///
/// The typed helpers are provided on top of [`RpcTransport::call`], so a test
/// double only has to implement `call`.
#[async_trait]
pub trait RpcTransport: Send + Sync {
    /// Send `method` with positional `params`; returns the `result` member.
    async fn call(&self, method: &str, params: Value) -> GatewayResult<Value>;

    /// `eth_getTransactionCount(address, "pending")`.
    async fn transaction_count(&self, address: Address) -> GatewayResult<u64> {
        let result = self
            .call("eth_getTransactionCount", json!([address, "pending"]))
            .await?;
        let count = parse_quantity(&result)?;
        u64::try_from(count)
            .map_err(|_| GatewayError::InvalidResponse(format!("nonce out of range: {}", result)))
    }

    /// `eth_gasPrice()` in wei.
    async fn gas_price(&self) -> GatewayResult<u128> {
        let result = self.call("eth_gasPrice", json!([])).await?;
        parse_quantity(&result)
    }

    /// `eth_sendRawTransaction(raw)`; returns the node's answer unchecked.
    async fn send_raw_transaction(&self, raw_tx: &str) -> GatewayResult<Value> {
        self.call("eth_sendRawTransaction", json!([raw_tx])).await
    }
}

/// Parse a JSON-RPC hex quantity (`"0x1a"`).
pub fn parse_quantity(value: &Value) -> GatewayResult<u128> {
    let text = value
        .as_str()
        .ok_or_else(|| GatewayError::InvalidResponse(format!("expected hex quantity, got {}", value)))?;
    let digits = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .ok_or_else(|| GatewayError::InvalidResponse(format!("expected hex quantity, got {}", text)))?;
    if digits.is_empty() {
        return Ok(0);
    }
    u128::from_str_radix(digits, 16)
        .map_err(|e| GatewayError::InvalidResponse(format!("bad hex quantity {}: {}", text, e)))
}

#[derive(Debug, Serialize)]
struct JsonRpcRequest<'a> {
    jsonrpc: &'static str,
    method: &'a str,
    params: Value,
    id: u32,
}

#[derive(Debug, Deserialize)]
struct JsonRpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<JsonRpcError>,
}

#[derive(Debug, Deserialize)]
struct JsonRpcError {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: String,
}

/// HTTP transport posting JSON bodies to a single node URL.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    url: String,
}

impl HttpTransport {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }

    async fn post(&self, method: &str, params: Value) -> GatewayResult<Value> {
        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            method,
            params,
            id: 1,
        };

        let response = self.client.post(&self.url).json(&request).send().await?;
        let status = response.status();
        let body = response.text().await?;

        // Nodes often pair a 4xx/5xx status with a valid error envelope; prefer the envelope.
        let envelope: JsonRpcResponse = match serde_json::from_str(&body) {
            Ok(envelope) => envelope,
            Err(_) if !status.is_success() => {
                return Err(GatewayError::Transport(format!(
                    "node returned {}: {}",
                    status, body
                )));
            }
            Err(e) => {
                return Err(GatewayError::InvalidResponse(format!(
                    "malformed JSON-RPC envelope: {}",
                    e
                )));
            }
        };

        if let Some(error) = envelope.error {
            return Err(GatewayError::Rpc {
                code: error.code,
                message: error.message,
            });
        }

        Ok(envelope.result.unwrap_or(Value::Null))
    }
}

#[async_trait]
impl RpcTransport for HttpTransport {
    async fn call(&self, method: &str, params: Value) -> GatewayResult<Value> {
        tracing::debug!(method = method, "RPC call");
        let result = self.post(method, params).await;

        match &result {
            Ok(_) => metrics::record_rpc_call(method, "ok"),
            Err(e) => {
                tracing::warn!(method = method, error = %e, "RPC call failed");
                metrics::record_rpc_call(method, e.kind());
            }
        }
        result
    }
}
