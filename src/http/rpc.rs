//! Ethereum-client-compatible JSON-RPC endpoint (`POST /`).
//!
//! Account methods are answered locally from the keystore; everything else
//! is forwarded verbatim to the upstream node.

use alloy::primitives::{hex, U256};
use axum::body::Bytes;
use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};

use crate::blockchain::{GatewayError, GatewayResult};
use crate::http::response::{
    rpc_error, rpc_result, RPC_INTERNAL_ERROR, RPC_INVALID_REQUEST, RPC_PARSE_ERROR,
};
use crate::http::server::AppState;

/// Handle one JSON-RPC request. Always HTTP 200.
pub async fn json_rpc(State(state): State<AppState>, body: Bytes) -> Json<Value> {
    let request: Value = match serde_json::from_slice(&body) {
        Ok(v) => v,
        Err(e) => return Json(rpc_error(RPC_PARSE_ERROR, format!("Parse error: {}", e), Value::Null)),
    };

    let id = request.get("id").cloned().unwrap_or(Value::Null);
    let Some(method) = request.get("method").and_then(Value::as_str) else {
        return Json(rpc_error(RPC_INVALID_REQUEST, "Invalid request: missing method", id));
    };
    let params = match request.get("params") {
        None | Some(Value::Null) => json!([]),
        Some(p) => p.clone(),
    };

    tracing::info!(method = method, "JSON-RPC call");

    match dispatch(&state, method, params).await {
        Ok(result) => Json(rpc_result(result, id)),
        Err(e) => {
            tracing::warn!(method = method, kind = e.kind(), error = %e, "JSON-RPC call failed");
            Json(rpc_error(RPC_INTERNAL_ERROR, e.to_string(), id))
        }
    }
}

async fn dispatch(state: &AppState, method: &str, params: Value) -> GatewayResult<Value> {
    match method {
        "personal_newAccount" => {
            let password = params.get(0).and_then(Value::as_str);
            let address = state.signer.keystore().create(password).await?;
            Ok(json!(address.to_string()))
        }
        "eth_sendTransaction" => send_transaction(state, &params).await,
        "personal_unlockAccount" | "personal_lockAccount" => Ok(json!(true)),
        "personal_listAccounts" => {
            let accounts: Vec<String> = state
                .signer
                .keystore()
                .list_accounts()?
                .into_iter()
                .map(hex::encode_prefixed)
                .collect();
            Ok(json!(accounts))
        }
        _ => state.signer.rpc().call(method, params).await,
    }
}

async fn send_transaction(state: &AppState, params: &Value) -> GatewayResult<Value> {
    let tx = params
        .get(0)
        .and_then(Value::as_object)
        .ok_or_else(|| GatewayError::Validation("Missing transaction object".to_string()))?;

    let field = |name: &str| tx.get(name).and_then(Value::as_str);
    let (Some(from), Some(to)) = (field("from"), field("to")) else {
        return Err(GatewayError::Validation("Missing required fields".to_string()));
    };
    let password = field("password")
        .ok_or_else(|| GatewayError::Validation("Missing password".to_string()))?;
    let value = parse_hex_wei(field("value"))?;

    let hash = state
        .signer
        .send_transaction_wei(from, password, to, value)
        .await?;
    Ok(json!(hash))
}

/// Parse a hex wei value (`0x`-prefixed or bare hex digits).
fn parse_hex_wei(value: Option<&str>) -> GatewayResult<U256> {
    let text = value.ok_or_else(GatewayError::invalid_amount)?;
    let digits = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .unwrap_or(text);
    U256::from_str_radix(digits, 16).map_err(|_| GatewayError::invalid_amount())
}
