//! REST endpoints.

use alloy::primitives::hex;
use axum::body::Bytes;
use axum::extract::State;
use axum::Json;
use serde_json::{json, Map, Value};

use crate::http::request::text_field;
use crate::http::response::ApiError;
use crate::http::server::AppState;

fn json_object(body: &Bytes) -> Result<Map<String, Value>, ApiError> {
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => Ok(map),
        _ => Err(ApiError::bad_request("Request body must be a JSON object")),
    }
}

/// `POST /create_account` with `{password}` → `{address}`.
pub async fn create_account(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let body = json_object(&body)?;
    let password = text_field(&body, "password").ok_or_else(|| ApiError::bad_request("Missing password"))?;

    let address = state.signer.keystore().create(Some(password.as_str())).await?;
    Ok(Json(json!({ "address": address.to_string() })))
}

/// `POST /send_transaction` with `{address, password, to, value}` → `{txHash}`.
pub async fn send_transaction(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let body = json_object(&body)?;
    let (Some(address), Some(password), Some(to), Some(value)) = (
        text_field(&body, "address"),
        text_field(&body, "password"),
        text_field(&body, "to"),
        text_field(&body, "value"),
    ) else {
        return Err(ApiError::bad_request("Missing required fields"));
    };

    let tx_hash = state
        .signer
        .send_transaction(&address, &password, &to, &value)
        .await?;
    Ok(Json(json!({ "txHash": tx_hash })))
}

/// `GET /accounts` → `{accounts: [...]}`, lowercase `0x` addresses.
pub async fn list_accounts(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let accounts: Vec<String> = state
        .signer
        .keystore()
        .list_accounts()?
        .into_iter()
        .map(hex::encode_prefixed)
        .collect();
    Ok(Json(json!({ "accounts": accounts })))
}

/// `GET /health`
pub async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "chain_id": state.config.chain.chain_id,
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
