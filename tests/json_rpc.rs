//! End-to-end tests for the JSON-RPC endpoint.

use alloy::consensus::{Transaction, TxEnvelope};
use alloy::eips::eip2718::Decodable2718;
use alloy::primitives::{hex, U256};
use serde_json::json;

mod common;
use common::{PASSWORD, RECIPIENT, TX_HASH};

#[tokio::test]
async fn test_new_account_and_list() {
    let node = common::start_mock_node().await;
    let dir = tempfile::tempdir().unwrap();
    let gateway = common::start_gateway(&node.url, dir.path(), |_| {}).await;

    let reply = gateway.rpc("personal_newAccount", json!([PASSWORD])).await;
    assert_eq!(reply["jsonrpc"], "2.0");
    assert_eq!(reply["id"], 7);
    let address = reply["result"].as_str().unwrap().to_string();
    assert_eq!(address.len(), 42);

    let reply = gateway.rpc("personal_listAccounts", json!([])).await;
    assert_eq!(reply["result"], json!([address.to_lowercase()]));
    assert!(node.calls().is_empty());
}

#[tokio::test]
async fn test_new_account_without_password_is_error() {
    let node = common::start_mock_node().await;
    let dir = tempfile::tempdir().unwrap();
    let gateway = common::start_gateway(&node.url, dir.path(), |_| {}).await;

    let reply = gateway.rpc("personal_newAccount", json!([])).await;
    assert_eq!(reply["error"]["code"], -32603);
    assert_eq!(reply["error"]["message"], "Password cannot be empty");
    assert!(reply.get("result").is_none());
}

#[tokio::test]
async fn test_lock_and_unlock_always_succeed() {
    let node = common::start_mock_node().await;
    let dir = tempfile::tempdir().unwrap();
    let gateway = common::start_gateway(&node.url, dir.path(), |_| {}).await;

    let reply = gateway
        .rpc("personal_unlockAccount", json!([RECIPIENT, "anything", 300]))
        .await;
    assert_eq!(reply["result"], true);

    let reply = gateway.rpc("personal_lockAccount", json!([RECIPIENT])).await;
    assert_eq!(reply["result"], true);
}

#[tokio::test]
async fn test_send_transaction_with_hex_value() {
    let node = common::start_mock_node().await;
    let dir = tempfile::tempdir().unwrap();
    let gateway = common::start_gateway(&node.url, dir.path(), |_| {}).await;

    let from = gateway.rpc("personal_newAccount", json!([PASSWORD])).await["result"]
        .as_str()
        .unwrap()
        .to_string();

    let reply = gateway
        .rpc(
            "eth_sendTransaction",
            json!([{ "from": from, "to": RECIPIENT, "value": "0xde0b6b3a7640000", "password": PASSWORD }]),
        )
        .await;
    assert_eq!(reply["result"], TX_HASH, "unexpected reply: {}", reply);

    let raw = node.raw_transactions();
    let bytes = hex::decode(&raw[0]).unwrap();
    let tx = TxEnvelope::decode_2718(&mut bytes.as_slice()).unwrap();
    assert_eq!(tx.value(), U256::from(1_000_000_000_000_000_000u128));
    assert_eq!(tx.nonce(), 5);
}

#[tokio::test]
async fn test_send_transaction_errors_use_envelope() {
    let node = common::start_mock_node().await;
    let dir = tempfile::tempdir().unwrap();
    let gateway = common::start_gateway(&node.url, dir.path(), |_| {}).await;

    let reply = gateway
        .rpc(
            "eth_sendTransaction",
            json!([{ "from": RECIPIENT, "to": "bogus", "value": "0x1", "password": PASSWORD }]),
        )
        .await;
    assert_eq!(reply["error"]["code"], -32603);
    assert_eq!(reply["error"]["message"], "invalid recipient");

    let reply = gateway
        .rpc(
            "eth_sendTransaction",
            json!([{ "from": RECIPIENT, "to": RECIPIENT, "value": "0x1" }]),
        )
        .await;
    assert_eq!(reply["error"]["code"], -32603);
    assert!(node.raw_transactions().is_empty());
}

#[tokio::test]
async fn test_unknown_methods_are_forwarded() {
    let node = common::start_mock_node().await;
    let dir = tempfile::tempdir().unwrap();
    let gateway = common::start_gateway(&node.url, dir.path(), |_| {}).await;

    let reply = gateway.rpc("eth_blockNumber", json!([])).await;
    assert_eq!(reply["result"], "0x10");
    assert_eq!(reply["id"], 7);

    let reply = gateway.rpc("eth_getBalance", json!([RECIPIENT, "latest"])).await;
    assert_eq!(reply["error"]["code"], -32603);
    assert!(reply["error"]["message"]
        .as_str()
        .unwrap()
        .contains("eth_getBalance"));

    let calls = node.calls();
    assert_eq!(calls[0].0, "eth_blockNumber");
    assert_eq!(calls[1], ("eth_getBalance".to_string(), json!([RECIPIENT, "latest"])));
}

#[tokio::test]
async fn test_malformed_requests() {
    let node = common::start_mock_node().await;
    let dir = tempfile::tempdir().unwrap();
    let gateway = common::start_gateway(&node.url, dir.path(), |_| {}).await;

    let (status, reply) = gateway.post_raw("/", "{not json").await;
    assert_eq!(status, 200);
    assert_eq!(reply["error"]["code"], -32700);
    assert_eq!(reply["id"], serde_json::Value::Null);

    let (status, reply) = gateway.post("/", json!({ "jsonrpc": "2.0", "id": 3 })).await;
    assert_eq!(status, 200);
    assert_eq!(reply["error"]["code"], -32600);
    assert_eq!(reply["id"], 3);
}
