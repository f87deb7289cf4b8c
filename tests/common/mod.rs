//! Shared utilities for integration tests: a scripted Ethereum node and a
//! gateway instance wired to it.

#![allow(dead_code)]

use axum::{extract::State, routing::post, Json, Router};
use keystore_gateway::config::GatewayConfig;
use keystore_gateway::{HttpServer, Shutdown};
use serde_json::{json, Value};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

pub const PASSWORD: &str = "correct horse battery staple";
pub const RECIPIENT: &str = "0x70997970C51812dc3A010C7d01b50e0d17dc79C8";
pub const TX_HASH: &str = "0x88df016429689c079f3b2f6ad39fa052532c56795b733da78a91ebe6a713944b";

struct NodeState {
    nonce: String,
    gas_price: String,
    send_reply: Result<Value, (i64, String)>,
    calls: Vec<(String, Value)>,
}

/// In-process JSON-RPC node with programmable answers.
#[derive(Clone)]
pub struct MockNode {
    state: Arc<Mutex<NodeState>>,
    pub url: String,
}

impl MockNode {
    pub fn set_nonce(&self, nonce: &str) {
        self.state.lock().unwrap().nonce = nonce.to_string();
    }

    pub fn set_gas_price(&self, gas_price: &str) {
        self.state.lock().unwrap().gas_price = gas_price.to_string();
    }

    pub fn set_send_result(&self, result: Value) {
        self.state.lock().unwrap().send_reply = Ok(result);
    }

    pub fn set_send_error(&self, code: i64, message: &str) {
        self.state.lock().unwrap().send_reply = Err((code, message.to_string()));
    }

    /// Every `(method, params)` the node has seen, oldest first.
    pub fn calls(&self) -> Vec<(String, Value)> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Raw transactions submitted through `eth_sendRawTransaction`.
    pub fn raw_transactions(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|(method, _)| method == "eth_sendRawTransaction")
            .filter_map(|(_, params)| params[0].as_str().map(str::to_string))
            .collect()
    }
}

async fn node_handler(State(node): State<MockNode>, Json(request): Json<Value>) -> Json<Value> {
    let id = request["id"].clone();
    let method = request["method"].as_str().unwrap_or_default().to_string();
    let params = request["params"].clone();

    let mut state = node.state.lock().unwrap();
    state.calls.push((method.clone(), params));

    let reply = match method.as_str() {
        "eth_getTransactionCount" => Ok(json!(state.nonce)),
        "eth_gasPrice" => Ok(json!(state.gas_price)),
        "eth_sendRawTransaction" => state.send_reply.clone(),
        "eth_blockNumber" => Ok(json!("0x10")),
        "eth_chainId" => Ok(json!("0x539")),
        other => Err((-32601, format!("the method {} does not exist/is not available", other))),
    };

    Json(match reply {
        Ok(result) => json!({ "jsonrpc": "2.0", "id": id, "result": result }),
        Err((code, message)) => json!({
            "jsonrpc": "2.0",
            "id": id,
            "error": { "code": code, "message": message },
        }),
    })
}

/// Start a mock node on an ephemeral port.
pub async fn start_mock_node() -> MockNode {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let node = MockNode {
        state: Arc::new(Mutex::new(NodeState {
            nonce: "0x5".to_string(),
            gas_price: "0x3b9aca00".to_string(),
            send_reply: Ok(json!(TX_HASH)),
            calls: Vec::new(),
        })),
        url: format!("http://{}", addr),
    };

    let app = Router::new()
        .route("/", post(node_handler))
        .with_state(node.clone());
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    node
}

/// A running gateway; shuts down when dropped.
pub struct TestGateway {
    pub url: String,
    pub client: reqwest::Client,
    shutdown: Shutdown,
}

impl TestGateway {
    pub async fn post(&self, path: &str, body: Value) -> (u16, Value) {
        let res = self
            .client
            .post(format!("{}{}", self.url, path))
            .json(&body)
            .send()
            .await
            .expect("gateway unreachable");
        let status = res.status().as_u16();
        (status, res.json().await.unwrap_or(Value::Null))
    }

    pub async fn post_raw(&self, path: &str, body: &'static str) -> (u16, Value) {
        let res = self
            .client
            .post(format!("{}{}", self.url, path))
            .header("content-type", "application/json")
            .body(body)
            .send()
            .await
            .expect("gateway unreachable");
        let status = res.status().as_u16();
        (status, res.json().await.unwrap_or(Value::Null))
    }

    pub async fn get(&self, path: &str) -> (u16, Value) {
        let res = self
            .client
            .get(format!("{}{}", self.url, path))
            .send()
            .await
            .expect("gateway unreachable");
        let status = res.status().as_u16();
        (status, res.json().await.unwrap_or(Value::Null))
    }

    /// Call the JSON-RPC endpoint and return the whole envelope.
    pub async fn rpc(&self, method: &str, params: Value) -> Value {
        let (status, body) = self
            .post("/", json!({ "jsonrpc": "2.0", "method": method, "params": params, "id": 7 }))
            .await;
        assert_eq!(status, 200, "JSON-RPC must always answer 200");
        body
    }
}

impl Drop for TestGateway {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Start a gateway against `node_url` storing keys under `keystore_dir`.
pub async fn start_gateway(
    node_url: &str,
    keystore_dir: &Path,
    configure: impl FnOnce(&mut GatewayConfig),
) -> TestGateway {
    let mut config = GatewayConfig::default();
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config.keystore.dir = keystore_dir.to_path_buf();
    config.chain.rpc_url = node_url.to_string();
    config.chain.chain_id = 1337;
    configure(&mut config);

    let listener = TcpListener::bind(&config.listener.bind_address).await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let server = HttpServer::new(config);
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    let client = reqwest::Client::builder().no_proxy().build().unwrap();
    TestGateway {
        url: format!("http://{}", addr),
        client,
        shutdown,
    }
}
