//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with REST and JSON-RPC handlers
//! - Wire up middleware (request ID, tracing, timeout, body limit, metrics)
//! - Serve on a bound listener until shutdown is signalled

use axum::{
    extract::{MatchedPath, Request},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{limit::RequestBodyLimitLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::blockchain::{HttpTransport, KeystoreStore, RpcTransport, TransferSigner};
use crate::config::GatewayConfig;
use crate::http::{handlers, request, rpc};
use crate::observability::metrics;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub signer: TransferSigner,
    pub config: Arc<GatewayConfig>,
}

/// HTTP front end of the gateway.
pub struct HttpServer {
    router: Router,
    config: Arc<GatewayConfig>,
}

impl HttpServer {
    /// Create a server talking to the node at `config.chain.rpc_url`.
    pub fn new(config: GatewayConfig) -> Self {
        let transport = Arc::new(HttpTransport::new(config.chain.rpc_url.clone()));
        Self::with_transport(config, transport)
    }

    /// Create a server with an explicit upstream transport.
    pub fn with_transport(config: GatewayConfig, transport: Arc<dyn RpcTransport>) -> Self {
        let config = Arc::new(config);
        let keystore = KeystoreStore::new(&config.keystore.dir);
        let signer = TransferSigner::new(keystore, transport, config.chain.clone());

        let state = AppState {
            signer,
            config: config.clone(),
        };

        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &GatewayConfig, state: AppState) -> Router {
        Router::new()
            .route("/", post(rpc::json_rpc))
            .route("/create_account", post(handlers::create_account))
            .route("/send_transaction", post(handlers::send_transaction))
            .route("/accounts", get(handlers::list_accounts))
            .route("/health", get(handlers::health))
            .route_layer(middleware::from_fn(track_requests))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(RequestBodyLimitLayer::new(config.limits.max_body_size))
            .layer(TraceLayer::new_for_http().make_span_with(request::make_request_span))
            .layer(request::propagate_request_id_layer())
            .layer(request::set_request_id_layer())
    }

    /// The configured router, for serving or in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            chain_id = self.config.chain.chain_id,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Count and time every routed request.
async fn track_requests(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let endpoint = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());

    let response = next.run(request).await;
    metrics::record_request(&endpoint, response.status().as_u16(), start);
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::{GatewayError, GatewayResult};
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request as HttpRequest, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    struct Offline;

    #[async_trait]
    impl RpcTransport for Offline {
        async fn call(&self, _method: &str, _params: Value) -> GatewayResult<Value> {
            Err(GatewayError::Transport("offline".to_string()))
        }
    }

    fn server(dir: &std::path::Path) -> HttpServer {
        let mut config = GatewayConfig::default();
        config.keystore.dir = dir.to_path_buf();
        config.limits.max_body_size = 64;
        HttpServer::with_transport(config, Arc::new(Offline))
    }

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_accounts_empty_dir() {
        let dir = tempfile::tempdir().unwrap();
        let response = server(dir.path())
            .router()
            .oneshot(HttpRequest::get("/accounts").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key(request::X_REQUEST_ID));
        assert_eq!(body_json(response).await, json!({ "accounts": [] }));
    }

    #[tokio::test]
    async fn test_forwarding_failure_is_rpc_error() {
        let dir = tempfile::tempdir().unwrap();
        let request = HttpRequest::post("/")
            .body(Body::from(r#"{"jsonrpc":"2.0","method":"eth_chainId","id":1}"#))
            .unwrap();
        let response = server(dir.path()).router().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], -32603);
        assert_eq!(body["error"]["message"], "Transport error: offline");
        assert_eq!(body["id"], 1);
    }

    #[tokio::test]
    async fn test_body_limit() {
        let dir = tempfile::tempdir().unwrap();
        let request = HttpRequest::post("/create_account")
            .header("content-length", "200")
            .body(Body::from("x".repeat(200)))
            .unwrap();
        let response = server(dir.path()).router().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }
}
