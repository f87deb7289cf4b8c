//! Startup orchestration.
//!
//! Config first, then the keystore directory and metrics exporter, then the
//! listener. Any startup error is fatal.

use std::net::SocketAddr;
use tokio::net::TcpListener;

use crate::blockchain::KeystoreStore;
use crate::config::GatewayConfig;
use crate::observability::metrics;

/// Prepare process-wide resources and bind the listener.
pub async fn prepare(config: &GatewayConfig) -> Result<TcpListener, Box<dyn std::error::Error>> {
    let keystore = KeystoreStore::new(&config.keystore.dir);
    keystore.ensure_dir()?;
    tracing::info!(keystore_dir = %keystore.dir().display(), "Keystore directory ready");

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");
    Ok(listener)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_prepare_creates_keystore_dir() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = GatewayConfig::default();
        config.keystore.dir = dir.path().join("nested").join("keys");
        config.listener.bind_address = "127.0.0.1:0".to_string();

        let listener = prepare(&config).await.unwrap();
        assert!(config.keystore.dir.is_dir());
        assert_ne!(listener.local_addr().unwrap().port(), 0);
    }
}
