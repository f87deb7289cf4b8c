//! Keystore gateway server.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client (REST / JSON-RPC)
//!     ───────────────────────┐
//!                            ▼
//!                     ┌─────────────┐
//!                     │    http     │  request id, trace, limits, metrics
//!                     │  handlers   │
//!                     └──────┬──────┘
//!                            │
//!              ┌─────────────┴─────────────┐
//!              ▼                           ▼
//!       ┌─────────────┐            ┌──────────────┐
//!       │  keystore   │◀───────────│ transaction  │
//!       │ UTC--files  │  decrypt   │ sign + send  │
//!       └─────────────┘            └──────┬───────┘
//!                                         │ JSON-RPC
//!                                         ▼
//!                                  ┌──────────────┐
//!                                  │    client    │────▶ Ethereum node
//!                                  └──────────────┘
//! ```

use clap::Parser;
use std::path::PathBuf;

use keystore_gateway::config::loader::{config_path, ENV_CHAIN};
use keystore_gateway::config::{build_config, read_file_config};
use keystore_gateway::lifecycle::{signals, startup};
use keystore_gateway::observability::logging;
use keystore_gateway::{HttpServer, Shutdown};

#[derive(Parser)]
#[command(name = "keystore-gateway")]
#[command(about = "HTTP gateway for keystore-backed Ethereum transfers", long_about = None)]
struct Args {
    /// Config file (YAML or TOML). GATEWAY_CONFIG takes precedence.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Named chain entry to use from the config file.
    #[arg(long, env = ENV_CHAIN)]
    chain: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let path = config_path(args.config.as_deref());

    // Parse the file first: it carries the logging settings. Everything the
    // loader reports happens in build_config, after the subscriber exists.
    let file = match read_file_config(&path) {
        Ok(file) => file,
        Err(e) => {
            eprintln!("Failed to load configuration from {}: {}", path.display(), e);
            return Err(e.into());
        }
    };
    let observability = file
        .as_ref()
        .and_then(|f| f.observability.clone())
        .unwrap_or_default();
    logging::init_logging(&observability);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config_path = %path.display(),
        "keystore-gateway starting"
    );

    let config = match build_config(&path, file.as_ref(), args.chain.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Failed to load configuration");
            return Err(e.into());
        }
    };

    let listener = startup::prepare(&config).await?;

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    signals::forward_signals(&shutdown);

    let server = HttpServer::new(config);
    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
