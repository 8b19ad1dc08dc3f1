//! Service bridge host (v1)
//!
//! Runs an application behind the bridge: every request gets a Context carrying
//! the platform's security ticket and trace id, API calls go out as envelopes,
//! and request logs are flushed after each response is written.
//!
//! # Architecture Overview
//!
//! ```text
//!                     ┌───────────────────────────────────────────────┐
//!                     │                 SERVICE BRIDGE                │
//!   Inbound request   │  ┌──────────┐   ┌─────────┐   ┌───────────┐   │
//!   ──────────────────┼─▶│   http   │──▶│ context │──▶│ app route │   │
//!                     │  │middleware│   │ + addr  │   └─────┬─────┘   │
//!                     │  └────┬─────┘   └─────────┘         │         │
//!                     │       │                             ▼         │
//!                     │       │                       ┌───────────┐   │      ┌─────────────┐
//!                     │       │                       │  client   │───┼─────▶│ API endpoint│
//!                     │       │                       │ envelope  │   │      │  /rpc_http  │
//!                     │       ▼                       └───────────┘   │      └─────────────┘
//!   Response          │  ┌──────────┐   body dropped  ┌───────────┐   │             ▲
//!   ◀─────────────────┼──│ flush    │────────────────▶│   logs    │───┼─────────────┘
//!                     │  │ count hdr│                 │  flusher  │   │
//!                     │  └──────────┘                 └───────────┘   │
//!                     └───────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use axum::routing::get;
use axum::Router;
use clap::Parser;
use tokio::net::TcpListener;

use service_bridge::config::{load_config, BridgeConfig};
use service_bridge::observability::{logging, metrics};
use service_bridge::{Client, Context, HttpServer, RemoteAddr, Shutdown};

#[derive(Parser, Debug)]
#[command(name = "service-bridge", version, about = "Host an app behind the service bridge")]
struct Args {
    /// Path to a TOML config file. Defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override listener.bind_address.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => BridgeConfig::default(),
    };
    if let Some(bind) = args.bind {
        config.listener.bind_address = bind;
    }

    logging::init_tracing(&config.observability);
    tracing::info!("service-bridge v{} starting", env!("CARGO_PKG_VERSION"));

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let client = Client::from_env(&config)?;
    let listener = TcpListener::bind(&config.listener.bind_address).await?;

    let server = HttpServer::new(config, client, app())?;
    let shutdown = Shutdown::new();
    shutdown.trigger_on_ctrl_c();
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

fn app() -> Router {
    Router::new().route("/", get(hello))
}

async fn hello(ctx: Context, RemoteAddr(addr): RemoteAddr) -> String {
    ctx.info(format!("Request from {addr}"));
    format!("Hello, {addr}\n")
}
