//! Service bridge library: API calls, per-request context and log flushing for hosted apps.

pub mod client;
pub mod config;
pub mod context;
pub mod envelope;
pub mod http;
pub mod lifecycle;
pub mod logs;
pub mod observability;
pub mod transport;

pub use client::{CallError, CallOptions, Client};
pub use config::schema::BridgeConfig;
pub use context::{Context, LogLevel, RemoteAddr};
pub use envelope::ErrorCode;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
