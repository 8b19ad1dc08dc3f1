//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the bridge.
//! All types derive Serde traits for deserialization from config files.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration for the service bridge.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct BridgeConfig {
    /// Inbound listener used by the demo host.
    pub listener: ListenerConfig,

    /// API endpoint discovery and call policy.
    pub api: ApiConfig,

    /// Header names shared between the inbound hook and outbound calls.
    pub headers: HeaderConfig,

    /// Request log buffering and flushing.
    pub logs: LogConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Inbound request deadline in seconds; 0 disables the deadline.
    pub request_timeout_secs: u64,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            request_timeout_secs: 60,
        }
    }
}

impl ListenerConfig {
    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_secs > 0).then(|| Duration::from_secs(self.request_timeout_secs))
    }
}

/// API endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Host used when the host variable is unset or empty.
    pub default_host: String,

    /// Port used when the port variable is unset or empty.
    pub default_port: String,

    /// Environment variable holding the API host.
    pub host_env: String,

    /// Environment variable holding the API port.
    pub port_env: String,

    /// HTTP path every call is posted to.
    pub path: String,

    /// Timeout for calls that do not set one, in milliseconds.
    pub default_timeout_ms: u64,

    /// Upper bound on name resolution plus TCP connect, in milliseconds.
    pub dial_timeout_ms: u64,

    /// Maximum calls in flight at once.
    pub max_concurrent_calls: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            default_host: "appengine.googleapis.internal".to_string(),
            default_port: "10001".to_string(),
            host_env: "API_HOST".to_string(),
            port_env: "API_PORT".to_string(),
            path: "/rpc_http".to_string(),
            default_timeout_ms: 60_000,
            dial_timeout_ms: 500,
            max_concurrent_calls: 100,
        }
    }
}

impl ApiConfig {
    pub fn default_timeout(&self) -> Duration {
        Duration::from_millis(self.default_timeout_ms)
    }

    pub fn dial_timeout(&self) -> Duration {
        Duration::from_millis(self.dial_timeout_ms)
    }
}

/// Header names. Kept in config so embedders and tests can rename them.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HeaderConfig {
    /// Carries the security ticket, inbound and outbound.
    pub ticket: String,

    /// Carries the trace id, inbound and outbound.
    pub trace: String,

    /// Reports how many log flushes a response triggered.
    pub flush_count: String,

    /// Client IP as seen by the front end.
    pub user_ip: String,

    /// Client address fallback when no user IP is present.
    pub remote_addr: String,
}

impl Default for HeaderConfig {
    fn default() -> Self {
        Self {
            ticket: "X-AppEngine-API-Ticket".to_string(),
            trace: "X-Google-DapperTraceInfo".to_string(),
            flush_count: "X-AppEngine-Log-Flush-Count".to_string(),
            user_ip: "X-AppEngine-User-IP".to_string(),
            remote_addr: "X-AppEngine-Remote-Addr".to_string(),
        }
    }
}

/// Log buffering configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LogConfig {
    /// Service name of the flush method.
    pub flush_service: String,

    /// Method name of the flush method.
    pub flush_method: String,

    /// Timeout for a single flush call, in milliseconds.
    pub flush_timeout_ms: u64,

    /// Messages longer than this are truncated.
    pub max_message_bytes: usize,

    /// How long shutdown waits for in-flight flushes, in milliseconds.
    pub drain_timeout_ms: u64,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            flush_service: "logservice".to_string(),
            flush_method: "Flush".to_string(),
            flush_timeout_ms: 5_000,
            max_message_bytes: 8 * 1024,
            drain_timeout_ms: 2_000,
        }
    }
}

impl LogConfig {
    pub fn flush_timeout(&self) -> Duration {
        Duration::from_millis(self.flush_timeout_ms)
    }

    pub fn drain_timeout(&self) -> Duration {
        Duration::from_millis(self.drain_timeout_ms)
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Filter directive used when RUST_LOG is unset.
    pub log_filter: String,

    /// Emit JSON log lines instead of the human format.
    pub json_logs: bool,

    /// Serve Prometheus metrics.
    pub metrics_enabled: bool,

    /// Metrics listener address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_filter: "service_bridge=info,tower_http=info".to_string(),
            json_logs: false,
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
