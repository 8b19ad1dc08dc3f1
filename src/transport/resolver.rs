//! API endpoint discovery.
//!
//! # Responsibilities
//! - Resolve the API host and port for every call
//! - Production: read the process environment at call time, never cached
//! - Tests and embedders: inject a fixed address

use std::env;
use std::fmt;
use std::net::SocketAddr;

use crate::config::ApiConfig;

/// Host and port of the API endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiAddress {
    pub host: String,
    pub port: String,
}

impl ApiAddress {
    pub fn new(host: impl Into<String>, port: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: port.into(),
        }
    }

    /// URL for `path` on this endpoint.
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self, path)
    }
}

impl From<SocketAddr> for ApiAddress {
    fn from(addr: SocketAddr) -> Self {
        Self::new(addr.ip().to_string(), addr.port().to_string())
    }
}

impl fmt::Display for ApiAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

/// Source of the API endpoint address.
pub trait ApiResolver: Send + Sync + fmt::Debug {
    fn resolve(&self) -> ApiAddress;
}

/// Reads host and port from environment variables on every call.
#[derive(Debug, Clone)]
pub struct EnvResolver {
    host_env: String,
    port_env: String,
    default: ApiAddress,
}

impl EnvResolver {
    pub fn new(config: &ApiConfig) -> Self {
        Self {
            host_env: config.host_env.clone(),
            port_env: config.port_env.clone(),
            default: ApiAddress::new(config.default_host.clone(), config.default_port.clone()),
        }
    }
}

impl ApiResolver for EnvResolver {
    fn resolve(&self) -> ApiAddress {
        let read = |name: &str, fallback: &str| match env::var(name) {
            Ok(value) if !value.is_empty() => value,
            _ => fallback.to_string(),
        };
        ApiAddress {
            host: read(&self.host_env, &self.default.host),
            port: read(&self.port_env, &self.default.port),
        }
    }
}

/// Always resolves to the same address.
#[derive(Debug, Clone)]
pub struct StaticResolver(ApiAddress);

impl StaticResolver {
    pub fn new(address: impl Into<ApiAddress>) -> Self {
        Self(address.into())
    }
}

impl ApiResolver for StaticResolver {
    fn resolve(&self) -> ApiAddress {
        self.0.clone()
    }
}
