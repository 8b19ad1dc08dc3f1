//! Client address normalisation.
//!
//! The front end reports the client as a bare IP in one of two headers.
//! Handlers expect `host:port`, so a default port is appended when missing.

use axum::http::{HeaderMap, HeaderName};

use super::HeaderNames;

pub const DEFAULT_REMOTE_HOST: &str = "127.0.0.1";
pub const DEFAULT_REMOTE_PORT: &str = "80";

/// The inbound client's address in `host:port` form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteAddr(pub String);

impl RemoteAddr {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Derive the client address from front-end headers.
///
/// User IP wins over remote addr; with neither, the loopback default is used.
pub fn resolve_remote_addr(headers: &HeaderMap, names: &HeaderNames) -> RemoteAddr {
    let header = |name: &HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
    };
    let addr = header(&names.user_ip)
        .or_else(|| header(&names.remote_addr))
        .unwrap_or(DEFAULT_REMOTE_HOST);

    if split_host_port(addr).is_some() {
        RemoteAddr(addr.to_string())
    } else {
        RemoteAddr(join_host_port(addr, DEFAULT_REMOTE_PORT))
    }
}

/// Split `host:port` or `[host]:port`. `None` when `addr` is not in either form.
pub fn split_host_port(addr: &str) -> Option<(&str, &str)> {
    if let Some(rest) = addr.strip_prefix('[') {
        let end = rest.find(']')?;
        let host = &rest[..end];
        let port = rest[end + 1..].strip_prefix(':')?;
        if host.contains('[') || port.contains(']') || port.contains(':') {
            return None;
        }
        return Some((host, port));
    }

    let (host, port) = addr.rsplit_once(':')?;
    if host.contains(':') || host.contains('[') || host.contains(']') || port.contains(']') {
        return None;
    }
    Some((host, port))
}

/// Inverse of [`split_host_port`]; IPv6 literals are bracketed.
pub fn join_host_port(host: &str, port: &str) -> String {
    if host.contains(':') {
        format!("[{host}]:{port}")
    } else {
        format!("{host}:{port}")
    }
}
