//! HTTP transport to the API endpoint.
//!
//! # Responsibilities
//! - POST one envelope per call to the configured path
//! - Bound the whole exchange by the call timeout
//! - Bound dialing (name resolution + connect) independently of the call timeout
//! - Classify failures: timeouts vs. everything else

use std::sync::Arc;
use std::time::Duration;

use axum::http::{HeaderMap, HeaderName, StatusCode};
use bytes::Bytes;
use thiserror::Error;
use tokio::sync::Semaphore;

use crate::config::ApiConfig;
use crate::transport::resolver::ApiAddress;

/// Content type of request and reply envelopes.
pub const ENVELOPE_CONTENT_TYPE: &str = "application/octet-stream";

/// Routing headers expected by the API endpoint.
pub const SERVICE_ENDPOINT_HEADER: HeaderName = HeaderName::from_static("x-google-rpc-service-endpoint");
pub const SERVICE_ENDPOINT: &str = "app-engine-apis";
pub const SERVICE_METHOD_HEADER: HeaderName = HeaderName::from_static("x-google-rpc-service-method");
pub const SERVICE_METHOD: &str = "/VMRemoteAPI.CallRemoteAPI";
/// Call timeout in (fractional) seconds.
pub const SERVICE_DEADLINE_HEADER: HeaderName = HeaderName::from_static("x-google-rpc-service-deadline");

/// Transport-level failures.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("call timed out after {0:?}")]
    Timeout(Duration),

    #[error("dial timed out: {0}")]
    DialTimeout(#[source] reqwest::Error),

    #[error("connect failed: {0}")]
    Connect(#[source] reqwest::Error),

    #[error("unexpected HTTP status {0}")]
    Status(u16),

    #[error("short body: read {read} of {declared} declared bytes")]
    ShortBody { declared: u64, read: usize },

    #[error("HTTP exchange failed: {0}")]
    Http(#[source] reqwest::Error),

    #[error("failed to build HTTP client: {0}")]
    Build(#[source] reqwest::Error),

    #[error("transport is shut down")]
    Closed,
}

impl TransportError {
    /// True when the call was aborted by a deadline rather than a response.
    pub fn is_timeout(&self) -> bool {
        matches!(self, TransportError::Timeout(_) | TransportError::DialTimeout(_))
    }
}

fn classify(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::DialTimeout(err)
    } else if err.is_connect() {
        TransportError::Connect(err)
    } else {
        TransportError::Http(err)
    }
}

/// A successful (2xx, complete body) exchange.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: StatusCode,
    pub body: Bytes,
}

impl TransportResponse {
    pub fn bytes_read(&self) -> usize {
        self.body.len()
    }
}

/// Pooled HTTP client for envelope exchanges.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    path: String,
    permits: Arc<Semaphore>,
}

impl HttpTransport {
    pub fn new(config: &ApiConfig) -> Result<Self, TransportError> {
        // connect_timeout covers DNS as well as the TCP handshake.
        let client = reqwest::Client::builder()
            .connect_timeout(config.dial_timeout())
            .no_proxy()
            .build()
            .map_err(TransportError::Build)?;

        Ok(Self {
            client,
            path: config.path.clone(),
            permits: Arc::new(Semaphore::new(config.max_concurrent_calls)),
        })
    }

    /// Send `body` to `address` and return the reply body.
    ///
    /// Waiting for a concurrency permit counts against `timeout`.
    pub async fn send(
        &self,
        address: &ApiAddress,
        headers: HeaderMap,
        body: Bytes,
        timeout: Duration,
    ) -> Result<TransportResponse, TransportError> {
        let url = address.url(&self.path);
        match tokio::time::timeout(timeout, self.exchange(&url, headers, body)).await {
            Ok(result) => result,
            Err(_) => {
                tracing::debug!(url = %url, timeout = ?timeout, "API call deadline elapsed");
                Err(TransportError::Timeout(timeout))
            }
        }
    }

    async fn exchange(&self, url: &str, headers: HeaderMap, body: Bytes) -> Result<TransportResponse, TransportError> {
        let _permit = self.permits.acquire().await.map_err(|_| TransportError::Closed)?;

        let response = self
            .client
            .post(url)
            .headers(headers)
            .body(body)
            .send()
            .await
            .map_err(classify)?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status(status.as_u16()));
        }

        let declared = response.content_length();
        let body = response.bytes().await.map_err(classify)?;
        if let Some(declared) = declared {
            if (body.len() as u64) < declared {
                return Err(TransportError::ShortBody {
                    declared,
                    read: body.len(),
                });
            }
        }

        tracing::trace!(url = %url, status = %status, bytes = body.len(), "API exchange complete");
        Ok(TransportResponse { status, body })
    }
}
