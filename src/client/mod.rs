//! API call orchestration.
//!
//! # Data Flow
//! ```text
//! Client::call(ctx, service, method, request, options)
//!     → effective timeout (options, else default; clamped to ctx deadline)
//!     → envelope::encode_request (request_id = ctx ticket)
//!     → headers (ticket, trace id, routing, deadline)
//!     → transport (resolve address, POST, read body)
//!     → envelope::decode_response
//!     → Reply::Payload → typed response | Reply::Error → CallError
//! ```
//!
//! # Design Decisions
//! - One error shape (`CallError`) for every failure
//! - No retries; every failure is terminal for the call
//! - The client holds no per-call state and is shared freely across tasks

pub mod error;

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderMap, HeaderValue};
use prost::Message;

use crate::config::validation::validate_config;
use crate::config::{BridgeConfig, ConfigError};
use crate::context::{Context, HeaderNames};
use crate::envelope::{self, ErrorCode, Reply};
use crate::observability::metrics;
use crate::transport::http::{
    ENVELOPE_CONTENT_TYPE, SERVICE_DEADLINE_HEADER, SERVICE_ENDPOINT, SERVICE_ENDPOINT_HEADER,
    SERVICE_METHOD, SERVICE_METHOD_HEADER,
};
use crate::transport::{ApiResolver, EnvResolver, HttpTransport};

pub use error::CallError;

/// Per-call options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallOptions {
    /// Overrides the configured default timeout.
    pub timeout: Option<Duration>,
}

impl CallOptions {
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout: Some(timeout),
        }
    }
}

/// Entry point for API calls.
#[derive(Debug, Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

#[derive(Debug)]
struct ClientInner {
    transport: HttpTransport,
    resolver: Arc<dyn ApiResolver>,
    headers: HeaderNames,
    default_timeout: Duration,
}

impl Client {
    /// Validates `config` before building anything from it.
    pub fn new(config: &BridgeConfig, resolver: Arc<dyn ApiResolver>) -> Result<Self, ConfigError> {
        validate_config(config).map_err(ConfigError::Validation)?;
        let headers = HeaderNames::from_config(&config.headers)?;
        let transport = HttpTransport::new(&config.api)?;
        Ok(Self {
            inner: Arc::new(ClientInner {
                transport,
                resolver,
                headers,
                default_timeout: config.api.default_timeout(),
            }),
        })
    }

    /// Client that discovers the endpoint from the process environment.
    pub fn from_env(config: &BridgeConfig) -> Result<Self, ConfigError> {
        Self::new(config, Arc::new(EnvResolver::new(&config.api)))
    }

    pub fn header_names(&self) -> &HeaderNames {
        &self.inner.headers
    }

    /// Invoke `service.method` with `request` on behalf of `ctx`.
    pub async fn call<Req, Res>(
        &self,
        ctx: &Context,
        service: &str,
        method: &str,
        request: &Req,
        options: CallOptions,
    ) -> Result<Res, CallError>
    where
        Req: Message,
        Res: Message + Default,
    {
        let start = Instant::now();
        let result = self.round_trip(ctx, service, method, request, options).await;

        match &result {
            Ok(_) => {
                tracing::trace!(service, method, elapsed = ?start.elapsed(), "API call succeeded");
                metrics::record_call(service, method, "OK", start);
            }
            Err(e) => {
                tracing::debug!(
                    service,
                    method,
                    code = %e.code,
                    detail = %e.detail,
                    elapsed = ?start.elapsed(),
                    "API call failed"
                );
                metrics::record_call(service, method, e.code.as_str(), start);
            }
        }
        result
    }

    async fn round_trip<Req, Res>(
        &self,
        ctx: &Context,
        service: &str,
        method: &str,
        request: &Req,
        options: CallOptions,
    ) -> Result<Res, CallError>
    where
        Req: Message,
        Res: Message + Default,
    {
        let timeout = self.effective_timeout(ctx, options)?;
        let headers = self.outbound_headers(ctx, timeout)?;
        let body = envelope::encode_request(service, method, ctx.ticket(), request);
        let address = self.inner.resolver.resolve();

        let response = self.inner.transport.send(&address, headers, body, timeout).await?;

        match envelope::decode_response(&response.body)? {
            Reply::Payload(payload) => Res::decode(payload).map_err(|e| {
                CallError::new(
                    ErrorCode::Unknown,
                    format!("failed decoding {service}.{method} response: {e}"),
                )
            }),
            Reply::Error { code, detail } => Err(CallError::new(code, detail)),
        }
    }

    fn effective_timeout(&self, ctx: &Context, options: CallOptions) -> Result<Duration, CallError> {
        let timeout = options.timeout.unwrap_or(self.inner.default_timeout);
        match ctx.remaining() {
            None => Ok(timeout),
            Some(remaining) if remaining.is_zero() => {
                Err(CallError::cancelled("request deadline passed before the call was made"))
            }
            Some(remaining) => Ok(timeout.min(remaining)),
        }
    }

    fn outbound_headers(&self, ctx: &Context, timeout: Duration) -> Result<HeaderMap, CallError> {
        let value = |raw: &str, what: &str| {
            HeaderValue::from_str(raw)
                .map_err(|_| CallError::new(ErrorCode::BadRequest, format!("{what} is not a valid header value")))
        };

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(ENVELOPE_CONTENT_TYPE));
        headers.insert(SERVICE_ENDPOINT_HEADER, HeaderValue::from_static(SERVICE_ENDPOINT));
        headers.insert(SERVICE_METHOD_HEADER, HeaderValue::from_static(SERVICE_METHOD));
        headers.insert(SERVICE_DEADLINE_HEADER, value(&timeout.as_secs_f64().to_string(), "deadline")?);
        headers.insert(self.inner.headers.ticket.clone(), value(ctx.ticket(), "security ticket")?);
        headers.insert(self.inner.headers.trace.clone(), value(ctx.trace_id(), "trace id")?);
        Ok(headers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::StaticResolver;

    fn client() -> Client {
        let resolver = Arc::new(StaticResolver::new(crate::transport::ApiAddress::new("127.0.0.1", "1")));
        Client::new(&BridgeConfig::default(), resolver).unwrap()
    }

    #[test]
    fn timeout_defaults_and_clamps_to_deadline() {
        let client = client();
        let ctx = Context::new("t", "trace");
        assert_eq!(client.effective_timeout(&ctx, CallOptions::default()).unwrap(), Duration::from_secs(60));

        let opts = CallOptions::with_timeout(Duration::from_millis(100));
        assert_eq!(client.effective_timeout(&ctx, opts).unwrap(), Duration::from_millis(100));

        let near = ctx.clone().with_deadline(Instant::now() + Duration::from_millis(50));
        assert!(client.effective_timeout(&near, opts).unwrap() <= Duration::from_millis(50));
    }

    #[tokio::test]
    async fn expired_deadline_never_reaches_the_network() {
        let client = client();
        let ctx = Context::new("t", "trace").with_deadline(Instant::now());

        let err = client
            .call::<_, envelope::base::VoidProto>(&ctx, "foo", "bar", &envelope::base::VoidProto {}, CallOptions::default())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Cancelled);
        assert!(err.is_timeout());
    }

    #[test]
    fn ticket_and_trace_are_copied_verbatim() {
        let client = client();
        let ctx = Context::new("s3cr3t", "trace-001");
        let headers = client.outbound_headers(&ctx, Duration::from_millis(1500)).unwrap();

        assert_eq!(headers["x-appengine-api-ticket"], "s3cr3t");
        assert_eq!(headers["x-google-dappertraceinfo"], "trace-001");
        assert_eq!(headers[SERVICE_DEADLINE_HEADER], "1.5");
        assert_eq!(headers[CONTENT_TYPE], ENVELOPE_CONTENT_TYPE);
    }

    #[test]
    fn invalid_config_is_rejected_up_front() {
        let mut config = BridgeConfig::default();
        config.api.max_concurrent_calls = 0;
        let resolver = Arc::new(StaticResolver::new(crate::transport::ApiAddress::new("127.0.0.1", "1")));

        match Client::new(&config, resolver) {
            Err(ConfigError::Validation(errors)) => {
                assert_eq!(errors.len(), 1);
                assert_eq!(errors[0].field, "api.max_concurrent_calls");
            }
            other => panic!("expected a validation error, got {other:?}"),
        }
    }

    #[test]
    fn unrepresentable_ticket_is_a_bad_request() {
        let client = client();
        let ctx = Context::new("line\nbreak", "trace");
        let err = client.outbound_headers(&ctx, Duration::from_secs(1)).unwrap_err();
        assert_eq!(err.code, ErrorCode::BadRequest);
    }
}
