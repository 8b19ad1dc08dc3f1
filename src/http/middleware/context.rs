//! Per-request bridge middleware.
//! Builds the request Context and hands its logs to the flusher once the response is out.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::{Body, HttpBody},
    extract::State,
    http::{header::CONTENT_LENGTH, HeaderValue, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::context::remote_addr::resolve_remote_addr;
use crate::context::{Context, HeaderNames};
use crate::logs::{FlushOnDrop, LogFlusher};

/// State shared by every request passing through [`api_context_middleware`].
#[derive(Debug, Clone)]
pub struct BridgeState {
    pub headers: Arc<HeaderNames>,
    pub flusher: LogFlusher,
    /// Deadline given to each request's Context.
    pub request_timeout: Option<Duration>,
    pub max_message_bytes: usize,
}

/// Extra time a handler gets past its Context deadline before it is cut off.
pub const HANDLER_GRACE: Duration = Duration::from_secs(1);

pub async fn api_context_middleware(
    State(state): State<BridgeState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let names = &state.headers;

    let mut ctx = Context::from_headers(req.headers(), names).with_max_message_bytes(state.max_message_bytes);
    if let Some(timeout) = state.request_timeout {
        ctx = ctx.with_deadline(Instant::now() + timeout);
    }

    // Front-end address headers are consumed here; the application sees RemoteAddr.
    let remote_addr = resolve_remote_addr(req.headers(), names);
    req.headers_mut().remove(&names.user_ip);
    req.headers_mut().remove(&names.remote_addr);

    tracing::debug!(
        remote_addr = %remote_addr.as_str(),
        trace_id = %ctx.trace_id(),
        path = %req.uri().path(),
        "Inbound request"
    );

    req.extensions_mut().insert(ctx.clone());
    req.extensions_mut().insert(remote_addr);

    // The cutoff lives here, not in an outer layer, so the flush below always runs.
    let response = match state.request_timeout {
        Some(timeout) => match tokio::time::timeout(timeout + HANDLER_GRACE, next.run(req)).await {
            Ok(response) => response,
            Err(_) => {
                ctx.warning(format!("Request exceeded its {}s deadline", timeout.as_secs()));
                StatusCode::REQUEST_TIMEOUT.into_response()
            }
        },
        None => next.run(req).await,
    };

    let pending = state.flusher.prepare(&ctx);
    let flushes = u32::from(pending.is_some());

    let (mut parts, body) = response.into_parts();
    parts.headers.insert(names.flush_count.clone(), HeaderValue::from(flushes));

    let body = match pending {
        Some(pending) => {
            // The stream wrapper loses the exact length; keep it on the header.
            if let Some(len) = body.size_hint().exact() {
                parts.headers.entry(CONTENT_LENGTH).or_insert(HeaderValue::from(len));
            }
            Body::from_stream(FlushOnDrop::new(body.into_data_stream(), pending))
        }
        None => body,
    };
    Response::from_parts(parts, body)
}
