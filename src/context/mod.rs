//! Per-request context.
//!
//! # Data Flow
//! ```text
//! Inbound request headers
//!     → headers.rs (configured ticket / trace header names)
//!     → Context::from_headers (ticket, trace id, deadline, empty log buffer)
//!     → remote_addr.rs (client address normalisation)
//!     → extract.rs (handlers receive the Context)
//!
//! Application code:
//!     ctx.info(..) → log buffer (memory only)
//!     client.call(&ctx, ..) → ticket + trace id on the outbound call
//! ```
//!
//! # Design Decisions
//! - Missing headers yield empty values; the API endpoint rejects them
//! - Ticket and trace id are immutable after construction
//! - Logging never performs I/O; records are shipped by the flush scheduler

pub mod extract;
pub mod headers;
pub mod remote_addr;

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use axum::http::{HeaderMap, HeaderName};

pub use headers::HeaderNames;
pub use remote_addr::RemoteAddr;

/// Default cap on a single log message, in bytes.
pub const DEFAULT_MAX_MESSAGE_BYTES: usize = 8 * 1024;

/// Severity of an application log record, as understood by the log service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogLevel {
    Debug = 0,
    Info = 1,
    Warning = 2,
    Error = 3,
    Critical = 4,
}

impl LogLevel {
    pub fn as_i64(self) -> i64 {
        self as i64
    }
}

/// One buffered application log line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    /// Microseconds since the Unix epoch.
    pub timestamp_usec: i64,
    pub level: LogLevel,
    pub message: String,
}

/// Whether a context's logs are still accumulating or being shipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushState {
    Buffering,
    Flushing,
}

#[derive(Debug)]
struct LogBuffer {
    records: Vec<LogRecord>,
    state: FlushState,
}

impl Default for LogBuffer {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            state: FlushState::Buffering,
        }
    }
}

/// State for one inbound request.
///
/// Clones share the log buffer.
#[derive(Clone)]
pub struct Context {
    ticket: Arc<str>,
    trace_id: Arc<str>,
    deadline: Option<Instant>,
    logs: Arc<Mutex<LogBuffer>>,
    max_message_bytes: usize,
}

impl Context {
    pub fn new(ticket: impl Into<String>, trace_id: impl Into<String>) -> Self {
        Self {
            ticket: Arc::from(ticket.into()),
            trace_id: Arc::from(trace_id.into()),
            deadline: None,
            logs: Arc::default(),
            max_message_bytes: DEFAULT_MAX_MESSAGE_BYTES,
        }
    }

    /// Seed a context from inbound headers. Absent or non-UTF-8 values become empty.
    pub fn from_headers(headers: &HeaderMap, names: &HeaderNames) -> Self {
        let value = |name: &HeaderName| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
                .to_string()
        };
        Self::new(value(&names.ticket), value(&names.trace))
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_max_message_bytes(mut self, max: usize) -> Self {
        self.max_message_bytes = max;
        self
    }

    /// A context with the same credentials, no deadline and its own log buffer.
    ///
    /// Used for work that outlives the request, such as the final log flush.
    pub fn detached(&self) -> Self {
        Self {
            ticket: Arc::clone(&self.ticket),
            trace_id: Arc::clone(&self.trace_id),
            deadline: None,
            logs: Arc::default(),
            max_message_bytes: self.max_message_bytes,
        }
    }

    pub fn ticket(&self) -> &str {
        &self.ticket
    }

    pub fn trace_id(&self) -> &str {
        &self.trace_id
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Time left before the deadline; `None` when there is no deadline.
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }

    pub fn log(&self, level: LogLevel, message: impl Into<String>) {
        let mut message = message.into();
        truncate_on_char_boundary(&mut message, self.max_message_bytes);

        match level {
            LogLevel::Debug => tracing::debug!(trace_id = %self.trace_id, "{}", message),
            LogLevel::Info => tracing::info!(trace_id = %self.trace_id, "{}", message),
            LogLevel::Warning => tracing::warn!(trace_id = %self.trace_id, "{}", message),
            LogLevel::Error => tracing::error!(trace_id = %self.trace_id, "{}", message),
            LogLevel::Critical => tracing::error!(trace_id = %self.trace_id, critical = true, "{}", message),
        }

        self.buffer().records.push(LogRecord {
            timestamp_usec: now_usec(),
            level,
            message,
        });
    }

    pub fn debug(&self, message: impl Into<String>) {
        self.log(LogLevel::Debug, message)
    }

    pub fn info(&self, message: impl Into<String>) {
        self.log(LogLevel::Info, message)
    }

    pub fn warning(&self, message: impl Into<String>) {
        self.log(LogLevel::Warning, message)
    }

    pub fn error(&self, message: impl Into<String>) {
        self.log(LogLevel::Error, message)
    }

    pub fn critical(&self, message: impl Into<String>) {
        self.log(LogLevel::Critical, message)
    }

    /// Number of records waiting for a flush.
    pub fn pending_logs(&self) -> usize {
        self.buffer().records.len()
    }

    pub fn flush_state(&self) -> FlushState {
        self.buffer().state
    }

    /// Drain the buffer for a flush. Moves to `Flushing` only if there was something to drain.
    pub(crate) fn begin_flush(&self) -> Vec<LogRecord> {
        let mut buffer = self.buffer();
        let records = std::mem::take(&mut buffer.records);
        if !records.is_empty() {
            buffer.state = FlushState::Flushing;
        }
        records
    }

    pub(crate) fn finish_flush(&self) {
        self.buffer().state = FlushState::Buffering;
    }

    fn buffer(&self) -> MutexGuard<'_, LogBuffer> {
        self.logs.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("trace_id", &self.trace_id)
            .field("deadline", &self.deadline)
            .field("pending_logs", &self.pending_logs())
            .finish_non_exhaustive()
    }
}

fn now_usec() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_micros() as i64)
        .unwrap_or_default()
}

fn truncate_on_char_boundary(message: &mut String, max: usize) {
    if message.len() <= max {
        return;
    }
    let mut end = max;
    while !message.is_char_boundary(end) {
        end -= 1;
    }
    message.truncate(end);
}
