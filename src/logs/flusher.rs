//! Background log flushing.
//!
//! # Responsibilities
//! - Drain a request's log buffer when its response is written
//! - Ship the records through the regular call path to the flush method
//! - Swallow failures: flushing is best-effort

use std::sync::Arc;
use std::time::Duration;

use prost::Message;

use crate::client::{CallOptions, Client};
use crate::config::LogConfig;
use crate::context::{Context, LogRecord};
use crate::envelope::base::VoidProto;
use crate::envelope::log::{FlushRequest, UserAppLogGroup, UserAppLogLine};
use crate::logs::tracker::{FlushGuard, FlushTracker};
use crate::observability::metrics;

/// Schedules log flushes for finished requests.
#[derive(Debug, Clone)]
pub struct LogFlusher {
    client: Client,
    tracker: FlushTracker,
    service: Arc<str>,
    method: Arc<str>,
    timeout: Duration,
}

impl LogFlusher {
    pub fn new(client: Client, config: &LogConfig) -> Self {
        Self {
            client,
            tracker: FlushTracker::new(),
            service: Arc::from(config.flush_service.as_str()),
            method: Arc::from(config.flush_method.as_str()),
            timeout: config.flush_timeout(),
        }
    }

    pub fn tracker(&self) -> &FlushTracker {
        &self.tracker
    }

    /// Take the context's buffered records for a flush.
    ///
    /// Returns `None` when nothing was logged. The flush does not start until
    /// the returned value is spawned (or dropped inside a response body).
    pub fn prepare(&self, ctx: &Context) -> Option<PendingFlush> {
        let records = ctx.begin_flush();
        if records.is_empty() {
            return None;
        }
        Some(PendingFlush {
            flusher: self.clone(),
            ctx: ctx.clone(),
            records,
            _guard: self.tracker.track(),
        })
    }
}

/// A drained batch of records waiting to be shipped.
#[derive(Debug)]
pub struct PendingFlush {
    flusher: LogFlusher,
    ctx: Context,
    records: Vec<LogRecord>,
    _guard: FlushGuard,
}

impl PendingFlush {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Run the flush on the current runtime without waiting for it.
    pub fn spawn(self) {
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(self.run());
            }
            Err(_) => {
                tracing::warn!(lines = self.len(), "No runtime for log flush; dropping records");
                self.ctx.finish_flush();
            }
        }
    }

    /// Ship the records and wait for the flush call to return.
    pub async fn run(self) {
        let lines = self.records.len();
        let request = encode_flush(&self.records);
        let result = self
            .flusher
            .client
            .call::<_, VoidProto>(
                &self.ctx.detached(),
                &self.flusher.service,
                &self.flusher.method,
                &request,
                CallOptions::with_timeout(self.flusher.timeout),
            )
            .await;

        match result {
            Ok(_) => {
                tracing::debug!(lines, trace_id = %self.ctx.trace_id(), "Flushed request logs");
                metrics::record_flush("ok", lines);
            }
            Err(e) => {
                tracing::warn!(
                    lines,
                    trace_id = %self.ctx.trace_id(),
                    code = %e.code,
                    detail = %e.detail,
                    "Log flush failed"
                );
                metrics::record_flush("error", lines);
            }
        }
        self.ctx.finish_flush();
    }
}

/// Build the flush method's request from buffered records.
pub fn encode_flush(records: &[LogRecord]) -> FlushRequest {
    let group = UserAppLogGroup {
        log_line: records
            .iter()
            .map(|r| UserAppLogLine {
                timestamp_usec: r.timestamp_usec,
                level: r.level.as_i64(),
                message: r.message.clone(),
            })
            .collect(),
    };
    FlushRequest {
        logs: Some(group.encode_to_vec()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BridgeConfig;
    use crate::context::{FlushState, LogLevel};
    use crate::transport::{ApiAddress, StaticResolver};

    fn flusher() -> LogFlusher {
        let resolver = Arc::new(StaticResolver::new(ApiAddress::new("127.0.0.1", "1")));
        let config = BridgeConfig::default();
        LogFlusher::new(Client::new(&config, resolver).unwrap(), &config.logs)
    }

    #[test]
    fn nothing_logged_means_no_flush() {
        let flusher = flusher();
        let ctx = Context::new("t", "trace");
        assert!(flusher.prepare(&ctx).is_none());
        assert_eq!(flusher.tracker().in_flight(), 0);
    }

    #[test]
    fn prepare_drains_and_tracks() {
        let flusher = flusher();
        let ctx = Context::new("t", "trace");
        ctx.info("It's a lovely day.");

        let pending = flusher.prepare(&ctx).unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(ctx.pending_logs(), 0);
        assert_eq!(ctx.flush_state(), FlushState::Flushing);
        assert_eq!(flusher.tracker().in_flight(), 1);

        drop(pending);
        assert_eq!(flusher.tracker().in_flight(), 0);
    }

    #[tokio::test]
    async fn failed_flush_is_swallowed_and_returns_to_buffering() {
        let flusher = flusher();
        let ctx = Context::new("t", "trace");
        ctx.error("boom");

        flusher.prepare(&ctx).unwrap().run().await;
        assert_eq!(ctx.flush_state(), FlushState::Buffering);
        assert_eq!(flusher.tracker().completed(), 1);
    }

    #[test]
    fn records_are_encoded_in_order() {
        let records = vec![
            LogRecord {
                timestamp_usec: 1,
                level: LogLevel::Info,
                message: "a".into(),
            },
            LogRecord {
                timestamp_usec: 2,
                level: LogLevel::Critical,
                message: "b".into(),
            },
        ];
        let request = encode_flush(&records);
        let group = UserAppLogGroup::decode(request.logs.unwrap().as_slice()).unwrap();
        assert_eq!(group.log_line.len(), 2);
        assert_eq!(group.log_line[0].message, "a");
        assert_eq!(group.log_line[1].level, 4);
    }
}
