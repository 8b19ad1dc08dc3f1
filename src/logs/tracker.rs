//! In-flight flush tracking for graceful shutdown.
//!
//! # Responsibilities
//! - Count background flush tasks that have been scheduled but not finished
//! - Count completed flushes for observation
//! - Let the host wait for the count to reach zero before exiting

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Tracks background flushes.
///
/// Clones share the same counters.
#[derive(Debug, Clone, Default)]
pub struct FlushTracker {
    in_flight: Arc<AtomicU64>,
    completed: Arc<AtomicU64>,
}

impl FlushTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new scheduled flush. Returns a guard that marks it finished on drop.
    pub fn track(&self) -> FlushGuard {
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        FlushGuard {
            tracker: self.clone(),
        }
    }

    /// Flushes scheduled and not yet finished.
    pub fn in_flight(&self) -> u64 {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Flushes that have finished, successfully or not.
    pub fn completed(&self) -> u64 {
        self.completed.load(Ordering::SeqCst)
    }

    /// Wait until nothing is in flight. Returns false if `timeout` elapsed first.
    pub async fn drain(&self, timeout: Duration) -> bool {
        let wait = async {
            while self.in_flight() > 0 {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        };
        tokio::time::timeout(timeout, wait).await.is_ok()
    }
}

/// Guard for one scheduled flush.
#[derive(Debug)]
pub struct FlushGuard {
    tracker: FlushTracker,
}

impl Drop for FlushGuard {
    fn drop(&mut self) {
        self.tracker.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.tracker.completed.fetch_add(1, Ordering::SeqCst);
        tracing::trace!(in_flight = self.tracker.in_flight(), "Log flush finished");
    }
}
