//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! client / logs / http produce:
//!     → logging.rs (tracing subscriber, structured events)
//!     → metrics.rs (call and flush counters, latency histogram)
//! ```
//!
//! # Design Decisions
//! - Application log records (Context) are separate from the bridge's own tracing output
//! - Trace id is attached as a field to every application log mirrored into tracing

pub mod logging;
pub mod metrics;
