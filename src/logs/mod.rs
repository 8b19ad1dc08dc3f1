//! Log flush scheduling.
//!
//! # States (per request)
//! ```text
//! Buffering ──(response written, logs present)──▶ Flushing
//! Flushing  ──(flush call returns, ok or not)───▶ Buffering
//! ```
//!
//! # Data Flow
//! ```text
//! middleware, after the handler returns:
//!     → flusher.rs (prepare: drain buffer, count = 0 or 1)
//!     → flush-count header set on the response
//!     → body.rs (body wrapper owns the pending flush)
//! server writes the body, drops it:
//!     → PendingFlush::spawn → Client::call(flush service/method)
//!     → tracker.rs (guard released when the call returns)
//! ```
//!
//! # Design Decisions
//! - The response path never awaits the flush
//! - Flush tasks are tracked so shutdown can drain them

pub mod body;
pub mod flusher;
pub mod tracker;

pub use body::FlushOnDrop;
pub use flusher::{encode_flush, LogFlusher, PendingFlush};
pub use tracker::{FlushGuard, FlushTracker};
