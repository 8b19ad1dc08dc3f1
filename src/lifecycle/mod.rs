//! Lifecycle management.
//!
//! # Data Flow
//! ```text
//! Ctrl+C / test trigger
//!     → Shutdown broadcast
//!     → HttpServer stops accepting, finishes in-flight requests
//!     → pending log flushes drained (bounded by logs.drain_timeout_ms)
//! ```

pub mod shutdown;

pub use shutdown::Shutdown;
