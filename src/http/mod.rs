//! HTTP host hook subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound request
//!     → middleware/context.rs (Context + RemoteAddr into extensions)
//!     → application handler (logs, API calls via Client)
//!     → middleware/context.rs (prepare flush, flush-count header, wrap body)
//!     → server writes response, body dropped → background flush
//! ```

pub mod middleware;
pub mod server;

pub use middleware::{api_context_middleware, BridgeState};
pub use server::HttpServer;
