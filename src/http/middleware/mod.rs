//! HTTP middleware.

pub mod context;

pub use context::{api_context_middleware, BridgeState};
