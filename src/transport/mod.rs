//! Transport subsystem.
//!
//! # Data Flow
//! ```text
//! Client::call
//!     → resolver.rs (host/port, re-read per call)
//!     → http.rs (permit → dial → POST envelope → read body, all under one deadline)
//!     → TransportResponse | TransportError
//! ```
//!
//! # Design Decisions
//! - Exactly one HTTP request per call, never retried
//! - Dial has its own short timeout so unreachable endpoints fail fast
//! - Non-2xx and truncated bodies are transport failures, not application errors

pub mod http;
pub mod resolver;

pub use http::{HttpTransport, TransportError, TransportResponse};
pub use resolver::{ApiAddress, ApiResolver, EnvResolver, StaticResolver};
