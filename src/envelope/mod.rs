//! Envelope subsystem.
//!
//! # Data Flow
//! ```text
//! Outbound call:
//!     typed message → codec.rs (encode_request) → wire::Request bytes → transport
//!
//! Inbound reply:
//!     transport body → codec.rs (decode_response) → Reply::Payload | Reply::Error
//! ```
//!
//! # Design Decisions
//! - Wire messages are protobuf, declared with prost derives (no build step)
//! - Structural parsing only; success/error interpretation belongs to the client
//! - `Reply` makes "payload and error at once" unrepresentable

pub mod base;
pub mod codec;
pub mod log;
pub mod wire;

pub use codec::{decode_request, decode_response, encode_reply, encode_request, CodecError, Reply};
pub use wire::ErrorCode;
