//! Remote API envelope messages.
//!
//! Field numbers follow the proto2 layout spoken by the API endpoint, so
//! these types interoperate with any other client of the same bridge.

use std::fmt;

/// Outbound call envelope.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Request {
    #[prost(string, required, tag = "2")]
    pub service_name: String,
    #[prost(string, required, tag = "3")]
    pub method: String,
    /// Encoded request message for `service_name.method`.
    #[prost(bytes = "vec", required, tag = "4")]
    pub request: Vec<u8>,
    /// Security ticket of the calling context.
    #[prost(string, optional, tag = "5")]
    pub request_id: Option<String>,
}

/// Reply envelope. Exactly one of `response` / `rpc_error` is meaningful.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Response {
    #[prost(bytes = "vec", optional, tag = "1")]
    pub response: Option<Vec<u8>>,
    #[prost(message, optional, tag = "5")]
    pub rpc_error: Option<RpcError>,
}

/// Structured failure reported by the API endpoint.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RpcError {
    #[prost(int32, required, tag = "1")]
    pub code: i32,
    #[prost(string, optional, tag = "2")]
    pub detail: Option<String>,
}

/// Error codes carried by [`RpcError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum ErrorCode {
    Unknown = 0,
    CallNotFound = 1,
    ParseError = 2,
    SecurityViolation = 3,
    OverQuota = 4,
    RequestTooLarge = 5,
    CapabilityDisabled = 6,
    FeatureDisabled = 7,
    BadRequest = 8,
    ResponseTooLarge = 9,
    Cancelled = 10,
    ReplayError = 11,
    DeadlineExceeded = 12,
}

impl ErrorCode {
    /// Map a raw wire value; values outside the table collapse to `Unknown`.
    pub fn from_wire(value: i32) -> Self {
        Self::try_from(value).unwrap_or(Self::Unknown)
    }

    /// Raw wire value.
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Canonical upper-case name, used in logs and metric labels.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::Unknown => "UNKNOWN",
            ErrorCode::CallNotFound => "CALL_NOT_FOUND",
            ErrorCode::ParseError => "PARSE_ERROR",
            ErrorCode::SecurityViolation => "SECURITY_VIOLATION",
            ErrorCode::OverQuota => "OVER_QUOTA",
            ErrorCode::RequestTooLarge => "REQUEST_TOO_LARGE",
            ErrorCode::CapabilityDisabled => "CAPABILITY_DISABLED",
            ErrorCode::FeatureDisabled => "FEATURE_DISABLED",
            ErrorCode::BadRequest => "BAD_REQUEST",
            ErrorCode::ResponseTooLarge => "RESPONSE_TOO_LARGE",
            ErrorCode::Cancelled => "CANCELLED",
            ErrorCode::ReplayError => "REPLAY_ERROR",
            ErrorCode::DeadlineExceeded => "DEADLINE_EXCEEDED",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_wire_codes_collapse() {
        assert_eq!(ErrorCode::from_wire(4), ErrorCode::OverQuota);
        assert_eq!(ErrorCode::from_wire(10), ErrorCode::Cancelled);
        assert_eq!(ErrorCode::from_wire(99), ErrorCode::Unknown);
        assert_eq!(ErrorCode::from_wire(-1), ErrorCode::Unknown);
    }

    #[test]
    fn display_uses_canonical_name() {
        assert_eq!(ErrorCode::SecurityViolation.to_string(), "SECURITY_VIOLATION");
        assert_eq!(ErrorCode::BadRequest.as_i32(), 8);
    }
}
