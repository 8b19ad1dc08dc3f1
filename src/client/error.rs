//! The single error shape returned by API calls.

use thiserror::Error;

use crate::envelope::{CodecError, ErrorCode};
use crate::transport::TransportError;

/// Failure of one API call, whether reported by the endpoint or synthesized locally.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("API call failed with {code}: {detail}")]
pub struct CallError {
    pub code: ErrorCode,
    pub detail: String,
    /// Set when a local deadline, not the endpoint, ended the call.
    pub timeout: bool,
}

impl CallError {
    pub fn new(code: ErrorCode, detail: impl Into<String>) -> Self {
        Self {
            code,
            detail: detail.into(),
            timeout: false,
        }
    }

    pub fn cancelled(detail: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::Cancelled,
            detail: detail.into(),
            timeout: true,
        }
    }

    pub fn is_timeout(&self) -> bool {
        self.timeout
    }
}

impl From<TransportError> for CallError {
    fn from(err: TransportError) -> Self {
        if err.is_timeout() {
            CallError::cancelled(err.to_string())
        } else {
            CallError::new(ErrorCode::Unknown, format!("service bridge HTTP failed: {err}"))
        }
    }
}

impl From<CodecError> for CallError {
    fn from(err: CodecError) -> Self {
        CallError::new(ErrorCode::Unknown, err.to_string())
    }
}
