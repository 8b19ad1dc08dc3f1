//! Envelope encoding and decoding.
//!
//! # Responsibilities
//! - Wrap a typed request message into a [`wire::Request`] envelope
//! - Parse reply bytes into a [`Reply`] (payload or structured error)
//! - Provide the server-side halves for in-process endpoints and test fakes

use bytes::Bytes;
use prost::Message;
use thiserror::Error;

use super::wire::{self, ErrorCode, RpcError};

/// Errors produced while parsing envelopes.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("malformed API response: {0}")]
    MalformedResponse(#[source] prost::DecodeError),

    #[error("malformed API request: {0}")]
    MalformedRequest(#[source] prost::DecodeError),
}

/// Decoded reply envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Success. Empty bytes decode to the zero value of the reply message.
    Payload(Bytes),
    /// Failure reported by the endpoint.
    Error { code: ErrorCode, detail: String },
}

impl Reply {
    pub fn error(code: ErrorCode, detail: impl Into<String>) -> Self {
        Reply::Error {
            code,
            detail: detail.into(),
        }
    }

    /// Success reply carrying `message`.
    pub fn payload<M: Message>(message: &M) -> Self {
        Reply::Payload(Bytes::from(message.encode_to_vec()))
    }
}

/// Build the envelope for `service.method` carrying `message`.
pub fn encode_request<M: Message>(service: &str, method: &str, request_id: &str, message: &M) -> Bytes {
    let envelope = wire::Request {
        service_name: service.to_owned(),
        method: method.to_owned(),
        request: message.encode_to_vec(),
        request_id: Some(request_id.to_owned()),
    };
    Bytes::from(envelope.encode_to_vec())
}

/// Parse a request envelope (endpoint side).
pub fn decode_request(bytes: &[u8]) -> Result<wire::Request, CodecError> {
    wire::Request::decode(bytes).map_err(CodecError::MalformedRequest)
}

/// Encode a reply envelope (endpoint side).
pub fn encode_reply(reply: &Reply) -> Bytes {
    let envelope = match reply {
        Reply::Payload(payload) => wire::Response {
            response: Some(payload.to_vec()),
            rpc_error: None,
        },
        Reply::Error { code, detail } => wire::Response {
            response: None,
            rpc_error: Some(RpcError {
                code: code.as_i32(),
                detail: Some(detail.clone()),
            }),
        },
    };
    Bytes::from(envelope.encode_to_vec())
}

/// Parse a reply envelope.
///
/// An envelope carrying an error always decodes as [`Reply::Error`], even if a
/// payload field is also present.
pub fn decode_response(bytes: &[u8]) -> Result<Reply, CodecError> {
    let envelope = wire::Response::decode(bytes).map_err(CodecError::MalformedResponse)?;
    if let Some(err) = envelope.rpc_error {
        return Ok(Reply::Error {
            code: ErrorCode::from_wire(err.code),
            detail: err.detail.unwrap_or_default(),
        });
    }
    Ok(Reply::Payload(Bytes::from(envelope.response.unwrap_or_default())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::base::{StringProto, VoidProto};

    #[test]
    fn request_carries_routing_and_ticket() {
        let bytes = encode_request("actordb", "LookupActor", "s3cr3t", &StringProto::new("Doctor Who"));
        let req = decode_request(&bytes).unwrap();

        assert_eq!(req.service_name, "actordb");
        assert_eq!(req.method, "LookupActor");
        assert_eq!(req.request_id.as_deref(), Some("s3cr3t"));
        let inner = StringProto::decode(req.request.as_slice()).unwrap();
        assert_eq!(inner.value(), "Doctor Who");
    }

    #[test]
    fn reply_discriminants_survive_the_wire() {
        let empty = Reply::payload(&VoidProto {});
        assert_eq!(decode_response(&encode_reply(&empty)).unwrap(), Reply::Payload(Bytes::new()));

        let full = Reply::payload(&StringProto::new("David Tennant"));
        assert_eq!(decode_response(&encode_reply(&full)).unwrap(), full);

        let failed = Reply::error(ErrorCode::OverQuota, "you are hogging the resources!");
        assert_eq!(decode_response(&encode_reply(&failed)).unwrap(), failed);
    }

    #[test]
    fn error_wins_over_payload() {
        let both = wire::Response {
            response: Some(b"ignored".to_vec()),
            rpc_error: Some(RpcError {
                code: ErrorCode::SecurityViolation.as_i32(),
                detail: Some("bad security ticket".into()),
            }),
        };
        let reply = decode_response(&both.encode_to_vec()).unwrap();
        assert_eq!(reply, Reply::error(ErrorCode::SecurityViolation, "bad security ticket"));
    }

    #[test]
    fn empty_envelope_is_empty_success() {
        assert_eq!(decode_response(&[]).unwrap(), Reply::Payload(Bytes::new()));
    }

    #[test]
    fn garbage_is_malformed() {
        let err = decode_response(b"way too short").unwrap_err();
        assert!(matches!(err, CodecError::MalformedResponse(_)));
    }
}
