//! General-purpose payload messages shared by many API methods.

/// A single optional string.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct StringProto {
    #[prost(string, optional, tag = "1")]
    pub value: Option<String>,
}

impl StringProto {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: Some(value.into()),
        }
    }
}

/// Empty message for methods without a meaningful request or reply.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct VoidProto {}
