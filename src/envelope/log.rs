//! Log service messages used by the flush path.

/// Payload of `logservice.Flush`: an encoded [`UserAppLogGroup`].
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct FlushRequest {
    #[prost(bytes = "vec", optional, tag = "1")]
    pub logs: Option<Vec<u8>>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct UserAppLogGroup {
    #[prost(message, repeated, tag = "2")]
    pub log_line: Vec<UserAppLogLine>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct UserAppLogLine {
    #[prost(int64, required, tag = "1")]
    pub timestamp_usec: i64,
    #[prost(int64, required, tag = "2")]
    pub level: i64,
    #[prost(string, required, tag = "3")]
    pub message: String,
}
