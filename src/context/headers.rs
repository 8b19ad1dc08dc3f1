//! Parsed header names.

use axum::http::HeaderName;

use crate::config::validation::parse_header_name;
use crate::config::{ConfigError, HeaderConfig};

/// Header names from [`HeaderConfig`], parsed once.
#[derive(Debug, Clone)]
pub struct HeaderNames {
    pub ticket: HeaderName,
    pub trace: HeaderName,
    pub flush_count: HeaderName,
    pub user_ip: HeaderName,
    pub remote_addr: HeaderName,
}

impl HeaderNames {
    pub fn from_config(config: &HeaderConfig) -> Result<Self, ConfigError> {
        let parsed = [
            parse_header_name("headers.ticket", &config.ticket),
            parse_header_name("headers.trace", &config.trace),
            parse_header_name("headers.flush_count", &config.flush_count),
            parse_header_name("headers.user_ip", &config.user_ip),
            parse_header_name("headers.remote_addr", &config.remote_addr),
        ];

        match parsed {
            [Ok(ticket), Ok(trace), Ok(flush_count), Ok(user_ip), Ok(remote_addr)] => Ok(Self {
                ticket,
                trace,
                flush_count,
                user_ip,
                remote_addr,
            }),
            parsed => Err(ConfigError::Validation(
                parsed.into_iter().filter_map(Result::err).collect(),
            )),
        }
    }
}

impl Default for HeaderNames {
    fn default() -> Self {
        Self {
            ticket: HeaderName::from_static("x-appengine-api-ticket"),
            trace: HeaderName::from_static("x-google-dappertraceinfo"),
            flush_count: HeaderName::from_static("x-appengine-log-flush-count"),
            user_ip: HeaderName::from_static("x-appengine-user-ip"),
            remote_addr: HeaderName::from_static("x-appengine-remote-addr"),
        }
    }
}
