//! Shared utilities for integration tests: an in-process fake API endpoint.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use prost::Message;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use service_bridge::config::BridgeConfig;
use service_bridge::envelope::base::{StringProto, VoidProto};
use service_bridge::envelope::log::{FlushRequest, UserAppLogGroup};
use service_bridge::envelope::{decode_request, encode_reply, ErrorCode, Reply};
use service_bridge::transport::{ApiAddress, StaticResolver};
use service_bridge::Client;

pub const TICKET_HEADER: &str = "X-Magic-Ticket-Header";
pub const TICKET: &str = "s3cr3t";
pub const TRACE_ID: &str = "trace-001";

/// Handle to a running fake endpoint.
#[derive(Clone)]
pub struct FakeApi {
    pub addr: SocketAddr,
    pub flushes: Arc<AtomicU32>,
    pub flushed_lines: Arc<Mutex<Vec<String>>>,
    pub last_ticket_header: Arc<Mutex<Option<String>>>,
}

impl FakeApi {
    pub fn flush_count(&self) -> u32 {
        self.flushes.load(Ordering::SeqCst)
    }

    pub fn flushed_lines(&self) -> Vec<String> {
        self.flushed_lines.lock().unwrap().clone()
    }
}

/// Bridge config pointing the ticket at the custom test header.
pub fn test_config() -> BridgeConfig {
    let mut config = BridgeConfig::default();
    config.headers.ticket = TICKET_HEADER.to_string();
    config.api.dial_timeout_ms = 200;
    config.logs.drain_timeout_ms = 1_000;
    config
}

pub fn client_for(config: &BridgeConfig, addr: SocketAddr) -> Client {
    let resolver = Arc::new(StaticResolver::new(ApiAddress::from(addr)));
    Client::new(config, resolver).unwrap()
}

/// Start the fake endpoint on an ephemeral port.
pub async fn start_fake_api() -> FakeApi {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let api = FakeApi {
        addr: listener.local_addr().unwrap(),
        flushes: Arc::new(AtomicU32::new(0)),
        flushed_lines: Arc::new(Mutex::new(Vec::new())),
        last_ticket_header: Arc::new(Mutex::new(None)),
    };

    let state = api.clone();
    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((socket, _)) => {
                    let state = state.clone();
                    tokio::spawn(async move {
                        serve_one(socket, state).await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    api
}

struct RawRequest {
    path: String,
    headers: HashMap<String, String>,
    body: Vec<u8>,
}

async fn read_request(socket: &mut TcpStream) -> Option<RawRequest> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let head_end = loop {
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
    };

    let head = String::from_utf8_lossy(&buf[..head_end]).to_string();
    let mut lines = head.split("\r\n");
    let path = lines.next()?.split_whitespace().nth(1)?.to_string();
    let headers: HashMap<String, String> = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(k, v)| (k.trim().to_ascii_lowercase(), v.trim().to_string()))
        .collect();

    let length: usize = headers
        .get("content-length")
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);
    let mut body = buf[head_end..].to_vec();
    while body.len() < length {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        body.extend_from_slice(&chunk[..n]);
    }

    Some(RawRequest { path, headers, body })
}

async fn write_raw(socket: &mut TcpStream, status: &str, content_length: usize, body: &[u8]) {
    let head = format!(
        "HTTP/1.1 {}\r\nContent-Type: application/octet-stream\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        status, content_length
    );
    let _ = socket.write_all(head.as_bytes()).await;
    let _ = socket.write_all(body).await;
    let _ = socket.shutdown().await;
}

async fn write_reply(socket: &mut TcpStream, reply: Reply) {
    let body = encode_reply(&reply);
    write_raw(socket, "200 OK", body.len(), &body).await;
}

async fn serve_one(mut socket: TcpStream, state: FakeApi) {
    let Some(req) = read_request(&mut socket).await else {
        return;
    };

    if req.path != "/rpc_http" {
        write_raw(&mut socket, "404 Not Found", 0, b"").await;
        return;
    }
    let Ok(envelope) = decode_request(&req.body) else {
        write_raw(&mut socket, "500 Internal Server Error", 0, b"").await;
        return;
    };

    *state.last_ticket_header.lock().unwrap() = req.headers.get(&TICKET_HEADER.to_ascii_lowercase()).cloned();

    if envelope.request_id.as_deref() != Some(TICKET) {
        write_reply(&mut socket, Reply::error(ErrorCode::SecurityViolation, "bad security ticket")).await;
        return;
    }
    let trace = req.headers.get("x-google-dappertraceinfo").cloned().unwrap_or_default();
    if trace != TRACE_ID {
        let detail = format!("trace info = {trace:?}, want {TRACE_ID:?}");
        write_reply(&mut socket, Reply::error(ErrorCode::BadRequest, detail)).await;
        return;
    }

    let reply = match (envelope.service_name.as_str(), envelope.method.as_str()) {
        ("actordb", "LookupActor") => {
            let Ok(query) = StringProto::decode(envelope.request.as_slice()) else {
                write_raw(&mut socket, "500 Internal Server Error", 0, b"").await;
                return;
            };
            let mut res = StringProto::default();
            if query.value() == "Doctor Who" {
                res = StringProto::new("David Tennant");
            }
            Reply::payload(&res)
        }
        ("errors", "Non200") => {
            let body = b"I'm a little teapot.";
            write_raw(&mut socket, "418 I'm a teapot", body.len(), body).await;
            return;
        }
        ("errors", "ShortResponse") => {
            write_raw(&mut socket, "200 OK", 100, b"way too short").await;
            return;
        }
        ("errors", "OverQuota") => Reply::error(ErrorCode::OverQuota, "you are hogging the resources!"),
        ("errors", "RunSlowly") => {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Reply::payload(&VoidProto {})
        }
        ("logservice", "Flush") => {
            tokio::time::sleep(Duration::from_millis(50)).await;
            if let Ok(flush) = FlushRequest::decode(envelope.request.as_slice()) {
                let group = UserAppLogGroup::decode(flush.logs.unwrap_or_default().as_slice()).unwrap_or_default();
                let mut lines = state.flushed_lines.lock().unwrap();
                lines.extend(group.log_line.into_iter().map(|line| line.message));
            }
            state.flushes.fetch_add(1, Ordering::SeqCst);
            Reply::payload(&VoidProto {})
        }
        _ => Reply::payload(&VoidProto {}),
    };

    write_reply(&mut socket, reply).await;
}
