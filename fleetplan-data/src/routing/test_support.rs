//! Test utilities for routing providers.
//!
//! This module provides [`CannedServer`], a loopback HTTP server that answers
//! each incoming request with the next pre-configured response, so that
//! [`OsrmProvider`](super::OsrmProvider) can be exercised end to end without
//! a running OSRM service.

use std::io::{self, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

/// One canned HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CannedResponse {
    status: u16,
    body: String,
    delay: Duration,
}

impl CannedResponse {
    /// A `200 OK` response carrying `body` as JSON.
    #[must_use]
    pub fn json(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
            delay: Duration::ZERO,
        }
    }

    /// Replace the status code.
    #[must_use]
    pub const fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    /// Hold the response back for `delay` after the request arrives.
    #[must_use]
    pub const fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// Loopback HTTP server replaying [`CannedResponse`]s in order.
///
/// Each response answers exactly one connection. The server thread exits
/// after the last response has been sent.
///
/// # Example
///
/// ```
/// use fleetplan_data::routing::test_support::{CannedResponse, CannedServer};
///
/// let server = CannedServer::start(vec![CannedResponse::json(r#"{"code":"Ok"}"#)])?;
/// assert!(server.base_url().starts_with("http://127.0.0.1:"));
/// # Ok::<(), std::io::Error>(())
/// ```
#[derive(Debug)]
pub struct CannedServer {
    base_url: String,
    requests: Arc<Mutex<Vec<String>>>,
}

impl CannedServer {
    /// Bind to an ephemeral loopback port and start serving `responses`.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener cannot be bound.
    pub fn start(responses: Vec<CannedResponse>) -> io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0")?;
        let base_url = format!("http://{}", listener.local_addr()?);
        let requests = Arc::new(Mutex::new(Vec::new()));
        let recorded = Arc::clone(&requests);

        thread::spawn(move || {
            for response in responses {
                let Ok((stream, _)) = listener.accept() else {
                    return;
                };
                serve(stream, &response, &recorded);
            }
        });

        Ok(Self { base_url, requests })
    }

    /// Base URL of the server, without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Request targets (path and query) received so far, in order.
    #[must_use]
    pub fn requests(&self) -> Vec<String> {
        self.requests
            .lock()
            .map(|log| log.clone())
            .unwrap_or_default()
    }
}

/// Answer one connection, recording its request target before replying.
fn serve(mut stream: TcpStream, response: &CannedResponse, log: &Mutex<Vec<String>>) {
    let Some(head) = read_head(&mut stream) else {
        return;
    };
    let target = head
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1));
    if let (Some(target), Ok(mut requests)) = (target, log.lock()) {
        requests.push(target.to_owned());
    }

    thread::sleep(response.delay);
    let reply = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\
         Connection: close\r\n\r\n{}",
        response.status,
        reason(response.status),
        response.body.len(),
        response.body
    );
    // The client may have given up already; a failed write is expected then.
    let _ = stream.write_all(reply.as_bytes());
    let _ = stream.flush();
}

fn read_head(stream: &mut TcpStream) -> Option<String> {
    let mut head = Vec::new();
    let mut chunk = [0_u8; 1024];
    while !head.windows(4).any(|window| window == b"\r\n\r\n") {
        let read = stream.read(&mut chunk).ok()?;
        if read == 0 {
            break;
        }
        head.extend_from_slice(chunk.get(..read)?);
    }
    String::from_utf8(head).ok()
}

const fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        400 => "Bad Request",
        404 => "Not Found",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Unknown",
    }
}
