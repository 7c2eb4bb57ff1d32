//! Minimal HTTP/1.1 server for integration tests.
//!
//! Serves one body for every path. HEAD answers with Content-Length and the
//! current ETag, or with a fixed failure status when one is set; GET answers with the next scripted status (200 once the script
//! is exhausted). Counts requests and remembers the last request head.

use std::collections::VecDeque;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

#[derive(Default)]
struct State {
    body: Mutex<Vec<u8>>,
    etag: Mutex<Option<String>>,
    get_script: Mutex<VecDeque<u16>>,
    head_status: Mutex<Option<u16>>,
    get_delay: Mutex<Duration>,
    last_request: Mutex<String>,
    gets: AtomicUsize,
    heads: AtomicUsize,
}

/// Handle to a running server. The server lives until the process exits.
#[derive(Clone)]
pub struct TestServer {
    base: String,
    state: Arc<State>,
}

impl TestServer {
    /// Start serving `body` on an ephemeral loopback port.
    pub fn start(body: Vec<u8>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let port = listener.local_addr().unwrap().port();
        let state = Arc::new(State::default());
        *state.body.lock().unwrap() = body;
        let st = Arc::clone(&state);
        thread::spawn(move || {
            for stream in listener.incoming().flatten() {
                let st = Arc::clone(&st);
                thread::spawn(move || handle(stream, &st));
            }
        });
        Self {
            base: format!("http://127.0.0.1:{}", port),
            state,
        }
    }

    /// Full URL for `path` (e.g. "/files/a.bin").
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    pub fn set_etag(&self, etag: Option<&str>) {
        *self.state.etag.lock().unwrap() = etag.map(str::to_string);
    }

    pub fn set_body(&self, body: Vec<u8>) {
        *self.state.body.lock().unwrap() = body;
    }

    /// Statuses returned by the next GETs, in order.
    pub fn script_get_statuses(&self, statuses: &[u16]) {
        self.state.get_script.lock().unwrap().extend(statuses.iter().copied());
    }

    /// Answer every HEAD with `status` (e.g. 405) instead of 200; `None` restores 200.
    pub fn set_head_status(&self, status: Option<u16>) {
        *self.state.head_status.lock().unwrap() = status;
    }

    /// Sleep before answering each GET (keeps a download in flight).
    pub fn set_get_delay(&self, delay: Duration) {
        *self.state.get_delay.lock().unwrap() = delay;
    }

    pub fn gets(&self) -> usize {
        self.state.gets.load(Ordering::SeqCst)
    }

    pub fn heads(&self) -> usize {
        self.state.heads.load(Ordering::SeqCst)
    }

    /// Raw head (request line and headers) of the most recent request.
    pub fn last_request(&self) -> String {
        self.state.last_request.lock().unwrap().clone()
    }
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        404 => "Not Found",
        405 => "Method Not Allowed",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Status",
    }
}

fn read_head(stream: &mut TcpStream) -> Option<String> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        match stream.read(&mut chunk) {
            Ok(0) | Err(_) => return None,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
    }
    String::from_utf8(buf).ok()
}

fn handle(mut stream: TcpStream, state: &State) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(5)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(5)));
    let Some(request) = read_head(&mut stream) else {
        return;
    };
    let method = request.split_whitespace().next().unwrap_or("").to_string();
    *state.last_request.lock().unwrap() = request;

    let body = state.body.lock().unwrap().clone();
    let etag_header = state
        .etag
        .lock()
        .unwrap()
        .as_ref()
        .map(|e| format!("ETag: \"{}\"\r\n", e))
        .unwrap_or_default();

    if method.eq_ignore_ascii_case("HEAD") {
        state.heads.fetch_add(1, Ordering::SeqCst);
        if let Some(status) = *state.head_status.lock().unwrap() {
            let response = format!(
                "HTTP/1.1 {} {}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
                status,
                reason(status)
            );
            let _ = stream.write_all(response.as_bytes());
            return;
        }
        let response = format!(
            "HTTP/1.1 200 OK\r\nContent-Length: {}\r\n{}Connection: close\r\n\r\n",
            body.len(),
            etag_header
        );
        let _ = stream.write_all(response.as_bytes());
        return;
    }

    if method.eq_ignore_ascii_case("GET") {
        state.gets.fetch_add(1, Ordering::SeqCst);
        let status = state.get_script.lock().unwrap().pop_front().unwrap_or(200);
        let delay = *state.get_delay.lock().unwrap();
        if !delay.is_zero() {
            thread::sleep(delay);
        }
        let payload: &[u8] = if status == 200 { &body } else { b"error page" };
        let response = format!(
            "HTTP/1.1 {} {}\r\nContent-Length: {}\r\n{}Connection: close\r\n\r\n",
            status,
            reason(status),
            payload.len(),
            etag_header
        );
        let _ = stream.write_all(response.as_bytes());
        let _ = stream.write_all(payload);
        return;
    }

    let _ = stream.write_all(b"HTTP/1.1 405 Method Not Allowed\r\nContent-Length: 0\r\nConnection: close\r\n\r\n");
}
