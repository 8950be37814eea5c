//! Test doubles shared across modules.

use crate::error::{Error, Result};
use crate::ledger::LedgerNode;
use async_trait::async_trait;
use serde_json::{Value, json};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// What the node does once the script runs out.
#[derive(Debug, Clone)]
enum Exhausted {
    Pending,
    Fail,
}

/// A ledger node that replays a fixed script of responses.
#[derive(Debug)]
pub struct ScriptedNode {
    script: Mutex<VecDeque<Result<Value>>>,
    requested: Mutex<Vec<String>>,
    exhausted: Exhausted,
}

impl ScriptedNode {
    pub fn new() -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            requested: Mutex::new(Vec::new()),
            exhausted: Exhausted::Pending,
        }
    }

    /// A node whose every request fails.
    pub fn failing() -> Self {
        Self {
            exhausted: Exhausted::Fail,
            ..Self::new()
        }
    }

    /// Queue `n` not-yet-indexed responses.
    pub fn pending(self, n: usize) -> Self {
        for _ in 0..n {
            self.push(Ok(json!({ "type": "pending_transaction" })));
        }
        self
    }

    /// Queue `n` request failures.
    pub fn errors(self, n: usize) -> Self {
        for _ in 0..n {
            self.push(Err(Error::network("connection reset")));
        }
        self
    }

    pub fn then_body(self, body: Value) -> Self {
        self.push(Ok(body));
        self
    }

    pub fn requests(&self) -> usize {
        self.requested.lock().unwrap().len()
    }

    pub fn requested_hashes(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }

    fn push(&self, response: Result<Value>) {
        self.script.lock().unwrap().push_back(response);
    }
}

#[async_trait]
impl LedgerNode for ScriptedNode {
    async fn transaction_by_hash(&self, hash: &str) -> Result<Value> {
        self.requested.lock().unwrap().push(hash.to_string());

        let next = self.script.lock().unwrap().pop_front();
        match (next, &self.exhausted) {
            (Some(response), _) => response,
            (None, Exhausted::Pending) => Ok(json!({ "type": "pending_transaction" })),
            (None, Exhausted::Fail) => Err(Error::network("node unreachable")),
        }
    }
}

/// Answer a single HTTP request with a canned response and return the
/// base URL to send it to. `status` is the full status line text, e.g.
/// `"404 Not Found"`.
pub async fn serve_once(status: &'static str, body: &'static str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let Ok((mut stream, _)) = listener.accept().await else {
            return;
        };
        read_request(&mut stream).await;

        let mut response = format!("HTTP/1.1 {}\r\nConnection: close\r\n", status);
        if !status.starts_with("204") {
            response.push_str(&format!(
                "Content-Type: text/plain\r\nContent-Length: {}\r\n",
                body.len()
            ));
        }
        response.push_str("\r\n");
        response.push_str(body);

        let _ = stream.write_all(response.as_bytes()).await;
        let _ = stream.shutdown().await;
    });

    format!("http://{}", addr)
}

/// Consume headers and any `Content-Length` body.
async fn read_request(stream: &mut TcpStream) {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        let n = match stream.read(&mut chunk).await {
            Ok(0) | Err(_) => return,
            Ok(n) => n,
        };
        buf.extend_from_slice(&chunk[..n]);

        if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            let headers = String::from_utf8_lossy(&buf[..end]).to_ascii_lowercase();
            let body_len = headers
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buf.len() >= end + 4 + body_len {
                return;
            }
        }
    }
}

/// In-memory log sink for a `tracing_subscriber::fmt` subscriber.
#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    /// Install a debug-level subscriber writing here for the current thread.
    pub fn install(&self) -> tracing::subscriber::DefaultGuard {
        let sink = self.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(move || sink.clone())
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl std::io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
