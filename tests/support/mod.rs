//! Minimal in-process HTTP server for integration tests.
//!
//! Serves a fixed set of routes over real TCP so the client stack under test
//! is exercised end to end. Each route counts its hits and can delay its
//! response to widen race windows deterministically.

// Not every test binary uses every helper.
#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use sha1::{Digest, Sha1};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

#[derive(Clone)]
pub struct Route {
    status: u16,
    body: Vec<u8>,
    delay: Option<Duration>,
    hits: Arc<AtomicUsize>,
}

impl Route {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
            delay: None,
            hits: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

pub struct TestServer {
    addr: SocketAddr,
    routes: Arc<Mutex<HashMap<String, Route>>>,
}

/// Install a log subscriber once per test binary; `RUST_LOG` filters it.
fn init_tracing() {
    static INIT: std::sync::Once = std::sync::Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

impl TestServer {
    pub async fn start() -> Self {
        init_tracing();
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind test server");
        let addr = listener.local_addr().expect("test server addr");
        let routes: Arc<Mutex<HashMap<String, Route>>> = Arc::new(Mutex::new(HashMap::new()));

        let accept_routes = Arc::clone(&routes);
        tokio::spawn(async move {
            loop {
                let Ok((stream, _)) = listener.accept().await else {
                    return;
                };
                let routes = Arc::clone(&accept_routes);
                tokio::spawn(async move {
                    serve_connection(stream, routes).await;
                });
            }
        });

        Self { addr, routes }
    }

    pub fn route(&self, path: &str, route: Route) {
        self.routes
            .lock()
            .expect("route map poisoned")
            .insert(path.to_string(), route);
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    /// How many requests this path has served.
    pub fn hits(&self, path: &str) -> usize {
        self.routes
            .lock()
            .expect("route map poisoned")
            .get(path)
            .map(|r| r.hits.load(Ordering::SeqCst))
            .unwrap_or(0)
    }
}

async fn serve_connection(mut stream: tokio::net::TcpStream, routes: Arc<Mutex<HashMap<String, Route>>>) {
    // Read until the end of the request headers; tests only issue GETs.
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        let Ok(n) = stream.read(&mut chunk).await else {
            return;
        };
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
        if buf.windows(4).any(|w| w == b"\r\n\r\n") {
            break;
        }
    }

    let request_line = String::from_utf8_lossy(&buf);
    let path = request_line
        .split_whitespace()
        .nth(1)
        .unwrap_or("/")
        .to_string();

    let route = routes
        .lock()
        .expect("route map poisoned")
        .get(&path)
        .cloned();

    let (status, body, delay) = match route {
        Some(route) => {
            route.hits.fetch_add(1, Ordering::SeqCst);
            (route.status, route.body, route.delay)
        }
        None => (404, b"not found".to_vec(), None),
    };

    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }

    let reason = match status {
        200 => "OK",
        404 => "Not Found",
        500 => "Internal Server Error",
        _ => "Unknown",
    };
    let header = format!(
        "HTTP/1.1 {status} {reason}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        body.len()
    );
    let _ = stream.write_all(header.as_bytes()).await;
    let _ = stream.write_all(&body).await;
    let _ = stream.shutdown().await;
}

pub fn sha1_hex(data: &[u8]) -> String {
    hex::encode(Sha1::digest(data))
}
