//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use live_relay::{Relay, RelayConfig, Shutdown, SocketRegistry};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;

/// Response the mock upstream sends for every request.
#[derive(Debug, Clone)]
pub struct MockResponse {
    pub status: &'static str,
    pub headers: Vec<(&'static str, String)>,
    pub body: Vec<u8>,
}

impl MockResponse {
    pub fn new(status: &'static str, content_type: &'static str, body: &str) -> Self {
        Self {
            status,
            headers: vec![("Content-Type", content_type.to_string())],
            body: body.as_bytes().to_vec(),
        }
    }
}

/// What the mock upstream saw.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub target: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Start a mock upstream on an ephemeral port that answers every request
/// with `response` and reports each request it receives.
pub async fn start_mock_upstream(
    response: MockResponse,
) -> (SocketAddr, mpsc::UnboundedReceiver<RecordedRequest>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = mpsc::unbounded_channel();
    let response = Arc::new(response);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((socket, _)) => {
                    let tx = tx.clone();
                    let response = response.clone();
                    tokio::spawn(async move {
                        handle_connection(socket, &response, tx).await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    (addr, rx)
}

async fn handle_connection(
    mut socket: TcpStream,
    response: &MockResponse,
    tx: mpsc::UnboundedSender<RecordedRequest>,
) {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let head_end = loop {
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos;
        }
        match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => return,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
    };

    let head = String::from_utf8_lossy(&buf[..head_end]).to_string();
    let mut lines = head.split("\r\n");
    let request_line = lines.next().unwrap_or_default();
    let mut parts = request_line.split(' ');
    let method = parts.next().unwrap_or_default().to_string();
    let target = parts.next().unwrap_or_default().to_string();
    let headers: Vec<(String, String)> = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .collect();

    let content_length = headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case("content-length"))
        .and_then(|(_, v)| v.parse::<usize>().ok())
        .unwrap_or(0);

    let mut body = buf[head_end + 4..].to_vec();
    while body.len() < content_length {
        match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(n) => body.extend_from_slice(&chunk[..n]),
        }
    }

    let _ = tx.send(RecordedRequest {
        method,
        target,
        headers,
        body,
    });

    let mut out = format!("HTTP/1.1 {}\r\n", response.status);
    for (name, value) in &response.headers {
        out.push_str(&format!("{}: {}\r\n", name, value));
    }
    out.push_str(&format!(
        "Content-Length: {}\r\nConnection: close\r\n\r\n",
        response.body.len()
    ));

    let mut bytes = out.into_bytes();
    bytes.extend_from_slice(&response.body);
    let _ = socket.write_all(&bytes).await;
    let _ = socket.shutdown().await;
}

/// Start an upstream that writes `raw` verbatim after reading the request
/// head, then closes the connection.
pub async fn start_raw_upstream(raw: &'static [u8]) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    tokio::spawn(async move {
                        let mut buf = Vec::new();
                        let mut chunk = [0u8; 4096];
                        while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
                            match socket.read(&mut chunk).await {
                                Ok(0) | Err(_) => return,
                                Ok(n) => buf.extend_from_slice(&chunk[..n]),
                            }
                        }
                        let _ = socket.write_all(raw).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

/// A relay running on ephemeral ports.
pub struct TestRelay {
    pub proxy_addr: SocketAddr,
    pub notification_addr: SocketAddr,
    pub registry: Arc<SocketRegistry>,
    pub shutdown: Arc<Shutdown>,
}

impl TestRelay {
    pub fn proxy_url(&self, target: &str) -> String {
        format!("http://{}{}", self.proxy_addr, target)
    }

    pub fn notification_url(&self, path: &str) -> String {
        format!("http://{}{}", self.notification_addr, path)
    }

    pub fn socket_url(&self) -> String {
        format!("ws://{}/ws", self.notification_addr)
    }

    /// Wait until the registry holds exactly `count` connections.
    pub async fn wait_for_connections(&self, count: usize) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while self.registry.len().await != count {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("registry never reached expected size");
    }
}

impl Drop for TestRelay {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Start a relay forwarding to `upstream_port`.
pub async fn start_relay(upstream_port: u16) -> TestRelay {
    start_relay_with(upstream_port, |_| {}).await
}

/// Start a relay forwarding to `upstream_port`, adjusting the config first.
pub async fn start_relay_with(
    upstream_port: u16,
    configure: impl FnOnce(&mut RelayConfig),
) -> TestRelay {
    let mut config = RelayConfig::default();
    config.upstream.host = "127.0.0.1".into();
    config.upstream.port = upstream_port;
    config.proxy.host = "127.0.0.1".into();
    config.proxy.port = 0;
    config.notification.host = "127.0.0.1".into();
    config.notification.port = 0;
    configure(&mut config);

    let relay = Relay::bind(config).await.unwrap();
    let proxy_addr = relay.proxy_addr().unwrap();
    let notification_addr = relay.notification_addr().unwrap();
    let registry = relay.registry();
    let shutdown = Arc::new(Shutdown::new());

    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            let _ = relay.serve(&shutdown).await;
        });
    }

    TestRelay {
        proxy_addr,
        notification_addr,
        registry,
        shutdown,
    }
}

/// HTTP client that never goes through a system proxy or reuses connections.
pub fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

/// Reserve a port with nothing listening on it.
pub fn closed_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}
