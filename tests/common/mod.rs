//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::time::Duration;

use flecha::{HttpServer, Router, ServerConfig, Shutdown};
use tokio::net::TcpListener;

/// A server running on an ephemeral port, stopped when dropped.
pub struct TestServer {
    pub addr: SocketAddr,
    shutdown: Shutdown,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Serve `router` with default settings on 127.0.0.1.
pub async fn spawn(router: Router) -> TestServer {
    spawn_with(router, ServerConfig::default()).await
}

pub async fn spawn_with(router: Router, config: ServerConfig) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = HttpServer::new(&router, config).expect("route table should bind");
    let shutdown = Shutdown::new();
    let rx = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, rx).await;
    });

    TestServer { addr, shutdown }
}

/// Client that never reuses connections between tests.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .timeout(Duration::from_secs(5))
        .build()
        .unwrap()
}
