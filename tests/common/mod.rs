//! Shared utilities for integration testing.

use std::path::Path;
use tokio::net::TcpListener;
use tokio::sync::broadcast;

use stub_server::config::loader;
use stub_server::http::HttpServer;
use stub_server::registry::SharedRegistry;

/// Write one rule file into the directory.
pub fn write_rules(dir: &Path, name: &str, content: &str) {
    std::fs::write(dir.join(name), content).unwrap();
}

/// Start a stub server over `dir` on an ephemeral port.
///
/// Returns the base URL, the shared registry handle, and the shutdown
/// sender that stops the server when triggered (or dropped).
pub async fn start_server(dir: &Path) -> (String, SharedRegistry, broadcast::Sender<()>) {
    let registry = SharedRegistry::new(loader::load_dir(dir).unwrap());
    let server = HttpServer::new(registry.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
    tokio::spawn(async move {
        let _ = server.run(listener, shutdown_rx).await;
    });

    (format!("http://{}", addr), registry, shutdown_tx)
}

/// Client that ignores any ambient proxy configuration.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}
