//! Configurable HTTP stub server.
//!
//! Loads declarative request → response rules from a directory of rule
//! files, serves them over HTTP or HTTPS, and hot-reloads the rule set
//! whenever the directory changes.
//!
//! ```text
//!                    ┌──────────────────────────────────────────────┐
//!                    │                 STUB SERVER                   │
//!                    │                                               │
//!   Client Request   │  ┌─────────┐    ┌────────────┐    ┌────────┐ │
//!   ─────────────────┼─▶│  http   │───▶│  routing   │───▶│ stub   │ │
//!                    │  │ server  │    │ dispatcher │    │ rules  │ │
//!                    │  └─────────┘    └────────────┘    └───┬────┘ │
//!                    │                                       │      │
//!   Client Response  │        canned JSON / 404 / 500        │      │
//!   ◀────────────────┼───────────────────────────────────────┘      │
//!                    │                                               │
//!                    │  ┌─────────────────────────────────────────┐ │
//!                    │  │ config: loader + watcher → atomic swap   │ │
//!                    │  └─────────────────────────────────────────┘ │
//!                    └──────────────────────────────────────────────┘
//! ```

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use stub_server::config::loader;
use stub_server::config::watcher::{spawn_swap_task, StubWatcher};
use stub_server::http::HttpServer;
use stub_server::net::tls;
use stub_server::registry::SharedRegistry;

#[derive(Parser, Debug)]
#[command(
    name = "stub-server",
    about = "Configurable HTTP stub server with hot-reloaded request/response rules",
    version
)]
struct Args {
    /// Directory containing rule files (.yml/.yaml/.json)
    #[arg(short, long, default_value = "stubs")]
    directory: PathBuf,

    /// Listen address
    #[arg(short, long, default_value = "127.0.0.1:8080")]
    listen: String,

    /// TLS certificate file (PEM); enables HTTPS together with --tls-key
    #[arg(long, requires = "tls_key")]
    tls_cert: Option<PathBuf>,

    /// TLS private key file (PEM)
    #[arg(long, requires = "tls_cert")]
    tls_key: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'L', long, default_value = "info")]
    log_level: String,

    /// Validate the rule directory and exit
    #[arg(long)]
    validate: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("stub_server={},tower_http={}", args.log_level, args.log_level).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Initial load is fatal: a server with broken rules must not start.
    let registry = loader::load_dir(&args.directory)?;
    tracing::info!(
        directory = %args.directory.display(),
        files = registry.file_count(),
        rules = registry.rule_count(),
        "Rules loaded"
    );

    if args.validate {
        println!(
            "{} rule(s) across {} file(s): OK",
            registry.rule_count(),
            registry.file_count()
        );
        return Ok(());
    }

    let shared = SharedRegistry::new(registry);

    // The watcher handle must stay alive for reloads to keep firing.
    let (stub_watcher, updates) = StubWatcher::new(&args.directory);
    let _watcher = stub_watcher.run()?;
    spawn_swap_task(shared.clone(), updates);

    let server = HttpServer::new(shared);

    match (&args.tls_cert, &args.tls_key) {
        (Some(cert), Some(key)) => {
            let addr: SocketAddr = args.listen.parse()?;
            let tls_config = tls::load_tls_config(cert, key).await?;
            server.run_tls(addr, tls_config).await?;
        }
        _ => {
            let listener = TcpListener::bind(&args.listen).await?;
            let (_shutdown_tx, shutdown_rx) = broadcast::channel(1);
            server.run(listener, shutdown_rx).await?;
        }
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
