//! s3gate server - single-bucket S3-compatible object gateway with SigV2 auth.
//!
//! # Usage
//!
//! ```text
//! S3_READ_WRITE_USERS='AKID=SECRET' DATA_FOLDER=/srv/files s3gate-server
//! ```
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `GATEWAY_LISTEN` | `0.0.0.0:8000` | Bind address |
//! | `SERVER_PORT` | *(unset)* | Port used when `GATEWAY_LISTEN` is unset |
//! | `DATA_FOLDER` | `/files` | Root of the filesystem backend |
//! | `STORAGE_BACKEND` | `filesystem` | `filesystem` or `memory` |
//! | `WRITE_TOKEN` | *(empty)* | Path token required on PUT |
//! | `S3_READ_WRITE_USERS` | *(empty)* | `key=secret;...` read-write credentials |
//! | `S3_READ_ONLY_USERS` | *(empty)* | `key=secret;...` read-only credentials |
//! | `S3_VIRTUAL_HOSTING` | `false` | Take the bucket from the `Host` header |
//! | `S3_DOMAIN` | `s3.localhost` | Virtual hosting domain |
//! | `LOG_LEVEL` | `info` | Log level filter |
//! | `RUST_LOG` | *(unset)* | Fine-grained tracing filter (overrides `LOG_LEVEL`) |

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as HttpConnBuilder;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use s3gate_auth::{AuthGate, CredentialRegistry, Permissions};
use s3gate_core::{
    FilesystemObjectStore, GatewayConfig, InMemoryObjectStore, ObjectStore, StorageBackend,
};
use s3gate_http::{GatewayHttpConfig, GatewayService, HEALTH_CHECK_PATH, ObjectDispatcher};

/// Server version reported at startup.
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the tracing subscriber.
///
/// Uses `RUST_LOG` if set, otherwise falls back to the `LOG_LEVEL` config value.
fn init_tracing(log_level: &str) -> Result<()> {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::try_new(log_level)
            .with_context(|| format!("invalid log level filter: {log_level}"))?
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    Ok(())
}

/// Populate the credential registry from the configured user lists.
///
/// Read-write users load first, so a key listed in both ends up read-only.
fn build_registry(config: &GatewayConfig) -> CredentialRegistry {
    let mut registry = CredentialRegistry::new();
    let read_write = registry.register_users(&config.read_write_users, Permissions::READ_WRITE);
    let read_only = registry.register_users(&config.read_only_users, Permissions::READ_ONLY);

    info!(read_write, read_only, total = registry.len(), "loaded credentials");
    if registry.is_empty() {
        warn!("no credentials configured, every signed request will be rejected");
    }

    registry
}

/// Open the configured storage backend.
async fn build_store(config: &GatewayConfig) -> Result<Arc<dyn ObjectStore>> {
    match config.storage_backend {
        StorageBackend::Memory => {
            info!("using in-memory storage backend");
            Ok(Arc::new(InMemoryObjectStore::new()))
        }
        StorageBackend::Filesystem => {
            let store = FilesystemObjectStore::open(&config.data_dir)
                .await
                .with_context(|| format!("failed to open data folder {}", config.data_dir))?;
            info!(root = %store.root().display(), "using filesystem storage backend");
            Ok(Arc::new(store))
        }
    }
}

/// Build the [`GatewayHttpConfig`] from the application [`GatewayConfig`].
fn build_http_config(config: &GatewayConfig) -> GatewayHttpConfig {
    GatewayHttpConfig {
        domain: config.domain.clone(),
        virtual_hosting: config.virtual_hosting,
    }
}

/// Assemble the full service from configuration.
async fn build_service(config: &GatewayConfig) -> Result<GatewayService> {
    let registry = build_registry(config);
    let store = build_store(config).await?;

    let gate = AuthGate::new(Arc::new(registry));
    let dispatcher = ObjectDispatcher::new(store, config.write_token().map(ToOwned::to_owned));

    Ok(GatewayService::new(
        gate,
        dispatcher,
        &build_http_config(config),
    ))
}

/// Run the accept loop, serving connections until a shutdown signal is received.
async fn serve(listener: TcpListener, service: GatewayService) -> Result<()> {
    let graceful = hyper_util::server::graceful::GracefulShutdown::new();
    let http = HttpConnBuilder::new(TokioExecutor::new());

    let shutdown = async {
        tokio::signal::ctrl_c().await.ok();
        info!("received shutdown signal, draining connections");
    };

    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            result = listener.accept() => {
                let (stream, peer_addr) = match result {
                    Ok(conn) => conn,
                    Err(e) => {
                        warn!(error = %e, "failed to accept connection");
                        continue;
                    }
                };

                let svc = service.clone();
                let conn = http.serve_connection(TokioIo::new(stream), svc);
                let conn = graceful.watch(conn.into_owned());

                tokio::spawn(async move {
                    if let Err(e) = conn.await {
                        error!(peer_addr = %peer_addr, error = %e, "connection error");
                    }
                });
            }

            () = &mut shutdown => {
                info!("shutting down gracefully");
                break;
            }
        }
    }

    graceful.shutdown().await;
    info!("all connections drained, exiting");

    Ok(())
}

/// Probe the health endpoint of a running gateway.
///
/// Exits with code 0 if healthy, 1 otherwise.
async fn run_health_check(addr: &str) -> Result<()> {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;

    let stream = TcpStream::connect(addr)
        .await
        .with_context(|| format!("cannot connect to {addr}"))?;

    let (mut reader, mut writer) = stream.into_split();

    let request =
        format!("GET {HEALTH_CHECK_PATH} HTTP/1.1\r\nHost: {addr}\r\nConnection: close\r\n\r\n");
    writer.write_all(request.as_bytes()).await?;
    writer.shutdown().await?;

    let mut response = String::new();
    reader.read_to_string(&mut response).await?;

    if is_healthy_response(&response) {
        Ok(())
    } else {
        anyhow::bail!("unhealthy response from {addr}")
    }
}

fn is_healthy_response(response: &str) -> bool {
    response.starts_with("HTTP/1.1 200") && response.contains("\"status\":\"running\"")
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = GatewayConfig::from_env();

    // Handle --health-check flag for container health checks.
    if std::env::args().any(|a| a == "--health-check") {
        let addr = config.gateway_listen.replace("0.0.0.0", "127.0.0.1");
        let healthy = run_health_check(&addr).await.is_ok();
        std::process::exit(i32::from(!healthy));
    }

    init_tracing(&config.log_level)?;

    info!(
        gateway_listen = %config.gateway_listen,
        storage_backend = ?config.storage_backend,
        data_dir = %config.data_dir,
        virtual_hosting = config.virtual_hosting,
        domain = %config.domain,
        write_token = config.write_token().is_some(),
        version = VERSION,
        "starting s3gate server",
    );

    let service = build_service(&config).await?;

    let addr: SocketAddr = config
        .gateway_listen
        .parse()
        .with_context(|| format!("invalid bind address: {}", config.gateway_listen))?;

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind to {addr}"))?;

    info!(%addr, "listening for connections");

    serve(listener, service).await
}
