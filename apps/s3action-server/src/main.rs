//! S3 Semantic Action Server.
//!
//! Exposes an S3-compatible object store as Schema.org JSON-LD actions
//! (`CreateAction`, `DownloadAction`, `DeleteAction`, `SearchAction`) plus a
//! small REST layer that is translated into the same actions.
//!
//! # Usage
//!
//! ```text
//! LISTEN_ADDR=0.0.0.0:8092 s3action-server
//! ```
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `LISTEN_ADDR` | `0.0.0.0:8092` | Bind address (`PORT` alone overrides the port) |
//! | `API_PREFIX` | `/v1/api` | Prefix for every route except `/health` |
//! | `S3_API_KEY` | *(unset)* | Require this key on action routes |
//! | `DEFAULT_REGION` | `us-east-1` | Region used when a target names none |
//! | `DOWNLOAD_DIR` | `/tmp` | Directory for downloads without a `contentUrl` |
//! | `MAX_OPERATIONS` | `100` | Operations kept by the state tracker |
//! | `REGISTRYSERVICE_API_URL` | *(unset)* | Service registry to announce to |
//! | `S3_ENDPOINT_URL`, `S3_REGION`, `S3_ACCESS_KEY`, `S3_SECRET_KEY`, `S3_BUCKET` | *(unset)* | Target used by REST routes |
//! | `LOG_LEVEL` | `info` | Log level filter |
//! | `LOG_FORMAT` | `text` | `json` for JSON lines |
//! | `RUST_LOG` | *(unset)* | Fine-grained tracing filter (overrides `LOG_LEVEL`) |

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as HttpConnBuilder;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use s3action_core::config::ServiceConfig;
use s3action_core::registry::{
    HttpServiceRegistry, NoopRegistry, ServiceRegistration, ServiceRegistry,
};
use s3action_core::{S3ActionProvider, S3ObjectStore, SemanticActionHandler};
use s3action_http::dispatch::ActionHandler;
use s3action_http::response::SERVICE_CAPABILITIES;
use s3action_http::service::{ActionHttpConfig, ActionHttpService};
use s3action_http::state::InMemoryOperationTracker;

/// Server version reported in health and registration documents.
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the tracing subscriber.
///
/// Uses `RUST_LOG` if set, otherwise falls back to the `LOG_LEVEL` config value.
fn init_tracing(config: &ServiceConfig) -> Result<()> {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::try_new(&config.log_level)
            .with_context(|| format!("invalid log level filter: {}", config.log_level))?
    };

    if config.json_logs() {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    }

    Ok(())
}

/// Build the [`ActionHttpConfig`] from the application [`ServiceConfig`].
fn build_http_config(config: &ServiceConfig) -> ActionHttpConfig {
    ActionHttpConfig {
        api_prefix: config.api_prefix.clone(),
        api_key: config.api_key.clone(),
        version: VERSION.to_owned(),
        default_target: config.default_target(),
        tracker: Arc::new(InMemoryOperationTracker::new(config.max_operations)),
        ..ActionHttpConfig::default()
    }
}

/// Pick the registry client: HTTP when a registry URL is configured.
fn build_registry(config: &ServiceConfig) -> Arc<dyn ServiceRegistry> {
    match &config.registry_url {
        Some(url) => Arc::new(HttpServiceRegistry::new(url.as_str())),
        None => Arc::new(NoopRegistry),
    }
}

/// Registration document announced at startup.
fn build_registration(config: &ServiceConfig, http_config: &ActionHttpConfig) -> ServiceRegistration {
    ServiceRegistration {
        service_id: http_config.service_id.clone(),
        service_name: http_config.service_name.clone(),
        description: http_config.description.clone(),
        port: config.port().unwrap_or_default(),
        version: http_config.version.clone(),
        capabilities: SERVICE_CAPABILITIES.iter().map(|c| (*c).to_owned()).collect(),
        api_versions: vec!["v1".to_owned()],
    }
}

/// Resolve once ctrl-c or, on unix, SIGTERM is received.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c().await.ok();
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }

    info!("received shutdown signal, draining connections");
}

/// Run the accept loop, serving connections until a shutdown signal is received.
async fn serve<H: ActionHandler>(listener: TcpListener, service: ActionHttpService<H>) -> Result<()> {
    let graceful = hyper_util::server::graceful::GracefulShutdown::new();
    let http = HttpConnBuilder::new(TokioExecutor::new());

    let shutdown = shutdown_signal();
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

/// Perform a health check by connecting to the server and requesting `/health`.
///
/// Exits with code 0 if healthy, 1 otherwise.
async fn run_health_check(addr: &str) -> Result<()> {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;

    let stream = TcpStream::connect(addr)
        .await
        .with_context(|| format!("cannot connect to {addr}"))?;

    let (mut reader, mut writer) = stream.into_split();

    let request = format!("GET /health HTTP/1.1\r\nHost: {addr}\r\nConnection: close\r\n\r\n");
    writer.write_all(request.as_bytes()).await?;
    writer.shutdown().await?;

    let mut response = String::new();
    reader.read_to_string(&mut response).await?;

    if response.contains("200 OK") && response.contains("\"status\":\"healthy\"") {
        Ok(())
    } else {
        anyhow::bail!("unhealthy response from {addr}")
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Handle --health-check flag for Docker HEALTHCHECK.
    if std::env::args().any(|a| a == "--health-check") {
        let config = ServiceConfig::from_env();
        let addr = config.listen_addr.replace("0.0.0.0", "127.0.0.1");
        let healthy = run_health_check(&addr).await.is_ok();
        std::process::exit(i32::from(!healthy));
    }

    let config = ServiceConfig::from_env();

    init_tracing(&config)?;

    info!(
        listen_addr = %config.listen_addr,
        api_prefix = %config.api_prefix,
        api_key_required = config.api_key.is_some(),
        default_region = %config.default_region,
        version = VERSION,
        "starting S3 Semantic Action Server",
    );

    let provider = S3ActionProvider::new(Arc::new(S3ObjectStore::new()), &config);
    let handler = SemanticActionHandler::new(Arc::new(provider));
    let http_config = build_http_config(&config);
    let registration = build_registration(&config, &http_config);
    let service = ActionHttpService::new(Arc::new(handler), http_config);

    let addr: SocketAddr = config
        .listen_addr
        .parse()
        .with_context(|| format!("invalid bind address: {}", config.listen_addr))?;

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind to {addr}"))?;

    info!(%addr, "listening for connections");

    let registry = build_registry(&config);
    if let Err(e) = registry.register(&registration).await {
        warn!(error = %e, "service registration failed");
    }

    let result = serve(listener, service).await;

    if let Err(e) = registry.unregister(&registration.service_id).await {
        warn!(error = %e, "service unregistration failed");
    }

    result
}
