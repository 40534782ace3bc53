use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lws::config::MountConfig;
use lws::store::JsonFileStore;
use lws::{AppState, Config, LifecycleEvent, Lws, routes};

#[derive(Parser, Debug)]
#[command(name = "lws")]
#[command(about = "Serve registered path prefixes from local directories")]
#[command(version)]
struct Cli {
    /// Port to listen on
    #[arg(short, long, env = "LWS_PORT", default_value = "41822")]
    port: u16,

    /// Address to bind to
    #[arg(short, long, env = "LWS_BIND", default_value = "127.0.0.1")]
    bind: String,

    /// Directory holding the persisted root map
    #[arg(long, env = "LWS_STORE_DIR")]
    store_dir: Option<PathBuf>,

    /// Register PREFIX=DIR[,DIR...] at startup (repeatable)
    #[arg(short, long = "mount", value_name = "PREFIX=DIRS")]
    mounts: Vec<MountConfig>,

    /// Enable verbose logging
    #[arg(short, long, env = "LWS_VERBOSE")]
    verbose: bool,

    /// Config file path (optional)
    #[arg(short, long, env = "LWS_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose {
        "lws=debug,tower_http=debug"
    } else {
        "lws=info,tower_http=info"
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load config from file if provided, otherwise use defaults
    let mut config = if let Some(config_path) = &cli.config {
        Config::from_file(config_path)?
    } else {
        Config::default()
    };
    if let Some(dir) = cli.store_dir {
        config.store.dir = Some(dir);
    }
    config.mounts.extend(cli.mounts);
    config.validate()?;

    let store = JsonFileStore::new(
        config.store.resolved_dir(),
        &config.store.database,
        &config.store.name,
    );
    info!("Persisting root map to {}", store.path().display());

    let lws = Lws::start(Arc::new(store), config.index_files.clone());
    lws.handle_lifecycle(LifecycleEvent::Install);
    lws.handle_lifecycle(LifecycleEvent::Activate);

    for mount in &config.mounts {
        lws.control().send(mount.to_command().await)?;
        info!("Mounting {} from {} roots", mount.prefix, mount.roots.len());
    }

    let state = AppState::new(lws, config);
    let app = routes::app(state);

    // Start server
    let addr: SocketAddr = format!("{}:{}", cli.bind, cli.port).parse()?;
    info!("Starting lws on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
