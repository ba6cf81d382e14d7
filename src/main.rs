use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tokio::sync::broadcast;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use zonesync::config::AppConfig;
use zonesync::handler::UpdateHandler;
use zonesync::notify::NotifyDispatcher;
use zonesync::server::NotifyServer;

/// Keeps a local nameserver's slave zones in sync with incoming DNS NOTIFY
/// announcements.
#[derive(Parser, Debug)]
#[command(name = "zonesync", version, about)]
struct Args {
    /// Path of the daemon configuration file
    #[arg(short, long, default_value = "./zonesync.toml")]
    config: std::path::PathBuf,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let config = match AppConfig::load(&args.config) {
        Ok(config) => Arc::new(config),
        Err(e) => {
            eprintln!("ERROR {e}");
            return ExitCode::FAILURE;
        }
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.clone()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("this is zonesync v{}", env!("CARGO_PKG_VERSION"));

    let dispatcher = NotifyDispatcher::new(config.remotes.clone());
    let update_handler = Arc::new(UpdateHandler::new(dispatcher));

    let server = match NotifyServer::bind(config.clone(), update_handler).await {
        Ok(server) => server,
        Err(e) => {
            error!("failed to bind {}: {}", config.listen, e);
            return ExitCode::FAILURE;
        }
    };

    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
    tokio::spawn(async move {
        shutdown_signal().await;
        info!("shutting down");
        let _ = shutdown_tx.send(());
    });

    server.run(shutdown_rx).await;
    ExitCode::SUCCESS
}

/// Resolves when the process receives SIGINT or SIGTERM.
async fn shutdown_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigterm = signal(SignalKind::terminate()).expect("SIGTERM handler can be installed");
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {}
        _ = sigterm.recv() => {}
    }
}
