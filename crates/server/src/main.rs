use std::path::Path;
use std::time::Duration;

use clap::Parser;
use tracing::{info, warn};

use archivist_server::api::{self, AppState};
use archivist_server::config::ArchivistConfig;

/// Discord channel archive service.
#[derive(Parser, Debug)]
#[command(name = "archivist-server", about = "Discord channel archive service")]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "archivist.toml")]
    config: String,

    /// Override the bind host.
    #[arg(long)]
    host: Option<String>,

    /// Override the bind port.
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = ArchivistConfig::load(Path::new(&cli.config))?;
    config.apply_env();

    let telemetry_guard = archivist_server::telemetry::init(&config.telemetry);
    config.validate()?;

    let state = AppState::from_config(&config)?;
    let runner = state.runner.clone();
    let app = api::router(state, &config.server.interactions_path);

    let host = cli.host.unwrap_or(config.server.host);
    let port = cli.port.unwrap_or(config.server.port);
    let addr = format!("{host}:{port}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(
        address = %addr,
        interactions_path = %config.server.interactions_path,
        "archivist-server listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    let shutdown_timeout = Duration::from_secs(config.server.shutdown_timeout_seconds);
    info!(
        in_flight = runner.in_flight(),
        timeout_secs = config.server.shutdown_timeout_seconds,
        "waiting for in-flight archive jobs..."
    );
    if tokio::time::timeout(shutdown_timeout, runner.drain())
        .await
        .is_err()
    {
        warn!(
            in_flight = runner.in_flight(),
            "shutdown timeout exceeded, abandoning unfinished archive jobs"
        );
    }

    telemetry_guard.shutdown();

    info!("archivist-server shut down");
    Ok(())
}

/// Wait for SIGINT (Ctrl+C) or SIGTERM, then return to trigger graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for Ctrl+C");
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
                warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => { info!("received SIGINT"); }
        () = terminate => { info!("received SIGTERM"); }
    }
}
