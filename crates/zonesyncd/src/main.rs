// # zonesyncd - zone publication daemon
//
// Thin integration layer only:
// 1. Load and validate settings from a YAML file
// 2. Initialize tracing
// 3. Wire the address book, reloader, and engine
// 4. Serve the HTTP surface until a shutdown signal arrives
//
// All zone-synchronization logic lives in zonesync-core.
//
// ## Configuration
//
// The settings file path comes from the first CLI argument, then the
// `ZONESYNC_CONFIG` environment variable, then
// `/etc/zonesync/config.yaml`. See `settings.rs` for the schema.

mod routes;
mod settings;

use anyhow::Result;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

use settings::Settings;
use zonesync_core::{AddressBook, NoopReloader, SerialState, SyncEngine, ZoneReloader};
use zonesync_reload_rndc::RndcReloader;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

/// Exit codes following systemd conventions
#[derive(Debug, Clone, Copy)]
enum DaemonExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error (unexpected failure)
    RuntimeError = 2,
}

impl From<DaemonExitCode> for ExitCode {
    fn from(code: DaemonExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

fn settings_path() -> PathBuf {
    std::env::args()
        .nth(1)
        .or_else(|| std::env::var("ZONESYNC_CONFIG").ok())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("/etc/zonesync/config.yaml"))
}

fn main() -> ExitCode {
    let path = settings_path();
    let settings = match Settings::load(&path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            return DaemonExitCode::ConfigError.into();
        }
    };

    if let Err(e) = settings.validate() {
        eprintln!("Configuration validation error: {e}");
        return DaemonExitCode::ConfigError.into();
    }

    let log_level = match settings.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };
    let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {e}");
        return DaemonExitCode::ConfigError.into();
    }

    info!("Starting zonesyncd");
    info!(
        zone = %settings.zone,
        clients = settings.clients.len(),
        sandbox = settings.sandbox,
        "Configuration loaded"
    );

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {e}");
            return DaemonExitCode::RuntimeError.into();
        }
    };

    rt.block_on(async {
        if let Err(e) = run_daemon(settings).await {
            error!("Daemon error: {e}");
            DaemonExitCode::RuntimeError
        } else {
            DaemonExitCode::CleanShutdown
        }
    })
    .into()
}

/// Wire the collaborators and serve until shutdown
async fn run_daemon(settings: Settings) -> Result<()> {
    let book = match &settings.book_file {
        Some(path) => AddressBook::open(path).await?,
        None => AddressBook::ephemeral(),
    };

    let reloader: Box<dyn ZoneReloader> = if settings.sandbox {
        Box::new(NoopReloader)
    } else {
        Box::new(RndcReloader::with_program(&settings.reload_program))
    };
    info!(reloader = reloader.reloader_name(), "Reloader selected");

    let engine = SyncEngine::new(
        settings.sync_config(),
        book,
        SerialState::new(),
        reloader,
    )?;

    let app = routes::build_router(Arc::new(engine));
    let listener = tokio::net::TcpListener::bind(&settings.listen).await?;
    info!(listen = %settings.listen, "Serving update requests");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Shutting down daemon");
    Ok(())
}

/// Wait for SIGTERM or SIGINT
#[cfg(unix)]
async fn shutdown_signal() {
    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(s) => s,
        Err(e) => {
            error!("Failed to setup SIGTERM handler: {e}");
            return;
        }
    };
    let mut sigint = match signal(SignalKind::interrupt()) {
        Ok(s) => s,
        Err(e) => {
            error!("Failed to setup SIGINT handler: {e}");
            return;
        }
    };

    tokio::select! {
        _ = sigterm.recv() => info!("Received SIGTERM"),
        _ = sigint.recv() => info!("Received SIGINT"),
    }
}

/// Fallback for non-Unix platforms (SIGINT only)
#[cfg(not(unix))]
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to wait for CTRL-C: {e}");
    } else {
        info!("Received SIGINT");
    }
}
