//! twister-hub - Central Engine RPC hub daemon

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::info;
use twister_hub_core::config::ConfigOverrides;
use twister_hub_daemon::project::InMemoryProjectModel;
use twister_hub_daemon::registry::ConnectionRegistry;
use twister_hub_daemon::status::StatusWriter;
use twister_hub_daemon::{facade::Facade, shutdown, transport};

/// Central Engine RPC hub - accepts client and EP connections, brokers
/// reservations and reverse dispatch between them.
#[derive(Parser, Debug)]
#[command(name = "twister-hub")]
#[command(about = "Central Engine RPC hub for the twister test orchestration platform")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Override the TCP bind address (e.g. 0.0.0.0:18812)
    #[arg(long, value_name = "ADDR")]
    bind_addr: Option<String>,

    /// Override the reverse-upcall deadline, in milliseconds
    #[arg(long, value_name = "MS")]
    upcall_deadline_ms: Option<u64>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if args.verbose {
        unsafe { std::env::set_var("TWISTER_HUB_LOG", "debug") };
    }
    twister_hub_core::logging::init();

    info!("twister-hub starting...");

    let home_dir =
        twister_hub_core::home::get_home_dir().context("failed to determine home directory")?;

    let overrides = ConfigOverrides {
        bind_addr: args.bind_addr.clone(),
        upcall_deadline_ms: args.upcall_deadline_ms,
        config_path: args.config.clone(),
        ..Default::default()
    };
    let config = twister_hub_core::config::resolve_config(&overrides, &home_dir)
        .context("failed to resolve configuration")?;

    if let Some(ref path) = args.config {
        info!("loaded config from {}", path.display());
    }
    info!(bind_addr = %config.core.bind_addr, "resolved configuration");

    // TWISTER_PATH absence is fatal: the hub cannot resolve per-user twister
    // homes or global libraries without it.
    twister_hub_core::home::installation_root()
        .context("TWISTER_PATH must be set for the hub to locate installation-wide resources")?;

    let registry = ConnectionRegistry::new();
    let project = Arc::new(InMemoryProjectModel::new());
    let facade = Arc::new(Facade::new(
        registry.clone(),
        project,
        config.core.bind_addr.clone(),
        Duration::from_millis(config.core.upcall_deadline_ms),
        config.logging.level.clone(),
    ));

    let handler_facade = facade.clone();
    let handler: transport::HandlerFn = Arc::new(move |addr, request| {
        let facade = handler_facade.clone();
        Box::pin(async move { facade.dispatch(addr, request).await })
    });

    let status_writer = Arc::new(StatusWriter::new(&home_dir, env!("CARGO_PKG_VERSION")));

    let shutdown_token = CancellationToken::new();
    let signal_token = shutdown_token.clone();
    tokio::spawn(async move {
        let ctrl_c = tokio::signal::ctrl_c();

        #[cfg(unix)]
        {
            let mut sigterm =
                tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
                    .expect("failed to install SIGTERM handler");

            tokio::select! {
                _ = ctrl_c => info!("received SIGINT"),
                _ = sigterm.recv() => info!("received SIGTERM"),
            }
        }

        #[cfg(not(unix))]
        {
            ctrl_c.await.expect("failed to listen for Ctrl+C");
            info!("received Ctrl+C");
        }

        signal_token.cancel();
    });

    let status_registry = registry.clone();
    let status_shutdown = shutdown_token.clone();
    tokio::spawn(async move {
        let mut tick = tokio::time::interval(Duration::from_secs(10));
        loop {
            tokio::select! {
                _ = status_shutdown.cancelled() => break,
                _ = tick.tick() => status_writer.write_status(&status_registry),
            }
        }
        status_writer.write_status(&status_registry);
    });

    transport::run(
        &config.core.bind_addr,
        registry.clone(),
        handler,
        shutdown_token.clone(),
    )
    .await
    .context("transport accept loop failed")?;

    shutdown::graceful_shutdown(&shutdown_token, &registry, Duration::from_secs(5)).await?;

    info!("twister-hub shutdown complete");
    Ok(())
}
