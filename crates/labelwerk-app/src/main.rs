// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Labelwerk — shipping-label watch folder daemon
//
// Entry point. Initialises logging, loads the configuration, prepares the
// directory layout and runs the watch loop until Ctrl-C.

mod services;

use std::process::ExitCode;
use std::sync::Arc;

use labelwerk_core::WatchdogConfig;
use labelwerk_core::error::Result;
use labelwerk_document::LopdfRewriter;
use labelwerk_print::LpCommand;
use tokio::sync::watch;

use services::layout::ensure_directories;
use services::pipeline::Pipeline;
use services::watcher;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    match serve().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "Labelwerk stopped");
            ExitCode::FAILURE
        }
    }
}

async fn serve() -> Result<()> {
    let config = WatchdogConfig::from_env()?;
    tracing::debug!(config = %serde_json::to_string(&config)?, "Effective configuration");

    ensure_directories(&config)?;

    let printer = LpCommand::from_config(&config);
    match printer.locate() {
        Ok(path) => tracing::debug!(command = %path.display(), "Print command found"),
        Err(err) => tracing::warn!(error = %err, "Labels will be processed but not printed"),
    }

    tracing::info!(
        watch_dir = %config.watch_dir.display(),
        printer = printer.queue(),
        "Labelwerk starting"
    );

    let config = Arc::new(config);
    let pipeline = Arc::new(Pipeline::new(
        Arc::clone(&config),
        Box::new(LopdfRewriter),
        Box::new(printer),
    ));

    let shutdown = listen_for_interrupt()?;
    watcher::run(&config, pipeline, shutdown).await
}

/// Install the SIGINT handler and return a flag raised on the first Ctrl-C.
///
/// The handler is registered before this returns, so an interrupt during
/// the startup sweep is caught instead of killing the process mid-file.
#[cfg(unix)]
fn listen_for_interrupt() -> Result<watch::Receiver<bool>> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut interrupt = signal(SignalKind::interrupt())?;
    let (trigger, shutdown) = watch::channel(false);
    tokio::spawn(async move {
        if interrupt.recv().await.is_some() {
            tracing::info!("Interrupt received, finishing the current label");
            trigger.send_replace(true);
        }
    });
    Ok(shutdown)
}

#[cfg(not(unix))]
fn listen_for_interrupt() -> Result<watch::Receiver<bool>> {
    let (trigger, shutdown) = watch::channel(false);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::info!("Interrupt received, finishing the current label");
                trigger.send_replace(true);
            }
            Err(err) => {
                tracing::error!(error = %err, "Cannot listen for Ctrl-C, running until killed")
            }
        }
    });
    Ok(shutdown)
}
