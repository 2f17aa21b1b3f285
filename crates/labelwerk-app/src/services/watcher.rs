// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Watch loop for the label drop folder.
//
// The notify watcher is attached before the startup sweep runs, so files
// arriving during the sweep are queued rather than lost. Arrivals are
// drained one at a time; each file runs to completion on the blocking pool
// before the next event is looked at.
//
// Shutdown is a `watch` flag set by the signal listener in `main`. It is
// checked between sweep files and raced against arrivals in the loop, never
// inside a file.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use labelwerk_core::error::{LabelwerkError, Result};
use labelwerk_core::{FileStage, WatchdogConfig};
use notify::event::{CreateKind, ModifyKind, RenameMode};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, warn};

use super::pipeline::{FileOutcome, Pipeline, PrintOutcome, ProcessingError};

/// Non-recursive watcher on the drop folder.
///
/// Dropping it detaches the OS watch; the receiver then sees end-of-stream.
pub struct LabelWatcher {
    watcher: RecommendedWatcher,
    arrivals: mpsc::UnboundedReceiver<PathBuf>,
}

impl LabelWatcher {
    /// Start watching `dir`. Events are buffered from this point on.
    pub fn start(dir: &Path) -> Result<Self> {
        let (tx, arrivals) = mpsc::unbounded_channel();

        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| match res {
            Ok(event) => {
                for path in arrived_paths(&event) {
                    // Receiver gone means the loop is shutting down.
                    let _ = tx.send(path);
                }
            }
            Err(err) => warn!(error = %err, "Watch error"),
        })
        .map_err(|err| LabelwerkError::Watch(err.to_string()))?;

        watcher
            .watch(dir, RecursiveMode::NonRecursive)
            .map_err(|err| LabelwerkError::Watch(format!("{}: {}", dir.display(), err)))?;
        debug!(dir = %dir.display(), "Watcher attached");

        Ok(Self { watcher, arrivals })
    }

    /// Split into the OS handle and the arrival stream.
    pub fn into_parts(self) -> (RecommendedWatcher, mpsc::UnboundedReceiver<PathBuf>) {
        (self.watcher, self.arrivals)
    }
}

/// Paths in `event` that count as a new file in the folder.
///
/// Creates and rename-to events qualify. inotify reports a rename as both
/// `To` and `Both`; only `To` is taken so each move-in arrives once.
/// Writes, metadata changes and removals are ignored.
fn arrived_paths(event: &Event) -> Vec<PathBuf> {
    match event.kind {
        EventKind::Create(CreateKind::File | CreateKind::Any)
        | EventKind::Modify(ModifyKind::Name(RenameMode::To)) => {}
        _ => return Vec::new(),
    }

    event
        .paths
        .iter()
        .filter(|path| is_label_pdf(path))
        .cloned()
        .collect()
}

/// `*.pdf` in any case.
pub fn is_label_pdf(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
}

/// Resolves once shutdown has been requested.
///
/// If the trigger goes away without firing, this never resolves.
async fn shutdown_requested(shutdown: &mut watch::Receiver<bool>) {
    while !*shutdown.borrow_and_update() {
        if shutdown.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

/// Process every PDF already in the watch directory, in listing order.
///
/// Stops before the next file once shutdown is requested. Returns how many
/// files were handled.
pub async fn startup_sweep(
    pipeline: &Arc<Pipeline>,
    shutdown: &watch::Receiver<bool>,
) -> Result<usize> {
    let watch_dir = pipeline.config().watch_dir.clone();

    let mut leftovers = Vec::new();
    for entry in std::fs::read_dir(&watch_dir)? {
        let entry = entry?;
        let path = entry.path();
        if entry.file_type()?.is_file() && is_label_pdf(&path) {
            leftovers.push(path);
        }
    }

    if leftovers.is_empty() {
        debug!("No leftover labels");
        return Ok(0);
    }

    info!(count = leftovers.len(), "Processing leftover labels");
    let mut handled = 0;
    for path in &leftovers {
        if *shutdown.borrow() {
            info!(remaining = leftovers.len() - handled, "Shutdown requested during sweep");
            break;
        }
        dispatch(pipeline, path.clone()).await;
        handled += 1;
    }
    Ok(handled)
}

/// Drain arrivals until `shutdown` resolves or the watcher goes away.
///
/// Returns the number of files handled.
pub async fn drain(
    pipeline: Arc<Pipeline>,
    mut arrivals: mpsc::UnboundedReceiver<PathBuf>,
    mut shutdown: watch::Receiver<bool>,
) -> usize {
    let settle = pipeline.config().settle_delay;
    let mut handled = 0;

    loop {
        let path = tokio::select! {
            biased;
            _ = shutdown_requested(&mut shutdown) => {
                info!("Shutdown requested");
                break;
            }
            next = arrivals.recv() => match next {
                Some(path) => path,
                None => {
                    warn!("Watcher closed");
                    break;
                }
            },
        };

        debug!(file = %path.display(), "Arrival");
        if !settle.is_zero() {
            tokio::time::sleep(settle).await;
        }

        match std::fs::metadata(&path) {
            Ok(meta) if meta.is_file() => {}
            Ok(_) => {
                debug!(file = %path.display(), "Not a regular file, ignored");
                continue;
            }
            Err(_) => {
                debug!(file = %path.display(), "Vanished before processing");
                continue;
            }
        }

        dispatch(&pipeline, path).await;
        handled += 1;
    }

    handled
}

/// Run one file on the blocking pool.
///
/// A panic inside the pipeline is turned into a quarantined fault.
async fn dispatch(pipeline: &Arc<Pipeline>, path: PathBuf) -> FileOutcome {
    let worker = Arc::clone(pipeline);
    let input = path.clone();
    match tokio::task::spawn_blocking(move || worker.handle(&input)).await {
        Ok(FileOutcome::Cleaned(report)) => {
            info!(
                file = %report.file_name,
                profile = %report.profile,
                printed = matches!(report.print, PrintOutcome::Sent(_)),
                rotation_failed = report.rotation_error.is_some(),
                "Label done"
            );
            FileOutcome::Cleaned(report)
        }
        Ok(failed) => failed,
        Err(join_err) => {
            let file = path.display().to_string();
            error!(file = %file, error = %join_err, "Worker crashed");
            let quarantined = pipeline.quarantine(&path);
            FileOutcome::Failed {
                error: ProcessingError::Fault {
                    file,
                    stage: FileStage::Arrived,
                    detail: join_err.to_string(),
                },
                quarantined,
            }
        }
    }
}

/// Attach the watcher, sweep leftovers, then serve until `shutdown`.
pub async fn run(
    config: &WatchdogConfig,
    pipeline: Arc<Pipeline>,
    shutdown: watch::Receiver<bool>,
) -> Result<()> {
    let watcher = LabelWatcher::start(&config.watch_dir)?;

    let leftovers = startup_sweep(&pipeline, &shutdown).await?;
    info!(
        dir = %config.watch_dir.display(),
        printer = %config.printer_queue,
        leftovers,
        "Watching for labels"
    );

    let (handle, arrivals) = watcher.into_parts();
    let handled = drain(pipeline, arrivals, shutdown).await;
    drop(handle);

    info!(handled, "Watcher stopped");
    Ok(())
}
