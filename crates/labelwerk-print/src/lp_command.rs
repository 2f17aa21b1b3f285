// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// CUPS `lp` print sink.
//
// Runs `lp -d <queue> -o fit-to-page <file>` and waits for it to exit. CUPS
// spools the file itself, so the processed copy can stay where it is.
// A non-zero exit status is a dispatch failure; whatever `lp` wrote to
// stderr becomes the error detail.

use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{debug, info, instrument, warn};

use labelwerk_core::WatchdogConfig;
use labelwerk_core::error::{LabelwerkError, Result};

use crate::sink::{PrintReceipt, PrintSink};

/// CUPS option asking the filter chain to scale the page onto the media.
const FIT_TO_PAGE_OPTION: &str = "fit-to-page";

/// Submits files to a CUPS queue through the `lp` command.
#[derive(Debug, Clone)]
pub struct LpCommand {
    /// Executable to run (normally `lp`).
    program: String,
    /// Destination queue passed with `-d`.
    queue: String,
    /// Pass `-o fit-to-page`.
    fit_to_page: bool,
}

impl LpCommand {
    pub fn new(program: impl Into<String>, queue: impl Into<String>, fit_to_page: bool) -> Self {
        Self {
            program: program.into(),
            queue: queue.into(),
            fit_to_page,
        }
    }

    /// Sink for the queue and command named in `config`.
    pub fn from_config(config: &WatchdogConfig) -> Self {
        Self::new(
            config.print_command.clone(),
            config.printer_queue.clone(),
            config.fit_to_page,
        )
    }

    pub fn queue(&self) -> &str {
        &self.queue
    }

    /// Arguments passed to the print command for `file`.
    pub fn arguments(&self, file: &Path) -> Vec<String> {
        let mut args = vec!["-d".to_string(), self.queue.clone()];
        if self.fit_to_page {
            args.push("-o".to_string());
            args.push(FIT_TO_PAGE_OPTION.to_string());
        }
        args.push(file.display().to_string());
        args
    }

    /// Resolve the print command on `PATH`.
    ///
    /// Used as a startup preflight; a missing command is reported but the
    /// daemon still archives and crops incoming labels.
    pub fn locate(&self) -> Result<PathBuf> {
        which::which(&self.program).map_err(|err| {
            LabelwerkError::PrintDispatch(format!(
                "print command {:?} not found: {}",
                self.program, err
            ))
        })
    }
}

impl PrintSink for LpCommand {
    #[instrument(skip(self), fields(queue = %self.queue, file = %file.display()))]
    fn submit(&self, file: &Path) -> Result<PrintReceipt> {
        info!("Sending to printer '{}'", self.queue);

        let output = Command::new(&self.program)
            .args(self.arguments(file))
            .output()
            .map_err(|err| {
                LabelwerkError::PrintDispatch(format!("cannot run {:?}: {}", self.program, err))
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);

        if !output.status.success() {
            warn!(status = %output.status, stderr = %stderr.trim(), "Print command failed");
            return Err(LabelwerkError::PrintDispatch(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }

        let request_id = parse_request_id(&stdout);
        debug!(stdout = %stdout.trim(), ?request_id, "Print command finished");
        info!(request_id = request_id.as_deref().unwrap_or("-"), "Print job sent");

        Ok(PrintReceipt { request_id })
    }
}

/// Extract the job id from `lp` output such as
/// `request id is Zebra_GK420d-17 (1 file(s))`.
fn parse_request_id(stdout: &str) -> Option<String> {
    stdout.lines().find_map(|line| {
        line.trim()
            .strip_prefix("request id is ")
            .and_then(|rest| rest.split_whitespace().next())
            .map(str::to_string)
    })
}
