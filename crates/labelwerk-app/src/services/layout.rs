// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Working directory bootstrap.

use labelwerk_core::WatchdogConfig;
use labelwerk_core::error::Result;
use tracing::{debug, info};

/// Create the watch, processed, archive and error directories if missing.
///
/// Runs once before the watch loop starts.
pub fn ensure_directories(config: &WatchdogConfig) -> Result<()> {
    for dir in config.directories() {
        if dir.is_dir() {
            debug!(path = %dir.display(), "directory present");
            continue;
        }
        std::fs::create_dir_all(dir)?;
        info!(path = %dir.display(), "created directory");
    }
    Ok(())
}
