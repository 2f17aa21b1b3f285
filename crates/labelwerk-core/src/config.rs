// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Daemon configuration.
//
// Built once at startup and shared read-only. There is no config file: the
// defaults describe the deployed label station, and a handful of environment
// variables can relocate it for testing or a second machine.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{LabelwerkError, Result};

/// Environment variable overriding [`WatchdogConfig::base_dir`].
pub const ENV_BASE_DIR: &str = "LABELWERK_BASE_DIR";
/// Environment variable overriding [`WatchdogConfig::printer_queue`].
pub const ENV_PRINTER: &str = "LABELWERK_PRINTER";
/// Environment variable overriding [`WatchdogConfig::print_command`].
pub const ENV_PRINT_COMMAND: &str = "LABELWERK_PRINT_COMMAND";
/// Environment variable overriding [`WatchdogConfig::settle_delay`], in milliseconds.
pub const ENV_SETTLE_MS: &str = "LABELWERK_SETTLE_MS";

const DEFAULT_BASE_DIR: &str = "/home/admin/labels";
/// CUPS queue name of the Zebra label printer, exactly as configured in CUPS.
const DEFAULT_PRINTER: &str = "Zebra_GK420d";
const DEFAULT_PRINT_COMMAND: &str = "lp";
const DEFAULT_SETTLE_DELAY: Duration = Duration::from_secs(2);

/// Immutable daemon settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchdogConfig {
    /// Root under which all four working directories live.
    pub base_dir: PathBuf,
    /// Directory watched for incoming label PDFs (non-recursive).
    pub watch_dir: PathBuf,
    /// Print-ready artifacts.
    pub processed_dir: PathBuf,
    /// Byte-identical copies of every accepted input.
    pub archive_dir: PathBuf,
    /// Inputs whose processing failed, kept for manual inspection.
    pub error_dir: PathBuf,
    /// Destination print queue.
    pub printer_queue: String,
    /// Print dispatcher executable (`lp` on CUPS systems).
    pub print_command: String,
    /// Ask the print system to scale the cropped page onto the label.
    pub fit_to_page: bool,
    /// Pause between a file appearing and reading it, to let copies finish.
    pub settle_delay: Duration,
}

impl Default for WatchdogConfig {
    fn default() -> Self {
        Self::with_base_dir(DEFAULT_BASE_DIR)
    }
}

impl WatchdogConfig {
    /// Default settings with all working directories under `base`.
    pub fn with_base_dir(base: impl AsRef<Path>) -> Self {
        let base = base.as_ref().to_path_buf();
        Self {
            watch_dir: base.join("input"),
            processed_dir: base.join("processed"),
            archive_dir: base.join("original"),
            error_dir: base.join("error"),
            base_dir: base,
            printer_queue: DEFAULT_PRINTER.to_string(),
            print_command: DEFAULT_PRINT_COMMAND.to_string(),
            fit_to_page: true,
            settle_delay: DEFAULT_SETTLE_DELAY,
        }
    }

    /// Defaults, adjusted by the `LABELWERK_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary variable source.
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let mut config = match get(ENV_BASE_DIR) {
            Some(base) => Self::with_base_dir(base),
            None => Self::default(),
        };

        if let Some(printer) = get(ENV_PRINTER) {
            config.printer_queue = printer;
        }
        if let Some(command) = get(ENV_PRINT_COMMAND) {
            config.print_command = command;
        }
        if let Some(raw) = get(ENV_SETTLE_MS) {
            let millis: u64 = raw.trim().parse().map_err(|_| {
                LabelwerkError::Config(format!("{ENV_SETTLE_MS} must be milliseconds, got {raw:?}"))
            })?;
            config.settle_delay = Duration::from_millis(millis);
        }

        Ok(config)
    }

    /// All directories the daemon writes to or watches, in bootstrap order.
    pub fn directories(&self) -> [&Path; 4] {
        [
            &self.watch_dir,
            &self.processed_dir,
            &self.archive_dir,
            &self.error_dir,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_match_label_station() {
        let config = WatchdogConfig::default();
        assert_eq!(config.watch_dir, PathBuf::from("/home/admin/labels/input"));
        assert_eq!(config.archive_dir, PathBuf::from("/home/admin/labels/original"));
        assert_eq!(config.printer_queue, "Zebra_GK420d");
        assert_eq!(config.print_command, "lp");
        assert!(config.fit_to_page);
        assert_eq!(config.settle_delay, Duration::from_secs(2));
    }

    #[test]
    fn env_overrides_are_applied() {
        let config = WatchdogConfig::from_lookup(lookup(&[
            (ENV_BASE_DIR, "/srv/labels"),
            (ENV_PRINTER, "Office_Zebra"),
            (ENV_SETTLE_MS, "250"),
        ]))
        .expect("valid config");

        assert_eq!(config.processed_dir, PathBuf::from("/srv/labels/processed"));
        assert_eq!(config.error_dir, PathBuf::from("/srv/labels/error"));
        assert_eq!(config.printer_queue, "Office_Zebra");
        assert_eq!(config.settle_delay, Duration::from_millis(250));
    }

    #[test]
    fn empty_values_are_ignored() {
        let config = WatchdogConfig::from_lookup(lookup(&[(ENV_PRINTER, "  ")])).expect("config");
        assert_eq!(config.printer_queue, "Zebra_GK420d");
    }

    #[test]
    fn bad_settle_delay_is_rejected() {
        let result = WatchdogConfig::from_lookup(lookup(&[(ENV_SETTLE_MS, "soon")]));
        assert!(matches!(result, Err(LabelwerkError::Config(_))));
    }

    #[test]
    fn config_round_trips_through_json() {
        let config = WatchdogConfig::with_base_dir("/tmp/labels");
        let json = serde_json::to_string(&config).expect("serialize");
        let back: WatchdogConfig = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, config);
    }
}
