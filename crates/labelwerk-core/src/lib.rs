// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Labelwerk — Core types, label profiles, crop geometry, filename classifier
// and error definitions shared across all crates.

pub mod classify;
pub mod config;
pub mod error;
pub mod geometry;
pub mod types;

pub use classify::classify;
pub use config::WatchdogConfig;
pub use error::LabelwerkError;
pub use geometry::compute_crop;
pub use types::*;
