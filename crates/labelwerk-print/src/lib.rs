// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Labelwerk Print — hands print-ready label files to the operating system's
// print queue. The pipeline only sees the `PrintSink` trait; `LpCommand`
// is the CUPS implementation used in production.

pub mod lp_command;
pub mod sink;

pub use lp_command::LpCommand;
pub use sink::{PrintReceipt, PrintSink};
