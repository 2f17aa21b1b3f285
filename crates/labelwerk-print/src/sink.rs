// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Print sink seam.

use std::path::Path;

use labelwerk_core::error::Result;

/// Acknowledgement from the print system.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrintReceipt {
    /// Queue-assigned job id (e.g. `Zebra_GK420d-17`), when the sink reports one.
    pub request_id: Option<String>,
}

/// Destination for print-ready files.
///
/// Submission blocks until the print system has accepted or rejected the
/// file; a rejection is a `LabelwerkError::PrintDispatch`.
pub trait PrintSink: Send + Sync {
    fn submit(&self, file: &Path) -> Result<PrintReceipt>;
}
