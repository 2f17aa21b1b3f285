// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// labelwerk-document — Page rewriting for the Labelwerk label station.
//
// Provides PDF inspection (page count, inherited media box), first-page
// extraction, crop box rewriting, page rotation, and the `PageRewriter`
// seam the pipeline drives.

pub mod pdf;
pub mod rewriter;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export the primary structs so callers can use `labelwerk_document::PdfReader` etc.
pub use pdf::reader::PdfReader;
pub use pdf::writer::LabelPage;
pub use rewriter::{LopdfRewriter, PageRewriter};
