// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page rewriter — the file-level operations label recipes are built from.

use std::path::Path;

use labelwerk_core::error::{LabelwerkError, Result};
use labelwerk_core::{BoundaryBox, Margin, Unit, compute_crop};
use tracing::{debug, info, instrument, warn};

use crate::pdf::PdfReader;

/// File-level page operations used by the label pipeline.
///
/// Implementations must be shareable with the blocking worker thread.
pub trait PageRewriter: Send + Sync {
    /// Write the first page of `input` to `output` with both page boxes moved
    /// inwards by `margin`. Returns the new box.
    fn crop_document(
        &self,
        input: &Path,
        output: &Path,
        margin: Margin,
        unit: Unit,
    ) -> Result<BoundaryBox>;

    /// Rotate the first page of `document` clockwise and rewrite it in place.
    fn rotate_in_place(&self, document: &Path, degrees: i64) -> Result<()>;

    /// Byte-identical copy. Returns the number of bytes copied.
    fn copy_through(&self, input: &Path, output: &Path) -> Result<u64>;
}

/// [`PageRewriter`] backed by `lopdf`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LopdfRewriter;

impl PageRewriter for LopdfRewriter {
    #[instrument(skip(self, margin), fields(input = %input.display(), output = %output.display()))]
    fn crop_document(
        &self,
        input: &Path,
        output: &Path,
        margin: Margin,
        unit: Unit,
    ) -> Result<BoundaryBox> {
        let mut page = PdfReader::open(input)?.into_first_page()?;
        let original = page.media_box();
        let cropped = compute_crop(original, margin, unit);

        if cropped.is_degenerate() {
            // Margins stay literal; an inverted box is reported, never corrected.
            warn!(
                ?original,
                ?cropped,
                ?margin,
                "Crop margins exceed the page, resulting box is inverted"
            );
        }

        page.set_boundary(cropped)?;
        page.save(output)?;

        info!(
            width = cropped.width(),
            height = cropped.height(),
            "Cropped {}",
            input.file_name().unwrap_or_default().to_string_lossy()
        );
        Ok(cropped)
    }

    #[instrument(skip(self), fields(document = %document.display()))]
    fn rotate_in_place(&self, document: &Path, degrees: i64) -> Result<()> {
        if degrees % 90 != 0 {
            return Err(LabelwerkError::InvalidRotation(degrees));
        }

        let mut page = PdfReader::open(document)?.into_first_page()?;
        page.rotate(degrees)?;
        page.save(document)?;
        Ok(())
    }

    #[instrument(skip(self), fields(input = %input.display(), output = %output.display()))]
    fn copy_through(&self, input: &Path, output: &Path) -> Result<u64> {
        let bytes = std::fs::copy(input, output)?;
        debug!(bytes, "Copied through");
        Ok(bytes)
    }
}
