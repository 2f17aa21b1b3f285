// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF reader — open carrier label PDFs, inspect page geometry, and cut them
// down to their first page using the `lopdf` crate.

use std::path::Path;

use labelwerk_core::BoundaryBox;
use labelwerk_core::error::LabelwerkError;
use lopdf::{Document, Object, ObjectId};
use tracing::{debug, info, instrument};

use super::writer::LabelPage;

/// Guard against cyclic /Parent chains in damaged files.
const MAX_TREE_DEPTH: usize = 32;

/// Reads existing PDF files.
///
/// Wraps `lopdf::Document` and resolves the page attributes that PDF allows
/// to be inherited from the page tree (`/MediaBox`, `/Rotate`).
pub struct PdfReader {
    /// The underlying lopdf document.
    document: Document,
    /// Source path, if opened from a file. Recorded on the extraction span.
    source_path: Option<String>,
}

impl PdfReader {
    // -- Construction ---------------------------------------------------------

    /// Open a PDF from the filesystem.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self, LabelwerkError> {
        let path_ref = path.as_ref();
        info!("Opening PDF: {}", path_ref.display());

        let document = Document::load(path_ref).map_err(|err| {
            LabelwerkError::Pdf(format!("failed to open {}: {}", path_ref.display(), err))
        })?;

        debug!(pages = document.get_pages().len(), "PDF loaded");

        Ok(Self {
            document,
            source_path: Some(path_ref.display().to_string()),
        })
    }

    /// Create a reader from raw PDF bytes already in memory.
    #[instrument(skip_all, fields(bytes_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self, LabelwerkError> {
        let document = Document::load_mem(data).map_err(|err| {
            LabelwerkError::Pdf(format!("failed to load PDF from memory: {}", err))
        })?;

        debug!(pages = document.get_pages().len(), "PDF loaded from bytes");

        Ok(Self {
            document,
            source_path: None,
        })
    }

    // -- Inspection -----------------------------------------------------------

    /// Number of pages in the document.
    pub fn page_count(&self) -> usize {
        self.document.get_pages().len()
    }

    /// Object id of a page (1-indexed).
    pub fn page_id(&self, page_number: u32) -> Result<ObjectId, LabelwerkError> {
        let pages = self.document.get_pages();
        pages
            .get(&page_number)
            .copied()
            .ok_or(LabelwerkError::PageOutOfRange {
                page: page_number,
                count: pages.len(),
            })
    }

    /// Effective `/MediaBox` of a page (1-indexed), following the page tree
    /// when the page itself does not carry one.
    pub fn media_box(&self, page_number: u32) -> Result<BoundaryBox, LabelwerkError> {
        let page_id = self.page_id(page_number)?;
        let object = self
            .inherited_attribute(page_id, b"MediaBox")?
            .ok_or_else(|| LabelwerkError::Pdf(format!("page {page_number} has no /MediaBox")))?;
        rect_from_object(&self.document, object)
    }

    /// Effective `/Rotate` of a page (1-indexed), 0 when unset.
    pub fn rotation(&self, page_number: u32) -> Result<i64, LabelwerkError> {
        let page_id = self.page_id(page_number)?;
        Ok(self
            .inherited_attribute(page_id, b"Rotate")?
            .and_then(|obj| obj.as_i64().ok())
            .unwrap_or(0))
    }

    // -- Extraction -----------------------------------------------------------

    /// Reduce the document to its first page and hand it over for editing.
    ///
    /// Later pages are dropped. Inheritable attributes are pinned onto the
    /// page first so they survive pruning of the page tree.
    #[instrument(skip(self), fields(source = self.source_path.as_deref().unwrap_or("<memory>")))]
    pub fn into_first_page(self) -> Result<LabelPage, LabelwerkError> {
        let page_id = self.page_id(1)?;
        let media_box = self.media_box(1)?;
        let rotation = self.rotation(1)?;

        let extra_pages: Vec<u32> = self
            .document
            .get_pages()
            .keys()
            .copied()
            .filter(|number| *number > 1)
            .collect();

        let mut document = self.document;
        if !extra_pages.is_empty() {
            info!(dropped = extra_pages.len(), "Discarding pages after the first");
            document.delete_pages(&extra_pages);
            let pruned = document.prune_objects();
            debug!(pruned = pruned.len(), "Unreferenced objects pruned");
        }

        LabelPage::new(document, page_id, media_box, rotation)
    }

    // -- Helpers --------------------------------------------------------------

    /// Look up `key` on the page, then on each ancestor in the page tree.
    fn inherited_attribute(
        &self,
        page_id: ObjectId,
        key: &[u8],
    ) -> Result<Option<&Object>, LabelwerkError> {
        let mut current = Some(page_id);

        for _ in 0..MAX_TREE_DEPTH {
            let Some(node_id) = current else {
                return Ok(None);
            };
            let node = self.document.get_dictionary(node_id).map_err(|err| {
                LabelwerkError::Pdf(format!("cannot read page tree node {:?}: {}", node_id, err))
            })?;
            if let Ok(value) = node.get(key) {
                return Ok(Some(value));
            }
            current = node.get(b"Parent").and_then(Object::as_reference).ok();
        }

        Err(LabelwerkError::Pdf(format!(
            "page tree deeper than {MAX_TREE_DEPTH} levels (cyclic /Parent?)"
        )))
    }
}

/// Parse a PDF rectangle (`[llx lly urx ury]`), resolving an indirect array.
///
/// Rectangles may be written with any two diagonally opposite corners, so the
/// coordinates are normalised to lower-left / upper-right.
fn rect_from_object(document: &Document, object: &Object) -> Result<BoundaryBox, LabelwerkError> {
    let object = match object {
        Object::Reference(id) => document.get_object(*id).map_err(|err| {
            LabelwerkError::Pdf(format!("cannot resolve rectangle {:?}: {}", id, err))
        })?,
        other => other,
    };

    let values = object
        .as_array()
        .map_err(|_| LabelwerkError::Pdf("page rectangle is not an array".to_string()))?;
    if values.len() != 4 {
        return Err(LabelwerkError::Pdf(format!(
            "page rectangle has {} entries, expected 4",
            values.len()
        )));
    }

    let mut coords = [0.0_f64; 4];
    for (slot, value) in coords.iter_mut().zip(values) {
        *slot = number(value)
            .ok_or_else(|| LabelwerkError::Pdf(format!("non-numeric rectangle entry {value:?}")))?;
    }

    let [x1, y1, x2, y2] = coords;
    Ok(BoundaryBox::new(x1.min(x2), y1.min(y2), x1.max(x2), y1.max(y2)))
}

fn number(object: &Object) -> Option<f64> {
    match object {
        Object::Integer(value) => Some(*value as f64),
        Object::Real(value) => Some(f64::from(*value)),
        _ => None,
    }
}
