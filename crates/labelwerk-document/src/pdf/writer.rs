// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Single-page editor — set page boxes and rotation on a label page and
// serialise it back to disk.
//
// Only page dictionary entries are written. Content streams are left as they
// are, so anything outside the new box is still in the file; viewers and
// CUPS clip to /CropBox.

use std::io::Write;
use std::path::Path;

use labelwerk_core::BoundaryBox;
use labelwerk_core::error::LabelwerkError;
use lopdf::{Document, Object, ObjectId};
use tempfile::NamedTempFile;
use tracing::{debug, info, instrument};

/// A document reduced to one editable page.
///
/// Created by [`crate::PdfReader::into_first_page`].
pub struct LabelPage {
    document: Document,
    page_id: ObjectId,
    media_box: BoundaryBox,
    rotation: i64,
}

impl LabelPage {
    /// Wrap `document`, pinning the resolved media box and rotation onto the
    /// page dictionary so they no longer depend on the page tree.
    pub(crate) fn new(
        mut document: Document,
        page_id: ObjectId,
        media_box: BoundaryBox,
        rotation: i64,
    ) -> Result<Self, LabelwerkError> {
        let page = page_dictionary(&mut document, page_id)?;
        page.set("MediaBox", rect_object(&media_box));
        if rotation != 0 {
            page.set("Rotate", Object::Integer(rotation));
        }

        Ok(Self {
            document,
            page_id,
            media_box,
            rotation,
        })
    }

    /// Current `/MediaBox`.
    pub fn media_box(&self) -> BoundaryBox {
        self.media_box
    }

    /// Current `/Rotate` in degrees (0, 90, 180 or 270).
    pub fn rotation(&self) -> i64 {
        self.rotation
    }

    /// Replace both `/MediaBox` and `/CropBox` with `boundary`.
    pub fn set_boundary(&mut self, boundary: BoundaryBox) -> Result<(), LabelwerkError> {
        let page = page_dictionary(&mut self.document, self.page_id)?;
        page.set("MediaBox", rect_object(&boundary));
        page.set("CropBox", rect_object(&boundary));
        self.media_box = boundary;

        debug!(?boundary, "Page boxes updated");
        Ok(())
    }

    /// Rotate clockwise by `degrees`, which must be a multiple of 90.
    ///
    /// Returns the resulting `/Rotate` value.
    pub fn rotate(&mut self, degrees: i64) -> Result<i64, LabelwerkError> {
        if degrees % 90 != 0 {
            return Err(LabelwerkError::InvalidRotation(degrees));
        }

        let new_rotation = (self.rotation + degrees).rem_euclid(360);
        let page = page_dictionary(&mut self.document, self.page_id)?;
        page.set("Rotate", Object::Integer(new_rotation));

        info!(existing_rotation = self.rotation, new_rotation, "Page rotated");
        self.rotation = new_rotation;
        Ok(new_rotation)
    }

    /// Serialise the document.
    pub fn to_bytes(&mut self) -> Result<Vec<u8>, LabelwerkError> {
        let mut output = Vec::new();
        self.document.save_to(&mut output).map_err(|err| {
            LabelwerkError::Pdf(format!("failed to serialise label page: {}", err))
        })?;
        Ok(output)
    }

    /// Serialise the document to `path`, replacing any existing file.
    ///
    /// The bytes are staged in a sibling temporary file and renamed over
    /// `path`, so on failure `path` keeps its previous contents.
    #[instrument(skip(self), fields(path = %path.as_ref().display()))]
    pub fn save(&mut self, path: impl AsRef<Path>) -> Result<(), LabelwerkError> {
        let path = path.as_ref();
        let bytes = self.to_bytes()?;

        let dir = path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        let mut staged = NamedTempFile::new_in(dir)?;
        staged.write_all(&bytes)?;
        staged.as_file().sync_all()?;
        staged.persist(path).map_err(|err| err.error)?;

        debug!(bytes = bytes.len(), "Label page written");
        Ok(())
    }
}

fn page_dictionary(
    document: &mut Document,
    page_id: ObjectId,
) -> Result<&mut lopdf::Dictionary, LabelwerkError> {
    document.get_dictionary_mut(page_id).map_err(|err| {
        LabelwerkError::Pdf(format!("cannot edit page object {:?}: {}", page_id, err))
    })
}

fn rect_object(boundary: &BoundaryBox) -> Object {
    Object::Array(
        boundary
            .to_array()
            .into_iter()
            .map(|value| Object::Real(value as f32))
            .collect(),
    )
}
