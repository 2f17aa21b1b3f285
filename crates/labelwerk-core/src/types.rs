// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Labelwerk label station.

use serde::{Deserialize, Serialize};

/// Unit in which a [`Margin`] is expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Unit {
    /// PDF user-space points (1/72 inch), the page's native unit.
    Point,
    /// Millimetres, converted with [`crate::geometry::MM_TO_PT`].
    Millimeter,
}

/// Distances trimmed from each edge of a page.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Margin {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl Margin {
    /// Margin in the (left, top, right, bottom) order the recipe table uses.
    pub const fn new(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }
}

/// A page rectangle in native coordinates (`/MediaBox`, `/CropBox`).
///
/// Stored in PDF array order: lower-left x, lower-left y, upper-right x,
/// upper-right y.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundaryBox {
    pub left: f64,
    pub bottom: f64,
    pub right: f64,
    pub top: f64,
}

impl BoundaryBox {
    pub const fn new(left: f64, bottom: f64, right: f64, top: f64) -> Self {
        Self {
            left,
            bottom,
            right,
            top,
        }
    }

    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    pub fn height(&self) -> f64 {
        self.top - self.bottom
    }

    /// True when the box is empty or inverted on either axis.
    pub fn is_degenerate(&self) -> bool {
        !(self.left < self.right && self.bottom < self.top)
    }

    /// The four coordinates in PDF rectangle order.
    pub fn to_array(&self) -> [f64; 4] {
        [self.left, self.bottom, self.right, self.top]
    }
}

/// What happens to a page after it has been cropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PostCropAction {
    None,
    /// Turn the page 90° clockwise so a landscape label feeds portrait.
    Rotate90,
}

/// How a document of a given profile is turned into a print-ready file.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Recipe {
    /// Crop straight into the processed file, then apply `post`.
    Crop {
        margin: Margin,
        unit: Unit,
        post: PostCropAction,
    },
    /// Crop into a temporary file, then copy that into the processed file.
    CropThenCopy { margin: Margin, unit: Unit },
    /// Byte-identical copy, no geometry change.
    CopyThrough,
}

/// Label layout a document was recognised as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LabelProfile {
    /// DHL Paketmarke: A4 sheet with the label in the upper half.
    DhlCrop,
    /// Hermes return label (Rücksende-Etikett).
    HermesReturnCrop,
    /// Hermes / Paketschein label, top centre of the sheet, printed rotated.
    HermesOrPaketscheinCropRotate,
    /// Deutsche Post stamp (Briefmarke) in the top-left corner.
    StampCropScale,
    /// Marketplace shipper label that is already label-sized.
    DirectCopyMarketplace,
    /// Anything unrecognised.
    DirectCopyStandard,
}

impl LabelProfile {
    /// Every profile, in classifier priority order.
    pub const ALL: [LabelProfile; 6] = [
        Self::DhlCrop,
        Self::HermesReturnCrop,
        Self::HermesOrPaketscheinCropRotate,
        Self::StampCropScale,
        Self::DirectCopyMarketplace,
        Self::DirectCopyStandard,
    ];

    /// The transform recipe for this profile.
    ///
    /// The margins were tuned by hand against the Zebra's 4x6" stock and
    /// must stay literal; see [`BoundaryBox::is_degenerate`] for how a bad
    /// fit surfaces.
    pub const fn recipe(&self) -> Recipe {
        match self {
            Self::DhlCrop => Recipe::Crop {
                margin: Margin::new(20.0, 65.0, 20.0, 485.0),
                unit: Unit::Point,
                post: PostCropAction::None,
            },
            Self::HermesReturnCrop => Recipe::Crop {
                margin: Margin::new(20.0, 180.0, 20.0, 25.0),
                unit: Unit::Millimeter,
                post: PostCropAction::None,
            },
            Self::HermesOrPaketscheinCropRotate => Recipe::Crop {
                margin: Margin::new(20.0, 10.0, 24.0, 165.0),
                unit: Unit::Millimeter,
                post: PostCropAction::Rotate90,
            },
            Self::StampCropScale => Recipe::CropThenCopy {
                margin: Margin::new(0.0, 30.0, 340.0, 670.0),
                unit: Unit::Point,
            },
            Self::DirectCopyMarketplace | Self::DirectCopyStandard => Recipe::CopyThrough,
        }
    }

    /// Short human label used in status lines.
    pub fn label(&self) -> &'static str {
        match self {
            Self::DhlCrop => "DHL crop",
            Self::HermesReturnCrop => "Hermes return label crop",
            Self::HermesOrPaketscheinCropRotate => "Hermes/Paketschein crop & rotate",
            Self::StampCropScale => "stamp crop",
            Self::DirectCopyMarketplace => "marketplace direct copy",
            Self::DirectCopyStandard => "standard direct copy",
        }
    }
}

impl std::fmt::Display for LabelProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Lifecycle stage of one file moving through the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileStage {
    /// Seen in the watch directory.
    Arrived,
    /// Copied unmodified into the archive directory.
    Archived,
    /// Profile chosen.
    Classified,
    /// Print-ready artifact written to the processed directory.
    Transformed,
    /// Handed to the print sink (successfully or not).
    Submitted,
    /// Input removed from the watch directory.
    Cleaned,
}
