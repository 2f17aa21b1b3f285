// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Crop geometry — shrink a page box by per-edge margins.

use crate::types::{BoundaryBox, Margin, Unit};

/// Points per millimetre.
pub const MM_TO_PT: f64 = 2.83465;

impl Unit {
    /// Convert a distance in this unit to points.
    pub fn to_points(&self, value: f64) -> f64 {
        match self {
            Unit::Point => value,
            Unit::Millimeter => value * MM_TO_PT,
        }
    }
}

impl Margin {
    /// The same margin expressed in points.
    pub fn to_points(&self, unit: Unit) -> Margin {
        Margin {
            left: unit.to_points(self.left),
            top: unit.to_points(self.top),
            right: unit.to_points(self.right),
            bottom: unit.to_points(self.bottom),
        }
    }
}

/// Move each edge of `page` inwards by the matching margin.
///
/// No bounds checking: a margin larger than the page yields an inverted box,
/// which callers detect with [`BoundaryBox::is_degenerate`].
pub fn compute_crop(page: BoundaryBox, margin: Margin, unit: Unit) -> BoundaryBox {
    let margin = margin.to_points(unit);
    BoundaryBox {
        left: page.left + margin.left,
        bottom: page.bottom + margin.bottom,
        right: page.right - margin.right,
        top: page.top - margin.top,
    }
}
