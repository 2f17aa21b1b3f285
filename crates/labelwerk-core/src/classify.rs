// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Filename classifier — decide which label profile a downloaded PDF uses.
//
// Carriers and marketplaces name their downloads predictably, so the filename
// alone is enough. Rules are evaluated top to bottom and the first hit wins;
// a DHL file that also mentions Hermes is still a DHL label.

use deunicode::deunicode;

use crate::types::LabelProfile;

/// One classification rule: any needle found in the filename selects `profile`.
#[derive(Debug, Clone, Copy)]
pub struct ClassifierRule {
    /// Lowercase substrings to look for.
    pub needles: &'static [&'static str],
    /// Also match against the ASCII-folded name (umlaut spellings).
    pub folded: bool,
    pub profile: LabelProfile,
}

/// Rules in priority order.
pub const RULES: &[ClassifierRule] = &[
    ClassifierRule {
        needles: &["dhl"],
        folded: false,
        profile: LabelProfile::DhlCrop,
    },
    ClassifierRule {
        needles: &["rücksende", "rucksende"],
        folded: true,
        profile: LabelProfile::HermesReturnCrop,
    },
    ClassifierRule {
        needles: &["hermes", "paketschein"],
        folded: false,
        profile: LabelProfile::HermesOrPaketscheinCropRotate,
    },
    ClassifierRule {
        needles: &["briefmarke"],
        folded: false,
        profile: LabelProfile::StampCropScale,
    },
    ClassifierRule {
        needles: &["shipperlabel"],
        folded: false,
        profile: LabelProfile::DirectCopyMarketplace,
    },
];

/// Profile used when no rule matches.
pub const FALLBACK: LabelProfile = LabelProfile::DirectCopyStandard;

impl ClassifierRule {
    fn matches(&self, lowered: &str, folded: &str) -> bool {
        self.needles
            .iter()
            .any(|needle| lowered.contains(needle) || (self.folded && folded.contains(needle)))
    }
}

/// Classify a file by its name (not its path, not its content).
pub fn classify(file_name: &str) -> LabelProfile {
    let lowered = file_name.to_lowercase();
    // "Rücksende" -> "rucksende", also for decomposed umlauts from macOS shares.
    let folded = deunicode(file_name).to_lowercase();

    RULES
        .iter()
        .find(|rule| rule.matches(&lowered, &folded))
        .map(|rule| rule.profile)
        .unwrap_or(FALLBACK)
}
