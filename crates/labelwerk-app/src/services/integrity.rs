// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Archive integrity — SHA-256 fingerprints of label files.

use std::fs::File;
use std::io;
use std::path::Path;

use labelwerk_core::error::{LabelwerkError, Result};
use sha2::{Digest, Sha256};

/// SHA-256 of the file at `path` as a lowercase hex string.
pub fn hash_file(path: &Path) -> Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher)?;
    Ok(hex::encode(hasher.finalize()))
}

/// Check that `copy` has the same content as `original`.
///
/// Returns the shared digest, or `IntegrityMismatch` with the original's
/// digest as `expected`.
pub fn verify_copy(original: &Path, copy: &Path) -> Result<String> {
    let expected = hash_file(original)?;
    let actual = hash_file(copy)?;
    if actual == expected {
        Ok(actual)
    } else {
        Err(LabelwerkError::IntegrityMismatch { expected, actual })
    }
}
