// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Label pipeline — one arrived file from archive to cleanup.
//
//   Arrived -> Archived -> Classified -> Transformed -> Submitted -> Cleaned
//
// Archive and transform failures are fatal for the file: the input is moved
// to the error directory as `error_<name>`. Rotation and print failures are
// logged and recorded on the report, and the file still completes. The input
// never stays in the watch directory.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use labelwerk_core::error::LabelwerkError;
use labelwerk_core::{
    BoundaryBox, FileStage, LabelProfile, PostCropAction, Recipe, WatchdogConfig, classify,
};
use labelwerk_document::PageRewriter;
use labelwerk_print::{PrintReceipt, PrintSink};
use thiserror::Error;
use tracing::{debug, error, info, instrument, warn};

use super::integrity;

/// Filename prefix for inputs moved to the error directory.
pub const ERROR_PREFIX: &str = "error_";
/// Filename prefix for the intermediate crop of two-stage recipes.
pub const TEMP_PREFIX: &str = "temp_";

/// Why a file could not be processed.
///
/// Every variant means the input was (or should be) quarantined.
#[derive(Debug, Error)]
pub enum ProcessingError {
    #[error("archiving {file} failed: {source}")]
    Archive {
        file: String,
        #[source]
        source: LabelwerkError,
    },

    #[error("{profile} of {file} failed: {source}")]
    Transform {
        file: String,
        profile: LabelProfile,
        #[source]
        source: LabelwerkError,
    },

    #[error("unexpected fault while processing {file}: {detail}")]
    Fault {
        file: String,
        stage: FileStage,
        detail: String,
    },
}

impl ProcessingError {
    /// The stage the file was trying to reach when it failed.
    pub fn failed_stage(&self) -> FileStage {
        match self {
            Self::Archive { .. } => FileStage::Archived,
            Self::Transform { .. } => FileStage::Transformed,
            Self::Fault { stage, .. } => *stage,
        }
    }
}

/// Result of handing the processed file to the print sink.
#[derive(Debug)]
pub enum PrintOutcome {
    Sent(PrintReceipt),
    /// Logged only; printing does not gate cleanup.
    Failed(LabelwerkError),
}

/// Summary of a file that made it all the way to cleanup.
#[derive(Debug)]
pub struct FileReport {
    pub file_name: String,
    pub profile: LabelProfile,
    pub archived: PathBuf,
    pub processed: PathBuf,
    /// SHA-256 of the input, identical to the archive copy.
    pub digest: String,
    /// New page box, for cropping recipes.
    pub crop: Option<BoundaryBox>,
    /// Set when the post-crop rotation failed and the label went out unrotated.
    pub rotation_error: Option<LabelwerkError>,
    pub print: PrintOutcome,
}

/// Terminal state of one file.
#[derive(Debug)]
pub enum FileOutcome {
    Cleaned(FileReport),
    Failed {
        error: ProcessingError,
        /// Where the input ended up, if it could be moved.
        quarantined: Option<PathBuf>,
    },
}

impl FileOutcome {
    pub fn is_cleaned(&self) -> bool {
        matches!(self, Self::Cleaned(_))
    }
}

struct Transformed {
    crop: Option<BoundaryBox>,
    rotation_error: Option<LabelwerkError>,
}

/// The per-file orchestrator.
///
/// Shared with the blocking worker via `Arc`; holds no mutable state.
pub struct Pipeline {
    config: Arc<WatchdogConfig>,
    rewriter: Box<dyn PageRewriter>,
    sink: Box<dyn PrintSink>,
}

impl Pipeline {
    pub fn new(
        config: Arc<WatchdogConfig>,
        rewriter: Box<dyn PageRewriter>,
        sink: Box<dyn PrintSink>,
    ) -> Self {
        Self {
            config,
            rewriter,
            sink,
        }
    }

    pub fn config(&self) -> &WatchdogConfig {
        &self.config
    }

    /// Process `input` and quarantine it if processing fails.
    ///
    /// This is the failure boundary used by the watch loop: it never returns
    /// an error, and afterwards `input` no longer exists in the watch directory
    /// (unless even the quarantine move failed, which is logged).
    pub fn handle(&self, input: &Path) -> FileOutcome {
        match self.process_file(input) {
            Ok(report) => FileOutcome::Cleaned(report),
            Err(error) => {
                error!(
                    file = %input.display(),
                    stage = ?error.failed_stage(),
                    "Processing failed: {error}"
                );
                let quarantined = self.quarantine(input);
                FileOutcome::Failed { error, quarantined }
            }
        }
    }

    /// Run the full pipeline for one file.
    #[instrument(skip(self), fields(input = %input.display()))]
    pub fn process_file(&self, input: &Path) -> Result<FileReport, ProcessingError> {
        let file_name = input
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| ProcessingError::Fault {
                file: input.display().to_string(),
                stage: FileStage::Arrived,
                detail: "path has no file name".to_string(),
            })?;

        info!("Label detected: {file_name}");

        // 1. Archive the untouched original.
        let (archived, digest) =
            self.archive(input, &file_name)
                .map_err(|source| ProcessingError::Archive {
                    file: file_name.clone(),
                    source,
                })?;
        info!(digest = %digest, "Original archived to {}", archived.display());

        // 2. Classify.
        let profile = classify(&file_name);
        info!(profile = ?profile, "Mode: {profile}");

        // 3. Transform into the processed directory.
        let processed = self.config.processed_dir.join(&file_name);
        let transformed = self
            .transform(profile, input, &processed, &file_name)
            .map_err(|source| ProcessingError::Transform {
                file: file_name.clone(),
                profile,
                source,
            })?;

        // 4. Print. Best effort: a failure is reported but cleanup still runs.
        let print = match self.sink.submit(&processed) {
            Ok(receipt) => PrintOutcome::Sent(receipt),
            Err(err) => {
                warn!(error = %err, "Print dispatch failed, continuing with cleanup");
                PrintOutcome::Failed(err)
            }
        };

        // 5. Remove the input from the watch directory.
        remove_input(input).map_err(|err| ProcessingError::Fault {
            file: file_name.clone(),
            stage: FileStage::Cleaned,
            detail: format!("cannot remove input: {err}"),
        })?;
        info!("Input cleaned up");

        Ok(FileReport {
            file_name,
            profile,
            archived,
            processed,
            digest,
            crop: transformed.crop,
            rotation_error: transformed.rotation_error,
            print,
        })
    }

    /// Move `input` into the error directory as `error_<name>`.
    ///
    /// Returns the new path, or `None` if the input was already gone or could
    /// not be moved.
    pub fn quarantine(&self, input: &Path) -> Option<PathBuf> {
        if !input.exists() {
            debug!(file = %input.display(), "Nothing to quarantine");
            return None;
        }

        let name = input
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "unnamed.pdf".to_string());
        let target = self.config.error_dir.join(format!("{ERROR_PREFIX}{name}"));

        match move_file(input, &target) {
            Ok(()) => {
                warn!(target = %target.display(), "Input moved to error directory");
                Some(target)
            }
            Err(err) => {
                error!(
                    file = %input.display(),
                    target = %target.display(),
                    error = %err,
                    "Could not move input to error directory"
                );
                None
            }
        }
    }

    // -- Steps ----------------------------------------------------------------

    fn archive(&self, input: &Path, file_name: &str) -> Result<(PathBuf, String), LabelwerkError> {
        let target = self.config.archive_dir.join(file_name);
        std::fs::copy(input, &target)?;
        let digest = integrity::verify_copy(input, &target)?;
        Ok((target, digest))
    }

    fn transform(
        &self,
        profile: LabelProfile,
        input: &Path,
        processed: &Path,
        file_name: &str,
    ) -> Result<Transformed, LabelwerkError> {
        match profile.recipe() {
            Recipe::Crop { margin, unit, post } => {
                let crop = self
                    .rewriter
                    .crop_document(input, processed, margin, unit)?;
                let rotation_error = match post {
                    PostCropAction::None => None,
                    PostCropAction::Rotate90 => self.rotate(processed),
                };
                Ok(Transformed {
                    crop: Some(crop),
                    rotation_error,
                })
            }
            Recipe::CropThenCopy { margin, unit } => {
                let temp = self
                    .config
                    .processed_dir
                    .join(format!("{TEMP_PREFIX}{file_name}"));
                let result = self
                    .rewriter
                    .crop_document(input, &temp, margin, unit)
                    .and_then(|crop| {
                        self.rewriter.copy_through(&temp, processed)?;
                        Ok(crop)
                    });
                if temp.exists() {
                    if let Err(err) = std::fs::remove_file(&temp) {
                        warn!(temp = %temp.display(), error = %err, "Could not remove temporary crop");
                    }
                }
                Ok(Transformed {
                    crop: Some(result?),
                    rotation_error: None,
                })
            }
            Recipe::CopyThrough => {
                self.rewriter.copy_through(input, processed)?;
                Ok(Transformed {
                    crop: None,
                    rotation_error: None,
                })
            }
        }
    }

    /// Rotate the processed label; a failure leaves the unrotated crop in place.
    fn rotate(&self, processed: &Path) -> Option<LabelwerkError> {
        match self.rewriter.rotate_in_place(processed, 90) {
            Ok(()) => {
                info!("Label rotated");
                None
            }
            Err(err) => {
                warn!(error = %err, "Rotation failed, printing unrotated label");
                Some(err)
            }
        }
    }
}

fn remove_input(input: &Path) -> std::io::Result<()> {
    match std::fs::remove_file(input) {
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}

/// Rename, falling back to copy + delete across filesystems.
fn move_file(from: &Path, to: &Path) -> std::io::Result<()> {
    if std::fs::rename(from, to).is_ok() {
        return Ok(());
    }
    std::fs::copy(from, to)?;
    std::fs::remove_file(from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::{
        Fixture, RecordingSink, RotateFails, label_pdf, read_box,
    };
    use labelwerk_document::LopdfRewriter;

    #[test]
    fn dhl_label_is_cropped_printed_and_cleaned() {
        let fx = Fixture::new();
        let input = fx.drop_file("DHL-Paketmarke_123.pdf", &label_pdf(400.0, 600.0, 1));

        let report = match fx.pipeline().handle(&input) {
            FileOutcome::Cleaned(report) => report,
            other => panic!("expected success, got {other:?}"),
        };

        assert_eq!(report.profile, LabelProfile::DhlCrop);
        assert_eq!(report.crop, Some(BoundaryBox::new(20.0, 485.0, 380.0, 535.0)));
        assert_eq!(read_box(&report.processed), [20.0, 485.0, 380.0, 535.0]);
        assert!(matches!(report.print, PrintOutcome::Sent(_)));
        assert_eq!(fx.sink.submitted(), vec![report.processed.clone()]);
        assert!(!input.exists());
        assert!(report.archived.exists());
    }

    #[test]
    fn archive_copy_is_byte_identical_to_input() {
        let fx = Fixture::new();
        let bytes = label_pdf(595.0, 842.0, 1);
        let input = fx.drop_file("Paketschein_1.pdf", &bytes);

        let FileOutcome::Cleaned(report) = fx.pipeline().handle(&input) else {
            panic!("expected success");
        };
        assert_eq!(std::fs::read(&report.archived).expect("archive"), bytes);
        assert_eq!(report.archived, fx.config.archive_dir.join("Paketschein_1.pdf"));
    }

    #[test]
    fn hermes_label_is_rotated() {
        let fx = Fixture::new();
        let input = fx.drop_file("Hermes_Label.pdf", &label_pdf(595.0, 842.0, 1));

        let FileOutcome::Cleaned(report) = fx.pipeline().handle(&input) else {
            panic!("expected success");
        };
        assert_eq!(report.profile, LabelProfile::HermesOrPaketscheinCropRotate);
        assert!(report.rotation_error.is_none());

        let reader = labelwerk_document::PdfReader::open(&report.processed).expect("open");
        assert_eq!(reader.rotation(1).expect("rotation"), 90);
    }

    #[test]
    fn rotation_failure_still_prints_unrotated_crop() {
        let fx = Fixture::new();
        let input = fx.drop_file("Hermes_Label.pdf", &label_pdf(595.0, 842.0, 1));

        let pipeline = fx.pipeline_with(Box::new(RotateFails), Box::new(fx.sink.clone()));
        let report = match pipeline.handle(&input) {
            FileOutcome::Cleaned(report) => report,
            other => panic!("rotation failure must not fail the file, got {other:?}"),
        };

        assert!(report.rotation_error.is_some());
        assert_eq!(fx.sink.submitted(), vec![report.processed.clone()]);

        let reader = labelwerk_document::PdfReader::open(&report.processed).expect("open");
        assert_eq!(reader.rotation(1).expect("rotation"), 0);
        assert_eq!(
            reader.media_box(1).expect("media box"),
            report.crop.expect("crop")
        );

        assert!(!input.exists());
        assert!(fx.error_files().is_empty());
    }

    #[test]
    fn copy_through_profiles_match_archive() {
        let fx = Fixture::new();
        for name in ["ShipperLabel_302.pdf", "random-scan.PDF"] {
            let input = fx.drop_file(name, &label_pdf(288.0, 432.0, 1));
            let FileOutcome::Cleaned(report) = fx.pipeline().handle(&input) else {
                panic!("expected success for {name}");
            };
            assert!(report.crop.is_none());
            assert_eq!(
                std::fs::read(&report.processed).expect("processed"),
                std::fs::read(&report.archived).expect("archived"),
                "{name}"
            );
        }
    }

    #[test]
    fn stamp_is_cropped_via_temporary_file() {
        let fx = Fixture::new();
        let input = fx.drop_file("Briefmarken_2026.pdf", &label_pdf(595.0, 842.0, 1));

        let FileOutcome::Cleaned(report) = fx.pipeline().handle(&input) else {
            panic!("expected success");
        };
        assert_eq!(report.profile, LabelProfile::StampCropScale);
        assert_eq!(read_box(&report.processed), [0.0, 670.0, 255.0, 812.0]);
        assert!(!fx.config.processed_dir.join("temp_Briefmarken_2026.pdf").exists());
    }

    #[test]
    fn corrupt_pdf_is_quarantined() {
        let fx = Fixture::new();
        let input = fx.drop_file("DHL-broken.pdf", b"%PDF-1.4 garbage");

        let outcome = fx.pipeline().handle(&input);
        let FileOutcome::Failed { error, quarantined } = outcome else {
            panic!("expected failure");
        };

        assert!(matches!(error, ProcessingError::Transform { .. }));
        assert_eq!(error.failed_stage(), FileStage::Transformed);
        assert_eq!(
            quarantined,
            Some(fx.config.error_dir.join("error_DHL-broken.pdf"))
        );
        assert!(!input.exists());
        assert!(fx.sink.submitted().is_empty());
    }

    #[test]
    fn zero_page_pdf_is_quarantined() {
        let fx = Fixture::new();
        let input = fx.drop_file("DHL-leer.pdf", &label_pdf(400.0, 600.0, 0));

        let outcome = fx.pipeline().handle(&input);
        let FileOutcome::Failed { error, quarantined } = outcome else {
            panic!("expected failure");
        };

        assert!(matches!(
            error,
            ProcessingError::Transform {
                source: LabelwerkError::PageOutOfRange { page: 1, count: 0 },
                ..
            }
        ));
        assert_eq!(quarantined, Some(fx.config.error_dir.join("error_DHL-leer.pdf")));
        assert_eq!(fx.error_files(), vec!["error_DHL-leer.pdf"]);
        assert!(fx.watch_files().is_empty());
        assert!(!fx.config.processed_dir.join("DHL-leer.pdf").exists());
        assert!(fx.sink.submitted().is_empty());
    }

    #[test]
    fn stamp_failure_removes_temporary_file() {
        let fx = Fixture::new();
        let input = fx.drop_file("Briefmarke.pdf", b"");

        let outcome = fx.pipeline().handle(&input);
        assert!(!outcome.is_cleaned());
        assert!(!fx.config.processed_dir.join("temp_Briefmarke.pdf").exists());
        assert!(!input.exists());
    }

    #[test]
    fn archive_failure_is_quarantined() {
        let fx = Fixture::new();
        let input = fx.drop_file("label.pdf", &label_pdf(288.0, 432.0, 1));
        std::fs::remove_dir_all(&fx.config.archive_dir).expect("remove archive dir");

        let outcome = fx.pipeline().handle(&input);
        let FileOutcome::Failed { error, quarantined } = outcome else {
            panic!("expected failure");
        };
        assert!(matches!(error, ProcessingError::Archive { .. }));
        assert!(quarantined.is_some());
        assert!(!input.exists());
    }

    #[test]
    fn print_failure_still_cleans_up() {
        let fx = Fixture::new();
        let input = fx.drop_file("label.pdf", &label_pdf(288.0, 432.0, 1));
        let failing = RecordingSink::failing();

        let pipeline = fx.pipeline_with(Box::new(LopdfRewriter), Box::new(failing.clone()));
        let FileOutcome::Cleaned(report) = pipeline.handle(&input) else {
            panic!("print failure must not fail the file");
        };

        assert!(matches!(report.print, PrintOutcome::Failed(_)));
        assert_eq!(failing.submitted().len(), 1);
        assert!(!input.exists());
        assert!(report.processed.exists());
        assert!(fx.error_files().is_empty());
    }

    #[test]
    fn quarantine_of_missing_file_is_noop() {
        let fx = Fixture::new();
        assert_eq!(
            fx.pipeline()
                .quarantine(&fx.config.watch_dir.join("gone.pdf")),
            None
        );
    }
}
