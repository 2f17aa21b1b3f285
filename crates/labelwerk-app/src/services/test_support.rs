// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Shared fixtures for pipeline and watcher tests.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use labelwerk_core::error::{LabelwerkError, Result};
use labelwerk_core::{BoundaryBox, Margin, Unit, WatchdogConfig};
use labelwerk_document::{LopdfRewriter, PageRewriter};
use labelwerk_print::{PrintReceipt, PrintSink};
use lopdf::{Document, Object, Stream, dictionary};
use tempfile::TempDir;

use super::layout::ensure_directories;
use super::pipeline::Pipeline;

/// Scratch label station in a temporary directory.
pub struct Fixture {
    _base: TempDir,
    pub config: Arc<WatchdogConfig>,
    pub sink: RecordingSink,
}

impl Fixture {
    pub fn new() -> Self {
        let base = TempDir::new().expect("tempdir");
        let mut config = WatchdogConfig::with_base_dir(base.path());
        config.settle_delay = Duration::ZERO;
        ensure_directories(&config).expect("directories");

        Self {
            _base: base,
            config: Arc::new(config),
            sink: RecordingSink::default(),
        }
    }

    /// Place a file in the watch directory.
    pub fn drop_file(&self, name: &str, bytes: &[u8]) -> PathBuf {
        let path = self.config.watch_dir.join(name);
        std::fs::write(&path, bytes).expect("write input");
        path
    }

    /// Pipeline with the real rewriter and the recording sink.
    pub fn pipeline(&self) -> Pipeline {
        self.pipeline_with(Box::new(LopdfRewriter), Box::new(self.sink.clone()))
    }

    pub fn pipeline_with(
        &self,
        rewriter: Box<dyn PageRewriter>,
        sink: Box<dyn PrintSink>,
    ) -> Pipeline {
        Pipeline::new(Arc::clone(&self.config), rewriter, sink)
    }

    /// Names of files currently in the error directory.
    pub fn error_files(&self) -> Vec<String> {
        list_names(&self.config.error_dir)
    }

    /// Names of files currently in the watch directory.
    pub fn watch_files(&self) -> Vec<String> {
        list_names(&self.config.watch_dir)
    }
}

fn list_names(dir: &Path) -> Vec<String> {
    std::fs::read_dir(dir)
        .expect("read dir")
        .map(|entry| entry.expect("entry").file_name().to_string_lossy().into_owned())
        .collect()
}

/// Print sink that records every submitted path.
#[derive(Clone, Default)]
pub struct RecordingSink {
    submitted: Arc<Mutex<Vec<PathBuf>>>,
    fail: bool,
}

impl RecordingSink {
    /// A sink that records and then rejects every file.
    pub fn failing() -> Self {
        Self {
            submitted: Arc::default(),
            fail: true,
        }
    }

    pub fn submitted(&self) -> Vec<PathBuf> {
        self.submitted.lock().expect("sink lock").clone()
    }
}

impl PrintSink for RecordingSink {
    fn submit(&self, file: &Path) -> Result<PrintReceipt> {
        self.submitted
            .lock()
            .expect("sink lock")
            .push(file.to_path_buf());
        if self.fail {
            return Err(LabelwerkError::PrintDispatch("printer offline".into()));
        }
        Ok(PrintReceipt {
            request_id: Some("Zebra_GK420d-1".into()),
        })
    }
}

/// Real rewriter whose rotation step always fails.
pub struct RotateFails;

impl PageRewriter for RotateFails {
    fn crop_document(
        &self,
        input: &Path,
        output: &Path,
        margin: Margin,
        unit: Unit,
    ) -> Result<BoundaryBox> {
        LopdfRewriter.crop_document(input, output, margin, unit)
    }

    fn rotate_in_place(&self, _document: &Path, _degrees: i64) -> Result<()> {
        Err(LabelwerkError::Pdf("simulated rotation fault".into()))
    }

    fn copy_through(&self, input: &Path, output: &Path) -> Result<u64> {
        LopdfRewriter.copy_through(input, output)
    }
}

/// A PDF with `pages` pages of `width` x `height` points.
pub fn label_pdf(width: f64, height: f64, pages: usize) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let mut kids = Vec::with_capacity(pages);
    for index in 0..pages {
        let content = format!("BT /F1 12 Tf 72 72 Td (label {index}) Tj ET");
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Real(width as f32),
                Object::Real(height as f32),
            ],
        });
        kids.push(Object::Reference(page_id));
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => pages as i64,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).expect("serialise fixture");
    bytes
}

/// `/MediaBox` of the first page of the PDF at `path`.
pub fn read_box(path: &Path) -> [f64; 4] {
    labelwerk_document::PdfReader::open(path)
        .expect("open")
        .media_box(1)
        .expect("media box")
        .to_array()
}
