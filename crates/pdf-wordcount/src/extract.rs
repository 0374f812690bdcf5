//! PDF text extraction.
//!
//! Uploads are written into a private scratch directory, flattened (unused
//! objects pruned, empty streams dropped, objects renumbered, streams
//! compressed) and only then read page by page. The scratch directory is a
//! [`tempfile::TempDir`], so both files disappear on every exit path.

use std::fs;
use std::io;
use std::path::Path;

use lopdf::Document;
use thiserror::Error;
use tracing::{debug, warn};

const PDF_MAGIC: &[u8] = b"%PDF-";
const SCRATCH_PREFIX: &str = "pdf-wordcount-";
const UPLOAD_FILE: &str = "upload.pdf";
const FLATTENED_FILE: &str = "flattened.pdf";

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("uploaded file is not a PDF document")]
    NotPdf,
    #[error("could not read PDF: {0}")]
    Pdf(#[from] lopdf::Error),
    #[error("scratch file error: {0}")]
    Io(#[from] io::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedText {
    /// Page texts in page order, joined by newlines.
    pub text: String,
    pub page_count: usize,
}

pub fn extract_text(bytes: &[u8], scratch_root: &Path) -> Result<ExtractedText, ExtractionError> {
    if !bytes.starts_with(PDF_MAGIC) {
        return Err(ExtractionError::NotPdf);
    }

    let scratch = tempfile::Builder::new()
        .prefix(SCRATCH_PREFIX)
        .tempdir_in(scratch_root)?;
    let upload = scratch.path().join(UPLOAD_FILE);
    let flattened = scratch.path().join(FLATTENED_FILE);

    fs::write(&upload, bytes)?;
    flatten(&upload, &flattened)?;
    let extracted = read_pages(&flattened)?;

    scratch.close()?;
    Ok(extracted)
}

/// Re-serialize `input` into `output` with garbage collection, cleanup and
/// deflate compression applied.
pub fn flatten(input: &Path, output: &Path) -> Result<(), ExtractionError> {
    let mut doc = Document::load(input)?;
    let pruned = doc.prune_objects();
    let emptied = doc.delete_zero_length_streams();
    doc.renumber_objects();
    doc.compress();
    doc.save(output)?;
    debug!(
        pruned = pruned.len(),
        emptied = emptied.len(),
        "flattened {}",
        output.display()
    );
    Ok(())
}

fn read_pages(path: &Path) -> Result<ExtractedText, ExtractionError> {
    let doc = Document::load(path)?;
    let pages = doc.get_pages();
    let mut parts = Vec::with_capacity(pages.len());
    for number in pages.keys() {
        match doc.extract_text(&[*number]) {
            Ok(text) => parts.push(text),
            Err(err) => warn!("skipping page {number}: {err}"),
        }
    }
    Ok(ExtractedText {
        text: parts.join("\n"),
        page_count: pages.len(),
    })
}
