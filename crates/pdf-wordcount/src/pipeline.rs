//! Extractor, normalizer and aggregator wired together for one upload.

use std::path::Path;
use std::time::Instant;

use lemma_types::{Annotator, Language, LanguageError};
use serde::Serialize;
use thiserror::Error;
use tokio::task::JoinError;
use tracing::info;

use crate::aggregate::{WordCountRow, aggregate};
use crate::export::{csv_file_name, to_csv};
use crate::extract::{ExtractionError, extract_text};
use crate::models::{ModelError, ModelRegistry};
use crate::normalize::normalize;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Language(#[from] LanguageError),
    #[error(transparent)]
    Extraction(#[from] ExtractionError),
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error("processing task failed: {0}")]
    Task(#[from] JoinError),
}

impl PipelineError {
    /// Short machine-readable name used in error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::Language(_) => "invalid_language",
            PipelineError::Extraction(_) => "extraction",
            PipelineError::Model(_) => "model_unavailable",
            PipelineError::Task(_) => "internal",
        }
    }
}

/// A document to count: the raw bytes plus the name it was uploaded under.
#[derive(Clone, Debug)]
pub struct Upload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

#[derive(Clone, Debug, Serialize)]
pub struct WordCountReport {
    pub file_name: String,
    pub csv_file_name: String,
    pub language: Language,
    pub page_count: usize,
    pub token_count: usize,
    pub rows: Vec<WordCountRow>,
}

impl WordCountReport {
    pub fn to_csv(&self) -> String {
        to_csv(&self.rows)
    }
}

/// Run the whole pipeline on the current thread.
pub fn count_words(
    upload: &Upload,
    language: Language,
    annotator: &dyn Annotator,
    scratch_root: &Path,
) -> Result<WordCountReport, PipelineError> {
    let start = Instant::now();
    let extracted = extract_text(&upload.bytes, scratch_root)?;
    let tokens = normalize(&extracted.text);
    let rows = aggregate(&tokens, annotator).ranked();
    info!(
        "counted {} ({language}): {} pages, {} tokens, {} lemmas in {} ms",
        upload.file_name,
        extracted.page_count,
        tokens.len(),
        rows.len(),
        start.elapsed().as_millis()
    );
    Ok(WordCountReport {
        file_name: upload.file_name.clone(),
        csv_file_name: csv_file_name(&upload.file_name),
        language,
        page_count: extracted.page_count,
        token_count: tokens.len(),
        rows,
    })
}

/// Resolve the model for `language` and count on a blocking worker.
pub async fn process(
    registry: &ModelRegistry,
    scratch_root: &Path,
    upload: Upload,
    language: Language,
) -> Result<WordCountReport, PipelineError> {
    let model = registry.get(language).await?;
    let scratch_root = scratch_root.to_path_buf();
    let report = tokio::task::spawn_blocking(move || {
        count_words(&upload, language, model.as_ref(), &scratch_root)
    })
    .await??;
    Ok(report)
}
