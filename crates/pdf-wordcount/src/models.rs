//! Per-language lemmatization models, installed and loaded on first use.
//!
//! A model is a lexicon file at `<model_dir>/<code>.tsv`. When the file is
//! missing and a source URL is configured, it is downloaded from
//! `<source_url>/<code>.tsv` and persisted atomically before loading. Each
//! language has its own [`OnceCell`], so concurrent first requests share a
//! single install and load. Models can also be built locally from Universal
//! Dependencies treebanks with [`build_from_treebanks`].

use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use lemma_lexicon::LoadMode;
use lemma_lexicon::conllu::LexiconBuilder;
use lemma_tagger::Tagger;
use lemma_types::{Annotator, Language};
use thiserror::Error;
use tokio::sync::OnceCell;
use tokio::task::JoinError;
use tracing::{info, warn};

const LANGUAGE_COUNT: usize = Language::ALL.len();
const MODEL_EXTENSION: &str = "tsv";

#[derive(Clone, Debug)]
pub struct ModelConfig {
    pub model_dir: PathBuf,
    pub source_url: Option<String>,
    pub load_mode: LoadMode,
}

#[derive(Debug, Error)]
pub enum ModelError {
    #[error(
        "no {language} model at {} and no model source configured (build one with `pdf-wordcount build-model`)",
        path.display()
    )]
    Unavailable { language: Language, path: PathBuf },
    #[error("failed to download {language} model from {url}: {source}")]
    Download {
        language: Language,
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("failed to install {language} model: {source}")]
    Install {
        language: Language,
        #[source]
        source: io::Error,
    },
    #[error("failed to load {language} model: {reason:#}")]
    Load {
        language: Language,
        reason: anyhow::Error,
    },
    #[error("failed to build {language} model: {reason:#}")]
    Build {
        language: Language,
        reason: anyhow::Error,
    },
    #[error("model task failed: {0}")]
    Task(#[from] JoinError),
}

type Model = Arc<dyn Annotator>;

pub struct ModelRegistry {
    config: ModelConfig,
    client: reqwest::Client,
    slots: [OnceCell<Model>; LANGUAGE_COUNT],
}

impl ModelRegistry {
    pub fn new(config: ModelConfig) -> Self {
        Self::preloaded(config, [])
    }

    /// Registry whose listed languages are already resolved; the rest load lazily.
    pub fn preloaded(
        config: ModelConfig,
        models: impl IntoIterator<Item = (Language, Model)>,
    ) -> Self {
        let mut ready: [Option<Model>; LANGUAGE_COUNT] = [None, None];
        for (language, model) in models {
            ready[language.index()] = Some(model);
        }
        Self {
            config,
            client: reqwest::Client::new(),
            slots: ready.map(OnceCell::new_with),
        }
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    pub fn model_path(&self, language: Language) -> PathBuf {
        model_file(&self.config.model_dir, language)
    }

    pub fn is_loaded(&self, language: Language) -> bool {
        self.slots[language.index()].initialized()
    }

    pub async fn get(&self, language: Language) -> Result<Model, ModelError> {
        let model = self.slots[language.index()]
            .get_or_try_init(|| self.install_and_load(language))
            .await?;
        Ok(Arc::clone(model))
    }

    /// Resolve every language up front, logging the ones that are unavailable.
    pub async fn warm_up(&self) {
        for language in Language::ALL {
            let start = Instant::now();
            match self.get(language).await {
                Ok(_) => info!(
                    "{} model ready in {} ms",
                    language.name(),
                    start.elapsed().as_millis()
                ),
                Err(err) => warn!("{} model unavailable: {err}", language.name()),
            }
        }
    }

    async fn install_and_load(&self, language: Language) -> Result<Model, ModelError> {
        let path = self.model_path(language);
        let present = tokio::fs::try_exists(&path)
            .await
            .map_err(|source| ModelError::Install { language, source })?;
        if !present {
            self.install(language, &path).await?;
        }

        let mode = self.config.load_mode;
        let start = Instant::now();
        let tagger = tokio::task::spawn_blocking(move || Tagger::load(language, &path, mode))
            .await?
            .map_err(|reason| ModelError::Load { language, reason })?;
        info!(
            "loaded {language} model ({} forms, {} lemmas) in {} ms",
            tagger.lexicon().form_count(),
            tagger.lexicon().lemma_count(),
            start.elapsed().as_millis()
        );
        Ok(Arc::new(tagger))
    }

    async fn install(&self, language: Language, path: &Path) -> Result<(), ModelError> {
        let Some(base) = self.config.source_url.as_deref() else {
            return Err(ModelError::Unavailable {
                language,
                path: path.to_path_buf(),
            });
        };
        let url = format!(
            "{}/{}.{MODEL_EXTENSION}",
            base.trim_end_matches('/'),
            language.code()
        );
        info!("installing {language} model from {url}");

        let download_err = |source| ModelError::Download {
            language,
            url: url.clone(),
            source,
        };
        let body = self
            .client
            .get(&url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(download_err)?
            .bytes()
            .await
            .map_err(download_err)?;

        let dir = self.config.model_dir.clone();
        let target = path.to_path_buf();
        tokio::task::spawn_blocking(move || persist_model(&dir, &target, &body))
            .await?
            .map_err(|source| ModelError::Install { language, source })?;
        info!("installed {language} model at {}", path.display());
        Ok(())
    }
}

/// Summary of a model built by [`build_from_treebanks`].
#[derive(Clone, Debug)]
pub struct BuiltModel {
    pub path: PathBuf,
    pub tokens: usize,
    pub entries: usize,
}

/// Convert CoNLL-U treebanks into `<model_dir>/<code>.tsv`, replacing any existing model.
pub fn build_from_treebanks(
    model_dir: &Path,
    language: Language,
    treebanks: &[PathBuf],
) -> Result<BuiltModel, ModelError> {
    let build_err = |reason| ModelError::Build { language, reason };
    let mut builder = LexiconBuilder::new();
    for treebank in treebanks {
        let file =
            File::open(treebank).map_err(|source| ModelError::Install { language, source })?;
        builder
            .add_conllu(BufReader::new(file))
            .map_err(|err| build_err(err.context(format!("read {}", treebank.display()))))?;
    }
    if builder.entry_count() == 0 {
        return Err(build_err(anyhow::anyhow!("treebanks contain no usable tokens")));
    }

    let mut tsv = Vec::new();
    builder.write_tsv(&mut tsv).map_err(build_err)?;
    let path = model_file(model_dir, language);
    persist_model(model_dir, &path, &tsv)
        .map_err(|source| ModelError::Install { language, source })?;
    info!(
        "built {language} model at {} ({} tokens, {} entries)",
        path.display(),
        builder.token_count(),
        builder.entry_count()
    );
    Ok(BuiltModel {
        path,
        tokens: builder.token_count(),
        entries: builder.entry_count(),
    })
}

fn model_file(model_dir: &Path, language: Language) -> PathBuf {
    model_dir.join(format!("{}.{MODEL_EXTENSION}", language.code()))
}

/// Write into a temp file next to the target, then rename it into place.
fn persist_model(dir: &Path, target: &Path, bytes: &[u8]) -> io::Result<()> {
    std::fs::create_dir_all(dir)?;
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.flush()?;
    tmp.persist(target).map_err(|err| err.error)?;
    Ok(())
}
