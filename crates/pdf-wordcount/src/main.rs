use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use lemma_lexicon::LoadMode;
use lemma_types::Language;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{Level, info};
use tracing_subscriber::EnvFilter;

use pdf_wordcount::models::build_from_treebanks;
use pdf_wordcount::{AppState, ModelConfig, ModelRegistry, Upload, csv_file_name, process, router};

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_MODEL_DIR: &str = "models";
const DEFAULT_MAX_UPLOAD_MB: usize = 50;
const STDOUT_MARKER: &str = "-";

#[derive(Parser, Debug)]
#[command(
    name = "pdf-wordcount",
    version,
    about = "Count lemmatized word variants in German and French PDFs"
)]
struct Cli {
    #[command(flatten)]
    config: Config,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Args, Debug, Clone)]
struct Config {
    /// Address to bind the HTTP server to.
    #[arg(long, env = "HOST", default_value = DEFAULT_HOST)]
    host: String,
    #[arg(long, env = "PORT", default_value_t = DEFAULT_PORT)]
    port: u16,
    /// Directory holding `<lang>.tsv` lexicon models.
    #[arg(long, env = "MODEL_DIR", default_value = DEFAULT_MODEL_DIR)]
    model_dir: PathBuf,
    /// Base URL missing models are downloaded from.
    #[arg(long, env = "MODEL_SOURCE_URL")]
    model_source_url: Option<String>,
    #[arg(long, env = "MODEL_LOAD_MODE", default_value = "mmap", value_parser = parse_load_mode)]
    model_load_mode: LoadMode,
    /// Where per-request scratch directories are created (system temp dir by default).
    #[arg(long, env = "SCRATCH_DIR")]
    scratch_dir: Option<PathBuf>,
    #[arg(long, env = "MAX_UPLOAD_MB", default_value_t = DEFAULT_MAX_UPLOAD_MB)]
    max_upload_mb: usize,
    /// Disable cache headers on static responses.
    #[arg(long)]
    no_cache: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP server (default).
    Serve,
    /// Count the words of a local PDF and write the CSV.
    Count {
        pdf: PathBuf,
        #[arg(short, long)]
        language: Language,
        /// Output path, or `-` for stdout. Defaults to `<name>_word_count.csv`.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Build `<model-dir>/<lang>.tsv` from Universal Dependencies CoNLL-U treebanks.
    BuildModel {
        #[arg(short, long)]
        language: Language,
        #[arg(required = true)]
        treebanks: Vec<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let Cli { config, command } = Cli::parse();
    let scratch_root = match &config.scratch_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("create scratch dir {}", dir.display()))?;
            dir.clone()
        }
        None => std::env::temp_dir(),
    };
    let registry = Arc::new(ModelRegistry::new(ModelConfig {
        model_dir: config.model_dir.clone(),
        source_url: config.model_source_url.clone(),
        load_mode: config.model_load_mode,
    }));

    match command.unwrap_or(Command::Serve) {
        Command::Serve => serve(&config, registry, scratch_root).await,
        Command::Count {
            pdf,
            language,
            output,
        } => count(&registry, &scratch_root, &pdf, language, output).await,
        Command::BuildModel {
            language,
            treebanks,
        } => {
            let model_dir = config.model_dir.clone();
            let built = tokio::task::spawn_blocking(move || {
                build_from_treebanks(&model_dir, language, &treebanks)
            })
            .await??;
            info!(
                "{} model ready at {} ({} entries)",
                language.name(),
                built.path.display(),
                built.entries
            );
            Ok(())
        }
    }
}

async fn serve(
    config: &Config,
    registry: Arc<ModelRegistry>,
    scratch_root: PathBuf,
) -> anyhow::Result<()> {
    info!("binding to {}:{}", config.host, config.port);
    info!(
        "using models in {} (mode: {:?})",
        config.model_dir.display(),
        config.model_load_mode
    );
    match &config.model_source_url {
        Some(url) => info!("missing models are installed from {url}"),
        None => info!("model download disabled (no source url); use `build-model` to create models"),
    }
    info!("scratch files under {}", scratch_root.display());
    if config.no_cache {
        info!("cache headers disabled");
    }

    let start = Instant::now();
    registry.warm_up().await;
    info!("models warmed up in {} ms", start.elapsed().as_millis());

    let state = AppState {
        registry,
        scratch_root,
        max_upload_bytes: config.max_upload_mb.saturating_mul(1024 * 1024),
        disable_cache: config.no_cache,
    };

    let app = router(state).layer(TraceLayer::new_for_http());
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .with_context(|| format!("invalid listen address {}:{}", config.host, config.port))?;
    let listener = TcpListener::bind(addr).await?;

    axum::serve(listener, app).await?;
    Ok(())
}

async fn count(
    registry: &ModelRegistry,
    scratch_root: &Path,
    pdf: &Path,
    language: Language,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let bytes = tokio::fs::read(pdf)
        .await
        .with_context(|| format!("read {}", pdf.display()))?;
    let file_name = pdf
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let upload = Upload { file_name, bytes };

    let report = process(registry, scratch_root, upload, language)
        .await
        .with_context(|| format!("count words in {}", pdf.display()))?;
    let csv = report.to_csv();

    let output = output.unwrap_or_else(|| PathBuf::from(csv_file_name(&report.file_name)));
    if output.as_os_str() == STDOUT_MARKER {
        println!("{csv}");
    } else {
        tokio::fs::write(&output, &csv)
            .await
            .with_context(|| format!("write {}", output.display()))?;
        info!("wrote {} rows to {}", report.rows.len(), output.display());
    }
    Ok(())
}

fn parse_load_mode(raw: &str) -> Result<LoadMode, String> {
    match raw.to_ascii_lowercase().as_str() {
        "mmap" => Ok(LoadMode::Mmap),
        "owned" => Ok(LoadMode::Owned),
        other => Err(format!("unknown load mode {other:?} (expected mmap or owned)")),
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let max_level = env_filter
        .max_level_hint()
        .and_then(|hint| hint.into_level())
        .unwrap_or(Level::INFO);
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_level(true)
        .with_max_level(max_level)
        .with_writer(std::io::stderr)
        .init();
}
