pub mod aggregate;
pub mod export;
pub mod extract;
pub mod handlers;
pub mod models;
pub mod normalize;
pub mod pipeline;
pub mod upload;

pub use aggregate::{LemmaGroups, WordCountRow, aggregate};
pub use export::{CSV_HEADER, csv_file_name, to_csv};
pub use extract::{ExtractedText, ExtractionError, extract_text};
pub use handlers::{AppState, router};
pub use models::{ModelConfig, ModelError, ModelRegistry};
pub use normalize::normalize;
pub use pipeline::{PipelineError, Upload, WordCountReport, count_words, process};
