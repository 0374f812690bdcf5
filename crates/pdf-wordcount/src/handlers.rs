use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use lemma_types::Language;
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

use crate::extract::ExtractionError;
use crate::models::ModelRegistry;
use crate::pipeline::{self, PipelineError, WordCountReport};
use crate::upload::{UploadError, parse_multipart};

const BYTES_PER_MB: usize = 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<ModelRegistry>,
    pub scratch_root: PathBuf,
    pub max_upload_bytes: usize,
    pub disable_cache: bool,
}

#[derive(Serialize)]
pub struct LanguageInfo {
    code: Language,
    name: &'static str,
    loaded: bool,
}

#[derive(Serialize)]
pub struct WordCountResponse {
    #[serde(flatten)]
    report: WordCountReport,
    csv: String,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    kind: &'static str,
}

pub fn router(state: AppState) -> Router {
    let body_limit = DefaultBodyLimit::max(state.max_upload_bytes);
    Router::new()
        .route("/", get(frontend))
        .route("/robots.txt", get(robots))
        .route("/healthz", get(healthz))
        .route("/v1/languages", get(languages))
        .route("/v1/word-counts", post(word_counts))
        .route("/v1/word-counts.csv", post(word_counts_csv))
        .layer(body_limit)
        .with_state(state)
}

async fn healthz() -> impl IntoResponse {
    "ok"
}

async fn robots(State(state): State<AppState>) -> Response {
    let headers = axum::http::HeaderMap::from_iter([
        (
            header::CONTENT_TYPE,
            HeaderValue::from_static("text/plain; charset=utf-8"),
        ),
        (
            header::CACHE_CONTROL,
            HeaderValue::from_static("public, max-age=86400, immutable"),
        ),
    ]);
    if state.disable_cache {
        return "User-agent: *\nDisallow: /".into_response();
    }
    (headers, "User-agent: *\nDisallow: /").into_response()
}

async fn frontend(State(state): State<AppState>) -> Response {
    let html = Html(upload_html(state.max_upload_bytes / BYTES_PER_MB));
    if state.disable_cache {
        return html.into_response();
    }
    (
        [(
            header::CACHE_CONTROL,
            HeaderValue::from_static("public, max-age=3600"),
        )],
        html,
    )
        .into_response()
}

async fn languages(State(state): State<AppState>) -> Json<Vec<LanguageInfo>> {
    let infos = Language::ALL
        .into_iter()
        .map(|language| LanguageInfo {
            code: language,
            name: language.name(),
            loaded: state.registry.is_loaded(language),
        })
        .collect();
    Json(infos)
}

async fn word_counts(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<WordCountResponse>, ApiError> {
    let report = run(&state, multipart).await?;
    let csv = report.to_csv();
    Ok(Json(WordCountResponse { report, csv }))
}

async fn word_counts_csv(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response, ApiError> {
    let report = run(&state, multipart).await?;
    let disposition = content_disposition(&report.csv_file_name);
    let disposition = HeaderValue::from_str(&disposition).map_err(|_| ApiError::Internal)?;
    Ok((
        [
            (
                header::CONTENT_TYPE,
                HeaderValue::from_static("text/csv; charset=utf-8"),
            ),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        report.to_csv(),
    )
        .into_response())
}

async fn run(state: &AppState, multipart: Multipart) -> Result<WordCountReport, ApiError> {
    let form = parse_multipart(multipart).await?;
    let language: Language = form.language.parse().map_err(PipelineError::from)?;
    let report = pipeline::process(&state.registry, &state.scratch_root, form.file, language).await?;
    Ok(report)
}

/// Attachment header with an ASCII `filename` and the exact UTF-8 name in `filename*`.
fn content_disposition(file_name: &str) -> String {
    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        header_safe_file_name(file_name),
        urlencoding::encode(file_name)
    )
}

/// ASCII-only file name for a quoted `Content-Disposition` parameter.
fn header_safe_file_name(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            ' ' => c,
            _ if c.is_ascii_graphic() => c,
            _ => '_',
        })
        .collect()
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Upload(#[from] UploadError),
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
    #[error("internal server error")]
    Internal,
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Upload(err) => err.status(),
            ApiError::Pipeline(PipelineError::Language(_)) => StatusCode::BAD_REQUEST,
            ApiError::Pipeline(PipelineError::Extraction(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Pipeline(PipelineError::Model(_)) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Pipeline(PipelineError::Task(_)) | ApiError::Internal => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            ApiError::Upload(_) => "bad_request",
            ApiError::Pipeline(err) => err.kind(),
            ApiError::Internal => "internal",
        }
    }
}

const BASE_HTML: &str = include_str!("../templates/base.html");
const STYLE_HTML: &str = include_str!("../templates/style.html");
const HEADER_HTML: &str = include_str!("../templates/header.html");
const FOOTER_HTML: &str = include_str!("../templates/footer.html");
const UPLOAD_BODY_HTML: &str = include_str!("../templates/upload_body.html");
const UPLOAD_SCRIPT: &str = include_str!("../templates/upload_script.js");

fn render_page(title: &str, body: &str, script: &str) -> String {
    let header = HEADER_HTML.replace("{{title}}", title);
    BASE_HTML
        .replace("{{title}}", title)
        .replace("{{style}}", STYLE_HTML)
        .replace("{{header}}", &header)
        .replace("{{body}}", body)
        .replace("{{footer}}", FOOTER_HTML)
        .replace("{{scripts}}", &format!(r#"<script>{}</script>"#, script))
}

fn upload_html(max_upload_mb: usize) -> String {
    render_page("PDF Word Counter", UPLOAD_BODY_HTML, UPLOAD_SCRIPT)
        .replace("__MAX_UPLOAD_MB__", &max_upload_mb.to_string())
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            ApiError::Pipeline(PipelineError::Task(err)) => {
                error!("word count task failed: {err}");
                "internal server error".to_string()
            }
            ApiError::Pipeline(PipelineError::Extraction(ExtractionError::Io(err))) => {
                error!("scratch file error: {err}");
                self.to_string()
            }
            other => {
                warn!("request failed ({status}): {other}");
                other.to_string()
            }
        };
        let body = Json(ErrorResponse {
            error: message,
            kind: self.kind(),
        });
        (status, body).into_response()
    }
}
