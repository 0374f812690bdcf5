use axum::extract::Multipart;
use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use thiserror::Error;

use crate::pipeline::Upload;

const DEFAULT_FILE_NAME: &str = "upload.pdf";

/// Fields of the word-count upload form.
pub struct UploadForm {
    pub file: Upload,
    pub language: String,
}

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("failed to read form: {0}")]
    Multipart(#[from] MultipartError),
    #[error("no file uploaded")]
    MissingFile,
    #[error("language is required")]
    MissingLanguage,
}

impl UploadError {
    pub fn status(&self) -> StatusCode {
        match self {
            UploadError::Multipart(err) => err.status(),
            UploadError::MissingFile | UploadError::MissingLanguage => StatusCode::BAD_REQUEST,
        }
    }
}

/// Read the `file` and `language` fields; anything else is drained and ignored.
pub async fn parse_multipart(mut multipart: Multipart) -> Result<UploadForm, UploadError> {
    let mut file: Option<Upload> = None;
    let mut language: Option<String> = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let file_name = field
                    .file_name()
                    .filter(|name| !name.is_empty())
                    .unwrap_or(DEFAULT_FILE_NAME)
                    .to_string();
                let bytes = field.bytes().await?.to_vec();
                file = Some(Upload { file_name, bytes });
            }
            "language" => {
                let value = field.text().await?;
                if !value.trim().is_empty() {
                    language = Some(value);
                }
            }
            _ => {
                let _ = field.bytes().await?;
            }
        }
    }

    Ok(UploadForm {
        file: file.ok_or(UploadError::MissingFile)?,
        language: language.ok_or(UploadError::MissingLanguage)?,
    })
}
