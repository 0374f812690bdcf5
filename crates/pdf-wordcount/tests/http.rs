mod common;

use std::path::PathBuf;
use std::sync::Arc;

use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use tower::util::ServiceExt;

use pdf_wordcount::handlers::{AppState, router};

use common::{FR_PAGES, french_only_registry, pdf_with_pages};

const BOUNDARY: &str = "wordcount-test-boundary";

struct TestApp {
    state: AppState,
    _models: tempfile::TempDir,
    scratch: tempfile::TempDir,
}

fn make_app() -> TestApp {
    let models = tempfile::tempdir().unwrap();
    let scratch = tempfile::tempdir().unwrap();
    let state = AppState {
        registry: Arc::new(french_only_registry(models.path())),
        scratch_root: PathBuf::from(scratch.path()),
        max_upload_bytes: 1024 * 1024,
        disable_cache: false,
    };
    TestApp {
        state,
        _models: models,
        scratch,
    }
}

fn multipart_body(file: Option<(&str, &[u8])>, language: Option<&str>) -> Vec<u8> {
    let mut body = Vec::new();
    if let Some(lang) = language {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"language\"\r\n\r\n{lang}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some((name, bytes)) = file {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{name}\"\r\nContent-Type: application/pdf\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn upload_request(uri: &str, body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn healthz_ok() {
    let app = make_app();
    let response = router(app.state)
        .oneshot(
            Request::builder()
                .uri("/healthz")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn frontend_serves_upload_form() {
    let app = make_app();
    let response = router(app.state)
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key(header::CACHE_CONTROL));
    let bytes = to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
    let html = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(html.contains("PDF Word Counter"));
    assert!(html.contains("name=\"language\""));
    assert!(html.contains("Up to 1 MB"));
    assert!(!html.contains("{{"));
}

#[tokio::test]
async fn languages_report_load_state() {
    let app = make_app();
    let response = router(app.state)
        .oneshot(
            Request::builder()
                .uri("/v1/languages")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body[0]["code"], "de");
    assert_eq!(body[0]["loaded"], false);
    assert_eq!(body[1]["code"], "fr");
    assert_eq!(body[1]["name"], "French");
    assert_eq!(body[1]["loaded"], true);
}

#[tokio::test]
async fn word_counts_returns_rows_and_csv() {
    let app = make_app();
    let pdf = pdf_with_pages(&FR_PAGES);
    let body = multipart_body(Some(("chats.pdf", pdf.as_slice())), Some("fr"));
    let response = router(app.state)
        .oneshot(upload_request("/v1/word-counts", body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["language"], "fr");
    assert_eq!(body["file_name"], "chats.pdf");
    assert_eq!(body["csv_file_name"], "chats_word_count.csv");
    assert_eq!(body["page_count"], 2);
    assert_eq!(body["rows"][0]["variants"], "chat/chats");
    assert_eq!(body["rows"][0]["count"], 3);

    let rows = body["rows"].as_array().unwrap();
    let csv = body["csv"].as_str().unwrap();
    let lines: Vec<&str> = csv.split('\n').collect();
    assert_eq!(lines[0], "Word Variants,Count");
    assert_eq!(lines.len(), rows.len() + 1);
    for (line, row) in lines[1..].iter().zip(rows) {
        let expected = format!("{},{}", row["variants"].as_str().unwrap(), row["count"]);
        assert_eq!(*line, expected);
    }
    assert!(common::is_empty_dir(app.scratch.path()));
}

#[tokio::test]
async fn csv_endpoint_returns_attachment() {
    let app = make_app();
    let pdf = pdf_with_pages(&FR_PAGES);
    let body = multipart_body(Some(("Rapport final.pdf", pdf.as_slice())), Some("FR"));
    let response = router(app.state)
        .oneshot(upload_request("/v1/word-counts.csv", body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "text/csv; charset=utf-8"
    );
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"Rapport final_word_count.csv\"; filename*=UTF-8''Rapport%20final_word_count.csv"
    );
    let bytes = to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
    let csv = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(csv.starts_with("Word Variants,Count\nchat/chats,3\n"));
}

#[tokio::test]
async fn csv_attachment_keeps_accented_name() {
    let app = make_app();
    let pdf = pdf_with_pages(&FR_PAGES);
    let body = multipart_body(Some(("thèse_été.pdf", pdf.as_slice())), Some("fr"));
    let response = router(app.state)
        .oneshot(upload_request("/v1/word-counts.csv", body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let disposition = response.headers()[header::CONTENT_DISPOSITION]
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.starts_with("attachment; filename=\"th_se__t__word_count.csv\""));
    assert!(disposition.ends_with("filename*=UTF-8''th%C3%A8se_%C3%A9t%C3%A9_word_count.csv"));
}

#[tokio::test]
async fn rejects_unknown_language() {
    let app = make_app();
    let pdf = pdf_with_pages(&FR_PAGES);
    let body = multipart_body(Some(("chats.pdf", pdf.as_slice())), Some("es"));
    let response = router(app.state)
        .oneshot(upload_request("/v1/word-counts", body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["kind"], "invalid_language");
    assert!(body["error"].as_str().unwrap().contains("es"));
}

#[tokio::test]
async fn rejects_missing_fields() {
    let app = make_app();
    let response = router(app.state.clone())
        .oneshot(upload_request("/v1/word-counts", multipart_body(None, Some("fr"))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["error"], "no file uploaded");

    let body = multipart_body(Some(("a.pdf", &b"%PDF-1.4"[..])), None);
    let response = router(app.state)
        .oneshot(upload_request("/v1/word-counts", body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["kind"], "bad_request");
}

#[tokio::test]
async fn non_pdf_upload_is_unprocessable() {
    let app = make_app();
    let body = multipart_body(Some(("notes.txt", &b"just some text"[..])), Some("fr"));
    let response = router(app.state)
        .oneshot(upload_request("/v1/word-counts", body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = json_body(response).await;
    assert_eq!(body["kind"], "extraction");
    assert!(common::is_empty_dir(app.scratch.path()));
}

#[tokio::test]
async fn missing_model_is_service_unavailable() {
    let app = make_app();
    let pdf = pdf_with_pages(&FR_PAGES);
    let body = multipart_body(Some(("chats.pdf", pdf.as_slice())), Some("de"));
    let response = router(app.state)
        .oneshot(upload_request("/v1/word-counts", body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json_body(response).await["kind"], "model_unavailable");
}

#[tokio::test]
async fn oversized_upload_is_rejected() {
    let mut app = make_app();
    app.state.max_upload_bytes = 64;
    let pdf = pdf_with_pages(&FR_PAGES);
    let body = multipart_body(Some(("chats.pdf", pdf.as_slice())), Some("fr"));
    let response = router(app.state)
        .oneshot(upload_request("/v1/word-counts", body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}
