//! HTTP surface: `/api/ocr`, `/api/health`, `/api/process-directory`.

use axum::extract::multipart::MultipartRejection;
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::batch::{self, BatchEntry};
use crate::error::ApiError;
use crate::pipeline::OcrResult;
use crate::state::AppState;
use crate::upload;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

pub fn router(state: AppState) -> Router {
    let max_upload_bytes = state.config.max_upload_bytes;
    Router::new()
        .route("/api/ocr", post(ocr))
        .route("/api/health", get(health))
        .route("/api/process-directory", get(process_directory))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

/// Handler for `POST /api/ocr`
async fn ocr(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<OcrResult>, ApiError> {
    let file = upload::read_file_field(multipart?).await?;
    Ok(Json(upload::handle(&state, file).await?))
}

/// Handler for `GET /api/health`
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "healthy" })
}

/// Handler for `GET /api/process-directory`
async fn process_directory(
    State(state): State<AppState>,
) -> Result<Json<Vec<BatchEntry>>, ApiError> {
    Ok(Json(batch::process_directory(&state).await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServiceConfig;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use moodscan_core::{EmotionClassifier, ScoreError, SentimentScorer, SentimentScores, VaderScorer};
    use moodscan_ocr::{MockRecognizer, OcrBackend, OcrError, TextExtractor};
    use serde_json::Value;
    use std::path::Path;
    use std::sync::Arc;
    use tower::ServiceExt;

    const BOUNDARY: &str = "moodscan-test-boundary";

    struct BrokenScorer;

    impl SentimentScorer for BrokenScorer {
        fn score(&self, _text: &str) -> Result<SentimentScores, ScoreError> {
            Err(ScoreError::MissingComponent("compound"))
        }
    }

    struct PanickingRecognizer;

    impl OcrBackend for PanickingRecognizer {
        fn recognize(&self, _image_bytes: &[u8]) -> Result<String, OcrError> {
            panic!("engine crashed")
        }
    }

    fn config_in(dir: &Path) -> ServiceConfig {
        ServiceConfig { upload_dir: dir.to_path_buf(), ..Default::default() }
    }

    fn app_with(config: ServiceConfig, recognized: &str, scorer: Arc<dyn SentimentScorer>) -> Router {
        router(AppState::new(
            config,
            TextExtractor::new(Arc::new(MockRecognizer::new(recognized))),
            EmotionClassifier::new(scorer),
        ))
    }

    fn app(dir: &Path, recognized: &str) -> Router {
        app_with(config_in(dir), recognized, Arc::new(VaderScorer::new()))
    }

    fn png_bytes() -> Vec<u8> {
        use image::{DynamicImage, GrayImage, ImageBuffer, Luma};
        let img: GrayImage = ImageBuffer::from_fn(8, 8, |x, _| Luma([(x * 30) as u8]));
        let mut buf = Vec::new();
        DynamicImage::ImageLuma8(img)
            .write_to(&mut std::io::Cursor::new(&mut buf), image::ImageFormat::Png)
            .unwrap();
        buf
    }

    fn multipart_request(field: &str, filename: &str, content: &[u8]) -> Request<Body> {
        let mut body = Vec::new();
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(content);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

        Request::builder()
            .method("POST")
            .uri("/api/ocr")
            .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}"))
            .body(Body::from(body))
            .unwrap()
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn dir_is_empty(dir: &Path) -> bool {
        std::fs::read_dir(dir).unwrap().next().is_none()
    }

    // ── POST /api/ocr ─────────────────────────────────────────────────────────

    #[tokio::test]
    async fn happy_image_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let (status, json) = send(
            app(dir.path(), "I am so happy today!\n"),
            multipart_request("file", "photo.PNG", &png_bytes()),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["text"], "I am so happy today!");
        let analysis = &json["emotional_analysis"];
        assert_eq!(analysis["overall_sentiment"], "Positive");
        let tags = analysis["primary_emotions"].as_array().unwrap();
        assert_eq!(tags.len(), 1);
        assert!(["Very Happy", "Happy", "Slightly Positive"].contains(&tags[0].as_str().unwrap()));
        assert_eq!(analysis["text_length"], 5);
        assert_eq!(analysis["emotional_depth"], "Basic");
        assert!(analysis["sentiment_scores"]["compound"].as_f64().unwrap() > 0.0);
        assert!(json.get("error").is_none());
        assert!(dir_is_empty(dir.path()));
    }

    #[tokio::test]
    async fn corrupt_image_is_200_with_error() {
        let dir = tempfile::tempdir().unwrap();
        let (status, json) = send(
            app(dir.path(), "unused"),
            multipart_request("file", "broken.jpg", b"not an image at all"),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert!(json["error"].as_str().unwrap().starts_with("Error processing image: "));
        assert!(json.get("text").is_none());
        assert!(dir_is_empty(dir.path()));
    }

    #[tokio::test]
    async fn gif_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let (status, json) = send(
            app(dir.path(), "unused"),
            multipart_request("file", "photo.GIF", &png_bytes()),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "Invalid file type");
        assert!(dir_is_empty(dir.path()));
    }

    #[tokio::test]
    async fn missing_file_field_is_400() {
        let dir = tempfile::tempdir().unwrap();
        let (status, json) = send(
            app(dir.path(), "unused"),
            multipart_request("image", "photo.png", &png_bytes()),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "No file part");
    }

    #[tokio::test]
    async fn empty_filename_is_400() {
        let dir = tempfile::tempdir().unwrap();
        let (status, json) =
            send(app(dir.path(), "unused"), multipart_request("file", "", b"")).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "No selected file");
    }

    #[tokio::test]
    async fn non_multipart_body_is_400() {
        let dir = tempfile::tempdir().unwrap();
        let request = Request::builder()
            .method("POST")
            .uri("/api/ocr")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{}"))
            .unwrap();
        let (status, json) = send(app(dir.path(), "unused"), request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["error"].is_string());
    }

    #[tokio::test]
    async fn oversized_upload_is_413() {
        let dir = tempfile::tempdir().unwrap();
        let config = ServiceConfig { max_upload_bytes: 64, ..config_in(dir.path()) };
        let app = app_with(config, "unused", Arc::new(VaderScorer::new()));
        let (status, json) =
            send(app, multipart_request("file", "big.png", &vec![0u8; 4096])).await;

        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert!(json["error"].is_string());
        assert!(dir_is_empty(dir.path()));
    }

    #[tokio::test]
    async fn scorer_failure_is_500_and_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        let app = app_with(config_in(dir.path()), "some text", Arc::new(BrokenScorer));
        let (status, json) = send(app, multipart_request("file", "a.png", &png_bytes())).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(json["error"].as_str().unwrap().contains("compound"));
        assert!(dir_is_empty(dir.path()));
    }

    #[tokio::test]
    async fn panicking_ocr_backend_is_500_and_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        let app = router(AppState::new(
            config_in(dir.path()),
            TextExtractor::new(Arc::new(PanickingRecognizer)),
            EmotionClassifier::new(Arc::new(VaderScorer::new())),
        ));
        let (status, json) = send(app, multipart_request("file", "a.png", &png_bytes())).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(json["error"].is_string(), "got {json}");
        assert!(dir_is_empty(dir.path()));
    }

    // ── GET /api/health ───────────────────────────────────────────────────────

    #[tokio::test]
    async fn health_ignores_upload_dir_state() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(&dir.path().join("does-not-exist"), "unused");
        let request = Request::builder().uri("/api/health").body(Body::empty()).unwrap();
        let (status, json) = send(app, request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json, serde_json::json!({"status": "healthy"}));
    }

    // ── GET /api/process-directory ────────────────────────────────────────────

    #[tokio::test]
    async fn process_directory_returns_ordered_entries() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.png"), png_bytes()).unwrap();
        std::fs::write(dir.path().join("a.tiff"), b"corrupt").unwrap();
        std::fs::write(dir.path().join("readme.md"), b"ignored").unwrap();

        let request =
            Request::builder().uri("/api/process-directory").body(Body::empty()).unwrap();
        let (status, json) = send(app(dir.path(), "Terrible awful news"), request).await;

        assert_eq!(status, StatusCode::OK);
        let entries = json.as_array().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0]["filename"], "a.tiff");
        assert!(entries[0]["error"].as_str().unwrap().starts_with("Error processing image: "));
        assert_eq!(entries[1]["filename"], "b.png");
        assert_eq!(entries[1]["text"], "Terrible awful news");
        assert_eq!(entries[1]["emotional_analysis"]["overall_sentiment"], "Negative");
        assert!(dir.path().join("b.png").exists());
    }

    #[tokio::test]
    async fn cors_preflight_is_allowed() {
        let dir = tempfile::tempdir().unwrap();
        let request = Request::builder()
            .method("OPTIONS")
            .uri("/api/ocr")
            .header(header::ORIGIN, "http://localhost:3000")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .body(Body::empty())
            .unwrap();
        let response = app(dir.path(), "unused").oneshot(request).await.unwrap();

        assert!(response.status().is_success());
        assert!(response.headers().contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
    }
}
