//! Axum router configuration

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

use super::handlers::{health_check, job_status, upload, version_check};
use super::middleware::request_logger;

/// Build the CORS layer for the configured origin
fn cors_layer(origin: &str) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::ACCEPT, header::CONTENT_TYPE, header::ORIGIN])
        .expose_headers([header::CONTENT_DISPOSITION, header::CONTENT_TYPE])
        .max_age(Duration::from_secs(3600));

    // Credentials cannot be combined with a wildcard origin
    if origin == "*" {
        return cors.allow_origin(Any);
    }
    match HeaderValue::from_str(origin) {
        Ok(value) => cors.allow_origin(value).allow_credentials(true),
        Err(e) => {
            tracing::warn!("Ignoring invalid allowed origin {:?}: {}", origin, e);
            cors.allow_origin(Any)
        }
    }
}

/// Create the Axum router with all routes
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state.config.allowed_origin);
    let body_limit = state.config.upload.max_upload_bytes();

    Router::new()
        // Health and version endpoints
        .route("/health", get(health_check))
        .route("/version", get(version_check))
        // Transcription endpoints
        .route("/upload", post(upload))
        .route("/status", get(job_status))
        // Middleware
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(middleware::from_fn(request_logger))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        // State
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cloud::memory::{MemoryStore, MemoryTranscriber};
    use crate::cloud::JobStatus;
    use crate::config::ServerConfig;
    use crate::subtitle::transcript::{TranscriptItem, TranscriptResults};
    use crate::subtitle::TranscriptDocument;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use axum::response::Response;
    use serde_json::Value;
    use std::path::Path;
    use tower::util::ServiceExt;

    const BOUNDARY: &str = "subgen-test-boundary";

    fn router(transcriber: MemoryTranscriber, output_dir: &Path, max_upload_mb: usize) -> Router {
        let mut config = ServerConfig::default();
        config.upload.output_dir = output_dir.to_path_buf();
        config.upload.max_upload_mb = max_upload_mb;
        let state = AppState::new(
            config,
            Arc::new(MemoryStore::default()),
            Arc::new(transcriber),
        );
        create_router(Arc::new(state))
    }

    fn multipart_request(field: &str, file_name: &str, payload: &[u8]) -> Request<Body> {
        let mut body = Vec::new();
        body.extend_from_slice(
            format!(
                "--{b}\r\nContent-Disposition: form-data; name=\"{f}\"; filename=\"{n}\"\r\nContent-Type: video/mp4\r\n\r\n",
                b = BOUNDARY,
                f = field,
                n = file_name
            )
            .as_bytes(),
        );
        body.extend_from_slice(payload);
        body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());

        Request::builder()
            .method(Method::POST)
            .uri("/upload")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(body))
            .unwrap()
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    async fn body_json(response: Response) -> Value {
        serde_json::from_str(&body_text(response).await).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let dir = tempfile::tempdir().unwrap();
        let app = router(MemoryTranscriber::default(), dir.path(), 100);
        let response = app.oneshot(get_request("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "OK");
    }

    #[tokio::test]
    async fn test_cors_preflight() {
        let dir = tempfile::tempdir().unwrap();
        let app = router(MemoryTranscriber::default(), dir.path(), 100);

        let request = Request::builder()
            .method(Method::OPTIONS)
            .uri("/upload")
            .header(header::ORIGIN, "http://localhost:5173")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response
                .headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .unwrap(),
            "http://localhost:5173"
        );
        assert_eq!(
            response
                .headers()
                .get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS)
                .unwrap(),
            "true"
        );
    }

    #[tokio::test]
    async fn test_upload_starts_job() {
        let dir = tempfile::tempdir().unwrap();
        let app = router(MemoryTranscriber::default(), dir.path(), 100);

        let response = app
            .oneshot(multipart_request("file", "talk.mp4", b"fake media"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert!(body["jobName"]
            .as_str()
            .unwrap()
            .starts_with("Transcription-"));
        assert_eq!(body["status"], "IN_PROGRESS");
    }

    #[tokio::test]
    async fn test_upload_without_file() {
        let dir = tempfile::tempdir().unwrap();
        let app = router(MemoryTranscriber::default(), dir.path(), 100);

        let response = app
            .oneshot(multipart_request("attachment", "talk.mp4", b"fake media"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"], "No file uploaded");
    }

    #[tokio::test]
    async fn test_upload_too_large() {
        let dir = tempfile::tempdir().unwrap();
        let app = router(MemoryTranscriber::default(), dir.path(), 1);

        let payload = vec![0u8; 2 * 1024 * 1024];
        let response = app
            .oneshot(multipart_request("file", "big.mp4", &payload))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn test_upload_failure_is_generic() {
        let dir = tempfile::tempdir().unwrap();
        let app = router(
            MemoryTranscriber {
                fail_start: true,
                ..Default::default()
            },
            dir.path(),
            100,
        );

        let response = app
            .oneshot(multipart_request("file", "talk.mp4", b"fake media"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json(response).await["error"],
            "File upload or transcription failed"
        );
    }

    #[tokio::test]
    async fn test_status_in_progress_is_json() {
        let dir = tempfile::tempdir().unwrap();
        let app = router(
            MemoryTranscriber::default().with_job("job-1", JobStatus::InProgress, None),
            dir.path(),
            100,
        );

        let response = app.oneshot(get_request("/status?jobName=job-1")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers()[header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("application/json"));
        assert_eq!(body_text(response).await, r#"{"status":"IN_PROGRESS"}"#);
    }

    #[tokio::test]
    async fn test_status_completed_is_attachment() {
        let dir = tempfile::tempdir().unwrap();
        let transcript = TranscriptDocument {
            job_name: None,
            results: TranscriptResults {
                transcripts: Vec::new(),
                items: vec![
                    TranscriptItem::pronunciation(0.0, 1.5, "Hi"),
                    TranscriptItem::punctuation("!"),
                ],
            },
        };
        let app = router(
            MemoryTranscriber::default()
                .with_job("job-2", JobStatus::Completed, Some("mem://job-2"))
                .with_transcript("mem://job-2", Ok(transcript)),
            dir.path(),
            100,
        );

        let response = app.oneshot(get_request("/status?jobName=job-2")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "text/srt");
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"transcription-job-2.srt\""
        );
        assert_eq!(
            body_text(response).await,
            "1\n00:00:00,000 --> 00:00:01,500\nHi\n\n"
        );
        assert!(dir.path().join("transcription-job-2.srt").exists());
    }

    #[tokio::test]
    async fn test_status_propagates_upstream_fetch_status() {
        let dir = tempfile::tempdir().unwrap();
        let app = router(
            MemoryTranscriber::default()
                .with_job("job-3", JobStatus::Completed, Some("mem://job-3"))
                .with_transcript("mem://job-3", Err(403)),
            dir.path(),
            100,
        );

        let response = app.oneshot(get_request("/status?jobName=job-3")).await.unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            body_json(response).await["error"],
            "Failed to fetch transcript from storage"
        );
    }

    #[tokio::test]
    async fn test_status_bad_transcript_time_is_generic_500() {
        let dir = tempfile::tempdir().unwrap();
        let transcript = TranscriptDocument {
            job_name: None,
            results: TranscriptResults {
                transcripts: Vec::new(),
                items: vec![TranscriptItem::pronunciation(-0.5, 1.0, "Hi")],
            },
        };
        let app = router(
            MemoryTranscriber::default()
                .with_job("j", JobStatus::Completed, Some("mem://j"))
                .with_transcript("mem://j", Ok(transcript)),
            dir.path(),
            100,
        );

        let response = app.oneshot(get_request("/status?jobName=j")).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json(response).await["error"],
            "Failed to fetch transcription status"
        );
        assert!(!dir.path().join("transcription-j.srt").exists());
    }

    #[tokio::test]
    async fn test_status_lookup_failure() {
        let dir = tempfile::tempdir().unwrap();
        let app = router(MemoryTranscriber::default(), dir.path(), 100);

        let response = app.oneshot(get_request("/status?jobName=nope")).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json(response).await["error"],
            "Failed to fetch transcription status"
        );
    }

    #[tokio::test]
    async fn test_status_requires_job_name() {
        let dir = tempfile::tempdir().unwrap();
        let app = router(MemoryTranscriber::default(), dir.path(), 100);

        let response = app.oneshot(get_request("/status")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
