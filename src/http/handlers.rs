//! HTTP request handlers
//!
//! Implements handlers for the upload and status endpoints.

use axum::{
    extract::{Multipart, Query, State},
    http::{header, HeaderMap, HeaderValue},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::cloud::JobStatus;
use crate::error::ServerError;
use crate::jobs::{resolve_status, upload_media, StatusOutcome};
use crate::state::AppState;

/// Multipart field carrying the media payload
const UPLOAD_FIELD: &str = "file";

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub message: String,
    pub job_name: String,
    pub status: JobStatus,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: JobStatus,
}

#[derive(Debug, Deserialize)]
pub struct StatusQuery {
    #[serde(rename = "jobName")]
    pub job_name: Option<String>,
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "OK"
}

/// Version endpoint
pub async fn version_check() -> &'static str {
    concat!("subgen-server v", env!("CARGO_PKG_VERSION"))
}

/// Media upload endpoint
/// POST /upload
pub async fn upload(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Response, ServerError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let file_name = field.file_name().unwrap_or("upload").to_string();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let body = field.bytes().await?;

        let job = upload_media(&state, &file_name, &content_type, body).await?;

        return Ok(Json(UploadResponse {
            message: "File uploaded and transcription started".to_string(),
            job_name: job.name,
            status: job.status,
        })
        .into_response());
    }

    Err(ServerError::InvalidInput("No file uploaded".to_string()))
}

/// Job status / subtitle download endpoint
/// GET /status?jobName={name}
pub async fn job_status(
    State(state): State<Arc<AppState>>,
    Query(query): Query<StatusQuery>,
) -> Result<Response, ServerError> {
    let job_name = query.job_name.unwrap_or_default();

    let mut headers = HeaderMap::new();
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));

    match resolve_status(&state, &job_name).await? {
        StatusOutcome::Pending(status) => Ok((headers, Json(StatusResponse { status })).into_response()),
        StatusOutcome::Ready {
            file_name,
            document,
        } => {
            let disposition = HeaderValue::from_str(&format!(
                "attachment; filename=\"{}\"",
                file_name
            ))
            .map_err(|e| ServerError::InvalidInput(e.to_string()))?;

            headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("text/srt"));
            headers.insert(header::CONTENT_DISPOSITION, disposition);

            tracing::info!("Serving {} ({} bytes)", file_name, document.len());
            Ok((headers, document).into_response())
        }
    }
}
