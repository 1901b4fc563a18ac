use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

/// Main error type for the subtitle server
#[derive(Error, Debug)]
pub enum ServerError {
    /// The request or a value handed to the converter was unusable
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Storing the payload or starting the transcription job failed
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    /// The transcription job could not be looked up
    #[error("Status lookup failed: {0}")]
    StatusLookupFailed(String),

    /// The transcript download answered with a non-success status
    #[error("Transcript fetch failed with upstream status {status}")]
    TranscriptFetchFailed { status: u16 },

    /// A transcript item violated the converter's preconditions
    #[error("Malformed transcript: {0}")]
    MalformedTranscript(String),

    #[error("Multipart error: {0}")]
    Multipart(#[from] axum::extract::multipart::MultipartError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ServerError {
    /// Status code and the generic message sent to clients
    fn public_parts(&self) -> (StatusCode, String) {
        match self {
            ServerError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ServerError::Multipart(err) => (err.status(), "File upload failed".to_string()),
            ServerError::UploadFailed(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "File upload or transcription failed".to_string(),
            ),
            ServerError::TranscriptFetchFailed { status } => (
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY),
                "Failed to fetch transcript from storage".to_string(),
            ),
            ServerError::StatusLookupFailed(_) | ServerError::MalformedTranscript(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to fetch transcription status".to_string(),
            ),
            ServerError::Config(_) | ServerError::Io(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, message) = self.public_parts();

        if status.is_server_error() {
            tracing::error!("{}", self);
        } else {
            tracing::warn!("{}", self);
        }

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

/// Errors raised by the upload/poll client
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Server rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Unexpected content type: {0}")]
    UnexpectedContentType(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, ServerError>;
