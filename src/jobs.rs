//! Upload dispatch and job status resolution
//!
//! The two server-side operations behind the HTTP handlers. Both are
//! stateless: everything about a job lives with the transcription service
//! and the job name alone is enough to resume.

use bytes::Bytes;
use std::path::PathBuf;
use uuid::Uuid;

use crate::cloud::{JobStatus, TranscriptionJob};
use crate::error::{Result, ServerError};
use crate::state::AppState;
use crate::subtitle::build_srt;

/// Result of a status lookup
#[derive(Debug, Clone, PartialEq)]
pub enum StatusOutcome {
    /// Job has not completed yet
    Pending(JobStatus),
    /// Job completed and its subtitle document was generated
    Ready { file_name: String, document: String },
}

fn is_safe_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-')
}

/// Replace every character outside `[A-Za-z0-9._-]` with `_`
pub fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| if is_safe_char(c) { c } else { '_' })
        .collect();
    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned
    }
}

/// Job names double as local file names, so only a plain character set is accepted
pub fn validate_job_name(job_name: &str) -> Result<()> {
    if job_name.is_empty() {
        return Err(ServerError::InvalidInput("jobName is required".to_string()));
    }
    if !job_name.chars().all(is_safe_char) || job_name.starts_with('.') {
        return Err(ServerError::InvalidInput(format!(
            "Invalid jobName: {}",
            job_name
        )));
    }
    Ok(())
}

/// Name of the subtitle attachment for a job
pub fn srt_file_name(job_name: &str) -> String {
    format!("transcription-{}.srt", job_name)
}

/// Store an uploaded payload and start a transcription job for it.
pub async fn upload_media(
    state: &AppState,
    file_name: &str,
    content_type: &str,
    body: Bytes,
) -> Result<TranscriptionJob> {
    if body.is_empty() {
        return Err(ServerError::InvalidInput("No file uploaded".to_string()));
    }

    let stamp = chrono::Utc::now().timestamp_millis();
    let id = Uuid::new_v4().simple().to_string();
    let suffix = &id[..8];
    let key = format!("{}-{}-{}", stamp, suffix, sanitize_file_name(file_name));
    let job_name = format!("Transcription-{}-{}", stamp, suffix);

    tracing::info!(
        "Dispatching upload {} ({} bytes) as {}",
        file_name,
        body.len(),
        key
    );

    state
        .store
        .put_object(&key, body, content_type)
        .await
        .map_err(into_upload_failed)?;

    let media_uri = state.store.media_uri(&key);
    state
        .transcriber
        .start_job(&job_name, &media_uri, &state.config.cloud.language_code)
        .await
        .map_err(into_upload_failed)
}

fn into_upload_failed(err: ServerError) -> ServerError {
    match err {
        ServerError::UploadFailed(_) => err,
        other => ServerError::UploadFailed(other.to_string()),
    }
}

/// Look up a job and, once it has completed, convert its transcript.
pub async fn resolve_status(state: &AppState, job_name: &str) -> Result<StatusOutcome> {
    validate_job_name(job_name)?;

    let job = state.transcriber.get_job(job_name).await?;
    tracing::debug!("Job {} is {}", job_name, job.status);

    if !job.status.is_completed() {
        return Ok(StatusOutcome::Pending(job.status));
    }

    let uri = job.transcript_uri.ok_or_else(|| {
        ServerError::StatusLookupFailed(format!("job {} completed without a transcript", job_name))
    })?;

    let transcript = state.transcriber.fetch_transcript(&uri).await?;
    let document = build_srt(&transcript.results.items)?;
    let file_name = srt_file_name(job_name);

    persist_copy(state.config.upload.output_dir.join(&file_name), &document).await;

    Ok(StatusOutcome::Ready {
        file_name,
        document,
    })
}

/// Write the local copy; failure is logged and otherwise ignored
async fn persist_copy(path: PathBuf, document: &str) {
    match tokio::fs::write(&path, document).await {
        Ok(()) => tracing::info!("Wrote subtitle copy to {}", path.display()),
        Err(e) => tracing::warn!("Could not write subtitle copy {}: {}", path.display(), e),
    }
}
