//! Transcription service client
//!
//! Job calls go through the signed Transcribe SDK client. Finished
//! transcripts are downloaded from the URI the job reports, which the
//! provider hands out pre-signed, so that request is a plain GET.

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_transcribe::error::DisplayErrorContext;
use aws_sdk_transcribe::types::{LanguageCode, Media};

use super::{JobStatus, TranscriptionJob, TranscriptionService};
use crate::config::CloudConfig;
use crate::error::{Result, ServerError};
use crate::subtitle::TranscriptDocument;

/// Client for the transcription job API
#[derive(Clone)]
pub struct TranscribeClient {
    client: aws_sdk_transcribe::Client,
    http: reqwest::Client,
}

impl TranscribeClient {
    pub fn new(sdk_config: &SdkConfig, http: reqwest::Client, config: &CloudConfig) -> Self {
        let mut builder = aws_sdk_transcribe::config::Builder::from(sdk_config);
        if let Some(endpoint) = &config.transcribe_endpoint {
            builder = builder.endpoint_url(endpoint);
        }
        Self::from_client(aws_sdk_transcribe::Client::from_conf(builder.build()), http)
    }

    pub fn from_client(client: aws_sdk_transcribe::Client, http: reqwest::Client) -> Self {
        Self { client, http }
    }
}

/// Map the provider's job description, falling back to the requested name
fn job_from(
    requested: &str,
    job: Option<&aws_sdk_transcribe::types::TranscriptionJob>,
) -> std::result::Result<TranscriptionJob, String> {
    let job = job.ok_or_else(|| format!("no job description returned for {}", requested))?;
    let status = job
        .transcription_job_status()
        .ok_or_else(|| format!("job {} has no status", requested))?;

    Ok(TranscriptionJob {
        name: job
            .transcription_job_name()
            .unwrap_or(requested)
            .to_string(),
        status: JobStatus::from(status.as_str().to_string()),
        transcript_uri: job
            .transcript()
            .and_then(|t| t.transcript_file_uri())
            .map(str::to_string),
    })
}

#[async_trait]
impl TranscriptionService for TranscribeClient {
    async fn start_job(
        &self,
        job_name: &str,
        media_uri: &str,
        language_code: &str,
    ) -> Result<TranscriptionJob> {
        let output = self
            .client
            .start_transcription_job()
            .transcription_job_name(job_name)
            .language_code(LanguageCode::from(language_code))
            .media(Media::builder().media_file_uri(media_uri).build())
            .send()
            .await
            .map_err(|e| {
                ServerError::UploadFailed(format!(
                    "StartTranscriptionJob {}: {}",
                    job_name,
                    DisplayErrorContext(&e)
                ))
            })?;

        let job = job_from(job_name, output.transcription_job()).map_err(ServerError::UploadFailed)?;
        tracing::info!("Started transcription job {} ({})", job.name, job.status);
        Ok(job)
    }

    async fn get_job(&self, job_name: &str) -> Result<TranscriptionJob> {
        let output = self
            .client
            .get_transcription_job()
            .transcription_job_name(job_name)
            .send()
            .await
            .map_err(|e| {
                ServerError::StatusLookupFailed(format!(
                    "GetTranscriptionJob {}: {}",
                    job_name,
                    DisplayErrorContext(&e)
                ))
            })?;

        job_from(job_name, output.transcription_job()).map_err(ServerError::StatusLookupFailed)
    }

    async fn fetch_transcript(&self, uri: &str) -> Result<TranscriptDocument> {
        let response = self
            .http
            .get(uri)
            .send()
            .await
            .map_err(|e| ServerError::StatusLookupFailed(format!("GET transcript: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ServerError::TranscriptFetchFailed {
                status: status.as_u16(),
            });
        }

        response
            .json::<TranscriptDocument>()
            .await
            .map_err(|e| ServerError::MalformedTranscript(e.to_string()))
    }
}
