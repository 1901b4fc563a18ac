//! Cloud collaborators
//!
//! Object storage and the transcription service sit behind traits so the
//! handlers receive explicitly constructed clients through `AppState`:
//! - `ObjectStore`: persists uploaded media
//! - `TranscriptionService`: starts and inspects jobs, downloads transcripts

pub mod storage;
pub mod transcribe;

#[cfg(test)]
pub mod memory;

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::Result;
use crate::subtitle::TranscriptDocument;

pub use storage::S3Store;
pub use transcribe::TranscribeClient;

/// Job status as reported by the transcription service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum JobStatus {
    Queued,
    InProgress,
    Completed,
    Failed,
    /// Any status this server does not know by name
    Other(String),
}

impl JobStatus {
    pub fn as_str(&self) -> &str {
        match self {
            JobStatus::Queued => "QUEUED",
            JobStatus::InProgress => "IN_PROGRESS",
            JobStatus::Completed => "COMPLETED",
            JobStatus::Failed => "FAILED",
            JobStatus::Other(s) => s,
        }
    }

    /// Only completion is terminal-success
    pub fn is_completed(&self) -> bool {
        matches!(self, JobStatus::Completed)
    }
}

impl From<String> for JobStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "QUEUED" => JobStatus::Queued,
            "IN_PROGRESS" => JobStatus::InProgress,
            "COMPLETED" => JobStatus::Completed,
            "FAILED" => JobStatus::Failed,
            _ => JobStatus::Other(s),
        }
    }
}

impl From<JobStatus> for String {
    fn from(status: JobStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A transcription job observed from the provider
#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptionJob {
    pub name: String,
    pub status: JobStatus,
    /// Where the finished transcript can be downloaded
    pub transcript_uri: Option<String>,
}

/// Object storage for uploaded media
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store `body` under `key`
    async fn put_object(&self, key: &str, body: Bytes, content_type: &str) -> Result<()>;

    /// URI the transcription service reads the stored object from
    fn media_uri(&self, key: &str) -> String;
}

/// External speech-to-text job API
#[async_trait]
pub trait TranscriptionService: Send + Sync {
    async fn start_job(
        &self,
        job_name: &str,
        media_uri: &str,
        language_code: &str,
    ) -> Result<TranscriptionJob>;

    async fn get_job(&self, job_name: &str) -> Result<TranscriptionJob>;

    /// Download a finished transcript
    async fn fetch_transcript(&self, uri: &str) -> Result<TranscriptDocument>;
}
