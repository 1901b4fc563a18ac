//! In-memory collaborators for handler tests

use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use std::sync::Mutex;

use super::{JobStatus, ObjectStore, TranscriptionJob, TranscriptionService};
use crate::error::{Result, ServerError};
use crate::subtitle::TranscriptDocument;

#[derive(Default)]
pub struct MemoryStore {
    pub objects: Mutex<HashMap<String, Bytes>>,
    pub fail: bool,
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn put_object(&self, key: &str, body: Bytes, _content_type: &str) -> Result<()> {
        if self.fail {
            return Err(ServerError::UploadFailed("store offline".to_string()));
        }
        self.objects.lock().unwrap().insert(key.to_string(), body);
        Ok(())
    }

    fn media_uri(&self, key: &str) -> String {
        format!("memory://{}", key)
    }
}

/// Jobs keyed by name; transcripts keyed by URI (`Err` holds an upstream status)
#[derive(Default)]
pub struct MemoryTranscriber {
    pub jobs: Mutex<HashMap<String, TranscriptionJob>>,
    pub transcripts: Mutex<HashMap<String, std::result::Result<TranscriptDocument, u16>>>,
    pub started: Mutex<Vec<(String, String, String)>>,
    pub fail_start: bool,
}

impl MemoryTranscriber {
    pub fn with_job(self, name: &str, status: JobStatus, transcript_uri: Option<&str>) -> Self {
        self.jobs.lock().unwrap().insert(
            name.to_string(),
            TranscriptionJob {
                name: name.to_string(),
                status,
                transcript_uri: transcript_uri.map(str::to_string),
            },
        );
        self
    }

    pub fn with_transcript(
        self,
        uri: &str,
        transcript: std::result::Result<TranscriptDocument, u16>,
    ) -> Self {
        self.transcripts
            .lock()
            .unwrap()
            .insert(uri.to_string(), transcript);
        self
    }
}

#[async_trait]
impl TranscriptionService for MemoryTranscriber {
    async fn start_job(
        &self,
        job_name: &str,
        media_uri: &str,
        language_code: &str,
    ) -> Result<TranscriptionJob> {
        if self.fail_start {
            return Err(ServerError::UploadFailed("quota exceeded".to_string()));
        }
        self.started.lock().unwrap().push((
            job_name.to_string(),
            media_uri.to_string(),
            language_code.to_string(),
        ));
        let job = TranscriptionJob {
            name: job_name.to_string(),
            status: JobStatus::InProgress,
            transcript_uri: None,
        };
        self.jobs
            .lock()
            .unwrap()
            .insert(job_name.to_string(), job.clone());
        Ok(job)
    }

    async fn get_job(&self, job_name: &str) -> Result<TranscriptionJob> {
        self.jobs
            .lock()
            .unwrap()
            .get(job_name)
            .cloned()
            .ok_or_else(|| ServerError::StatusLookupFailed(format!("no job {}", job_name)))
    }

    async fn fetch_transcript(&self, uri: &str) -> Result<TranscriptDocument> {
        match self.transcripts.lock().unwrap().get(uri) {
            Some(Ok(doc)) => Ok(doc.clone()),
            Some(Err(status)) => Err(ServerError::TranscriptFetchFailed { status: *status }),
            None => Err(ServerError::TranscriptFetchFailed { status: 404 }),
        }
    }
}
