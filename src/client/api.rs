//! HTTP client for the upload and status endpoints

use bytes::Bytes;
use reqwest::header::CONTENT_TYPE;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use std::path::Path;

use crate::cloud::JobStatus;
use crate::error::ClientError;

/// What a status request answered with
#[derive(Debug, Clone, PartialEq)]
pub enum StatusReply {
    /// The finished subtitle document
    Subtitle(Bytes),
    /// Structured status, job not finished
    Status(JobStatus),
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UploadReply {
    job_name: String,
}

#[derive(Deserialize)]
struct StatusBody {
    status: Option<JobStatus>,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

/// Client for a running subgen-server
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("subgen-client/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Upload a media file; returns the job name
    pub async fn upload(&self, path: &Path) -> Result<String, ClientError> {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        let data = tokio::fs::read(path).await?;
        tracing::info!("Uploading {} ({} bytes)", file_name, data.len());

        let form = Form::new().part("file", Part::bytes(data).file_name(file_name));
        let response = self
            .http
            .post(format!("{}/upload", self.base_url))
            .multipart(form)
            .send()
            .await?;

        let response = Self::check(response).await?;
        let reply: UploadReply = response.json().await?;
        Ok(reply.job_name)
    }

    /// Issue one status request and classify the reply by content type
    pub async fn check_status(&self, job_name: &str) -> Result<StatusReply, ClientError> {
        let response = self
            .http
            .get(format!("{}/status", self.base_url))
            .query(&[("jobName", job_name)])
            .send()
            .await?;
        let response = Self::check(response).await?;

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();

        if content_type.contains("text/srt") {
            Ok(StatusReply::Subtitle(response.bytes().await?))
        } else if content_type.contains("application/json") {
            let body: StatusBody = response.json().await?;
            body.status
                .map(StatusReply::Status)
                .ok_or_else(|| ClientError::InvalidResponse("status field missing".to_string()))
        } else {
            Err(ClientError::UnexpectedContentType(content_type))
        }
    }

    /// Turn a non-success response into `ClientError::Rejected`
    async fn check(response: reqwest::Response) -> Result<reqwest::Response, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&text)
            .map(|b| b.error)
            .unwrap_or(text);
        Err(ClientError::Rejected {
            status: status.as_u16(),
            message,
        })
    }
}
