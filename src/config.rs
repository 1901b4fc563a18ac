//! Server configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Cloud provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloudConfig {
    /// Provider region
    pub region: String,

    /// Bucket receiving uploaded media
    pub bucket: String,

    /// Object storage endpoint override for S3-compatible emulators
    pub storage_endpoint: Option<String>,

    /// Transcription API endpoint override
    pub transcribe_endpoint: Option<String>,

    /// Language code requested for every job
    pub language_code: String,
}

impl Default for CloudConfig {
    fn default() -> Self {
        Self {
            region: "us-east-1".to_string(),
            bucket: "subgen-uploads".to_string(),
            storage_endpoint: None,
            transcribe_endpoint: None,
            language_code: "en-US".to_string(),
        }
    }
}

/// Upload configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    /// Maximum accepted upload size in megabytes
    pub max_upload_mb: usize,

    /// Directory receiving local copies of generated subtitle files
    pub output_dir: PathBuf,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_upload_mb: 100,
            output_dir: PathBuf::from("."),
        }
    }
}

impl UploadConfig {
    /// Get maximum upload size in bytes
    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb * 1024 * 1024
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Origin allowed by CORS (`*` allows any origin without credentials)
    pub allowed_origin: String,

    /// Cloud provider configuration
    pub cloud: CloudConfig,

    /// Upload configuration
    pub upload: UploadConfig,

    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,

    /// Log output format (pretty, json)
    pub log_format: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            allowed_origin: "http://localhost:5173".to_string(),
            cloud: CloudConfig::default(),
            upload: UploadConfig::default(),
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
        }
    }
}

impl ServerConfig {
    /// Get the socket address string
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Apply overrides from the process environment
    pub fn apply_env(&mut self) -> Result<(), String> {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable lookup
    pub fn apply_env_from<F>(&mut self, lookup: F) -> Result<(), String>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(region) = lookup("AWS_REGION") {
            self.cloud.region = region;
        }
        if let Some(bucket) = lookup("S3_BUCKET_NAME") {
            self.cloud.bucket = bucket;
        }
        if let Some(port) = lookup("PORT") {
            self.port = port
                .parse()
                .map_err(|_| format!("PORT is not a valid port number: {}", port))?;
        }
        if let Some(origin) = lookup("ALLOWED_ORIGIN") {
            self.allowed_origin = origin;
        }
        if let Some(dir) = lookup("OUTPUT_DIR") {
            self.upload.output_dir = PathBuf::from(dir);
        }
        Ok(())
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.cloud.bucket.is_empty() {
            return Err("Bucket name must not be empty".to_string());
        }
        if self.cloud.region.is_empty() {
            return Err("Region must not be empty".to_string());
        }
        if self.upload.max_upload_mb == 0 {
            return Err("max_upload_mb must be at least 1".to_string());
        }
        if self.allowed_origin != "*"
            && axum::http::HeaderValue::from_str(&self.allowed_origin).is_err()
        {
            return Err(format!("Invalid allowed origin: {}", self.allowed_origin));
        }
        for endpoint in [&self.cloud.storage_endpoint, &self.cloud.transcribe_endpoint]
            .into_iter()
            .flatten()
        {
            if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
                return Err(format!(
                    "Endpoint must start with http:// or https://: {}",
                    endpoint
                ));
            }
        }
        Ok(())
    }
}
