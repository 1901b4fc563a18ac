//! S3 object storage

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_s3::config::RequestChecksumCalculation;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;

use super::ObjectStore;
use crate::config::CloudConfig;
use crate::error::{Result, ServerError};

/// Uploads media into the configured bucket with signed `PutObject` calls
#[derive(Clone)]
pub struct S3Store {
    client: aws_sdk_s3::Client,
    bucket: String,
}

impl S3Store {
    pub fn new(sdk_config: &SdkConfig, config: &CloudConfig) -> Self {
        // Checksums only where the operation demands one
        let mut builder = aws_sdk_s3::config::Builder::from(sdk_config)
            .request_checksum_calculation(RequestChecksumCalculation::WhenRequired);
        if let Some(endpoint) = &config.storage_endpoint {
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }
        Self::from_client(aws_sdk_s3::Client::from_conf(builder.build()), &config.bucket)
    }

    pub fn from_client(client: aws_sdk_s3::Client, bucket: &str) -> Self {
        Self {
            client,
            bucket: bucket.to_string(),
        }
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn put_object(&self, key: &str, body: Bytes, content_type: &str) -> Result<()> {
        let size = body.len();
        tracing::debug!("PutObject s3://{}/{} ({} bytes)", self.bucket, key, size);

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(|e| {
                ServerError::UploadFailed(format!(
                    "PutObject s3://{}/{}: {}",
                    self.bucket,
                    key,
                    DisplayErrorContext(&e)
                ))
            })?;

        tracing::info!("Stored {} bytes as s3://{}/{}", size, self.bucket, key);
        Ok(())
    }

    fn media_uri(&self, key: &str) -> String {
        format!("s3://{}/{}", self.bucket, key)
    }
}
