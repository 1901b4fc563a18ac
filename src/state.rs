//! Application state management
//!
//! `AppState` holds the server configuration and the cloud clients. The
//! clients are constructed once at startup and shared by every handler; no
//! job state is kept in process memory.

use aws_config::{BehaviorVersion, Region};
use std::sync::Arc;

use crate::cloud::{ObjectStore, S3Store, TranscribeClient, TranscriptionService};
use crate::config::ServerConfig;

pub struct AppState {
    pub config: ServerConfig,
    pub store: Arc<dyn ObjectStore>,
    pub transcriber: Arc<dyn TranscriptionService>,
}

impl AppState {
    /// Create state from explicitly constructed collaborators
    pub fn new(
        config: ServerConfig,
        store: Arc<dyn ObjectStore>,
        transcriber: Arc<dyn TranscriptionService>,
    ) -> Self {
        Self {
            config,
            store,
            transcriber,
        }
    }

    /// Create state wired to the provider, using the default credential chain
    pub async fn connect(config: ServerConfig) -> Result<Self, reqwest::Error> {
        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.cloud.region.clone()))
            .load()
            .await;
        let http = reqwest::Client::builder()
            .user_agent(concat!("subgen-server/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let store = Arc::new(S3Store::new(&sdk_config, &config.cloud));
        let transcriber = Arc::new(TranscribeClient::new(&sdk_config, http, &config.cloud));
        tracing::info!(
            "Cloud clients ready: region={}, storage endpoint={}, transcribe endpoint={}",
            config.cloud.region,
            config.cloud.storage_endpoint.as_deref().unwrap_or("default"),
            config.cloud.transcribe_endpoint.as_deref().unwrap_or("default")
        );

        Ok(Self::new(config, store, transcriber))
    }
}
