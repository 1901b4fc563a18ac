//! Subtitle Generation Server
//!
//! Accepts media uploads, stores them in object storage, starts a cloud
//! transcription job, and converts the finished transcript into an SRT
//! subtitle file. The `transcribe` subcommand is the matching client.

#![allow(dead_code)]

mod client;
mod cloud;
mod config;
mod config_file;
mod error;
mod http;
mod jobs;
mod state;
mod subtitle;

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::client::{upload_and_poll, ApiClient, PollOptions, PollOutcome, PollState};
use crate::config::ServerConfig;
use crate::error::ServerError;
use crate::http::create_router;
use crate::state::AppState;

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
const APP_NAME: &str = "subgen-server";

#[derive(Parser, Debug)]
#[command(name = "subgen-server")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP server
    Serve {
        /// TOML configuration file (defaults are used when it does not exist)
        #[arg(short, long, default_value = "config.toml")]
        config: PathBuf,
    },
    /// Upload a media file to a running server and download its subtitles
    Transcribe {
        /// Audio or video file to transcribe
        file: PathBuf,

        /// Server base URL
        #[arg(short, long, default_value = "http://127.0.0.1:3000")]
        server: String,

        /// Directory the subtitle file is written to
        #[arg(short, long, default_value = ".")]
        out: PathBuf,

        /// Seconds between status requests
        #[arg(long, default_value_t = 5)]
        interval: u64,

        /// Stop after this many status requests
        #[arg(long)]
        max_attempts: Option<u32>,

        /// Stop after this many seconds of polling
        #[arg(long)]
        deadline: Option<u64>,
    },
    /// Write a default configuration file
    InitConfig {
        #[arg(default_value = "config.toml")]
        path: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Serve { config } => serve(&config).await,
        Command::Transcribe {
            file,
            server,
            out,
            interval,
            max_attempts,
            deadline,
        } => {
            init_logging("info", "pretty");
            let options = PollOptions {
                interval: Duration::from_secs(interval.max(1)),
                max_attempts,
                deadline: deadline.map(Duration::from_secs),
                download_dir: out,
            };
            transcribe(&server, &file, options).await
        }
        Command::InitConfig { path } => {
            config_file::generate_default_config(&path)?;
            println!("Wrote default configuration to {}", path.display());
            Ok(())
        }
    }
}

/// Load configuration: file (if present), then environment overrides
fn load_config(path: &Path) -> Result<ServerConfig, ServerError> {
    let mut config = if path.exists() {
        config_file::ConfigFile::from_file(path)
            .map_err(|e| {
                ServerError::Config(format!("Failed to load config file {}: {}", path.display(), e))
            })?
            .into_server_config()
    } else {
        ServerConfig::default()
    };

    config.apply_env().map_err(ServerError::Config)?;
    config.validate().map_err(ServerError::Config)?;
    Ok(config)
}

async fn serve(config_path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(config_path)?;

    // Initialize logging
    init_logging(&config.log_level, &config.log_format);

    tracing::info!("{} v{} starting", APP_NAME, VERSION);
    tracing::info!("Configuration loaded: {:?}", config);

    // Create application state
    let state = Arc::new(AppState::connect(config.clone()).await?);

    // Build router
    let app = create_router(state);

    // Start server
    let addr = config.socket_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Starting HTTP server on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown requested");
}

async fn transcribe(
    server: &str,
    file: &Path,
    options: PollOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let client = ApiClient::new(server)?;
    let (state_tx, mut state_rx) = watch::channel(PollState::Idle);

    let progress = tokio::spawn(async move {
        while state_rx.changed().await.is_ok() {
            let state = state_rx.borrow_and_update().clone();
            match state {
                PollState::Polling {
                    job_name,
                    attempts,
                    last_status: Some(status),
                } => tracing::info!("{}: {} (check {})", job_name, status, attempts),
                PollState::Finished(_) => break,
                other => tracing::debug!("{:?}", other),
            }
        }
    });

    let handle = upload_and_poll(client, file, options, state_tx).await;
    let outcome = match handle {
        Some(handle) => tokio::select! {
            outcome = handle.wait() => outcome,
            _ = tokio::signal::ctrl_c() => PollOutcome::Cancelled,
        },
        None => PollOutcome::Failed("upload failed".to_string()),
    };
    progress.abort();

    match outcome {
        PollOutcome::Downloaded(path) => {
            tracing::info!("Subtitles saved to {}", path.display());
            Ok(())
        }
        PollOutcome::Completed => {
            tracing::info!("Transcription completed");
            Ok(())
        }
        other => Err(format!("transcription did not finish: {:?}", other).into()),
    }
}

/// Initialize logging with tracing
fn init_logging(level: &str, format: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("subgen_server={},tower_http={}", level, level).into()
    });

    let registry = tracing_subscriber::registry().with(filter);
    if format == "json" {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
