//! Job status poller
//!
//! Polls the status endpoint on a fixed interval until the subtitle document
//! arrives, the job reports completion, an error occurs, or a configured
//! bound is hit. The poll loop runs as one task behind a `PollHandle`.

use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use super::api::{ApiClient, StatusReply};
use crate::cloud::JobStatus;
use crate::jobs::srt_file_name;

/// Poller settings
#[derive(Debug, Clone)]
pub struct PollOptions {
    /// Time between status requests
    pub interval: Duration,
    /// Give up after this many requests
    pub max_attempts: Option<u32>,
    /// Give up once this much time has passed
    pub deadline: Option<Duration>,
    /// Where the downloaded subtitle file is written
    pub download_dir: PathBuf,
}

impl Default for PollOptions {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            max_attempts: None,
            deadline: None,
            download_dir: PathBuf::from("."),
        }
    }
}

/// Observable client state
#[derive(Debug, Clone, PartialEq)]
pub enum PollState {
    Idle,
    Uploading,
    UploadFailed(String),
    Uploaded { job_name: String },
    Polling {
        job_name: String,
        attempts: u32,
        last_status: Option<JobStatus>,
    },
    Finished(PollOutcome),
}

/// How polling ended
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    /// Subtitle document received and written to disk
    Downloaded(PathBuf),
    /// Status reported completion without a document
    Completed,
    /// Request, response or file error; polling stopped
    Failed(String),
    Cancelled,
    Exhausted { attempts: u32 },
    TimedOut,
}

/// Handle to a running poll loop. Dropping it cancels the loop.
pub struct PollHandle {
    cancel: watch::Sender<bool>,
    state: watch::Receiver<PollState>,
    task: JoinHandle<PollOutcome>,
}

impl PollHandle {
    /// Stop polling; an in-flight request is abandoned
    pub fn cancel(&self) {
        let _ = self.cancel.send(true);
    }

    /// Snapshot of the current state
    pub fn state(&self) -> PollState {
        self.state.borrow().clone()
    }

    /// Receiver for state changes
    pub fn subscribe(&self) -> watch::Receiver<PollState> {
        self.state.clone()
    }

    /// Wait for the loop to finish
    pub async fn wait(self) -> PollOutcome {
        let PollHandle { cancel, task, .. } = self;
        let outcome = match task.await {
            Ok(outcome) => outcome,
            Err(e) => PollOutcome::Failed(format!("poll task aborted: {}", e)),
        };
        drop(cancel);
        outcome
    }
}

/// Start polling `job_name` in the background
pub fn spawn_poller(client: ApiClient, job_name: String, options: PollOptions) -> PollHandle {
    let (state_tx, state_rx) = watch::channel(PollState::Polling {
        job_name: job_name.clone(),
        attempts: 0,
        last_status: None,
    });
    spawn_with_state(client, job_name, options, state_tx, state_rx)
}

fn spawn_with_state(
    client: ApiClient,
    job_name: String,
    options: PollOptions,
    state_tx: watch::Sender<PollState>,
    state_rx: watch::Receiver<PollState>,
) -> PollHandle {
    let (cancel_tx, cancel_rx) = watch::channel(false);
    let task = tokio::spawn(async move {
        let outcome = poll_loop(&client, &job_name, &options, &state_tx, cancel_rx).await;
        tracing::info!("Polling {} finished: {:?}", job_name, outcome);
        let _ = state_tx.send(PollState::Finished(outcome.clone()));
        outcome
    });

    PollHandle {
        cancel: cancel_tx,
        state: state_rx,
        task,
    }
}

async fn poll_loop(
    client: &ApiClient,
    job_name: &str,
    options: &PollOptions,
    state_tx: &watch::Sender<PollState>,
    mut cancel_rx: watch::Receiver<bool>,
) -> PollOutcome {
    let started = Instant::now();
    let mut ticker = tokio::time::interval_at(started + options.interval, options.interval);
    // A slow response must not be followed by a burst of catch-up requests
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut attempts = 0u32;

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = cancel_rx.changed() => return PollOutcome::Cancelled,
        }

        if let Some(deadline) = options.deadline {
            if started.elapsed() >= deadline {
                return PollOutcome::TimedOut;
            }
        }

        attempts += 1;
        // One request at a time: the next tick is only awaited after this resolves
        let reply = tokio::select! {
            reply = client.check_status(job_name) => reply,
            _ = cancel_rx.changed() => return PollOutcome::Cancelled,
        };

        match reply {
            Ok(StatusReply::Subtitle(body)) => {
                return match save_subtitle(&options.download_dir, job_name, &body).await {
                    Ok(path) => PollOutcome::Downloaded(path),
                    Err(e) => PollOutcome::Failed(format!("could not save subtitle: {}", e)),
                };
            }
            Ok(StatusReply::Status(status)) => {
                tracing::debug!("Job {} attempt {}: {}", job_name, attempts, status);
                if status.is_completed() {
                    return PollOutcome::Completed;
                }
                let _ = state_tx.send(PollState::Polling {
                    job_name: job_name.to_string(),
                    attempts,
                    last_status: Some(status),
                });
            }
            Err(e) => {
                tracing::error!("Error fetching transcription status: {}", e);
                return PollOutcome::Failed(e.to_string());
            }
        }

        if options.max_attempts.is_some_and(|max| attempts >= max) {
            return PollOutcome::Exhausted { attempts };
        }
    }
}

async fn save_subtitle(dir: &Path, job_name: &str, body: &[u8]) -> std::io::Result<PathBuf> {
    let path = dir.join(srt_file_name(job_name));
    tokio::fs::write(&path, body).await?;
    Ok(path)
}

/// Upload `path`, then poll its job to the end.
///
/// State moves `Idle -> Uploading -> Uploaded | UploadFailed`, then hands
/// over to the poll loop. Returns `None` when the upload failed.
pub async fn upload_and_poll(
    client: ApiClient,
    path: &Path,
    options: PollOptions,
    state_tx: watch::Sender<PollState>,
) -> Option<PollHandle> {
    let _ = state_tx.send(PollState::Uploading);

    let job_name = match client.upload(path).await {
        Ok(job_name) => job_name,
        Err(e) => {
            tracing::error!("Upload failed: {}", e);
            let _ = state_tx.send(PollState::UploadFailed(e.to_string()));
            return None;
        }
    };
    tracing::info!("Upload accepted, transcription job {}", job_name);
    let _ = state_tx.send(PollState::Uploaded {
        job_name: job_name.clone(),
    });

    let state_rx = state_tx.subscribe();
    Some(spawn_with_state(client, job_name, options, state_tx, state_rx))
}
