//! Upload and polling client
//!
//! Talks to a running server the way the browser front end does: one
//! multipart upload, then fixed-interval status polls until the subtitle
//! file can be downloaded.

pub mod api;
pub mod poller;

pub use api::ApiClient;
pub use poller::{upload_and_poll, PollOptions, PollOutcome, PollState};
