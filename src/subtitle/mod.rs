//! Subtitle conversion module
//!
//! Turns a timed transcript into an SRT document:
//! - Transcript document model as written by the transcription service
//! - `HH:MM:SS,mmm` timestamp formatting
//! - Cue numbering and SRT block rendering

pub mod srt;
pub mod timestamp;
pub mod transcript;

pub use srt::build_srt;
pub use transcript::TranscriptDocument;
