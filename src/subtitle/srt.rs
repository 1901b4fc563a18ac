//! SRT document generation from timed transcript items

use super::timestamp::format_timestamp;
use super::transcript::{ItemKind, TranscriptItem};
use crate::error::{Result, ServerError};

/// A single rendered subtitle block
#[derive(Debug, Clone, PartialEq)]
pub struct SrtCue<'a> {
    /// 1-based position in emission order
    pub index: usize,
    /// Start time in seconds
    pub start: f64,
    /// End time in seconds
    pub end: f64,
    pub text: &'a str,
}

impl SrtCue<'_> {
    /// Append this cue, including the blank separator line, to `out`.
    ///
    /// Times outside the representable range make the transcript malformed.
    pub fn render_into(&self, out: &mut String) -> Result<()> {
        let start = self.timestamp(self.start)?;
        let end = self.timestamp(self.end)?;
        out.push_str(&format!(
            "{}\n{} --> {}\n{}\n\n",
            self.index, start, end, self.text
        ));
        Ok(())
    }

    fn timestamp(&self, seconds: f64) -> Result<String> {
        format_timestamp(seconds).map_err(|e| {
            ServerError::MalformedTranscript(format!("cue {}: {}", self.index, e))
        })
    }
}

/// Turn one pronunciation item into a cue, checking its timing fields
fn cue_for<'a>(position: usize, index: usize, item: &'a TranscriptItem) -> Result<SrtCue<'a>> {
    let (start, end) = match (item.start_time, item.end_time) {
        (Some(start), Some(end)) => (start, end),
        _ => {
            return Err(ServerError::MalformedTranscript(format!(
                "item {} has no timing",
                position
            )))
        }
    };
    if start > end {
        return Err(ServerError::MalformedTranscript(format!(
            "item {} ends before it starts ({} > {})",
            position, start, end
        )));
    }
    let text = item.best_content().ok_or_else(|| {
        ServerError::MalformedTranscript(format!("item {} has no alternatives", position))
    })?;

    Ok(SrtCue {
        index,
        start,
        end,
        text,
    })
}

/// Build an SRT document from transcript items.
///
/// Items are rendered in the order given. Punctuation items produce no cue
/// and do not advance the cue counter.
pub fn build_srt(items: &[TranscriptItem]) -> Result<String> {
    let mut out = String::new();
    let mut index = 1;

    for (position, item) in items.iter().enumerate() {
        if item.kind != ItemKind::Pronunciation {
            continue;
        }
        cue_for(position, index, item)?.render_into(&mut out)?;
        index += 1;
    }

    Ok(out)
}
