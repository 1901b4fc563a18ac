//! Transcript document model
//!
//! Mirrors the transcript file written by the transcription service. Times
//! and confidences arrive as decimal strings (`"1.53"`); plain numbers are
//! accepted as well.

use serde::{Deserialize, Deserializer, Serialize};

/// Token kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Pronunciation,
    Punctuation,
}

/// One ranked alternative for a token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alternative {
    pub content: String,
    #[serde(default, deserialize_with = "decimal_opt")]
    pub confidence: Option<f64>,
}

/// One token of the transcription result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptItem {
    #[serde(rename = "type")]
    pub kind: ItemKind,
    #[serde(default, deserialize_with = "decimal_opt")]
    pub start_time: Option<f64>,
    #[serde(default, deserialize_with = "decimal_opt")]
    pub end_time: Option<f64>,
    #[serde(default)]
    pub alternatives: Vec<Alternative>,
}

impl TranscriptItem {
    /// A timed spoken word
    pub fn pronunciation(start: f64, end: f64, content: &str) -> Self {
        Self {
            kind: ItemKind::Pronunciation,
            start_time: Some(start),
            end_time: Some(end),
            alternatives: vec![Alternative {
                content: content.to_string(),
                confidence: None,
            }],
        }
    }

    /// An untimed punctuation mark
    pub fn punctuation(content: &str) -> Self {
        Self {
            kind: ItemKind::Punctuation,
            start_time: None,
            end_time: None,
            alternatives: vec![Alternative {
                content: content.to_string(),
                confidence: None,
            }],
        }
    }

    /// Text of the provider's top-ranked alternative
    pub fn best_content(&self) -> Option<&str> {
        self.alternatives.first().map(|a| a.content.as_str())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TranscriptText {
    pub transcript: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TranscriptResults {
    #[serde(default)]
    pub transcripts: Vec<TranscriptText>,
    #[serde(default)]
    pub items: Vec<TranscriptItem>,
}

/// Transcript file fetched once per completed job
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptDocument {
    #[serde(default)]
    pub job_name: Option<String>,
    pub results: TranscriptResults,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Decimal {
    Number(f64),
    Text(String),
}

fn decimal_opt<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Decimal>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Decimal::Number(n)) => Ok(Some(n)),
        Some(Decimal::Text(s)) => s
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("invalid decimal: {:?}", s))),
    }
}
