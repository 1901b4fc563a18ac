//! SRT timestamp formatting

use crate::error::{Result, ServerError};

/// Largest offset that still fits the two-digit hour field
const MAX_SECONDS: f64 = 100.0 * 3600.0;

/// Format a fractional-seconds offset as an SRT timestamp (`HH:MM:SS,mmm`).
///
/// Milliseconds are truncated, never rounded. Negative, non-finite and
/// three-digit-hour offsets are rejected.
pub fn format_timestamp(seconds: f64) -> Result<String> {
    if !seconds.is_finite() || seconds < 0.0 {
        return Err(ServerError::InvalidInput(format!(
            "timestamp must be a non-negative finite number, got {}",
            seconds
        )));
    }
    if seconds >= MAX_SECONDS {
        return Err(ServerError::InvalidInput(format!(
            "timestamp {} exceeds 99:59:59,999",
            seconds
        )));
    }

    let hours = (seconds / 3600.0).floor() as u32;
    let minutes = ((seconds % 3600.0) / 60.0).floor() as u32;
    let secs = (seconds % 60.0).floor() as u32;
    let millis = ((seconds % 1.0) * 1000.0).floor() as u32;

    Ok(format!(
        "{:02}:{:02}:{:02},{:03}",
        hours, minutes, secs, millis
    ))
}
