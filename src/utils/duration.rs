//! Conversion between second counts and "hh:mm:ss" text

use crate::error::TimerError;

/// Parse "[[h:]m:]s" into a number of seconds.
///
/// Missing leading parts count as zero and no part is range limited, so
/// "90", "1:30" and "00:00:90" all mean ninety seconds. Every part must be a
/// non-negative integer; surrounding whitespace is ignored.
pub fn parse_hms(text: &str) -> Result<u64, TimerError> {
    let invalid = || TimerError::InvalidDuration(text.to_string());

    let parts: Vec<&str> = text.split(':').collect();
    if parts.len() > 3 {
        return Err(invalid());
    }

    let mut values = [0u64; 3];
    let offset = 3 - parts.len();
    for (i, part) in parts.iter().enumerate() {
        let part = part.trim();
        if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        values[offset + i] = part.parse().map_err(|_| invalid())?;
    }

    let [h, m, s] = values;
    h.checked_mul(3600)
        .and_then(|h| m.checked_mul(60).and_then(|m| h.checked_add(m)))
        .and_then(|hm| hm.checked_add(s))
        .ok_or_else(invalid)
}

/// Format seconds as "hh:mm:ss". Hours grow past two digits when needed.
pub fn format_hms(seconds: u64) -> String {
    let h = seconds / 3600;
    let m = (seconds % 3600) / 60;
    let s = seconds % 60;
    format!("{:02}:{:02}:{:02}", h, m, s)
}
