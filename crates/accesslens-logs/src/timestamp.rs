use chrono::{DateTime, Local};

/// Display format for normalized timestamps
const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Convert a raw timestamp token to epoch seconds.
///
/// Accepts only pure decimal digits: 10 digits are seconds, 13 digits are
/// milliseconds (floored to seconds). Everything else is unparseable.
pub fn parse_epoch(token: &str) -> Option<i64> {
    let token = token.trim();
    if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    match token.len() {
        10 => token.parse::<i64>().ok(),
        13 => token.parse::<i64>().ok().map(|ms| ms.div_euclid(1000)),
        _ => None,
    }
}

/// Render epoch seconds as local time, e.g. `2023-12-03 10:40:00`
pub fn format_epoch(epoch: i64) -> Option<String> {
    let utc = DateTime::from_timestamp(epoch, 0)?;
    Some(utc.with_timezone(&Local).format(DISPLAY_FORMAT).to_string())
}

/// Display form of a raw token: the local-time string when it parses,
/// otherwise the trimmed token unchanged
pub fn display_timestamp(token: &str) -> String {
    parse_epoch(token)
        .and_then(format_epoch)
        .unwrap_or_else(|| token.trim().to_string())
}
