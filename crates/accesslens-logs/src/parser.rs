use std::sync::LazyLock;

use regex::Regex;

use accesslens_types::LogRow;

use crate::timestamp;

/// Number of positional quoted fields in an access-log line
const FIELD_COUNT: usize = 8;

static QUOTED_FIELD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""([^"]*)""#).expect("quoted field pattern"));

static REQUEST_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\S+\s+(\S+)").expect("request line pattern"));

/// Parser for the quoted-field access-log format:
///
/// ```text
/// "ip" "timestamp" "request" "status" "extra" "bytes" "referer" "user agent"
/// ```
pub struct LogParser;

impl LogParser {
    /// Parse one line read from `file`.
    ///
    /// Returns `None` for blank lines and for lines without any quoted field.
    /// Missing trailing fields are treated as empty.
    pub fn parse(line: &str, file: &str) -> Option<LogRow> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        let mut fields: Vec<&str> = QUOTED_FIELD
            .captures_iter(line)
            .filter_map(|c| c.get(1).map(|m| m.as_str()))
            .collect();
        if fields.is_empty() {
            return None;
        }
        if fields.len() < FIELD_COUNT {
            fields.resize(FIELD_COUNT, "");
        }

        let timestamp_raw = fields[1];
        let request = fields[2];

        Some(LogRow {
            file: file.to_string(),
            ip: fields[0].to_string(),
            timestamp_raw: timestamp_raw.to_string(),
            epoch: timestamp::parse_epoch(timestamp_raw),
            timestamp: timestamp::display_timestamp(timestamp_raw),
            request: request.to_string(),
            path: Self::request_path(request).to_string(),
            status: coerce_int(fields[3]),
            extra: fields[4].to_string(),
            bytes: fields[5].to_string(),
            referer: fields[6].to_string(),
            user_agent: fields[7].to_string(),
            raw: line.to_string(),
        })
    }

    /// Extract the path from a `METHOD /path ...` request line
    pub fn request_path(request: &str) -> &str {
        REQUEST_LINE
            .captures(request)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str())
            .unwrap_or("")
    }
}

/// Lenient integer coercion: optional sign and leading digits, 0 otherwise.
///
/// `"404"` → 404, `"512kb"` → 512, `"-"` → 0.
pub fn coerce_int(s: &str) -> i64 {
    let s = s.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let mut value: i64 = 0;
    for b in digits.bytes().take_while(u8::is_ascii_digit) {
        value = value.saturating_mul(10).saturating_add(i64::from(b - b'0'));
    }

    if negative { -value } else { value }
}
