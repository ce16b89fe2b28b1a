//! Shared types for accesslens
//!
//! This crate contains the data model passed between the log pipeline and
//! its callers: parsed rows, filter and sort settings, and time ranges.

use serde::Serialize;

// ============================================================================
// Log Rows
// ============================================================================

/// A single parsed access-log line
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LogRow {
    /// Name of the file the line was read from
    pub file: String,

    /// Client IP (may be empty)
    pub ip: String,

    /// Timestamp token exactly as it appeared in the line
    pub timestamp_raw: String,

    /// Seconds since the Unix epoch, if the token could be parsed
    pub epoch: Option<i64>,

    /// Local-time rendering of `epoch`, or the trimmed raw token
    pub timestamp: String,

    /// HTTP request line, e.g. `GET /index.html HTTP/1.1`
    pub request: String,

    /// Path extracted from the request line (empty if it did not parse)
    pub path: String,

    /// HTTP status code, 0 when missing or non-numeric
    pub status: i64,

    /// Opaque fifth field, carried through untouched
    pub extra: String,

    /// Byte count as read; not guaranteed to be numeric
    pub bytes: String,

    pub referer: String,

    pub user_agent: String,

    /// Original line, kept for raw display and export
    pub raw: String,
}

impl LogRow {
    /// Whether the status code is a client or server error
    pub fn is_error(&self) -> bool {
        self.status >= 400
    }

    /// Status class bucket for this row, if the status falls in 200..=599
    pub fn status_class(&self) -> Option<StatusClass> {
        StatusClass::from_status(self.status)
    }
}

/// HTTP status code hundred-group
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StatusClass {
    Success,
    Redirect,
    ClientError,
    ServerError,
}

impl StatusClass {
    /// All classes in report order
    pub const ALL: [StatusClass; 4] = [
        Self::Success,
        Self::Redirect,
        Self::ClientError,
        Self::ServerError,
    ];

    /// Bucket a status code; codes outside 200..=599 have no class
    pub fn from_status(status: i64) -> Option<Self> {
        match status {
            200..=299 => Some(Self::Success),
            300..=399 => Some(Self::Redirect),
            400..=499 => Some(Self::ClientError),
            500..=599 => Some(Self::ServerError),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Success => "2xx",
            Self::Redirect => "3xx",
            Self::ClientError => "4xx",
            Self::ServerError => "5xx",
        }
    }
}

impl std::fmt::Display for StatusClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// ============================================================================
// Time Ranges
// ============================================================================

/// Look-back window for multi-file browsing
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimeRange {
    Hours(u32),
    Days(u32),
}

impl Default for TimeRange {
    fn default() -> Self {
        Self::Days(3)
    }
}

impl TimeRange {
    /// Parse a `<N>h` / `<N>d` token.
    ///
    /// Returns `None` for anything that is not a positive number followed by
    /// `h` or `d`; callers fall back to their default range.
    pub fn parse(token: &str) -> Option<Self> {
        let token = token.trim().to_ascii_lowercase();
        let unit = token.chars().last()?;
        let digits = &token[..token.len() - unit.len_utf8()];
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }

        let n = match digits.parse::<u32>() {
            Ok(n) if n > 0 => n,
            _ => return None,
        };

        match unit {
            'h' => Some(Self::Hours(n)),
            'd' => Some(Self::Days(n)),
            _ => None,
        }
    }

    /// Get the number of seconds for this time range
    pub fn as_seconds(&self) -> i64 {
        match self {
            Self::Hours(n) => i64::from(*n) * 3600,
            Self::Days(n) => i64::from(*n) * 86_400,
        }
    }

    /// Earliest epoch second still inside the window ending at `now`
    pub fn cutoff(&self, now: i64) -> i64 {
        now.saturating_sub(self.as_seconds())
    }

    /// Token form, e.g. `24h`
    pub fn label(&self) -> String {
        match self {
            Self::Hours(n) => format!("{}h", n),
            Self::Days(n) => format!("{}d", n),
        }
    }
}

impl std::fmt::Display for TimeRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.label())
    }
}

// ============================================================================
// Filter & Sort Settings
// ============================================================================

/// Active row filters. All predicates must pass.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FilterSpec {
    /// Rows with a parsed epoch before this are dropped. `None` in
    /// single-file mode.
    pub cutoff: Option<i64>,

    /// Keep only rows with status >= 400
    pub errors_only: bool,

    /// Case-insensitive substring matched against the raw line; empty
    /// matches everything
    pub search: String,
}

/// Column to order rows by
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SortField {
    #[default]
    Time,
    Ip,
    Status,
    Bytes,
    File,
}

impl SortField {
    /// Parse a field name; unknown names sort by time
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "ip" => Self::Ip,
            "status" => Self::Status,
            "bytes" => Self::Bytes,
            "file" => Self::File,
            _ => Self::Time,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Time => "time",
            Self::Ip => "ip",
            Self::Status => "status",
            Self::Bytes => "bytes",
            Self::File => "file",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SortDirection {
    Ascending,
    #[default]
    Descending,
}

impl SortDirection {
    /// `asc` sorts ascending; anything else sorts descending
    pub fn parse(s: &str) -> Self {
        if s.trim().eq_ignore_ascii_case("asc") {
            Self::Ascending
        } else {
            Self::Descending
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ascending => "asc",
            Self::Descending => "desc",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct SortSpec {
    pub field: SortField,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn new(field: SortField, direction: SortDirection) -> Self {
        Self { field, direction }
    }
}
