use accesslens_types::{FilterSpec, LogRow};

/// Compiled filter for log rows
#[derive(Clone)]
pub struct CompiledFilter {
    /// Rows with a parsed epoch before this are excluded
    cutoff: Option<i64>,

    /// Keep only status >= 400
    errors_only: bool,

    /// Lowercased search term (empty = all)
    needle: String,
}

impl CompiledFilter {
    /// Compile a [`FilterSpec`]; the search term is lowercased once here
    pub fn new(spec: &FilterSpec) -> Self {
        Self {
            cutoff: spec.cutoff,
            errors_only: spec.errors_only,
            needle: spec.search.to_lowercase(),
        }
    }

    /// Check if a row passes every active predicate
    pub fn matches(&self, row: &LogRow) -> bool {
        self.time_matches(row) && self.status_matches(row) && self.text_matches(row)
    }

    /// Rows without a parseable timestamp always pass
    fn time_matches(&self, row: &LogRow) -> bool {
        match (self.cutoff, row.epoch) {
            (Some(cutoff), Some(epoch)) => epoch >= cutoff,
            _ => true,
        }
    }

    fn status_matches(&self, row: &LogRow) -> bool {
        !self.errors_only || row.is_error()
    }

    fn text_matches(&self, row: &LogRow) -> bool {
        self.needle.is_empty() || row.raw.to_lowercase().contains(&self.needle)
    }
}

impl std::fmt::Debug for CompiledFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompiledFilter")
            .field("cutoff", &self.cutoff)
            .field("errors_only", &self.errors_only)
            .field("search", &self.needle)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LogParser;

    fn row(epoch: &str, status: &str, ua: &str) -> LogRow {
        let line = format!(
            r#""1.2.3.4" "{}" "GET /foo HTTP/1.1" "{}" "-" "512" "-" "{}""#,
            epoch, status, ua
        );
        LogParser::parse(&line, "f.log").unwrap()
    }

    fn spec(cutoff: Option<i64>, errors_only: bool, search: &str) -> FilterSpec {
        FilterSpec {
            cutoff,
            errors_only,
            search: search.to_string(),
        }
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        let filter = CompiledFilter::new(&FilterSpec::default());
        assert!(filter.matches(&row("1701600000", "200", "UA")));
        assert!(filter.matches(&row("junk", "0", "")));
    }

    #[test]
    fn test_cutoff() {
        let filter = CompiledFilter::new(&spec(Some(1_701_600_000), false, ""));
        assert!(filter.matches(&row("1701600000", "200", "UA")));
        assert!(filter.matches(&row("1701600001000", "200", "UA")));
        assert!(!filter.matches(&row("1701599999", "200", "UA")));
    }

    #[test]
    fn test_unparseable_timestamp_survives_cutoff() {
        let filter = CompiledFilter::new(&spec(Some(i64::MAX), false, ""));
        assert!(filter.matches(&row("yesterday", "200", "UA")));
    }

    #[test]
    fn test_errors_only() {
        let filter = CompiledFilter::new(&spec(None, true, ""));
        assert!(filter.matches(&row("1701600000", "404", "UA")));
        assert!(filter.matches(&row("1701600000", "500", "UA")));
        assert!(!filter.matches(&row("1701600000", "200", "UA")));
        assert!(!filter.matches(&row("1701600000", "399", "UA")));
    }

    #[test]
    fn test_search_is_case_insensitive_over_raw_line() {
        let filter = CompiledFilter::new(&spec(None, false, "curl"));
        assert!(filter.matches(&row("1701600000", "200", "CURL/8.0")));
        assert!(!filter.matches(&row("1701600000", "200", "Mozilla")));

        // The quote characters of the raw line are searchable too
        let filter = CompiledFilter::new(&spec(None, false, "\"404\""));
        assert!(filter.matches(&row("1701600000", "404", "UA")));
    }

    #[test]
    fn test_all_predicates_must_pass() {
        let filter = CompiledFilter::new(&spec(Some(1_701_600_000), true, "bot"));
        assert!(filter.matches(&row("1701600000", "503", "SomeBot")));
        assert!(!filter.matches(&row("1701600000", "200", "SomeBot")));
        assert!(!filter.matches(&row("1701600000", "503", "Mozilla")));
        assert!(!filter.matches(&row("1600000000", "503", "SomeBot")));
    }
}
