//! Request normalization
//!
//! Turns loosely-typed invocation parameters into a fully-populated
//! [`Query`]. Bad values never error; they fall back to defaults.

use accesslens_logs::{
    FileSelection, FilterSpec, SortDirection, SortField, SortSpec, TimeRange, is_valid_file_name,
};

use crate::config::Settings;

/// Raw parameters as supplied by the caller
#[derive(Clone, Debug, Default)]
pub struct QueryParams {
    pub file: Option<String>,
    pub search: Option<String>,
    pub range: Option<String>,
    pub errors_only: bool,
    pub sort: Option<String>,
    pub dir: Option<String>,
    pub page: Option<String>,
}

/// Validated parameters for one pipeline run
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Query {
    pub selection: FileSelection,
    pub filter: FilterSpec,
    pub sort: SortSpec,
    /// 1-based, before clamping to the page count
    pub page: usize,
    /// Effective range; `None` in single-file mode
    pub range: Option<TimeRange>,
}

impl QueryParams {
    pub fn normalize(&self, settings: &Settings, now: i64) -> Query {
        let selection = match self.file.as_deref().map(str::trim) {
            Some(name) if is_valid_file_name(name, &settings.extension) => {
                FileSelection::Single(name.to_string())
            }
            Some(name) if !name.is_empty() => {
                tracing::warn!("Ignoring invalid file selection {:?}", name);
                FileSelection::All
            }
            _ => FileSelection::All,
        };

        let range = match &selection {
            FileSelection::All => Some(
                self.range
                    .as_deref()
                    .and_then(TimeRange::parse)
                    .unwrap_or_else(|| settings.default_range()),
            ),
            FileSelection::Single(_) => None,
        };

        let filter = FilterSpec {
            cutoff: range.map(|r| r.cutoff(now)),
            errors_only: self.errors_only,
            search: self.search.as_deref().map(str::trim).unwrap_or("").to_string(),
        };

        let sort = SortSpec::new(
            self.sort.as_deref().map(SortField::parse).unwrap_or_default(),
            self.dir.as_deref().map(SortDirection::parse).unwrap_or_default(),
        );

        let page = self
            .page
            .as_deref()
            .and_then(|p| p.trim().parse::<usize>().ok())
            .unwrap_or(1)
            .max(1);

        Query {
            selection,
            filter,
            sort,
            page,
            range,
        }
    }
}
