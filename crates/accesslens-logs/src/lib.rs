//! Access-log processing for accesslens
//!
//! This crate provides the single-pass pipeline over daily access-log files:
//! parsing, filtering, aggregation, sorting, paging, and export.
//!
//! ```text
//! files ──► LogParser ──► CompiledFilter ──► AggregateStats
//!                               │
//!                               └──► rows ──► sort_rows ──► paginate
//! ```

mod discovery;
mod export;
mod filter;
mod pager;
mod parser;
mod pipeline;
mod sort;
mod stats;
pub mod timestamp;

pub use discovery::{discover_log_files, is_valid_file_name};
pub use export::{CSV_HEADER, ChartData, ExportError, Series, csv_file_name, write_csv};
pub use filter::CompiledFilter;
pub use pager::{Page, paginate, total_pages};
pub use parser::{LogParser, coerce_int};
pub use pipeline::{DEFAULT_MAX_ROWS, FileSelection, Pipeline, PipelineConfig, PipelineResult};
pub use sort::{compare, sort_rows};
pub use stats::{AggregateStats, DEFAULT_TOP_N, StatusCounts};

// Re-export types used in our public API
pub use accesslens_types::{
    FilterSpec, LogRow, SortDirection, SortField, SortSpec, StatusClass, TimeRange,
};
