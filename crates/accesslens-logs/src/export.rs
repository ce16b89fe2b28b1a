//! CSV and chart-data export
//!
//! Both exporters consume a finished [`PipelineResult`](crate::PipelineResult):
//! CSV covers every filtered row (not just the current page), chart data
//! covers the aggregate counters.

use std::io::Write;

use chrono::{DateTime, Local};
use serde::Serialize;
use thiserror::Error;

use accesslens_types::LogRow;

use crate::stats::AggregateStats;

/// Column names of the CSV export, in order
pub const CSV_HEADER: [&str; 11] = [
    "file",
    "ip",
    "timestamp",
    "timestamp_raw",
    "request",
    "path",
    "status",
    "bytes",
    "referer",
    "user_agent",
    "raw_line",
];

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to flush CSV output: {0}")]
    Io(#[from] std::io::Error),
}

/// Write `rows` as CSV with a header line. Returns the number of data rows.
pub fn write_csv<W: Write>(writer: W, rows: &[LogRow]) -> Result<usize, ExportError> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(CSV_HEADER)?;

    for row in rows {
        let status = row.status.to_string();
        wtr.write_record([
            row.file.as_str(),
            row.ip.as_str(),
            row.timestamp.as_str(),
            row.timestamp_raw.as_str(),
            row.request.as_str(),
            row.path.as_str(),
            status.as_str(),
            row.bytes.as_str(),
            row.referer.as_str(),
            row.user_agent.as_str(),
            row.raw.as_str(),
        ])?;
    }

    wtr.flush()?;
    Ok(rows.len())
}

/// Download file name for a CSV export taken at `now`
pub fn csv_file_name(now: DateTime<Local>) -> String {
    format!("access_logs_{}.csv", now.format("%Y%m%d_%H%M%S"))
}

/// Ordered label/value pairs, shaped for a charting library
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Series {
    pub labels: Vec<String>,
    pub values: Vec<u64>,
}

impl Series {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Iterate over `(label, value)` pairs
    pub fn pairs(&self) -> impl Iterator<Item = (&str, u64)> {
        self.labels
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().copied())
    }
}

impl<L: Into<String>> FromIterator<(L, u64)> for Series {
    fn from_iter<I: IntoIterator<Item = (L, u64)>>(iter: I) -> Self {
        let mut series = Series::default();
        for (label, value) in iter {
            series.labels.push(label.into());
            series.values.push(value);
        }
        series
    }
}

/// Aggregate statistics ready for serialization
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ChartData {
    pub top_ips: Series,
    pub top_paths: Series,
    pub status: Series,
}

impl ChartData {
    pub fn from_stats(stats: &AggregateStats, top_n: usize) -> Self {
        Self {
            top_ips: stats.top_ips(top_n).into_iter().collect(),
            top_paths: stats.top_paths(top_n).into_iter().collect(),
            status: stats
                .status_buckets()
                .into_iter()
                .map(|(class, n)| (class.label(), n))
                .collect(),
        }
    }
}
