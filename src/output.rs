use std::io::{self, Write};

use serde::Serialize;

use accesslens_logs::{ChartData, LogRow, Page, PipelineResult, Series};

use crate::query::Query;

/// JSON shape of one run
#[derive(Serialize)]
pub struct Report<'a> {
    pub total_rows: usize,
    pub total_pages: usize,
    pub page: usize,
    pub truncated: bool,
    pub range: Option<String>,
    pub sort: String,
    pub files_read: &'a [String],
    pub rows: &'a [LogRow],
    pub stats: ChartData,
}

impl<'a> Report<'a> {
    pub fn new(query: &Query, result: &'a PipelineResult, page: &Page<'a>, top_n: usize) -> Self {
        Self {
            total_rows: page.total_rows,
            total_pages: page.total_pages,
            page: page.number,
            truncated: result.truncated,
            range: query.range.map(|r| r.label()),
            sort: format!("{} {}", query.sort.field.as_str(), query.sort.direction.as_str()),
            files_read: &result.files_read,
            rows: page.rows,
            stats: result.chart_data(top_n),
        }
    }
}

pub fn write_json<W: Write>(mut out: W, report: &Report<'_>) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut out, report)?;
    writeln!(out)
}

/// Plain-text rendering: summary, page of rows, then the statistics tables
pub fn write_table<W: Write>(mut out: W, report: &Report<'_>) -> io::Result<()> {
    writeln!(
        out,
        "{} rows | page {}/{} | range {} | sort {}{}",
        report.total_rows,
        report.page,
        report.total_pages,
        report.range.as_deref().unwrap_or("single file"),
        report.sort,
        if report.truncated {
            " | TRUNCATED (row cap reached)"
        } else {
            ""
        }
    )?;
    writeln!(out)?;

    if report.rows.is_empty() {
        writeln!(out, "No matching log lines.")?;
    } else {
        writeln!(
            out,
            "{:<19}  {:<15}  {:>6}  {:>8}  {:<16}  REQUEST",
            "TIME", "IP", "STATUS", "BYTES", "FILE"
        )?;
        for row in report.rows {
            writeln!(
                out,
                "{:<19}  {:<15}  {:>6}  {:>8}  {:<16}  {}",
                truncate(&row.timestamp, 19),
                truncate(&row.ip, 15),
                row.status,
                truncate(&row.bytes, 8),
                truncate(&row.file, 16),
                row.request
            )?;
        }
    }

    write_series(&mut out, "Top IPs", &report.stats.top_ips)?;
    write_series(&mut out, "Top paths", &report.stats.top_paths)?;
    write_series(&mut out, "Status classes", &report.stats.status)?;
    Ok(())
}

fn write_series<W: Write>(out: &mut W, title: &str, series: &Series) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", title)?;
    if series.is_empty() {
        writeln!(out, "  (none)")?;
    }
    for (label, value) in series.pairs() {
        writeln!(out, "  {:>8}  {}", value, label)?;
    }
    Ok(())
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let mut cut: String = s.chars().take(max.saturating_sub(1)).collect();
        cut.push('…');
        cut
    }
}
