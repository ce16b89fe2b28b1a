use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;

use accesslens_types::{FilterSpec, LogRow, SortSpec};

use crate::discovery::{discover_log_files, is_valid_file_name};
use crate::export::ChartData;
use crate::filter::CompiledFilter;
use crate::pager::{self, Page};
use crate::parser::LogParser;
use crate::sort::sort_rows;
use crate::stats::AggregateStats;

/// Default maximum number of rows kept per run
pub const DEFAULT_MAX_ROWS: usize = 20_000;

/// Static settings for a [`Pipeline`]
#[derive(Clone, Debug)]
pub struct PipelineConfig {
    /// Directory holding one log file per day
    pub log_dir: PathBuf,

    /// File name suffix of log files, e.g. `.log`
    pub extension: String,

    /// Stop reading once this many rows have been accepted
    pub max_rows: usize,
}

impl PipelineConfig {
    pub fn new(log_dir: impl Into<PathBuf>) -> Self {
        Self {
            log_dir: log_dir.into(),
            extension: ".log".to_string(),
            max_rows: DEFAULT_MAX_ROWS,
        }
    }

    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    pub fn with_max_rows(mut self, max_rows: usize) -> Self {
        self.max_rows = max_rows;
        self
    }
}

/// Which files a run reads
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FileSelection {
    /// Every discovered file, newest first, with time-range filtering
    All,
    /// One explicitly chosen file, read in full without time-range filtering
    Single(String),
}

/// Output of one pipeline run
#[derive(Clone, Debug, Default)]
pub struct PipelineResult {
    /// Accepted rows, in read order until [`PipelineResult::sort`] is called
    pub rows: Vec<LogRow>,

    /// True when the row cap stopped ingestion
    pub truncated: bool,

    pub stats: AggregateStats,

    /// Files that were opened, in read order
    pub files_read: Vec<String>,
}

impl PipelineResult {
    pub fn sort(&mut self, spec: SortSpec) {
        sort_rows(&mut self.rows, spec);
    }

    pub fn page(&self, page_size: usize, page: usize) -> Page<'_> {
        pager::paginate(&self.rows, page_size, page)
    }

    pub fn chart_data(&self, top_n: usize) -> ChartData {
        ChartData::from_stats(&self.stats, top_n)
    }
}

/// Single-threaded read → parse → filter → aggregate pass over the log files
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(mut config: PipelineConfig) -> Self {
        config.max_rows = config.max_rows.max(1);
        Self { config }
    }

    /// Log files available for single-file selection, newest first
    pub fn available_files(&self) -> Vec<String> {
        discover_log_files(&self.config.log_dir, &self.config.extension)
    }

    /// Run one full pass. The cutoff in `filter` is ignored for a single file,
    /// and a single file name that is not a bare log file name reads nothing.
    pub fn run(&self, selection: &FileSelection, filter: &FilterSpec) -> PipelineResult {
        let (files, filter) = match selection {
            FileSelection::All => (self.available_files(), CompiledFilter::new(filter)),
            FileSelection::Single(name) if !is_valid_file_name(name, &self.config.extension) => {
                tracing::warn!("Refusing to read {:?} outside the log directory", name);
                (Vec::new(), CompiledFilter::new(filter))
            }
            FileSelection::Single(name) => {
                let single_file = FilterSpec {
                    cutoff: None,
                    ..filter.clone()
                };
                (vec![name.clone()], CompiledFilter::new(&single_file))
            }
        };

        tracing::debug!(
            "Pipeline run over {} file(s), filter {:?}",
            files.len(),
            filter
        );

        let mut result = PipelineResult::default();

        'files: for name in files {
            let path = self.config.log_dir.join(&name);
            let file = match File::open(&path) {
                Ok(file) => file,
                Err(e) => {
                    tracing::warn!("Skipping {}: {}", path.display(), e);
                    continue;
                }
            };
            tracing::debug!("Reading {}", path.display());
            result.files_read.push(name.clone());

            let mut reader = BufReader::new(file);
            let mut buf = Vec::new();
            loop {
                buf.clear();
                match reader.read_until(b'\n', &mut buf) {
                    Ok(0) => break,
                    Ok(_) => {}
                    Err(e) => {
                        tracing::warn!("Stopped reading {}: {}", path.display(), e);
                        break;
                    }
                }

                let line = String::from_utf8_lossy(&buf);
                let Some(row) = LogParser::parse(&line, &name) else {
                    continue;
                };
                if !filter.matches(&row) {
                    continue;
                }

                result.stats.record(&row);
                result.rows.push(row);

                if result.rows.len() >= self.config.max_rows {
                    result.truncated = true;
                    break 'files;
                }
            }
        }

        tracing::info!(
            "Accepted {} row(s) from {} file(s){}",
            result.rows.len(),
            result.files_read.len(),
            if result.truncated { " (truncated)" } else { "" }
        );

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use accesslens_types::{SortDirection, SortField, StatusClass};
    use std::fs;

    fn line(ip: &str, epoch: i64, path: &str, status: u16) -> String {
        format!(
            r#""{}" "{}" "GET {} HTTP/1.1" "{}" "-" "100" "-" "UA""#,
            ip, epoch, path, status
        )
    }

    fn write_log(dir: &std::path::Path, name: &str, lines: &[String]) {
        fs::write(dir.join(name), lines.join("\n")).unwrap();
    }

    fn errors_only() -> FilterSpec {
        FilterSpec {
            errors_only: true,
            ..FilterSpec::default()
        }
    }

    #[test]
    fn test_errors_only_scenario() {
        let dir = tempfile::tempdir().unwrap();
        write_log(
            dir.path(),
            "2023-12-03.log",
            &[
                r#""1.2.3.4" "1701600000" "GET /foo HTTP/1.1" "404" "-" "512" "-" "UA""#
                    .to_string(),
                r#""1.2.3.4" "1701600000" "GET /foo HTTP/1.1" "200" "-" "512" "-" "UA""#
                    .to_string(),
            ],
        );

        let pipeline = Pipeline::new(PipelineConfig::new(dir.path()));
        let result = pipeline.run(&FileSelection::All, &errors_only());

        assert_eq!(result.rows.len(), 1);
        assert_eq!(result.rows[0].path, "/foo");
        assert_eq!(result.rows[0].status, 404);
        let buckets = result.stats.status_buckets();
        assert_eq!(buckets[2], (StatusClass::ClientError, 1));
        assert_eq!(result.stats.status_counts().success, 0);
        assert!(!result.truncated);
    }

    #[test]
    fn test_row_cap_truncates() {
        let dir = tempfile::tempdir().unwrap();
        let lines: Vec<String> = (0..5)
            .map(|i| line(&format!("10.0.0.{}", i), 1_701_600_000 + i, "/x", 200))
            .collect();
        write_log(dir.path(), "2023-12-03.log", &lines);

        let pipeline = Pipeline::new(PipelineConfig::new(dir.path()).with_max_rows(3));
        let result = pipeline.run(&FileSelection::All, &FilterSpec::default());

        assert_eq!(result.rows.len(), 3);
        assert!(result.truncated);
        assert_eq!(result.stats.path_hits("/x"), 3);
    }

    #[test]
    fn test_cap_stops_across_files_newest_first() {
        let dir = tempfile::tempdir().unwrap();
        write_log(dir.path(), "2023-12-01.log", &[line("old", 1_701_400_000, "/a", 200)]);
        write_log(
            dir.path(),
            "2023-12-03.log",
            &[
                line("new1", 1_701_600_000, "/a", 200),
                line("new2", 1_701_600_001, "/a", 200),
            ],
        );

        let pipeline = Pipeline::new(PipelineConfig::new(dir.path()).with_max_rows(2));
        let result = pipeline.run(&FileSelection::All, &FilterSpec::default());

        let ips: Vec<&str> = result.rows.iter().map(|r| r.ip.as_str()).collect();
        assert_eq!(ips, vec!["new1", "new2"]);
        assert!(result.truncated);
        assert_eq!(result.files_read, vec!["2023-12-03.log"]);
        assert_eq!(result.stats.ip_hits("old"), 0);
    }

    #[test]
    fn test_cutoff_applies_only_in_multi_file_mode() {
        let dir = tempfile::tempdir().unwrap();
        write_log(
            dir.path(),
            "2023-12-03.log",
            &[
                line("recent", 1_701_600_000, "/a", 200),
                line("ancient", 1_000_000_000, "/a", 200),
                r#""undated" "sometime" "GET /a HTTP/1.1" "200""#.to_string(),
            ],
        );
        let filter = FilterSpec {
            cutoff: Some(1_701_000_000),
            ..FilterSpec::default()
        };
        let pipeline = Pipeline::new(PipelineConfig::new(dir.path()));

        let all = pipeline.run(&FileSelection::All, &filter);
        let ips: Vec<&str> = all.rows.iter().map(|r| r.ip.as_str()).collect();
        assert_eq!(ips, vec!["recent", "undated"]);

        let single = pipeline.run(&FileSelection::Single("2023-12-03.log".to_string()), &filter);
        assert_eq!(single.rows.len(), 3);
    }

    #[test]
    fn test_missing_file_and_junk_lines_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        write_log(
            dir.path(),
            "2023-12-03.log",
            &[
                String::new(),
                "no quotes here".to_string(),
                line("ok", 1_701_600_000, "/a", 200),
            ],
        );
        let pipeline = Pipeline::new(PipelineConfig::new(dir.path()));

        let missing = pipeline.run(
            &FileSelection::Single("2020-01-01.log".to_string()),
            &FilterSpec::default(),
        );
        assert!(missing.rows.is_empty());
        assert!(missing.files_read.is_empty());
        assert!(!missing.truncated);

        let result = pipeline.run(&FileSelection::All, &FilterSpec::default());
        assert_eq!(result.rows.len(), 1);
        assert_eq!(result.rows[0].file, "2023-12-03.log");
    }

    #[test]
    fn test_single_file_must_be_a_bare_name() {
        let root = tempfile::tempdir().unwrap();
        let log_dir = root.path().join("logs");
        fs::create_dir(&log_dir).unwrap();
        write_log(root.path(), "outside.log", &[line("leak", 1_701_600_000, "/a", 200)]);
        write_log(&log_dir, "2023-12-03.log", &[line("ok", 1_701_600_000, "/a", 200)]);

        let pipeline = Pipeline::new(PipelineConfig::new(&log_dir));
        for name in ["../outside.log", "sub/2023-12-03.log", ".hidden.log", "2023-12-03.txt"] {
            let result = pipeline.run(
                &FileSelection::Single(name.to_string()),
                &FilterSpec::default(),
            );
            assert!(result.rows.is_empty(), "name {:?}", name);
            assert!(result.files_read.is_empty(), "name {:?}", name);
        }

        let ok = pipeline.run(
            &FileSelection::Single("2023-12-03.log".to_string()),
            &FilterSpec::default(),
        );
        assert_eq!(ok.rows.len(), 1);
    }

    #[test]
    fn test_invalid_utf8_does_not_abort() {
        let dir = tempfile::tempdir().unwrap();
        let mut bytes = b"\"1.1.1.1\" \"1701600000\" \"GET /\xff HTTP/1.1\" \"200\"\n".to_vec();
        bytes.extend_from_slice(line("2.2.2.2", 1_701_600_001, "/b", 500).as_bytes());
        fs::write(dir.path().join("2023-12-03.log"), bytes).unwrap();

        let pipeline = Pipeline::new(PipelineConfig::new(dir.path()));
        let result = pipeline.run(&FileSelection::All, &FilterSpec::default());
        assert_eq!(result.rows.len(), 2);
        assert_eq!(result.rows[1].ip, "2.2.2.2");
    }

    #[test]
    fn test_rerun_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let lines: Vec<String> = (0..30)
            .map(|i| line(&format!("10.0.{}.1", i % 7), 1_701_600_000 + i % 4, "/p", 200 + (i % 4) as u16 * 100))
            .collect();
        write_log(dir.path(), "2023-12-02.log", &lines[..15]);
        write_log(dir.path(), "2023-12-03.log", &lines[15..]);

        let pipeline = Pipeline::new(PipelineConfig::new(dir.path()).with_max_rows(25));
        let spec = SortSpec::new(SortField::Time, SortDirection::Descending);

        let mut first = pipeline.run(&FileSelection::All, &FilterSpec::default());
        first.sort(spec);
        let mut second = pipeline.run(&FileSelection::All, &FilterSpec::default());
        second.sort(spec);

        assert_eq!(first.rows, second.rows);
        assert_eq!(first.stats, second.stats);
        assert_eq!(first.truncated, second.truncated);
        assert_eq!(first.chart_data(10), second.chart_data(10));
    }

    #[test]
    fn test_result_paging() {
        let dir = tempfile::tempdir().unwrap();
        let lines: Vec<String> = (0..12)
            .map(|i| line(&format!("{}", i + 1), 1_701_600_000 + i, "/p", 200))
            .collect();
        write_log(dir.path(), "2023-12-03.log", &lines);

        let pipeline = Pipeline::new(PipelineConfig::new(dir.path()));
        let mut result = pipeline.run(&FileSelection::All, &FilterSpec::default());
        result.sort(SortSpec::new(SortField::Time, SortDirection::Ascending));

        let page = result.page(5, 3);
        assert_eq!(page.total_pages, 3);
        let ips: Vec<&str> = page.rows.iter().map(|r| r.ip.as_str()).collect();
        assert_eq!(ips, vec!["11", "12"]);
    }
}
