mod config;
mod output;
mod query;

use std::fs::File;
use std::future::Future;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tokio::time::MissedTickBehavior;

use accesslens_logs::{Pipeline, csv_file_name, write_csv};

use crate::config::Settings;
use crate::output::Report;
use crate::query::QueryParams;

/// accesslens - Filter, aggregate and page through daily access logs
#[derive(Parser, Debug)]
#[command(name = "accesslens")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory containing one log file per day
    #[arg(long, value_name = "DIR")]
    log_dir: Option<PathBuf>,

    /// View a single file in full (disables the time range)
    #[arg(long, value_name = "NAME")]
    file: Option<String>,

    /// Case-insensitive text to look for anywhere in the line
    #[arg(short, long)]
    search: Option<String>,

    /// Time range, e.g. 6h or 7d
    #[arg(short, long)]
    range: Option<String>,

    /// Only show 4xx/5xx responses
    #[arg(short, long)]
    errors_only: bool,

    /// Sort field: time, ip, status, bytes, file
    #[arg(long)]
    sort: Option<String>,

    /// Sort direction: asc or desc
    #[arg(long)]
    dir: Option<String>,

    /// Page number (1-based)
    #[arg(short, long)]
    page: Option<String>,

    /// Stop reading after this many matching rows
    #[arg(long)]
    max_rows: Option<usize>,

    /// Rows per page
    #[arg(long)]
    page_size: Option<usize>,

    /// Settings file (default: ~/.config/accesslens/config.toml)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = Format::Table)]
    format: Format,

    /// Write every matching row (all pages) as CSV to a file or directory;
    /// `-` for stdout
    #[arg(long, value_name = "PATH")]
    csv: Option<PathBuf>,

    /// Re-run the whole query every `refresh_secs` until interrupted
    #[arg(long)]
    live: bool,

    /// List available log files, newest first, and exit
    #[arg(long)]
    list_files: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Table,
    Json,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize tracing for debugging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    // Run the application
    let result = run_app(args).await;

    // Handle any errors
    if let Err(e) = &result {
        eprintln!("Error: {:#}", e);
    }

    result
}

async fn run_app(args: Args) -> Result<()> {
    let session = Session::from_args(&args)?;

    if args.list_files {
        let mut out = io::stdout().lock();
        for name in session.pipeline.available_files() {
            writeln!(out, "{}", name)?;
        }
        return Ok(());
    }

    if !session.live {
        return session.run_to_terminal();
    }

    let period = Duration::from_secs(session.settings.refresh_secs.max(1));
    run_live(period, tokio::signal::ctrl_c(), || session.run_to_terminal()).await
}

/// Call `pass` on every tick of `period` until `shutdown` resolves.
///
/// `shutdown` is polled before each pass and stays registered while a pass
/// runs, so an interrupt during a pass stops the loop before the next one.
async fn run_live<S, F>(period: Duration, shutdown: S, mut pass: F) -> Result<()>
where
    S: Future,
    F: FnMut() -> Result<()>,
{
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            biased;
            _ = &mut shutdown => {
                tracing::info!("Interrupted, stopping live view");
                return Ok(());
            }
            _ = interval.tick() => pass()?,
        }
    }
}

fn load_settings(args: &Args) -> Result<Settings> {
    let mut settings = Settings::load(args.config.as_deref())?;
    if let Some(dir) = &args.log_dir {
        settings.log_dir = dir.clone();
    }
    if let Some(max_rows) = args.max_rows {
        settings.max_rows = max_rows;
    }
    if let Some(page_size) = args.page_size {
        settings.page_size = page_size;
    }
    Ok(settings)
}

/// Destination of `--csv`, fixed for the whole invocation
#[derive(Clone, Debug, PartialEq, Eq)]
enum CsvTarget {
    Stdout,
    File(PathBuf),
}

impl CsvTarget {
    /// `-` is stdout; a directory gets one timestamped file name
    fn resolve(path: &Path) -> Self {
        if path == Path::new("-") {
            Self::Stdout
        } else if path.is_dir() {
            Self::File(path.join(csv_file_name(chrono::Local::now())))
        } else {
            Self::File(path.to_path_buf())
        }
    }
}

/// Everything a pass needs, resolved once from the command line
struct Session {
    settings: Settings,
    pipeline: Pipeline,
    params: QueryParams,
    format: Format,
    live: bool,
    csv: Option<CsvTarget>,
}

impl Session {
    fn from_args(args: &Args) -> Result<Self> {
        let settings = load_settings(args)?;
        let pipeline = Pipeline::new(settings.pipeline_config());
        let params = QueryParams {
            file: args.file.clone(),
            search: args.search.clone(),
            range: args.range.clone(),
            errors_only: args.errors_only,
            sort: args.sort.clone(),
            dir: args.dir.clone(),
            page: args.page.clone(),
        };

        Ok(Self {
            settings,
            pipeline,
            params,
            format: args.format,
            live: args.live,
            csv: args.csv.as_deref().map(CsvTarget::resolve),
        })
    }

    fn run_to_terminal(&self) -> Result<()> {
        let mut stdout = BufWriter::new(io::stdout().lock());
        let mut stderr = io::stderr().lock();
        self.run_once(&mut stdout, &mut stderr)
    }

    /// One full read → filter → aggregate → sort → page pass.
    ///
    /// When the CSV goes to stdout the report is written to `stderr` instead.
    fn run_once<'w>(&self, stdout: &'w mut dyn Write, stderr: &'w mut dyn Write) -> Result<()> {
        let now = chrono::Utc::now().timestamp();
        let query = self.params.normalize(&self.settings, now);

        let mut result = self.pipeline.run(&query.selection, &query.filter);
        result.sort(query.sort);

        let out = match &self.csv {
            Some(CsvTarget::Stdout) => {
                write_csv(&mut *stdout, &result.rows)?;
                stdout.flush()?;
                stderr
            }
            Some(CsvTarget::File(path)) => {
                let file = File::create(path)
                    .with_context(|| format!("cannot create {}", path.display()))?;
                let count = write_csv(BufWriter::new(file), &result.rows)?;
                tracing::info!("Exported {} rows to {}", count, path.display());
                stdout
            }
            None => stdout,
        };

        let page = result.page(self.settings.page_size, query.page);
        let report = Report::new(&query, &result, &page, self.settings.top_n);

        match self.format {
            Format::Table => {
                if self.live {
                    writeln!(
                        out,
                        "--- {} ---",
                        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
                    )?;
                }
                output::write_table(&mut *out, &report)?;
            }
            Format::Json => output::write_json(&mut *out, &report)?,
        }
        out.flush()?;

        Ok(())
    }
}
