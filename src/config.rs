//! Settings file support
//!
//! Settings are read from `~/.config/accesslens/config.toml` (or the path
//! given with `--config`). Every key is optional; a missing file means
//! defaults.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use accesslens_logs::{DEFAULT_MAX_ROWS, DEFAULT_TOP_N, PipelineConfig, TimeRange};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Tunables for a run, passed by value into the pipeline
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Directory holding one access log per day
    pub log_dir: PathBuf,

    /// Log file name suffix
    pub extension: String,

    /// Row cap per run
    pub max_rows: usize,

    /// Rows per page
    pub page_size: usize,

    /// Range token used when none (or a bad one) is given
    pub default_range: String,

    /// Seconds between re-runs in live mode
    pub refresh_secs: u64,

    /// Entries in the top-IP and top-path tables
    pub top_n: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_dir: PathBuf::from("/var/log/access"),
            extension: ".log".to_string(),
            max_rows: DEFAULT_MAX_ROWS,
            page_size: 100,
            default_range: "3d".to_string(),
            refresh_secs: 5,
            top_n: DEFAULT_TOP_N,
        }
    }
}

impl Settings {
    /// Load from `path`, or from the default location when `None`.
    ///
    /// A missing file yields defaults; an unreadable or malformed one is an
    /// error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => match default_path() {
                Some(p) => p,
                None => return Ok(Self::default()),
            },
        };

        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No config at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(source) => return Err(ConfigError::Read { path, source }),
        };

        Self::from_toml(&content).map_err(|source| ConfigError::Parse { path, source })
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// The default range, falling back to three days if the configured
    /// token does not parse
    pub fn default_range(&self) -> TimeRange {
        TimeRange::parse(&self.default_range).unwrap_or_default()
    }

    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig::new(&self.log_dir)
            .with_extension(&self.extension)
            .with_max_rows(self.max_rows)
    }
}

fn default_path() -> Option<PathBuf> {
    let base = std::env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config")))?;
    Some(base.join("accesslens").join("config.toml"))
}
