use std::fs;
use std::path::Path;

/// List log files in `dir` whose names end with `extension`, newest first.
///
/// Files are named one per day so that reverse lexicographic order is
/// newest-first. An unreadable directory yields an empty list.
pub fn discover_log_files(dir: &Path, extension: &str) -> Vec<String> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!("Cannot read log directory {}: {}", dir.display(), e);
            return Vec::new();
        }
    };

    let mut names: Vec<String> = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
        .filter_map(|entry| entry.file_name().into_string().ok())
        .filter(|name| name.ends_with(extension))
        .collect();

    names.sort_unstable_by(|a, b| b.cmp(a));
    names
}

/// Whether `name` is a plain file name with the expected extension, safe to
/// join onto the log directory
pub fn is_valid_file_name(name: &str, extension: &str) -> bool {
    name.len() > extension.len()
        && name.ends_with(extension)
        && !name.starts_with('.')
        && !name.contains(['/', '\\'])
}
