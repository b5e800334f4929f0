//! Diagnostic logging
//!
//! Logs go to `<config_dir>/curly.log`, never to the terminal the shell is
//! drawing on. The filter comes from `CURLY_LOG`, then `--log-level`, then
//! `warn`. The file rotates once it reaches [`LOG_MAX_BYTES`], keeping
//! [`LOG_BACKUPS`] older files as `curly.log.1`, `curly.log.2`, ...

use file_rotate::compression::Compression;
use file_rotate::suffix::AppendCount;
use file_rotate::{ContentLimit, FileRotate};
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Environment variable holding a tracing filter directive
pub const LOG_ENV: &str = "CURLY_LOG";

/// Size at which the log file is rotated
pub const LOG_MAX_BYTES: usize = 500_000;

/// Rotated files kept next to the live one
pub const LOG_BACKUPS: usize = 3;

const DEFAULT_LEVEL: &str = "warn";

fn filter(level: Option<&str>) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| {
        EnvFilter::try_new(level.unwrap_or(DEFAULT_LEVEL))
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LEVEL))
    })
}

/// Size-capped appending writer for `log_file`
pub fn rotating_writer(log_file: &Path, max_bytes: usize) -> FileRotate<AppendCount> {
    FileRotate::new(
        log_file,
        AppendCount::new(LOG_BACKUPS),
        ContentLimit::Bytes(max_bytes),
        Compression::None,
        #[cfg(unix)]
        None,
    )
}

/// Install the global subscriber
///
/// Failing to open the log file leaves logging disabled; the shell still runs.
pub fn init(log_file: &Path, level: Option<&str>) {
    if let Some(parent) = log_file.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    if let Err(e) = OpenOptions::new().create(true).append(true).open(log_file) {
        eprintln!("Warning: cannot open log file {}: {}", log_file.display(), e);
        return;
    }

    let _ = tracing_subscriber::fmt()
        .with_writer(Mutex::new(rotating_writer(log_file, LOG_MAX_BYTES)))
        .with_ansi(false)
        .with_target(false)
        .with_env_filter(filter(level))
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_invalid_level_falls_back() {
        // Must not panic on garbage directives
        let _ = filter(Some("[[not a level"));
        let _ = filter(None);
    }

    #[test]
    fn test_init_creates_log_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("nested").join("curly.log");
        init(&path, Some("debug"));
        assert!(path.exists());
    }

    #[test]
    fn test_writer_rotates_past_the_cap() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("curly.log");
        let line = "x".repeat(63) + "\n";
        {
            let mut writer = rotating_writer(&path, 256);
            for _ in 0..20 {
                writer.write_all(line.as_bytes()).unwrap();
            }
            writer.flush().unwrap();
        }

        assert!(dir.path().join("curly.log.1").exists());
        assert!(std::fs::metadata(&path).unwrap().len() <= 256);
        // Older files beyond the backup count are dropped
        assert!(!dir.path().join(format!("curly.log.{}", LOG_BACKUPS + 1)).exists());
    }

    #[test]
    fn test_writer_appends_across_reopen() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("curly.log");
        rotating_writer(&path, LOG_MAX_BYTES).write_all(b"first\n").unwrap();
        rotating_writer(&path, LOG_MAX_BYTES).write_all(b"second\n").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "first\nsecond\n");
    }
}
