//! Logging setup.
//!
//! CLI commands log to stderr. The TUI owns the terminal, so it logs to a
//! file through a non-blocking writer instead.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Default level for CLI commands, whose stdout is the command's result.
pub const STDERR_DEFAULT_LEVEL: &str = "warn";
/// Default level for the TUI log file.
pub const FILE_DEFAULT_LEVEL: &str = "info";

/// `RUST_LOG` if set, otherwise `default`.
fn env_filter(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

/// Log to stderr (warnings and above unless `RUST_LOG` says otherwise).
pub fn init_stderr() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter(STDERR_DEFAULT_LEVEL))
        .with_writer(std::io::stderr)
        .try_init();
}

/// Log to `path`. The returned guard flushes pending lines when dropped and
/// must be kept alive for as long as the TUI runs. Returns `None` when the
/// log directory cannot be created; logging is then disabled.
pub fn init_file(path: &Path) -> Option<WorkerGuard> {
    let dir = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
    let file_name = path.file_name()?;
    if let Err(e) = std::fs::create_dir_all(dir) {
        eprintln!("Failed to create log directory {}: {}", dir.display(), e);
        return None;
    }

    let appender = tracing_appender::rolling::never(dir, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter(FILE_DEFAULT_LEVEL))
        .with_writer(writer)
        .with_ansi(false)
        .try_init();
    Some(guard)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::filter::LevelFilter;

    #[test]
    fn test_default_levels() {
        assert_eq!(EnvFilter::new(STDERR_DEFAULT_LEVEL).max_level_hint(), Some(LevelFilter::WARN));
        assert_eq!(EnvFilter::new(FILE_DEFAULT_LEVEL).max_level_hint(), Some(LevelFilter::INFO));
    }

    #[test]
    fn test_init_file_creates_log_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("taskboard.log");
        let guard = init_file(&path);
        assert!(guard.is_some());
        assert!(path.parent().unwrap().is_dir());
    }
}
