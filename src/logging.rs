//! Console and file logging
//!
//! Besides the console, two append-only files are written under the log
//! directory:
//! - `errors.log`: every `ERROR` event
//! - `sent.log`: success records emitted with target [`SENT_TARGET`]

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result};
use tracing::Level;
use tracing_subscriber::filter::{LevelFilter, Targets};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, fmt};

/// Target for the success log records
pub const SENT_TARGET: &str = "sent";

pub const ERROR_LOG_FILE: &str = "errors.log";
pub const SENT_LOG_FILE: &str = "sent.log";

static INSTALLED: AtomicBool = AtomicBool::new(false);

/// Handle to the installed log sinks
#[derive(Debug, Clone)]
pub struct LogContext {
    pub error_log: PathBuf,
    pub sent_log: PathBuf,
}

impl LogContext {
    /// Create `log_dir` if needed and install the global subscriber.
    ///
    /// Only the first call installs anything; later calls return the paths
    /// without registering the file writers again.
    pub fn init(log_dir: &Path) -> Result<Self> {
        Self::init_with(&INSTALLED, log_dir)
    }

    /// `installed` is only set once both log files are open
    fn init_with(installed: &AtomicBool, log_dir: &Path) -> Result<Self> {
        fs::create_dir_all(log_dir)
            .with_context(|| format!("Failed to create log directory {}", log_dir.display()))?;

        let context = Self {
            error_log: log_dir.join(ERROR_LOG_FILE),
            sent_log: log_dir.join(SENT_LOG_FILE),
        };

        if installed.load(Ordering::SeqCst) {
            return Ok(context);
        }

        let error_file = open_append(&context.error_log)?;
        let sent_file = open_append(&context.sent_log)?;

        if installed.swap(true, Ordering::SeqCst) {
            return Ok(context);
        }

        let console_filter = EnvFilter::builder()
            .with_default_directive(LevelFilter::INFO.into())
            .from_env_lossy();

        // Fails only if a global subscriber already exists; keep that one
        let _ = tracing_subscriber::registry()
            .with(fmt::layer().with_filter(console_filter))
            .with(
                fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(error_file))
                    .with_filter(LevelFilter::ERROR),
            )
            .with(
                fmt::layer()
                    .with_ansi(false)
                    .with_target(false)
                    .with_writer(Mutex::new(sent_file))
                    .with_filter(Targets::new().with_target(SENT_TARGET, Level::INFO)),
            )
            .try_init();

        Ok(context)
    }
}

fn open_append(path: &Path) -> Result<File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_init_creates_directory_and_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let log_dir = dir.path().join("logs");

        let first = LogContext::init(&log_dir).unwrap();
        let second = LogContext::init(&log_dir).unwrap();

        assert!(log_dir.is_dir());
        assert_eq!(first.error_log, log_dir.join(ERROR_LOG_FILE));
        assert_eq!(second.sent_log, log_dir.join(SENT_LOG_FILE));
    }

    #[test]
    fn test_unopenable_log_file_leaves_install_pending() {
        let installed = AtomicBool::new(false);
        let dir = TempDir::new().unwrap();
        let broken = dir.path().join("broken");
        fs::create_dir_all(broken.join(ERROR_LOG_FILE)).unwrap();

        assert!(LogContext::init_with(&installed, &broken).is_err());
        assert!(!installed.load(Ordering::SeqCst));

        let good = dir.path().join("logs");
        LogContext::init_with(&installed, &good).unwrap();
        assert!(installed.load(Ordering::SeqCst));
        assert!(good.join(ERROR_LOG_FILE).is_file());
        assert!(good.join(SENT_LOG_FILE).is_file());
    }
}
