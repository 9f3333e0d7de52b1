//! Shared logging utilities for the AssayFlow binaries.

use anyhow::{Context, Result};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

const DEFAULT_LOG_FILTER: &str =
    "assay_quartermaster=info,assay_dispatcher=info,assay_db=info,assay_protocol=info";
const MAX_LOG_FILES: usize = 4;
const MAX_LOG_FILE_SIZE: u64 = 8 * 1024 * 1024;

/// Logging configuration shared by the server binaries.
pub struct LogConfig<'a> {
    pub app_name: &'a str,
    pub verbose: bool,
}

/// Initialize tracing with an append-mode log file and stderr output.
///
/// The file layer always follows `RUST_LOG` (or the default directives);
/// `verbose` widens the console layer to match it instead of warn-and-up.
pub fn init_logging(config: LogConfig<'_>) -> Result<()> {
    let log_dir = ensure_logs_dir().context("Failed to ensure log directory")?;
    let file_writer = LogFileWriter::open(log_dir, config.app_name)
        .context("Failed to open log file")?;

    let file_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let console_filter = if config.verbose {
        file_filter.clone()
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(file_writer)
                .with_ansi(false)
                .with_filter(file_filter),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_filter(console_filter),
        )
        .init();

    Ok(())
}

/// AssayFlow home directory: ~/.assayflow (override with ASSAYFLOW_HOME).
pub fn assayflow_home() -> PathBuf {
    if let Ok(override_path) = std::env::var("ASSAYFLOW_HOME") {
        return PathBuf::from(override_path);
    }
    dirs::home_dir()
        .expect("Could not determine home directory")
        .join(".assayflow")
}

/// Logs directory: ~/.assayflow/logs
pub fn logs_dir() -> PathBuf {
    assayflow_home().join("logs")
}

/// Ensure the logs directory exists.
pub fn ensure_logs_dir() -> Result<PathBuf> {
    let logs = logs_dir();
    fs::create_dir_all(&logs)
        .with_context(|| format!("Failed to create logs directory: {}", logs.display()))?;
    Ok(logs)
}

/// Append-mode log writer with size-based rotation.
///
/// `<app>.log` is the live file; rotated files are `<app>.log.1` (newest
/// rotation) through `<app>.log.N`.
struct LogFile {
    dir: PathBuf,
    base_name: String,
    file: File,
    written: u64,
}

impl LogFile {
    fn open(dir: PathBuf, app_name: &str) -> io::Result<Self> {
        let base_name = sanitize_name(app_name);
        let (file, written) = open_append(&dir.join(format!("{}.log", base_name)))?;
        let mut log = Self {
            dir,
            base_name,
            file,
            written,
        };
        if log.written > MAX_LOG_FILE_SIZE {
            log.rotate()?;
        }
        Ok(log)
    }

    fn live_path(&self) -> PathBuf {
        self.dir.join(format!("{}.log", self.base_name))
    }

    fn rotated_path(&self, index: usize) -> PathBuf {
        self.dir.join(format!("{}.log.{}", self.base_name, index))
    }

    fn rotate(&mut self) -> io::Result<()> {
        let _ = self.file.flush();

        let oldest = self.rotated_path(MAX_LOG_FILES - 1);
        if oldest.exists() {
            fs::remove_file(&oldest)?;
        }
        for idx in (1..MAX_LOG_FILES - 1).rev() {
            let src = self.rotated_path(idx);
            if src.exists() {
                fs::rename(&src, self.rotated_path(idx + 1))?;
            }
        }
        if self.live_path().exists() {
            fs::rename(self.live_path(), self.rotated_path(1))?;
        }

        let (file, written) = open_append(&self.live_path())?;
        self.file = file;
        self.written = written;
        Ok(())
    }
}

impl Write for LogFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.written + buf.len() as u64 > MAX_LOG_FILE_SIZE {
            self.rotate()?;
        }
        let bytes = self.file.write(buf)?;
        self.written += bytes as u64;
        Ok(bytes)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

fn open_append(path: &std::path::Path) -> io::Result<(File, u64)> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let size = file.metadata()?.len();
    Ok((file, size))
}

#[derive(Clone)]
struct LogFileWriter {
    inner: Arc<Mutex<LogFile>>,
}

impl LogFileWriter {
    fn open(dir: PathBuf, app_name: &str) -> Result<Self> {
        let log = LogFile::open(dir, app_name)
            .with_context(|| format!("Failed to open log file for {}", app_name))?;
        Ok(Self {
            inner: Arc::new(Mutex::new(log)),
        })
    }
}

struct LogFileGuard {
    inner: Arc<Mutex<LogFile>>,
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for LogFileWriter {
    type Writer = LogFileGuard;

    fn make_writer(&'a self) -> Self::Writer {
        LogFileGuard {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl Write for LogFileGuard {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut guard = self
            .inner
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "log writer lock poisoned"))?;
        guard.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut guard = self
            .inner
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "log writer lock poisoned"))?;
        guard.flush()
    }
}

fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|ch| {
            if ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' {
                ch
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_log_file_appends() {
        let tmp = TempDir::new().unwrap();
        let mut log = LogFile::open(tmp.path().to_path_buf(), "assay-test").unwrap();
        log.write_all(b"hello\n").unwrap();
        log.flush().unwrap();

        let contents = fs::read_to_string(tmp.path().join("assay-test.log")).unwrap();
        assert_eq!(contents, "hello\n");
    }

    #[test]
    fn test_sanitize_name() {
        assert_eq!(sanitize_name("assay-quartermaster"), "assay-quartermaster");
        assert_eq!(sanitize_name("a b/c"), "a_b_c");
    }
}
