use crate::error::Result;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

/// A durable consumer of formatted event lines. Implementations must be
/// safe to call from any producer; append-mode writes give OS-level atomic
/// appends so no extra locking is layered on top.
pub trait LogSink: Send + Sync {
    fn append(&self, line: &str) -> Result<()>;
}

/// Appends lines to a log file, creating the parent directory on first use.
/// The file is opened per write in append mode, mirroring an append-only
/// audit log: a restart or a concurrent writer never clobbers earlier lines.
pub struct FileLogSink {
    path: PathBuf,
}

impl FileLogSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl LogSink for FileLogSink {
    fn append(&self, line: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{}", line)?;
        Ok(())
    }
}

/// Discards everything. Used when durable logging is disabled and in tests.
pub struct NullLogSink;

impl LogSink for NullLogSink {
    fn append(&self, _line: &str) -> Result<()> {
        Ok(())
    }
}
