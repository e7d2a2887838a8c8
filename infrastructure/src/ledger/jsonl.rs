//! JSONL file writer for usage entries.
//!
//! Each [`UsageEntry`] is serialized as a single JSON line and appended to
//! the file via a buffered writer.

use super::InMemoryUsageLedger;
use ctxprobe_application::{UsageEntry, UsageLedger};
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::warn;

/// JSONL usage ledger that appends one JSON object per call.
///
/// Thread-safe via `Mutex<BufWriter<File>>`. Flushes after every entry and
/// on `Drop`.
pub struct JsonlUsageLedger {
    writer: Mutex<BufWriter<File>>,
    path: PathBuf,
    recorded: InMemoryUsageLedger,
}

impl JsonlUsageLedger {
    /// Open the ledger at `path` for appending.
    ///
    /// Creates the file (and parent directories) if they don't exist.
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;

        Ok(Self {
            writer: Mutex::new(BufWriter::new(file)),
            path: path.to_path_buf(),
            recorded: InMemoryUsageLedger::new(),
        })
    }

    /// Get the path to the ledger file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn append(&self, entry: &UsageEntry) -> io::Result<()> {
        let line = serde_json::to_string(entry)?;
        let mut writer = self
            .writer
            .lock()
            .map_err(|_| io::Error::other("ledger writer lock poisoned"))?;
        writeln!(writer, "{}", line)?;
        writer.flush()
    }
}

impl UsageLedger for JsonlUsageLedger {
    fn record(&self, entry: UsageEntry) {
        if let Err(e) = self.append(&entry) {
            warn!("Could not write usage entry to {}: {}", self.path.display(), e);
        }
        self.recorded.record(entry);
    }

    /// Entries recorded by this process; earlier runs in the file are not reread.
    fn entries(&self) -> Vec<UsageEntry> {
        self.recorded.entries()
    }
}

impl Drop for JsonlUsageLedger {
    fn drop(&mut self) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writer.flush();
        }
    }
}
