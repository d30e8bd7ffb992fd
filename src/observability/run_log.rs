//! Human-readable, append-only run log kept next to the output tables.

use chrono::Local;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::app::ports::RunLogPort;
use crate::common::error::Result;

/// Appends `[HH:MM:SS] line` to a file, flushing after every line and on drop.
pub struct FileRunLog {
    path: PathBuf,
    writer: Mutex<BufWriter<File>>,
}

impl FileRunLog {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            path,
            writer: Mutex::new(BufWriter::new(file)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RunLogPort for FileRunLog {
    fn append_line(&self, line: &str) {
        let stamped = format!("[{}] {}", Local::now().format("%H:%M:%S"), line);
        let Ok(mut writer) = self.writer.lock() else {
            return;
        };
        if let Err(e) = writeln!(writer, "{}", stamped).and_then(|_| writer.flush()) {
            tracing::warn!("Failed to append to run log {}: {}", self.path.display(), e);
        }
    }
}

impl Drop for FileRunLog {
    fn drop(&mut self) {
        if let Ok(writer) = self.writer.get_mut() {
            let _ = writer.flush();
        }
    }
}

/// Collects lines in memory, without timestamps.
#[derive(Default)]
pub struct MemoryRunLog {
    lines: Mutex<Vec<String>>,
}

impl MemoryRunLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().map(|l| l.clone()).unwrap_or_default()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.lines().iter().any(|l| l.contains(needle))
    }
}

impl RunLogPort for MemoryRunLog {
    fn append_line(&self, line: &str) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push(line.to_string());
        }
    }
}
