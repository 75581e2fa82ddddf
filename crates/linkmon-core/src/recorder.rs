//! Append-only CSV recorder.
//!
//! # Storage Format
//!
//! One run produces one CSV file: a fixed header row ([`COLUMNS`]) followed by
//! one row per sample. Absent metrics are empty fields, never `0` or `null`.
//! Every append is flushed before returning so a crash loses at most the
//! in-flight row.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::Result;
use crate::sample::{COLUMNS, Sample};

/// Writes samples to a CSV file. Safe to share between threads; appends are
/// serialized by an internal lock.
pub struct Recorder {
    path: PathBuf,
    lock: Mutex<u64>,
}

impl Recorder {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(0),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create or truncate the file and write the header row.
    pub fn write_header(&self) -> Result<()> {
        let mut rows = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut wtr = writer(File::create(&self.path)?);
        wtr.write_record(COLUMNS)?;
        wtr.flush()?;
        *rows = 0;
        Ok(())
    }

    /// Append one sample as one row and flush it to disk.
    pub fn append(&self, sample: &Sample) -> Result<()> {
        let mut rows = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let file = OpenOptions::new().append(true).open(&self.path)?;
        let mut wtr = writer(file);
        wtr.serialize(sample)?;
        wtr.flush()?;
        *rows += 1;
        Ok(())
    }

    /// Rows appended since the last [`write_header`](Self::write_header).
    pub fn rows_written(&self) -> u64 {
        *self.lock.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn writer(file: File) -> csv::Writer<File> {
    csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(file)
}
