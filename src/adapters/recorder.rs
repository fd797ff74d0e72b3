//! Session recording adapters.
//!
//! The session log is JSON lines: one [`TickRecord`] object per line, in
//! tick order.  The same format feeds an instant replay, so a recorded
//! session can be played back by [`JsonLinesSource`].

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use log::{debug, warn};

use crate::app::events::TickRecord;
use crate::app::ports::{ReplaySource, TickLog};
use crate::config::PreAirFilter;
use crate::error::{Error, Result};
use crate::replay::ReplayBuffer;

// ───────────────────────────────────────────────────────────────
// Writers
// ───────────────────────────────────────────────────────────────

/// [`TickLog`] writing JSON lines to any `Write`.
pub struct JsonLinesLog<W: Write> {
    out: W,
    rows: u64,
}

impl JsonLinesLog<BufWriter<File>> {
    /// Create (or truncate) `path`.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::create(path)
            .map_err(|e| Error::Source(format!("{}: {e}", path.display())))?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> JsonLinesLog<W> {
    pub fn new(out: W) -> Self {
        Self { out, rows: 0 }
    }

    /// Rows written so far.
    pub fn rows(&self) -> u64 {
        self.rows
    }

    /// Push buffered rows to the underlying writer.
    pub fn flush(&mut self) -> Result<()> {
        self.out
            .flush()
            .map_err(|e| Error::Source(format!("flush: {e}")))
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> TickLog for JsonLinesLog<W> {
    fn append(&mut self, record: &TickRecord) -> Result<()> {
        serde_json::to_writer(&mut self.out, record)
            .map_err(|e| Error::Source(format!("encode row {}: {e}", self.rows)))?;
        self.out
            .write_all(b"\n")
            .map_err(|e| Error::Source(format!("write row {}: {e}", self.rows)))?;
        self.rows += 1;
        Ok(())
    }
}

/// In-memory [`TickLog`], also usable directly as a replay source.
#[derive(Debug, Clone, Default)]
pub struct MemoryLog {
    records: Vec<TickRecord>,
}

impl MemoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[TickRecord] {
        &self.records
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }
}

impl TickLog for MemoryLog {
    fn append(&mut self, record: &TickRecord) -> Result<()> {
        self.records.push(*record);
        Ok(())
    }
}

impl ReplaySource for MemoryLog {
    fn load(&mut self, filter: PreAirFilter) -> Result<ReplayBuffer> {
        ReplayBuffer::from_records(&self.records, filter)
    }
}

// ───────────────────────────────────────────────────────────────
// Readers
// ───────────────────────────────────────────────────────────────

/// Parse a JSON-lines recording.  Blank lines are skipped; any other line
/// that is not a [`TickRecord`] fails the whole read.
pub fn read_records(reader: impl BufRead) -> Result<Vec<TickRecord>> {
    let mut records = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| Error::Source(format!("line {}: {e}", i + 1)))?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let record: TickRecord = serde_json::from_str(line)
            .map_err(|e| Error::Source(format!("line {}: {e}", i + 1)))?;
        records.push(record);
    }
    Ok(records)
}

/// [`ReplaySource`] reading a JSON-lines recording from disk.
#[derive(Debug, Clone)]
pub struct JsonLinesSource {
    path: PathBuf,
}

impl JsonLinesSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ReplaySource for JsonLinesSource {
    fn load(&mut self, filter: PreAirFilter) -> Result<ReplayBuffer> {
        let file = File::open(&self.path)
            .map_err(|e| Error::Source(format!("{}: {e}", self.path.display())))?;
        let records = read_records(BufReader::new(file))?;
        let buffer = ReplayBuffer::from_records(&records, filter)?;
        if buffer.is_empty() {
            warn!("{}: no live rows to replay", self.path.display());
        }
        debug!(
            "loaded {} replay entries from {} rows of {}",
            buffer.len(),
            records.len(),
            self.path.display()
        );
        Ok(buffer)
    }
}
