//! Append-only provenance log and its consolidation.
//!
//! One line of JSON per discovered source, appended synchronously at
//! discovery time so a mid-run crash still leaves a usable partial log.
//! Consolidation is a pure fold over a fresh re-read of the file — never
//! an in-memory structure flushed once — and is idempotent.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use crate::error::Result;

/// One observed search hit, tagged with its run provenance.
///
/// Write-once: records are appended at discovery time and never mutated
/// or deleted within a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceRecord {
    /// Capture time.
    pub ts: DateTime<Utc>,
    /// The search string that produced this hit.
    pub query: String,
    /// Result title as returned by the provider.
    pub title: String,
    /// Result URL — the run-wide dedup key.
    pub url: String,
    /// Result snippet as returned by the provider.
    pub snippet: String,
    /// Which backend supplied the hit.
    pub provider: String,
    /// 1-based rank among the records admitted for this query.
    pub rank_in_query: usize,
}

/// Handle to a run's append-only JSONL provenance log.
#[derive(Debug, Clone)]
pub struct ProvenanceLog {
    path: PathBuf,
}

impl ProvenanceLog {
    /// Create a handle for the given log path. The file is created on
    /// first append.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The log file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record as a single JSON line, synchronously.
    ///
    /// The line is fully written and flushed before this returns, so the
    /// caller may rely on it surviving a subsequent crash.
    pub fn append(&self, record: &SourceRecord) -> Result<()> {
        let line = serde_json::to_string(record)?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(line.as_bytes())?;
        file.write_all(b"\n")?;
        file.flush()?;
        Ok(())
    }

    /// Read every record in file order.
    ///
    /// A missing file reads as empty. Unparsable lines (e.g. a trailing
    /// line truncated by a crash) are skipped with a warning rather than
    /// failing the read.
    pub fn read_records(&self) -> Result<Vec<SourceRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let reader = BufReader::new(File::open(&self.path)?);
        let mut records = Vec::new();
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<SourceRecord>(&line) {
                Ok(record) => records.push(record),
                Err(err) => {
                    tracing::warn!(error = %err, "skipping unparsable provenance line");
                }
            }
        }
        Ok(records)
    }

    /// Consolidate the log into a single JSON array at `out_path`.
    ///
    /// Re-reads the log fresh, so repeated calls with no new appends
    /// produce byte-identical output. An empty or missing log
    /// consolidates to `[]`.
    pub fn consolidate(&self, out_path: &Path) -> Result<Vec<SourceRecord>> {
        let records = self.read_records()?;
        let json = serde_json::to_string_pretty(&records)?;
        std::fs::write(out_path, json)?;
        tracing::info!(
            count = records.len(),
            path = %out_path.display(),
            "provenance consolidated"
        );
        Ok(records)
    }
}
