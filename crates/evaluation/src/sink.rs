//! Trial records and the sinks they are appended to.
//!
//! One evaluation run produces one `TrialRecord`. Sinks are append-only
//! and row-addressable: `append` returns the row the record landed in.

use crate::error::Result;
use crate::metrics::ErrorMetrics;
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Parameters and results of one evaluation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialRecord {
    pub algorithm: String,
    /// Collaborative similarity method, for runs that use one
    pub similarity: Option<String>,
    pub threshold: f64,
    pub weighted: bool,
    pub mse: Option<f64>,
    pub rmse: Option<f64>,
    pub mae: Option<f64>,
    pub coverage_fraction: f64,
    pub coverage: usize,
    /// Ratings held out
    pub trials: usize,
}

impl TrialRecord {
    pub fn metrics(&self) -> ErrorMetrics {
        ErrorMetrics {
            mse: self.mse,
            rmse: self.rmse,
            mae: self.mae,
            coverage: self.coverage,
            coverage_fraction: self.coverage_fraction,
        }
    }
}

/// Append-only destination for trial records
pub trait ResultSink {
    /// Append a record and return its zero-based row
    fn append(&mut self, record: &TrialRecord) -> Result<usize>;
}

/// Keeps records in memory
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    records: Vec<TrialRecord>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[TrialRecord] {
        &self.records
    }
}

impl ResultSink for MemorySink {
    fn append(&mut self, record: &TrialRecord) -> Result<usize> {
        self.records.push(record.clone());
        Ok(self.records.len() - 1)
    }
}

/// One JSON object per line in a file, appended across runs
#[derive(Debug)]
pub struct JsonLinesSink {
    path: PathBuf,
    next_row: usize,
}

impl JsonLinesSink {
    /// Open (or create on first append) the file at `path`; rows continue
    /// after any records already in it.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let next_row = match File::open(&path) {
            Ok(file) => BufReader::new(file)
                .lines()
                .filter(|line| line.as_ref().map_or(true, |l| !l.trim().is_empty()))
                .count(),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => 0,
            Err(e) => return Err(e.into()),
        };
        debug!("Result sink {:?} starts at row {}", path, next_row);
        Ok(Self { path, next_row })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every record in the file back
    pub fn read_all(&self) -> Result<Vec<TrialRecord>> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        contents
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| Ok(serde_json::from_str(line)?))
            .collect()
    }
}

impl ResultSink for JsonLinesSink {
    fn append(&mut self, record: &TrialRecord) -> Result<usize> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        let line = serde_json::to_string(record)?;
        writeln!(file, "{line}")?;

        let row = self.next_row;
        self.next_row += 1;
        Ok(row)
    }
}
