//! JSONL performance logs.
//!
//! One file per test (`<dir>/<test>.jsonl`), one record per line:
//! `{"timestamp": "...Z", "test": "...", "scale": 8, "time_ms": 1.25}`.
//! This is the shape the perf dashboards ingest, so field names are fixed.
//! Older logs name the optional engine field `godot_version`; it loads as
//! `runtime`.

use std::collections::BTreeMap;
use std::error::Error;
use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PerfRecord {
    pub timestamp: String,
    pub test: String,
    pub scale: u32,
    pub time_ms: f64,
    /// Engine build that produced the record.
    #[serde(default, alias = "godot_version", skip_serializing_if = "Option::is_none")]
    pub runtime: Option<String>,
}

impl PerfRecord {
    /// Record stamped with the current UTC time.
    pub fn now(test: &str, scale: u32, time_ms: f64) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            test: test.to_string(),
            scale,
            time_ms,
            runtime: None,
        }
    }

    /// `YYYY-MM-DD` date filters match on the timestamp prefix.
    pub fn is_on(&self, date: &str) -> bool {
        self.timestamp.starts_with(date)
    }
}

#[derive(Debug)]
pub enum PerfLogError {
    Io(io::Error),
    InvalidRecord { path: PathBuf, line: usize, message: String },
}

impl fmt::Display for PerfLogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "perf log I/O error: {e}"),
            Self::InvalidRecord { path, line, message } => {
                write!(f, "invalid perf record in {} at line {line}: {message}", path.display())
            }
        }
    }
}

impl Error for PerfLogError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::InvalidRecord { .. } => None,
        }
    }
}

/// Appends `record` to `<dir>/<test>.jsonl`, creating the directory if needed.
pub fn append_record(dir: &Path, record: &PerfRecord) -> io::Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(format!("{}.jsonl", record.test));
    let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
    let line = serde_json::to_string(record).map_err(io::Error::other)?;
    writeln!(file, "{line}")?;
    file.flush()?;
    Ok(path)
}

/// Reads every record of one log. Blank lines are ignored; the first
/// malformed line aborts the load.
pub fn load_records(path: &Path) -> Result<Vec<PerfRecord>, PerfLogError> {
    let content = fs::read_to_string(path).map_err(PerfLogError::Io)?;
    let mut records = Vec::new();
    for (index, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let record = serde_json::from_str(line).map_err(|e| PerfLogError::InvalidRecord {
            path: path.to_path_buf(),
            line: index + 1,
            message: e.to_string(),
        })?;
        records.push(record);
    }
    Ok(records)
}

/// Loads every `*.jsonl` file in `dir`, keyed by file stem.
pub fn load_dir(dir: &Path) -> Result<BTreeMap<String, Vec<PerfRecord>>, PerfLogError> {
    let mut by_test = BTreeMap::new();
    for entry in fs::read_dir(dir).map_err(PerfLogError::Io)? {
        let path = entry.map_err(PerfLogError::Io)?.path();
        if path.extension().is_none_or(|ext| ext != "jsonl") {
            continue;
        }
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        by_test.insert(stem.to_string(), load_records(&path)?);
    }
    tracing::debug!(dir = %dir.display(), tests = by_test.len(), "perf logs loaded");
    Ok(by_test)
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Stats {
    pub avg: f64,
    pub min: f64,
    pub max: f64,
    pub count: usize,
}

impl Stats {
    pub fn of<'a>(records: impl IntoIterator<Item = &'a PerfRecord>) -> Option<Self> {
        let times: Vec<f64> = records.into_iter().map(|r| r.time_ms).collect();
        if times.is_empty() {
            return None;
        }
        let sum: f64 = times.iter().sum();
        Some(Self {
            avg: sum / times.len() as f64,
            min: times.iter().copied().fold(f64::INFINITY, f64::min),
            max: times.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            count: times.len(),
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    Improvement,
    Regression,
    Unchanged,
    New,
    Missing,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TestComparison {
    pub test: String,
    pub old: Option<Stats>,
    pub new: Option<Stats>,
    /// Change of the average in percent; 0 when the old average is 0.
    pub diff_pct: Option<f64>,
    pub verdict: Verdict,
}

/// Compares the records of `old_date` against `new_date` per test.
///
/// A test is an improvement when its average dropped by more than
/// `threshold_pct` percent, a regression when it grew by more.
pub fn compare(
    by_test: &BTreeMap<String, Vec<PerfRecord>>,
    old_date: &str,
    new_date: &str,
    threshold_pct: f64,
) -> Vec<TestComparison> {
    let mut out = Vec::new();
    for (test, records) in by_test {
        let old = Stats::of(records.iter().filter(|r| r.is_on(old_date)));
        let new = Stats::of(records.iter().filter(|r| r.is_on(new_date)));

        let (diff_pct, verdict) = match (old, new) {
            (Some(old), Some(new)) => {
                let diff_pct =
                    if old.avg > 0.0 { (new.avg - old.avg) / old.avg * 100.0 } else { 0.0 };
                let verdict = if diff_pct < -threshold_pct {
                    Verdict::Improvement
                } else if diff_pct > threshold_pct {
                    Verdict::Regression
                } else {
                    Verdict::Unchanged
                };
                (Some(diff_pct), verdict)
            }
            (None, Some(_)) => (None, Verdict::New),
            (Some(_), None) => (None, Verdict::Missing),
            (None, None) => continue,
        };
        out.push(TestComparison { test: test.clone(), old, new, diff_pct, verdict });
    }
    tracing::debug!(old_date, new_date, tests = out.len(), "perf comparison done");
    out
}
