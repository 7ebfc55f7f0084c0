//! Failure log
//!
//! Store failures are recoverable from the caller's point of view: the
//! gateway reports `false` or an empty collection and writes the failure
//! here. Each entry is one line of the form
//! `[<RFC3339 timestamp>] <operation>: <detail>`, and is mirrored as a
//! `tracing` error event.

use chrono::{DateTime, SecondsFormat, Utc};
use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{error, warn};

use core_kernel::{Clock, SystemClock};

/// A recorded store failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureEntry {
    pub at: DateTime<Utc>,
    pub operation: String,
    pub detail: String,
}

impl fmt::Display for FailureEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.at.to_rfc3339_opts(SecondsFormat::Secs, true),
            self.operation,
            self.detail
        )
    }
}

/// Destination for recoverable store failures
pub trait DiagnosticsSink: Send + Sync {
    fn record(&self, operation: &str, detail: &str);
}

/// Append-only failure log file
#[derive(Debug)]
pub struct FailureLog {
    path: PathBuf,
    clock: Arc<dyn Clock>,
}

impl FailureLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_clock(path, Arc::new(SystemClock))
    }

    pub fn with_clock(path: impl Into<PathBuf>, clock: Arc<dyn Clock>) -> Self {
        Self {
            path: path.into(),
            clock,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn append(&self, line: &str) -> std::io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{}", line)
    }
}

impl DiagnosticsSink for FailureLog {
    fn record(&self, operation: &str, detail: &str) {
        let entry = FailureEntry {
            at: self.clock.now(),
            operation: operation.to_string(),
            detail: detail.to_string(),
        };
        error!(operation, detail, "Store operation failed");
        if let Err(e) = self.append(&entry.to_string()) {
            warn!(path = %self.path.display(), error = %e, "Could not write failure log");
        }
    }
}

/// Failure log kept in memory
#[derive(Debug, Default)]
pub struct MemoryFailureLog {
    entries: Mutex<Vec<FailureEntry>>,
}

impl MemoryFailureLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of every entry recorded so far
    pub fn entries(&self) -> Vec<FailureEntry> {
        match self.entries.lock() {
            Ok(entries) => entries.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DiagnosticsSink for MemoryFailureLog {
    fn record(&self, operation: &str, detail: &str) {
        error!(operation, detail, "Store operation failed");
        let entry = FailureEntry {
            at: Utc::now(),
            operation: operation.to_string(),
            detail: detail.to_string(),
        };
        match self.entries.lock() {
            Ok(mut entries) => entries.push(entry),
            Err(poisoned) => poisoned.into_inner().push(entry),
        }
    }
}

impl<T: DiagnosticsSink + ?Sized> DiagnosticsSink for Arc<T> {
    fn record(&self, operation: &str, detail: &str) {
        (**self).record(operation, detail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use core_kernel::FixedClock;

    #[test]
    fn test_entry_line_format() {
        let entry = FailureEntry {
            at: NaiveDate::from_ymd_opt(2025, 1, 3)
                .unwrap()
                .and_hms_opt(12, 0, 0)
                .unwrap()
                .and_utc(),
            operation: "save person Test Person".to_string(),
            detail: "connection refused".to_string(),
        };
        assert_eq!(
            entry.to_string(),
            "[2025-01-03T12:00:00Z] save person Test Person: connection refused"
        );
    }

    #[test]
    fn test_file_log_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("failures.log");
        let clock = Arc::new(FixedClock::new(NaiveDate::from_ymd_opt(2025, 1, 3).unwrap()));
        let log = FailureLog::with_clock(&path, clock);

        log.record("load persons", "timeout");
        log.record("save supply", "duplicate");

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = contents.lines().collect();
        assert_eq!(
            lines,
            vec![
                "[2025-01-03T12:00:00Z] load persons: timeout",
                "[2025-01-03T12:00:00Z] save supply: duplicate",
            ]
        );
    }

    #[test]
    fn test_memory_log_collects() {
        let log = MemoryFailureLog::new();
        assert!(log.is_empty());
        log.record("close", "already closed");
        assert_eq!(log.entries()[0].operation, "close");
    }
}
