//! Timestamped JSON report artifacts
//!
//! Every report is a new file named `{kind}_{YYYYMMDD_HHMM}.json` under the
//! reports directory. Files are opened with `create_new`, so a second report
//! in the same minute gets a `_{NNN}` sequence suffix instead of replacing
//! the first. Lexicographic order of the names matches write order.


use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde::Serialize;

/// Report writer errors
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("I/O error writing report to {path}: {source}")]
    Io { path: PathBuf, source: std::io::Error },

    #[error("Failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("No free report name for {0} after {1} attempts")]
    Exhausted(String, u32),
}

/// Result type for report operations
pub type Result<T> = std::result::Result<T, ReportError>;

const MAX_SEQUENCE: u32 = 999;

/// Kind of report, which fixes its file-name prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReportKind {
    Drift,
    Monitoring,
    ModelRegistry,
}

impl ReportKind {
    pub fn prefix(&self) -> &'static str {
        match self {
            ReportKind::Drift => "drift_report",
            ReportKind::Monitoring => "monitoring_report",
            ReportKind::ModelRegistry => "model_registry_report",
        }
    }
}

/// Writes reports into one directory without ever overwriting
#[derive(Debug, Clone)]
pub struct ReportWriter {
    dir: PathBuf,
}

impl ReportWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Persist `report` stamped with the current local time
    pub fn write<T: Serialize>(&self, kind: ReportKind, report: &T) -> Result<PathBuf> {
        self.write_at(kind, report, Local::now())
    }

    /// Persist `report` stamped with `at`
    pub fn write_at<T: Serialize>(
        &self,
        kind: ReportKind,
        report: &T,
        at: DateTime<Local>,
    ) -> Result<PathBuf> {
        let bytes = serde_json::to_vec_pretty(report)?;
        fs::create_dir_all(&self.dir).map_err(|source| self.io_error(&self.dir, source))?;

        let stem = format!("{}_{}", kind.prefix(), at.format("%Y%m%d_%H%M"));
        for seq in 0..=MAX_SEQUENCE {
            let name = if seq == 0 { format!("{stem}.json") } else { format!("{stem}_{seq:03}.json") };
            let path = self.dir.join(name);
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(mut file) => {
                    file.write_all(&bytes).map_err(|source| self.io_error(&path, source))?;
                    file.sync_all().map_err(|source| self.io_error(&path, source))?;
                    tracing::info!(path = %path.display(), "Report written");
                    return Ok(path);
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(source) => return Err(self.io_error(&path, source)),
            }
        }
        Err(ReportError::Exhausted(stem, MAX_SEQUENCE + 1))
    }

    /// Existing reports of one kind, oldest first
    pub fn list(&self, kind: ReportKind) -> Result<Vec<PathBuf>> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => return Err(self.io_error(&self.dir, source)),
        };
        let prefix = format!("{}_", kind.prefix());
        let mut paths: Vec<PathBuf> = entries
            .filter_map(std::result::Result::ok)
            .map(|e| e.path())
            .filter(|p| {
                p.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.starts_with(&prefix) && n.ends_with(".json"))
            })
            .collect();
        paths.sort();
        Ok(paths)
    }

    fn io_error(&self, path: &Path, source: std::io::Error) -> ReportError {
        ReportError::Io { path: path.to_path_buf(), source }
    }
}
