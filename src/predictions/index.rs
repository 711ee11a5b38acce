//! `(model, date) -> file` index over a prediction log directory

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use chrono::NaiveDate;

use super::{PredictionLogError, Result};

/// One discovered log file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogFile {
    pub model_name: String,
    pub date: NaiveDate,
    pub path: PathBuf,
    pub modified: Option<SystemTime>,
}

/// Snapshot of the log files present in one directory
#[derive(Debug, Clone, Default)]
pub struct PredictionLogIndex {
    dir: PathBuf,
    files: BTreeMap<String, BTreeMap<NaiveDate, LogFile>>,
    skipped: Vec<(PathBuf, String)>,
}

/// Split `{model}_{YYYYMMDD}.csv` into its model name and date
pub fn parse_log_file_name(file_name: &str) -> std::result::Result<(String, NaiveDate), String> {
    let stem = file_name.strip_suffix(".csv").ok_or_else(|| "not a .csv file".to_string())?;
    let (model, date) =
        stem.rsplit_once('_').ok_or_else(|| "missing _YYYYMMDD suffix".to_string())?;
    if model.is_empty() {
        return Err("empty model name".to_string());
    }
    if date.len() != 8 || !date.bytes().all(|b| b.is_ascii_digit()) {
        return Err(format!("date suffix {date:?} is not YYYYMMDD"));
    }
    let date = NaiveDate::parse_from_str(date, "%Y%m%d").map_err(|e| format!("bad date {date:?}: {e}"))?;
    Ok((model.to_string(), date))
}

impl PredictionLogIndex {
    /// Scan `dir`; a missing directory yields an empty index
    pub fn scan(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        let mut index = Self { dir: dir.clone(), ..Self::default() };

        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(dir = %dir.display(), "Prediction log directory does not exist");
                return Ok(index);
            }
            Err(source) => return Err(PredictionLogError::Io { path: dir, source }),
        };

        for entry in entries {
            let entry = entry.map_err(|source| PredictionLogError::Io { path: dir.clone(), source })?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                index.skip(path, "file name is not UTF-8".to_string());
                continue;
            };
            match parse_log_file_name(name) {
                Ok((model_name, date)) => {
                    let modified = entry.metadata().and_then(|m| m.modified()).ok();
                    index
                        .files
                        .entry(model_name.clone())
                        .or_default()
                        .insert(date, LogFile { model_name, date, path, modified });
                }
                Err(reason) => index.skip(path, reason),
            }
        }
        Ok(index)
    }

    fn skip(&mut self, path: PathBuf, reason: String) {
        tracing::warn!(path = %path.display(), reason = %reason, "Skipping prediction log file");
        self.skipped.push((path, reason));
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Files that could not be mapped to `(model, date)`, with the reason
    pub fn skipped(&self) -> &[(PathBuf, String)] {
        &self.skipped
    }

    /// Models with at least one log file
    pub fn models(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    /// All files of a model, oldest date first
    pub fn files_for(&self, model_name: &str) -> Vec<&LogFile> {
        self.files.get(model_name).map(|m| m.values().collect()).unwrap_or_default()
    }

    /// Files of a model whose date lies in `[from, to]`, oldest first
    pub fn in_range(&self, model_name: &str, from: NaiveDate, to: NaiveDate) -> Vec<&LogFile> {
        if from > to {
            return Vec::new();
        }
        self.files
            .get(model_name)
            .map(|m| m.range(from..=to).map(|(_, f)| f).collect())
            .unwrap_or_default()
    }

    /// Files of a model modified within `window` before `now`
    pub fn modified_within(&self, model_name: &str, window: Duration, now: SystemTime) -> Vec<&LogFile> {
        let cutoff = now.checked_sub(window).unwrap_or(SystemTime::UNIX_EPOCH);
        self.files_for(model_name).into_iter().filter(|f| f.modified.is_some_and(|m| m >= cutoff)).collect()
    }
}
