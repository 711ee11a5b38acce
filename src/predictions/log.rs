//! Append-only writer and tolerant reader for prediction log files

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use super::{PredictionLogEntry, PredictionLogError, Result};

const HEADER: [&str; 3] = ["true", "predicted", "timestamp"];

/// Writer half of the prediction log contract
#[derive(Debug, Clone)]
pub struct PredictionLog {
    dir: PathBuf,
}

impl PredictionLog {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, model_name: &str, date: NaiveDate) -> PathBuf {
        self.dir.join(format!("{model_name}_{}.csv", date.format("%Y%m%d")))
    }

    /// Append `entries` to the model's log for `date`.
    ///
    /// Rows are encoded up front and written with one `write_all` on a file
    /// opened in append mode; the header is included only when the file is
    /// empty. Existing content is never rewritten.
    pub fn append(
        &self,
        model_name: &str,
        date: NaiveDate,
        entries: &[PredictionLogEntry],
    ) -> Result<PathBuf> {
        if model_name.is_empty() || model_name.contains(['/', '\\']) || model_name == ".." {
            return Err(PredictionLogError::InvalidModelName(model_name.to_string()));
        }
        let path = self.path_for(model_name, date);
        let io_err = |source| PredictionLogError::Io { path: path.clone(), source };

        fs::create_dir_all(&self.dir).map_err(|source| PredictionLogError::Io { path: self.dir.clone(), source })?;
        let mut file = OpenOptions::new().create(true).append(true).open(&path).map_err(io_err)?;
        let needs_header = file.metadata().map_err(io_err)?.len() == 0;

        let mut writer = csv::WriterBuilder::new().has_headers(needs_header).from_writer(Vec::new());
        for entry in entries {
            writer.serialize(entry).map_err(|source| PredictionLogError::Csv { path: path.clone(), source })?;
        }
        // An empty batch still produces the header on a fresh file
        if needs_header && entries.is_empty() {
            writer.write_record(HEADER).map_err(|source| PredictionLogError::Csv { path: path.clone(), source })?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|e| PredictionLogError::Io { path: path.clone(), source: e.into_error() })?;

        file.write_all(&bytes).map_err(io_err)?;
        tracing::debug!(model = model_name, path = %path.display(), rows = entries.len(), "Appended predictions");
        Ok(path)
    }
}

/// Read every entry of one log file.
///
/// Repeated header rows, left by concurrent first writers, are ignored.
pub fn read_entries(path: &Path) -> Result<Vec<PredictionLogEntry>> {
    let csv_err = |source| PredictionLogError::Csv { path: path.to_path_buf(), source };
    let mut reader = csv::ReaderBuilder::new().flexible(false).from_path(path).map_err(csv_err)?;
    let headers = reader.headers().map_err(csv_err)?.clone();

    let mut entries = Vec::new();
    for record in reader.records() {
        let record = record.map_err(csv_err)?;
        if record == headers {
            continue;
        }
        entries.push(record.deserialize(Some(&headers)).map_err(csv_err)?);
    }
    Ok(entries)
}
