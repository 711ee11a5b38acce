//! Column-oriented tabular data for data drift checks

use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use super::DriftError;

/// One parsed cell
#[derive(Clone, Debug, PartialEq)]
pub enum Cell {
    Number(f64),
    Text(String),
    Missing,
}

impl Cell {
    /// Empty, `NA`, `NaN` and `null` are missing; finite numbers are numeric
    pub fn parse(raw: &str) -> Self {
        let s = raw.trim();
        if s.is_empty() || ["na", "nan", "null", "none"].contains(&s.to_ascii_lowercase().as_str()) {
            return Cell::Missing;
        }
        match s.parse::<f64>() {
            Ok(v) if v.is_finite() => Cell::Number(v),
            _ => Cell::Text(s.to_string()),
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Cell::Missing)
    }

    /// Category label of a non-missing cell
    pub fn label(&self) -> Option<String> {
        match self {
            Cell::Number(v) => Some(v.to_string()),
            Cell::Text(s) => Some(s.clone()),
            Cell::Missing => None,
        }
    }
}

impl From<f64> for Cell {
    fn from(v: f64) -> Self {
        if v.is_finite() {
            Cell::Number(v)
        } else {
            Cell::Missing
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

/// Named columns of cells
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Dataset {
    columns: BTreeMap<String, Vec<Cell>>,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a column
    pub fn with_column<C: Into<Cell>>(mut self, name: &str, values: impl IntoIterator<Item = C>) -> Self {
        self.columns.insert(name.to_string(), values.into_iter().map(Into::into).collect());
        self
    }

    pub fn column(&self, name: &str) -> Option<&[Cell]> {
        self.columns.get(name).map(Vec::as_slice)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    /// Load a CSV file with a header row
    pub fn from_csv_path(path: &Path) -> Result<Self, DriftError> {
        let file = std::fs::File::open(path)
            .map_err(|source| DriftError::Io { path: path.to_path_buf(), source })?;
        Self::from_csv_reader(file).map_err(|e| match e {
            DriftError::Dataset { source, .. } => DriftError::Dataset { path: path.to_path_buf(), source },
            other => other,
        })
    }

    /// Parse CSV with a header row from any reader
    pub fn from_csv_reader(reader: impl Read) -> Result<Self, DriftError> {
        let csv_err = |source| DriftError::Dataset { path: Default::default(), source };
        let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
        let headers: Vec<String> = reader.headers().map_err(csv_err)?.iter().map(String::from).collect();

        let mut columns: Vec<Vec<Cell>> = vec![Vec::new(); headers.len()];
        for record in reader.records() {
            let record = record.map_err(csv_err)?;
            for (idx, column) in columns.iter_mut().enumerate() {
                column.push(record.get(idx).map_or(Cell::Missing, Cell::parse));
            }
        }
        Ok(Self { columns: headers.into_iter().zip(columns).collect() })
    }
}
