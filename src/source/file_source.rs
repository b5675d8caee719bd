use serde_json::Value;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use tracing::info;

use super::row_view::Table;
use super::TableSource;
use crate::errors::ScorecardError;
use crate::types::DatasetName;

/// Column name used in diagnostics for whole-row parse failures.
const ROW_COLUMN: &str = "<row>";

/// Table source reading one JSON object per line.
///
/// Blank lines are skipped. Row indices in errors count non-blank lines
/// from zero, matching [`super::row_view::RowView::index`].
#[derive(Clone, Debug)]
pub struct JsonLinesSource {
    dataset: DatasetName,
    path: PathBuf,
}

impl JsonLinesSource {
    /// Source named `dataset` reading the file at `path`.
    pub fn new(dataset: impl Into<DatasetName>, path: impl Into<PathBuf>) -> Self {
        Self {
            dataset: dataset.into(),
            path: path.into(),
        }
    }

    /// File this source reads.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn invalid_row(&self, row: usize, details: String) -> ScorecardError {
        ScorecardError::InvalidField {
            dataset: self.dataset.clone(),
            row,
            column: ROW_COLUMN.to_string(),
            details,
        }
    }
}

impl TableSource for JsonLinesSource {
    fn dataset(&self) -> &str {
        &self.dataset
    }

    fn load(&self) -> Result<Table, ScorecardError> {
        let reader = BufReader::new(File::open(self.path())?);
        let mut rows = Vec::new();
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let row = rows.len();
            match serde_json::from_str::<Value>(&line) {
                Ok(Value::Object(map)) => rows.push(map),
                Ok(other) => {
                    return Err(self.invalid_row(row, format!("is not a JSON object: {other}")));
                }
                Err(err) => return Err(self.invalid_row(row, format!("is not valid JSON: {err}"))),
            }
        }
        info!(
            "[scorecard:source] loaded {} '{}' row(s) from {}",
            rows.len(),
            self.dataset,
            self.path().display()
        );
        Ok(Table::new(self.dataset.clone(), rows))
    }
}
