use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::types::{CaseId, ColumnName, DatasetName};

/// Error type for schema, integrity, configuration, and persistence failures.
#[derive(Debug, Error)]
pub enum ScorecardError {
    /// Required columns absent from a table; raised before any row converts.
    #[error("dataset '{dataset}' is missing required columns: {}", columns.join(", "))]
    MissingColumns {
        /// Table that failed the check.
        dataset: DatasetName,
        /// Every missing column, in required order.
        columns: Vec<ColumnName>,
    },
    /// A field value could not be parsed.
    #[error("dataset '{dataset}' row {row}: column '{column}' {details}")]
    InvalidField {
        /// Table holding the row.
        dataset: DatasetName,
        /// Zero-based row index.
        row: usize,
        /// Offending column.
        column: ColumnName,
        /// What was wrong with the value.
        details: String,
    },
    /// The merge integrity gate rejected the data.
    #[error("integrity gate failed ({} violation(s)): {}", violations.len(), render_violations(violations))]
    Integrity {
        /// Every violation found.
        violations: Vec<IntegrityViolation>,
    },
    /// Invalid pipeline configuration.
    #[error("configuration error: {0}")]
    Configuration(String),
    /// An output name for the chosen version already exists.
    #[error("refusing to overwrite existing output '{}'", path.display())]
    VersionConflict {
        /// Output that is already taken.
        path: PathBuf,
    },
    /// Filesystem failure.
    #[error(transparent)]
    Io(#[from] io::Error),
    /// JSON serialization failure.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// One failed invariant found by the merge integrity gate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IntegrityViolation {
    /// An actor has more successes than distinct cases.
    RateExceedsUnity {
        /// Offending actor label.
        actor: String,
        /// Distinct successful cases.
        successes: usize,
        /// Distinct cases.
        cases: usize,
    },
    /// One case id reconciles to more than one actor across outcome rows.
    AmbiguousCase {
        /// Shared case.
        case_id: CaseId,
        /// Actor labels claiming the case, sorted.
        actors: Vec<String>,
    },
}

impl fmt::Display for IntegrityViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntegrityViolation::RateExceedsUnity {
                actor,
                successes,
                cases,
            } => {
                let pct = if *cases == 0 {
                    f64::INFINITY
                } else {
                    *successes as f64 / *cases as f64 * 100.0
                };
                write!(
                    f,
                    "actor '{actor}' success rate {pct:.1}% ({successes}/{cases})"
                )
            }
            IntegrityViolation::AmbiguousCase { case_id, actors } => write!(
                f,
                "case '{case_id}' attributed to multiple actors [{}]",
                actors.join(", ")
            ),
        }
    }
}

fn render_violations(violations: &[IntegrityViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
