//! Tabular ingestion and schema validation.
//!
//! A [`TableSource`] yields an untyped [`row_view::Table`]; the row view
//! layer validates required columns and converts rows into typed records.
//! Nothing downstream of this module sees untyped rows.

use serde::Serialize;
use std::path::Path;
use tracing::info;

use crate::config::PipelineConfig;
use crate::constants::columns::{MESSAGES_DATASET, OUTCOMES_DATASET};
use crate::data::{MessageRecord, OutcomeRecord};
use crate::errors::ScorecardError;

/// JSON Lines file loading.
pub mod file_source;
/// Untyped rows, schema checks, and record conversion.
pub mod row_view;

pub use file_source::JsonLinesSource;
pub use row_view::{messages_from_table, outcomes_from_table, Converted, RowView, Table};

/// Anything that can produce one named table.
pub trait TableSource {
    /// Dataset name used in diagnostics.
    fn dataset(&self) -> &str;
    /// Load every row.
    fn load(&self) -> Result<Table, ScorecardError>;
}

/// Row-level data-quality counts collected while converting both tables.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct IngestionReport {
    /// Non-blank rows read from the message table.
    pub message_rows_read: usize,
    /// Non-blank rows read from the outcome table.
    pub outcome_rows_read: usize,
    /// Message rows dropped for a null or blank case id.
    pub dropped_message_rows: usize,
    /// Outcome rows dropped for a null or blank case id.
    pub dropped_outcome_rows: usize,
    /// Message rows whose channel fell back to the default rubric.
    pub unknown_channels: usize,
}

impl IngestionReport {
    /// Human-readable notes for every non-zero count.
    pub fn warnings(&self) -> Vec<String> {
        let mut notes = Vec::new();
        if self.dropped_message_rows > 0 {
            notes.push(format!(
                "{} of {} message row(s) without a case id dropped",
                self.dropped_message_rows, self.message_rows_read
            ));
        }
        if self.dropped_outcome_rows > 0 {
            notes.push(format!(
                "{} of {} outcome row(s) without a case id dropped",
                self.dropped_outcome_rows, self.outcome_rows_read
            ));
        }
        if self.unknown_channels > 0 {
            notes.push(format!(
                "{} message row(s) with an unrecognized channel scored with the default rubric",
                self.unknown_channels
            ));
        }
        notes
    }
}

/// Typed records ready for the pipeline.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Datasets {
    /// Converted message rows.
    pub messages: Vec<MessageRecord>,
    /// Converted outcome rows.
    pub outcomes: Vec<OutcomeRecord>,
    /// What conversion dropped or defaulted.
    pub ingestion: IngestionReport,
}

/// Load, schema-check, and convert both tables.
///
/// Both schemas are validated before either table is converted so a missing
/// column is reported before any row-level error.
pub fn load_datasets(
    messages: &dyn TableSource,
    outcomes: &dyn TableSource,
    config: &PipelineConfig,
) -> Result<Datasets, ScorecardError> {
    let message_table = messages.load()?;
    let outcome_table = outcomes.load()?;
    message_table.require_columns(&config.columns.messages.required())?;
    outcome_table.require_columns(&config.columns.outcomes.required())?;

    let converted_messages = messages_from_table(
        &message_table,
        &config.columns.messages,
        config.default_channel,
    )?;
    let converted_outcomes = outcomes_from_table(&outcome_table, &config.columns.outcomes)?;
    info!(
        "[scorecard:source] {} '{}' record(s), {} '{}' record(s)",
        converted_messages.records.len(),
        messages.dataset(),
        converted_outcomes.records.len(),
        outcomes.dataset()
    );
    Ok(Datasets {
        ingestion: IngestionReport {
            message_rows_read: message_table.len(),
            outcome_rows_read: outcome_table.len(),
            dropped_message_rows: converted_messages.dropped_rows,
            dropped_outcome_rows: converted_outcomes.dropped_rows,
            unknown_channels: converted_messages.unknown_channels,
        },
        messages: converted_messages.records,
        outcomes: converted_outcomes.records,
    })
}

/// Load both datasets from JSON Lines files.
pub fn load_json_lines(
    messages: &Path,
    outcomes: &Path,
    config: &PipelineConfig,
) -> Result<Datasets, ScorecardError> {
    load_datasets(
        &JsonLinesSource::new(MESSAGES_DATASET, messages),
        &JsonLinesSource::new(OUTCOMES_DATASET, outcomes),
        config,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    struct StaticSource {
        dataset: &'static str,
        rows: Vec<Value>,
    }

    impl TableSource for StaticSource {
        fn dataset(&self) -> &str {
            self.dataset
        }

        fn load(&self) -> Result<Table, ScorecardError> {
            let rows = self
                .rows
                .iter()
                .filter_map(|row| row.as_object().cloned())
                .collect();
            Ok(Table::new(self.dataset(), rows))
        }
    }

    fn message(case_id: Value, channel: &str) -> Value {
        json!({
            "opportunity_uuid": case_id,
            "task_owner": "Ann",
            "message": "Ready to start?",
            "direction": "outbound",
            "ai_agent_tag": 0,
            "task_type": channel
        })
    }

    #[test]
    fn ingestion_report_counts_dropped_and_defaulted_rows() {
        let messages = StaticSource {
            dataset: MESSAGES_DATASET,
            rows: vec![
                message(json!("c1"), "sms"),
                message(Value::Null, "sms"),
                message(json!("  "), "sms"),
                message(json!("c2"), "carrier pigeon"),
            ],
        };
        let outcomes = StaticSource {
            dataset: OUTCOMES_DATASET,
            rows: vec![
                json!({
                    "opportunity_uuid": "c1",
                    "owner_name": "Ann",
                    "successful_conversion": true,
                    "ai_agent_tag": 0
                }),
                json!({
                    "opportunity_uuid": null,
                    "owner_name": "Ann",
                    "successful_conversion": false,
                    "ai_agent_tag": 0
                }),
            ],
        };
        let datasets =
            load_datasets(&messages, &outcomes, &PipelineConfig::default()).unwrap();
        assert_eq!(datasets.messages.len(), 2);
        assert_eq!(datasets.outcomes.len(), 1);
        assert_eq!(
            datasets.ingestion,
            IngestionReport {
                message_rows_read: 4,
                outcome_rows_read: 2,
                dropped_message_rows: 2,
                dropped_outcome_rows: 1,
                unknown_channels: 1,
            }
        );
        assert_eq!(
            datasets.ingestion.warnings(),
            vec![
                "2 of 4 message row(s) without a case id dropped".to_string(),
                "1 of 2 outcome row(s) without a case id dropped".to_string(),
                "1 message row(s) with an unrecognized channel scored with the default rubric"
                    .to_string(),
            ]
        );
    }

    #[test]
    fn clean_ingestion_has_no_warnings() {
        assert!(IngestionReport::default().warnings().is_empty());
    }
}
