use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use tracing::{debug, warn};

use crate::config::{MessageColumns, OutcomeColumns};
use crate::data::{Channel, Direction, MessageRecord, OutcomeRecord};
use crate::errors::ScorecardError;
use crate::types::{CaseId, ColumnName, DatasetName};

const NAIVE_TIMESTAMP_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

static NULL: Value = Value::Null;

/// One raw row keyed by column name.
#[derive(Clone, Debug, PartialEq)]
pub struct RowView {
    /// Zero-based position in the source table.
    pub index: usize,
    /// Raw field values keyed by column.
    pub fields: Map<String, Value>,
}

impl RowView {
    /// Value for `column`; a missing key reads as JSON null.
    pub fn get(&self, column: &str) -> &Value {
        self.fields.get(column).unwrap_or(&NULL)
    }
}

/// Records converted from a table plus the rows that needed special handling.
#[derive(Clone, Debug, PartialEq)]
pub struct Converted<T> {
    /// Typed records, in table order.
    pub records: Vec<T>,
    /// Rows dropped for lacking a case id.
    pub dropped_rows: usize,
    /// Rows whose channel value was not recognized and fell back to the default.
    pub unknown_channels: usize,
}

/// A loaded table: named rows whose column set is the union of row keys.
#[derive(Clone, Debug, PartialEq)]
pub struct Table {
    dataset: DatasetName,
    rows: Vec<RowView>,
    columns: BTreeSet<ColumnName>,
}

impl Table {
    /// Build a table, collecting the union of row keys as its columns.
    pub fn new(dataset: impl Into<DatasetName>, rows: Vec<Map<String, Value>>) -> Self {
        let mut columns = BTreeSet::new();
        let rows = rows
            .into_iter()
            .enumerate()
            .map(|(index, fields)| {
                columns.extend(fields.keys().cloned());
                RowView { index, fields }
            })
            .collect();
        Self {
            dataset: dataset.into(),
            rows,
            columns,
        }
    }

    /// Dataset name used in diagnostics.
    pub fn dataset(&self) -> &str {
        &self.dataset
    }

    /// Rows in source order.
    pub fn rows(&self) -> &[RowView] {
        &self.rows
    }

    /// Every column seen in any row.
    pub fn columns(&self) -> &BTreeSet<ColumnName> {
        &self.columns
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True when the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Fail with every missing column at once.
    pub fn require_columns(&self, required: &[&str]) -> Result<(), ScorecardError> {
        let missing: Vec<ColumnName> = required
            .iter()
            .filter(|column| !self.columns.contains(**column))
            .map(|column| column.to_string())
            .collect();
        if missing.is_empty() {
            return Ok(());
        }
        warn!(
            "[scorecard:source] dataset '{}' missing columns: {}",
            self.dataset,
            missing.join(", ")
        );
        Err(ScorecardError::MissingColumns {
            dataset: self.dataset.clone(),
            columns: missing,
        })
    }

    fn invalid(&self, row: &RowView, column: &str, details: impl Into<String>) -> ScorecardError {
        ScorecardError::InvalidField {
            dataset: self.dataset.clone(),
            row: row.index,
            column: column.to_string(),
            details: details.into(),
        }
    }

    fn case_id(&self, row: &RowView, column: &str) -> Result<Option<CaseId>, ScorecardError> {
        match row.get(column) {
            Value::Null => Ok(None),
            Value::String(raw) if raw.trim().is_empty() => Ok(None),
            Value::String(raw) => Ok(Some(raw.trim().to_string())),
            Value::Number(number) if number.is_i64() || number.is_u64() => {
                Ok(Some(number.to_string()))
            }
            other => Err(self.invalid(row, column, format!("is not a case id: {other}"))),
        }
    }

    fn text(&self, row: &RowView, column: &str) -> Result<Option<String>, ScorecardError> {
        match row.get(column) {
            Value::Null => Ok(None),
            Value::String(raw) => Ok(Some(raw.clone())),
            Value::Number(number) => Ok(Some(number.to_string())),
            other => Err(self.invalid(row, column, format!("is not text: {other}"))),
        }
    }

    fn flag(&self, row: &RowView, column: &str) -> Result<bool, ScorecardError> {
        match row.get(column) {
            Value::Null => Ok(false),
            Value::Bool(flag) => Ok(*flag),
            Value::Number(number) => match number.as_f64() {
                Some(value) if value == 0.0 => Ok(false),
                Some(value) if value == 1.0 => Ok(true),
                _ => Err(self.invalid(row, column, format!("is not a 0/1 flag: {number}"))),
            },
            Value::String(raw) => match raw.trim().to_ascii_lowercase().as_str() {
                "true" | "1" => Ok(true),
                "false" | "0" | "" => Ok(false),
                _ => Err(self.invalid(row, column, format!("is not a boolean: '{raw}'"))),
            },
            other => Err(self.invalid(row, column, format!("is not a boolean: {other}"))),
        }
    }

    fn timestamp(
        &self,
        row: &RowView,
        column: &str,
    ) -> Result<Option<DateTime<Utc>>, ScorecardError> {
        match row.get(column) {
            Value::Null => Ok(None),
            Value::String(raw) if raw.trim().is_empty() => Ok(None),
            Value::String(raw) => parse_timestamp(raw)
                .map(Some)
                .ok_or_else(|| self.invalid(row, column, format!("is not a timestamp: '{raw}'"))),
            other => Err(self.invalid(row, column, format!("is not a timestamp: {other}"))),
        }
    }
}

/// Parse RFC 3339 or a naive `YYYY-MM-DD HH:MM:SS` timestamp (read as UTC).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    NAIVE_TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|naive| naive.and_utc())
}

/// Convert a message table into typed records.
///
/// Required columns are checked before any row is read. The channel and
/// timestamp columns are optional; rows without a channel use `default_channel`.
pub fn messages_from_table(
    table: &Table,
    columns: &MessageColumns,
    default_channel: Channel,
) -> Result<Converted<MessageRecord>, ScorecardError> {
    table.require_columns(&columns.required())?;
    let mut records = Vec::with_capacity(table.len());
    let mut dropped_rows = 0;
    let mut unknown_channels = 0;
    for row in table.rows() {
        let Some(case_id) = table.case_id(row, &columns.case_id)? else {
            dropped_rows += 1;
            continue;
        };
        let direction = match table.text(row, &columns.direction)? {
            Some(raw) => Direction::parse(&raw),
            None => Direction::Other,
        };
        let channel = match table.text(row, &columns.channel)? {
            Some(raw) => Channel::parse(&raw).unwrap_or_else(|| {
                unknown_channels += 1;
                default_channel
            }),
            None => default_channel,
        };
        records.push(MessageRecord {
            case_id,
            raw_actor: table.text(row, &columns.actor)?,
            text: table.text(row, &columns.text)?,
            direction,
            automation: table.flag(row, &columns.automation)?,
            channel,
            sent_at: table.timestamp(row, &columns.sent_at)?,
        });
    }
    if dropped_rows > 0 {
        warn!(
            "[scorecard:source] dropped {} '{}' row(s) without a case id",
            dropped_rows,
            table.dataset()
        );
    }
    if unknown_channels > 0 {
        warn!(
            "[scorecard:source] {} '{}' row(s) with an unrecognized channel scored as {}",
            unknown_channels,
            table.dataset(),
            default_channel
        );
    }
    debug!(
        "[scorecard:source] converted {} message record(s)",
        records.len()
    );
    Ok(Converted {
        records,
        dropped_rows,
        unknown_channels,
    })
}

/// Convert an outcome table into typed records.
pub fn outcomes_from_table(
    table: &Table,
    columns: &OutcomeColumns,
) -> Result<Converted<OutcomeRecord>, ScorecardError> {
    table.require_columns(&columns.required())?;
    let mut records = Vec::with_capacity(table.len());
    let mut dropped_rows = 0;
    for row in table.rows() {
        let Some(case_id) = table.case_id(row, &columns.case_id)? else {
            dropped_rows += 1;
            continue;
        };
        records.push(OutcomeRecord {
            case_id,
            raw_actor: table.text(row, &columns.actor)?,
            success: table.flag(row, &columns.success)?,
            automation: table.flag(row, &columns.automation)?,
        });
    }
    if dropped_rows > 0 {
        warn!(
            "[scorecard:source] dropped {} '{}' row(s) without a case id",
            dropped_rows,
            table.dataset()
        );
    }
    debug!(
        "[scorecard:source] converted {} outcome record(s)",
        records.len()
    );
    Ok(Converted {
        records,
        dropped_rows,
        unknown_channels: 0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn table(dataset: &str, rows: Vec<Value>) -> Table {
        let rows = rows
            .into_iter()
            .map(|row| match row {
                Value::Object(map) => map,
                _ => panic!("test rows must be objects"),
            })
            .collect();
        Table::new(dataset, rows)
    }

    #[test]
    fn columns_are_the_union_of_row_keys() {
        let table = table("t", vec![json!({"a": 1}), json!({"b": 2})]);
        let columns: Vec<&str> = table.columns().iter().map(String::as_str).collect();
        assert_eq!(columns, vec!["a", "b"]);
        assert!(table.require_columns(&["a", "b"]).is_ok());
    }

    #[test]
    fn missing_columns_are_reported_together() {
        let table = table("outcomes", vec![json!({"opportunity_uuid": "c1"})]);
        let err = outcomes_from_table(&table, &OutcomeColumns::default()).unwrap_err();
        match err {
            ScorecardError::MissingColumns { dataset, columns } => {
                assert_eq!(dataset, "outcomes");
                assert_eq!(
                    columns,
                    vec!["owner_name", "successful_conversion", "ai_agent_tag"]
                );
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn message_rows_convert_with_defaults() {
        let table = table(
            "messages",
            vec![
                json!({
                    "opportunity_uuid": "c1",
                    "task_owner": "Ann",
                    "message": "Hi there",
                    "direction": "Outbound",
                    "ai_agent_tag": 0,
                    "task_datetime_cst": "2024-05-01 08:15:00"
                }),
                json!({
                    "opportunity_uuid": 42,
                    "task_owner": null,
                    "message": null,
                    "direction": "inbound",
                    "ai_agent_tag": "true",
                    "task_type": "Call"
                }),
                json!({
                    "opportunity_uuid": null,
                    "task_owner": "Ann",
                    "message": "lost",
                    "direction": "outbound",
                    "ai_agent_tag": false
                }),
            ],
        );
        let converted =
            messages_from_table(&table, &MessageColumns::default(), Channel::Sms).unwrap();
        assert_eq!(converted.dropped_rows, 1);
        assert_eq!(converted.unknown_channels, 0);
        assert_eq!(converted.records.len(), 2);
        let first = &converted.records[0];
        assert_eq!(first.direction, Direction::Outbound);
        assert_eq!(first.channel, Channel::Sms);
        assert!(!first.automation);
        assert_eq!(
            first.sent_at,
            Some(Utc.with_ymd_and_hms(2024, 5, 1, 8, 15, 0).unwrap())
        );
        let second = &converted.records[1];
        assert_eq!(second.case_id, "42");
        assert_eq!(second.raw_actor, None);
        assert_eq!(second.text, None);
        assert!(second.automation);
        assert_eq!(second.channel, Channel::Call);
        assert_eq!(second.sent_at, None);
    }

    #[test]
    fn unknown_channels_fall_back_and_are_counted() {
        let table = table(
            "messages",
            vec![
                json!({
                    "opportunity_uuid": "c1",
                    "task_owner": "Ann",
                    "message": "Hi there",
                    "direction": "outbound",
                    "ai_agent_tag": 0,
                    "task_type": "Email"
                }),
                json!({
                    "opportunity_uuid": "c2",
                    "task_owner": "Ann",
                    "message": "Hi there",
                    "direction": "outbound",
                    "ai_agent_tag": 0,
                    "task_type": "call"
                }),
            ],
        );
        let converted =
            messages_from_table(&table, &MessageColumns::default(), Channel::Sms).unwrap();
        assert_eq!(converted.unknown_channels, 1);
        assert_eq!(converted.records[0].channel, Channel::Sms);
        assert_eq!(converted.records[1].channel, Channel::Call);
    }

    #[test]
    fn unparseable_flags_are_field_errors() {
        let table = table(
            "outcomes",
            vec![json!({
                "opportunity_uuid": "c1",
                "owner_name": "Ann",
                "successful_conversion": "maybe",
                "ai_agent_tag": 0
            })],
        );
        let err = outcomes_from_table(&table, &OutcomeColumns::default()).unwrap_err();
        assert!(matches!(
            err,
            ScorecardError::InvalidField { row: 0, ref column, .. } if column == "successful_conversion"
        ));
    }

    #[test]
    fn timestamps_accept_rfc3339_and_naive_forms() {
        let expected = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(parse_timestamp("2024-01-02T03:04:05Z"), Some(expected));
        assert_eq!(parse_timestamp("2024-01-02 03:04:05"), Some(expected));
        assert_eq!(parse_timestamp("2024-01-02 03:04:05.000"), Some(expected));
        assert_eq!(parse_timestamp("yesterday"), None);
    }
}
