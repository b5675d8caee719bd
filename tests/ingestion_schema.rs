use std::fs;
use std::path::Path;

use serde_json::json;
use tempfile::tempdir;

use rep_scorecard::apps::run_scorecard;
use rep_scorecard::{load_json_lines, PipelineConfig, ScorecardError};

fn write_lines(path: &Path, rows: &[serde_json::Value]) {
    let body: Vec<String> = rows.iter().map(|row| row.to_string()).collect();
    fs::write(path, body.join("\n")).unwrap();
}

fn message_row(case: usize, owner: &str, text: &str) -> serde_json::Value {
    json!({
        "opportunity_uuid": format!("case-{case}"),
        "task_owner": owner,
        "message": text,
        "direction": "outbound",
        "ai_agent_tag": 0,
        "task_type": "SMS",
        "task_datetime_cst": format!("2024-03-{:02} 09:00:00", case % 28 + 1),
    })
}

fn outcome_row(case: usize, owner: &str, success: bool) -> serde_json::Value {
    json!({
        "opportunity_uuid": format!("case-{case}"),
        "owner_name": owner,
        "successful_conversion": success,
        "ai_agent_tag": "false",
    })
}

#[test]
fn missing_columns_fail_before_any_row_is_converted() {
    let dir = tempdir().unwrap();
    let messages = dir.path().join("messages.jsonl");
    let outcomes = dir.path().join("outcomes.jsonl");
    write_lines(
        &messages,
        &[json!({"opportunity_uuid": "case-1", "message": "hi"})],
    );
    // The outcome row is malformed too; the schema error must win.
    write_lines(
        &outcomes,
        &[json!({
            "opportunity_uuid": "case-1",
            "owner_name": "Ann",
            "successful_conversion": "perhaps",
            "ai_agent_tag": 0
        })],
    );
    let err =
        load_json_lines(&messages, &outcomes, &PipelineConfig::default()).unwrap_err();
    match err {
        ScorecardError::MissingColumns { dataset, columns } => {
            assert_eq!(dataset, "messages");
            assert_eq!(columns, vec!["task_owner", "direction", "ai_agent_tag"]);
        }
        other => panic!("expected missing columns, got {other}"),
    }
}

#[test]
fn null_case_ids_are_dropped_and_counted() {
    let dir = tempdir().unwrap();
    let messages = dir.path().join("messages.jsonl");
    let outcomes = dir.path().join("outcomes.jsonl");
    let mut orphan = message_row(2, "Ann", "Hello");
    orphan["opportunity_uuid"] = serde_json::Value::Null;
    write_lines(&messages, &[message_row(1, "Ann", "Hello"), orphan]);
    write_lines(&outcomes, &[outcome_row(1, "Ann", true)]);
    let datasets =
        load_json_lines(&messages, &outcomes, &PipelineConfig::default()).unwrap();
    assert_eq!(datasets.messages.len(), 1);
    assert_eq!(datasets.outcomes.len(), 1);
    assert_eq!(datasets.ingestion.dropped_message_rows, 1);
    assert_eq!(datasets.ingestion.dropped_outcome_rows, 0);
    assert!(datasets.outcomes[0].success);
    assert!(!datasets.outcomes[0].automation);
}

#[test]
fn cli_writes_versioned_outputs() {
    let dir = tempdir().unwrap();
    let messages = dir.path().join("messages.jsonl");
    let outcomes = dir.path().join("outcomes.jsonl");
    let output = dir.path().join("out");
    let mut message_rows = Vec::new();
    let mut outcome_rows = Vec::new();
    for case in 0..6 {
        let owner = if case % 2 == 0 { "Ann" } else { "Ben" };
        message_rows.push(message_row(case, owner, "Thanks! Can you make a delivery this week?"));
        outcome_rows.push(outcome_row(case, owner, case < 2));
    }
    write_lines(&messages, &message_rows);
    write_lines(&outcomes, &outcome_rows);

    let args = vec![
        "--messages".to_string(),
        messages.display().to_string(),
        "--outcomes".to_string(),
        outcomes.display().to_string(),
        "--output-dir".to_string(),
        output.display().to_string(),
        "--prefix".to_string(),
        "cli_run".to_string(),
        "--min-cases".to_string(),
        "3".to_string(),
    ];
    run_scorecard(args.clone().into_iter()).unwrap();
    run_scorecard(args.into_iter()).unwrap();
    assert!(output.join("cli_run_v1.0.md").exists());
    assert!(output.join("cli_run_data_v1.0.json").exists());
    assert!(output.join("cli_run_v1.1.md").exists());
    assert!(output.join("cli_run_data_v1.1.json").exists());
}

#[test]
fn dropped_rows_are_disclosed_in_report_and_dump() {
    let dir = tempdir().unwrap();
    let messages = dir.path().join("messages.jsonl");
    let outcomes = dir.path().join("outcomes.jsonl");
    let output = dir.path().join("out");
    let mut message_rows = Vec::new();
    let mut outcome_rows = Vec::new();
    for case in 0..3 {
        message_rows.push(message_row(case, "Ann", "Ready to start this week?"));
        outcome_rows.push(outcome_row(case, "Ann", case == 0));
    }
    for case in 3..8 {
        let mut orphan = message_row(case, "Ann", "Ready to start this week?");
        orphan["opportunity_uuid"] = serde_json::Value::Null;
        message_rows.push(orphan);
    }
    let mut odd_channel = message_row(1, "Ann", "Following up, ready to start?");
    odd_channel["task_type"] = json!("Fax");
    message_rows.push(odd_channel);
    write_lines(&messages, &message_rows);
    write_lines(&outcomes, &outcome_rows);

    let args = vec![
        "--messages".to_string(),
        messages.display().to_string(),
        "--outcomes".to_string(),
        outcomes.display().to_string(),
        "--output-dir".to_string(),
        output.display().to_string(),
        "--min-cases".to_string(),
        "1".to_string(),
    ];
    run_scorecard(args.into_iter()).unwrap();

    let report = fs::read_to_string(output.join("rep_scorecard_v1.0.md")).unwrap();
    assert!(report.contains("- Rows read: 9 message, 3 outcome"));
    assert!(report.contains("- 5 of 9 message row(s) without a case id dropped"));
    assert!(report.contains(
        "- 1 message row(s) with an unrecognized channel scored with the default rubric"
    ));
    assert!(!report.contains("No data-quality warnings"));

    let raw = fs::read_to_string(output.join("rep_scorecard_data_v1.0.json")).unwrap();
    let data: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(data["ingestion"]["message_rows_read"], 9);
    assert_eq!(data["ingestion"]["dropped_message_rows"], 5);
    assert_eq!(data["ingestion"]["unknown_channels"], 1);
}

#[test]
fn cli_dry_run_writes_nothing() {
    let dir = tempdir().unwrap();
    let messages = dir.path().join("messages.jsonl");
    let outcomes = dir.path().join("outcomes.jsonl");
    let output = dir.path().join("out");
    write_lines(&messages, &[message_row(1, "Ann", "Hello")]);
    write_lines(&outcomes, &[outcome_row(1, "Ann", false)]);
    let args = vec![
        "--messages".to_string(),
        messages.display().to_string(),
        "--outcomes".to_string(),
        outcomes.display().to_string(),
        "--output-dir".to_string(),
        output.display().to_string(),
        "--dry-run".to_string(),
    ];
    run_scorecard(args.into_iter()).unwrap();
    assert!(!output.exists());
}
