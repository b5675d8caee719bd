//! Dataset merge and integrity validation.
//!
//! Outcomes are deduplicated per case (first row wins), both streams are
//! reconciled to canonical actors, outbound non-empty messages are
//! inner-joined to outcomes, and per-actor case tallies are computed from
//! unique (case, actor) pairs. The integrity gate then rejects any actor
//! whose success rate exceeds 100% and any case attributed to more than one
//! actor. Gate failures abort the run; they are never clamped.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use tracing::{error, info, warn};

use crate::data::{CanonicalActor, Direction, MergedRecord, MessageRecord, OutcomeRecord};
use crate::errors::{IntegrityViolation, ScorecardError};
use crate::identity::{message_actor, outcome_actor};

/// Non-fatal data-quality counts collected while merging.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct MergeReport {
    /// Message rows received.
    pub message_rows: usize,
    /// Outbound rows with null or blank text.
    pub empty_messages: usize,
    /// Rows that were not outbound.
    pub non_outbound_messages: usize,
    /// Outbound rows carrying the ignore marker.
    pub ignored_messages: usize,
    /// Outbound rows whose case has no outcome.
    pub orphan_messages: usize,
    /// Outcome rows received.
    pub outcome_rows: usize,
    /// Outcome rows dropped as same-actor duplicates.
    pub duplicate_outcomes_removed: usize,
    /// Deduplicated outcomes with no scored outbound message.
    pub outcomes_without_messages: usize,
    /// Merged rows whose message-side actor differs from the outcome actor.
    pub reattributed_messages: usize,
    /// Rows that survived the join.
    pub merged_rows: usize,
    /// Distinct cases among merged rows.
    pub unique_cases: usize,
    /// Distinct actors among merged rows.
    pub actors: usize,
}

impl MergeReport {
    /// Human-readable notes for every non-zero data-quality count.
    pub fn warnings(&self) -> Vec<String> {
        let mut notes = Vec::new();
        let mut push = |count: usize, what: &str| {
            if count > 0 {
                notes.push(format!("{count} {what}"));
            }
        };
        push(
            self.duplicate_outcomes_removed,
            "duplicate outcome row(s) removed (first occurrence kept)",
        );
        push(self.empty_messages, "outbound message(s) with empty text skipped");
        push(self.ignored_messages, "outbound message(s) marked for exclusion skipped");
        push(
            self.orphan_messages,
            "outbound message(s) without a matching outcome dropped",
        );
        push(
            self.outcomes_without_messages,
            "outcome(s) without a scored outbound message not counted",
        );
        push(
            self.reattributed_messages,
            "merged message(s) re-attributed to the outcome owner",
        );
        notes
    }
}

/// Distinct case counts for one actor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ActorTally {
    /// Actor the cases belong to.
    pub actor: CanonicalActor,
    /// Distinct cases.
    pub cases: usize,
    /// Distinct successful cases.
    pub successes: usize,
}

impl ActorTally {
    /// `successes / cases`; zero when there are no cases.
    pub fn success_rate(&self) -> f64 {
        if self.cases == 0 {
            0.0
        } else {
            self.successes as f64 / self.cases as f64
        }
    }
}

/// Validated merge result.
#[derive(Clone, Debug)]
pub struct MergeOutput {
    /// Joined outbound messages.
    pub records: Vec<MergedRecord>,
    /// Tallies sorted by actor.
    pub tallies: Vec<ActorTally>,
    /// Data-quality counts.
    pub report: MergeReport,
}

/// Drop outcome rows whose case id was already seen, keeping the first.
///
/// Returns the retained rows and the number removed. Applying it to its own
/// output removes nothing.
pub fn dedupe_outcomes(outcomes: &[OutcomeRecord]) -> (Vec<OutcomeRecord>, usize) {
    let mut seen: HashSet<&str> = HashSet::with_capacity(outcomes.len());
    let mut unique = Vec::with_capacity(outcomes.len());
    for outcome in outcomes {
        if seen.insert(outcome.case_id.as_str()) {
            unique.push(outcome.clone());
        }
    }
    let removed = outcomes.len() - unique.len();
    (unique, removed)
}

/// Cases whose outcome rows reconcile to more than one canonical actor.
pub fn find_ambiguous_cases(outcomes: &[OutcomeRecord]) -> Vec<IntegrityViolation> {
    let mut by_case: BTreeMap<&str, BTreeSet<CanonicalActor>> = BTreeMap::new();
    for outcome in outcomes {
        by_case
            .entry(outcome.case_id.as_str())
            .or_default()
            .insert(outcome_actor(outcome));
    }
    by_case
        .into_iter()
        .filter(|(_, actors)| actors.len() > 1)
        .map(|(case_id, actors)| IntegrityViolation::AmbiguousCase {
            case_id: case_id.to_string(),
            actors: actors.iter().map(|actor| actor.label().to_string()).collect(),
        })
        .collect()
}

/// Per-actor tallies over unique (case, actor) pairs.
///
/// Message volume never inflates counts: a case with ten messages counts
/// once for its actor.
pub fn tally_cases(records: &[MergedRecord]) -> Vec<ActorTally> {
    let mut pairs: HashMap<(&str, &CanonicalActor), bool> = HashMap::new();
    for record in records {
        let success = pairs
            .entry((record.case_id.as_str(), &record.actor))
            .or_insert(false);
        *success |= record.success;
    }
    let mut tallies: BTreeMap<&CanonicalActor, (usize, usize)> = BTreeMap::new();
    for ((_, actor), success) in pairs {
        let entry = tallies.entry(actor).or_insert((0, 0));
        entry.0 += 1;
        if success {
            entry.1 += 1;
        }
    }
    tallies
        .into_iter()
        .map(|(actor, (cases, successes))| ActorTally {
            actor: actor.clone(),
            cases,
            successes,
        })
        .collect()
}

fn rate_violations(tallies: &[ActorTally]) -> Vec<IntegrityViolation> {
    tallies
        .iter()
        .filter(|tally| tally.successes > tally.cases)
        .map(|tally| IntegrityViolation::RateExceedsUnity {
            actor: tally.actor.label().to_string(),
            successes: tally.successes,
            cases: tally.cases,
        })
        .collect()
}

/// Integrity gate over tallies: every success rate must be at most 100%.
pub fn validate_tallies(tallies: &[ActorTally]) -> Result<(), ScorecardError> {
    let violations = rate_violations(tallies);
    if violations.is_empty() {
        Ok(())
    } else {
        Err(ScorecardError::Integrity { violations })
    }
}

fn has_marker(text: &str, marker: Option<&str>) -> bool {
    match marker {
        Some(marker) if !marker.is_empty() => {
            text.to_lowercase().contains(&marker.to_lowercase())
        }
        _ => false,
    }
}

/// Join messages to outcomes and run the integrity gate.
///
/// `ignore_marker` excludes outbound messages containing it (case-insensitive).
pub fn merge(
    messages: &[MessageRecord],
    outcomes: &[OutcomeRecord],
    ignore_marker: Option<&str>,
) -> Result<MergeOutput, ScorecardError> {
    let mut report = MergeReport {
        message_rows: messages.len(),
        outcome_rows: outcomes.len(),
        ..MergeReport::default()
    };
    info!(
        "[scorecard:merge] merging {} message rows with {} outcome rows",
        messages.len(),
        outcomes.len()
    );

    let mut violations = find_ambiguous_cases(outcomes);
    let (unique_outcomes, removed) = dedupe_outcomes(outcomes);
    report.duplicate_outcomes_removed = removed;
    if removed > 0 {
        warn!(
            "[scorecard:merge] removed {} duplicate outcome rows (first occurrence kept)",
            removed
        );
    }

    let outcome_index: HashMap<&str, (CanonicalActor, bool)> = unique_outcomes
        .iter()
        .map(|outcome| {
            (
                outcome.case_id.as_str(),
                (outcome_actor(outcome), outcome.success),
            )
        })
        .collect();

    let mut records = Vec::new();
    for message in messages {
        if message.direction != Direction::Outbound {
            report.non_outbound_messages += 1;
            continue;
        }
        let Some(text) = message
            .text
            .as_deref()
            .filter(|text| !text.trim().is_empty())
        else {
            report.empty_messages += 1;
            continue;
        };
        if has_marker(text, ignore_marker) {
            report.ignored_messages += 1;
            continue;
        }
        let Some((actor, success)) = outcome_index.get(message.case_id.as_str()) else {
            report.orphan_messages += 1;
            continue;
        };
        let sender = message_actor(message);
        if sender != *actor {
            report.reattributed_messages += 1;
        }
        records.push(MergedRecord {
            case_id: message.case_id.clone(),
            actor: actor.clone(),
            message_actor: sender,
            text: text.to_string(),
            channel: message.channel,
            success: *success,
            sent_at: message.sent_at,
        });
    }

    let merged_cases: HashSet<&str> = records
        .iter()
        .map(|record| record.case_id.as_str())
        .collect();
    report.unique_cases = merged_cases.len();
    report.outcomes_without_messages = unique_outcomes
        .iter()
        .filter(|outcome| !merged_cases.contains(outcome.case_id.as_str()))
        .count();
    report.merged_rows = records.len();

    let tallies = tally_cases(&records);
    report.actors = tallies.len();
    violations.extend(rate_violations(&tallies));
    if !violations.is_empty() {
        for violation in &violations {
            error!("[scorecard:merge] integrity violation: {}", violation);
        }
        return Err(ScorecardError::Integrity { violations });
    }

    for note in report.warnings() {
        warn!("[scorecard:merge] {}", note);
    }
    info!(
        "[scorecard:merge] merged {} rows across {} cases and {} actors",
        report.merged_rows, report.unique_cases, report.actors
    );
    Ok(MergeOutput {
        records,
        tallies,
        report,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Channel;

    fn message(case_id: &str, actor: &str, text: Option<&str>) -> MessageRecord {
        MessageRecord {
            case_id: case_id.to_string(),
            raw_actor: Some(actor.to_string()),
            text: text.map(str::to_string),
            direction: Direction::Outbound,
            automation: false,
            channel: Channel::Sms,
            sent_at: None,
        }
    }

    fn outcome(case_id: &str, actor: &str, success: bool) -> OutcomeRecord {
        OutcomeRecord {
            case_id: case_id.to_string(),
            raw_actor: Some(actor.to_string()),
            success,
            automation: false,
        }
    }

    #[test]
    fn dedupe_keeps_first_and_is_idempotent() {
        let outcomes = vec![
            outcome("c1", "Ann", true),
            outcome("c2", "Ann", false),
            outcome("c1", "Ann", false),
        ];
        let (once, removed) = dedupe_outcomes(&outcomes);
        assert_eq!(removed, 1);
        assert_eq!(once.len(), 2);
        assert!(once[0].success);
        let (twice, removed_again) = dedupe_outcomes(&once);
        assert_eq!(removed_again, 0);
        assert_eq!(twice, once);
    }

    #[test]
    fn tallies_count_cases_not_messages() {
        let messages = vec![
            message("c1", "Ann", Some("Ready to start?")),
            message("c1", "Ann", Some("Following up, ready?")),
            message("c1", "Ann", Some("Last check, ready?")),
            message("c2", "Ann", Some("Ready to start?")),
        ];
        let outcomes = vec![outcome("c1", "Ann", true), outcome("c2", "Ann", false)];
        let merged = merge(&messages, &outcomes, None).unwrap();
        assert_eq!(merged.records.len(), 4);
        assert_eq!(
            merged.tallies,
            vec![ActorTally {
                actor: CanonicalActor::Named("Ann".into()),
                cases: 2,
                successes: 1,
            }]
        );
        assert!((merged.tallies[0].success_rate() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn join_keeps_only_outbound_non_empty_matched_messages() {
        let mut inbound = message("c1", "Ann", Some("Who is this?"));
        inbound.direction = Direction::Inbound;
        let messages = vec![
            inbound,
            message("c1", "Ann", None),
            message("c1", "Ann", Some("   ")),
            message("c1", "Ann", Some("test send - IGNORE FOR ANALYSIS")),
            message("c9", "Ann", Some("Ready to start?")),
            message("c1", "Ann", Some("Ready to start?")),
        ];
        let outcomes = vec![outcome("c1", "Ann", true), outcome("c2", "Bob", true)];
        let merged = merge(&messages, &outcomes, Some("ignore for analysis")).unwrap();
        let report = &merged.report;
        assert_eq!(report.non_outbound_messages, 1);
        assert_eq!(report.empty_messages, 2);
        assert_eq!(report.ignored_messages, 1);
        assert_eq!(report.orphan_messages, 1);
        assert_eq!(report.merged_rows, 1);
        assert_eq!(report.outcomes_without_messages, 1);
        assert_eq!(report.unique_cases, 1);
        assert_eq!(merged.records[0].text, "Ready to start?");
    }

    #[test]
    fn outcome_actor_is_authoritative() {
        let mut messages = vec![message("c1", "Ann", Some("Ready to start?"))];
        messages[0].automation = true;
        let outcomes = vec![outcome("c1", "Bob", true)];
        let merged = merge(&messages, &outcomes, None).unwrap();
        assert_eq!(merged.records[0].actor, CanonicalActor::Named("Bob".into()));
        assert_eq!(merged.records[0].message_actor, CanonicalActor::Automation);
        assert_eq!(merged.report.reattributed_messages, 1);
    }

    #[test]
    fn merged_text_keeps_its_original_whitespace() {
        let messages = vec![message("c1", "Ann", Some("  Ready to start?\n"))];
        let outcomes = vec![outcome("c1", "Ann", true)];
        let merged = merge(&messages, &outcomes, None).unwrap();
        assert_eq!(merged.records[0].text, "  Ready to start?\n");
        assert_eq!(merged.report.empty_messages, 0);
    }

    #[test]
    fn case_attributed_to_two_actors_aborts() {
        let messages = vec![message("c1", "Ann", Some("Ready to start?"))];
        let outcomes = vec![outcome("c1", "Ann", true), outcome("c1", "Bob", true)];
        let err = merge(&messages, &outcomes, None).unwrap_err();
        match err {
            ScorecardError::Integrity { violations } => {
                assert_eq!(
                    violations,
                    vec![IntegrityViolation::AmbiguousCase {
                        case_id: "c1".into(),
                        actors: vec!["Ann".into(), "Bob".into()],
                    }]
                );
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn benign_duplicates_only_warn() {
        let messages = vec![message("c1", "Ann", Some("Ready to start?"))];
        let outcomes = vec![outcome("c1", "Ann", true), outcome("c1", "Ann", true)];
        let merged = merge(&messages, &outcomes, None).unwrap();
        assert_eq!(merged.report.duplicate_outcomes_removed, 1);
        assert_eq!(merged.tallies[0].cases, 1);
        assert_eq!(merged.tallies[0].successes, 1);
        assert!(merged.report.warnings()[0].starts_with("1 duplicate outcome"));
    }

    #[test]
    fn gate_reports_offending_actors_with_counts() {
        let tallies = vec![
            ActorTally {
                actor: CanonicalActor::Named("Ann".into()),
                cases: 10,
                successes: 4,
            },
            ActorTally {
                actor: CanonicalActor::Automation,
                cases: 3,
                successes: 5,
            },
        ];
        let err = validate_tallies(&tallies).unwrap_err();
        let text = err.to_string();
        assert!(text.contains("AI Agent"));
        assert!(text.contains("(5/3)"));
        assert!(!text.contains("Ann"));
        assert!(validate_tallies(&tallies[..1]).is_ok());
    }
}
