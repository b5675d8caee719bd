//! Per-actor roll-up of message quality and case outcomes.

use std::collections::{BTreeMap, HashMap};
use tracing::{info, warn};

use crate::data::{ActorAggregate, CanonicalActor, MergedRecord};
use crate::merge::tally_cases;
use crate::metrics::{top_signals, SummaryStats};
use crate::scoring::QualityScorer;
use crate::types::SignalLabel;

/// Aggregates split by the minimum-case gate.
#[derive(Clone, Debug, Default)]
pub struct Aggregation {
    /// Actors meeting the minimum-case threshold, sorted by actor.
    pub qualifying: Vec<ActorAggregate>,
    /// Actors below the threshold; never ranked.
    pub excluded: Vec<ActorAggregate>,
}

#[derive(Default)]
struct QualityAccumulator {
    totals: Vec<f64>,
    engagement: f64,
    tone: f64,
    strengths: HashMap<SignalLabel, usize>,
    issues: HashMap<SignalLabel, usize>,
}

/// Score every merged message and roll results up per actor.
///
/// Actors with fewer than `min_cases` distinct cases are aggregated but
/// moved to [`Aggregation::excluded`]: a small sample is no claim, not a
/// bad score.
pub fn aggregate(
    records: &[MergedRecord],
    scorer: &QualityScorer<'_>,
    min_cases: usize,
    top_signal_count: usize,
) -> Aggregation {
    let mut quality: BTreeMap<&CanonicalActor, QualityAccumulator> = BTreeMap::new();
    for record in records {
        let score = scorer.score(record.channel, Some(&record.text));
        let acc = quality.entry(&record.actor).or_default();
        acc.totals.push(f64::from(score.total));
        acc.engagement += f64::from(score.engagement);
        acc.tone += f64::from(score.tone);
        for label in score.matched_signals {
            *acc.strengths.entry(label).or_insert(0) += 1;
        }
        for label in score.violated_signals {
            *acc.issues.entry(label).or_insert(0) += 1;
        }
    }

    let mut aggregation = Aggregation::default();
    for tally in tally_cases(records) {
        let acc = quality.remove(&tally.actor).unwrap_or_default();
        let messages = acc.totals.len();
        let mean_of = |sum: f64| {
            if messages == 0 {
                0.0
            } else {
                sum / messages as f64
            }
        };
        let aggregate = ActorAggregate {
            success_rate: tally.success_rate(),
            cases: tally.cases,
            successes: tally.successes,
            messages,
            quality: SummaryStats::from_values(&acc.totals),
            engagement_mean: mean_of(acc.engagement),
            tone_mean: mean_of(acc.tone),
            top_strengths: top_signals(&acc.strengths, top_signal_count),
            top_issues: top_signals(&acc.issues, top_signal_count),
            actor: tally.actor,
        };
        if aggregate.cases >= min_cases {
            aggregation.qualifying.push(aggregate);
        } else {
            warn!(
                "[scorecard:aggregate] excluding '{}' from ranking: {} cases below minimum {}",
                aggregate.actor, aggregate.cases, min_cases
            );
            aggregation.excluded.push(aggregate);
        }
    }
    info!(
        "[scorecard:aggregate] {} actors qualify, {} excluded (minimum {} cases)",
        aggregation.qualifying.len(),
        aggregation.excluded.len(),
        min_cases
    );
    aggregation
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScoringRubrics;
    use crate::data::Channel;

    fn record(case_id: &str, actor: CanonicalActor, text: &str, success: bool) -> MergedRecord {
        MergedRecord {
            case_id: case_id.to_string(),
            message_actor: actor.clone(),
            actor,
            text: text.to_string(),
            channel: Channel::Sms,
            success,
            sent_at: None,
        }
    }

    #[test]
    fn aggregates_quality_and_outcomes_per_actor() {
        let ann = CanonicalActor::Named("Ann".into());
        let records = vec![
            record("c1", ann.clone(), "Thanks! Can you make a delivery this week?", true),
            record("c1", ann.clone(), "YOU MUST START IMMEDIATELY", true),
            record("c2", ann.clone(), "Thanks! Can you make a delivery this week?", false),
        ];
        let rubrics = ScoringRubrics::default();
        let scorer = QualityScorer::new(&rubrics);
        let aggregation = aggregate(&records, &scorer, 1, 5);
        assert!(aggregation.excluded.is_empty());
        let ann_agg = &aggregation.qualifying[0];
        assert_eq!(ann_agg.actor, ann);
        assert_eq!(ann_agg.cases, 2);
        assert_eq!(ann_agg.successes, 1);
        assert_eq!(ann_agg.messages, 3);
        assert!((ann_agg.quality.mean - 80.0).abs() < 1e-9);
        assert_eq!(ann_agg.quality.median, 96.0);
        assert_eq!(ann_agg.quality.min, 48.0);
        assert_eq!(ann_agg.quality.max, 96.0);
        assert_eq!(ann_agg.top_strengths[0].label, "Contains clear call-to-action");
        assert_eq!(ann_agg.top_strengths[0].count, 3);
        assert!(ann_agg.top_strengths.len() <= 5);
        assert!(ann_agg
            .top_issues
            .iter()
            .any(|entry| entry.label == "Excessive capitalization"));
    }

    #[test]
    fn actors_below_threshold_are_excluded_not_zeroed() {
        let mut records = Vec::new();
        for idx in 0..50 {
            records.push(record(
                &format!("small-{idx}"),
                CanonicalActor::Named("Small".into()),
                "Thanks! Can you make a delivery this week?",
                true,
            ));
        }
        for idx in 0..120 {
            records.push(record(
                &format!("big-{idx}"),
                CanonicalActor::Automation,
                "Ready to start?",
                idx % 3 == 0,
            ));
        }
        let rubrics = ScoringRubrics::default();
        let scorer = QualityScorer::new(&rubrics);
        let aggregation = aggregate(&records, &scorer, 100, 5);
        assert_eq!(aggregation.qualifying.len(), 1);
        assert_eq!(aggregation.qualifying[0].actor, CanonicalActor::Automation);
        assert_eq!(aggregation.qualifying[0].successes, 40);
        assert_eq!(aggregation.excluded.len(), 1);
        assert_eq!(aggregation.excluded[0].cases, 50);
        assert!(aggregation.excluded[0].quality.mean > 90.0);
    }
}
