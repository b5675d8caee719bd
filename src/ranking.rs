//! Composite scoring and deterministic ranking.

use std::cmp::Ordering;

use crate::config::{OutcomeCurve, PipelineConfig};
use crate::constants::ranking::{GRADE_EXCELLENT, GRADE_GOOD, GRADE_OK, GRADE_POOR};
use crate::data::{ActorAggregate, ActorScore, Grade};

/// Piecewise transform from success rate (percent) to outcome score.
///
/// Rates at or below the floor score zero; each tier multiplies the rate by
/// its factor; rates above the last tier use the top multiplier with no cap,
/// so exceptional performers can score past 100.
pub fn outcome_score(rate_pct: f64, curve: &OutcomeCurve) -> f64 {
    if rate_pct <= curve.floor_pct {
        return 0.0;
    }
    let multiplier = curve
        .tiers
        .iter()
        .find(|tier| rate_pct <= tier.upper_pct)
        .map(|tier| tier.multiplier)
        .unwrap_or(curve.top_multiplier);
    rate_pct * multiplier
}

/// Grade category for a composite score.
pub fn grade(composite: f64) -> Grade {
    if composite >= GRADE_EXCELLENT {
        Grade::Excellent
    } else if composite >= GRADE_GOOD {
        Grade::Good
    } else if composite >= GRADE_OK {
        Grade::Ok
    } else if composite >= GRADE_POOR {
        Grade::Poor
    } else {
        Grade::AttentionNeeded
    }
}

/// Total order used for ranking: composite desc, outcome desc, actor asc.
pub fn compare_scores(a: &ActorScore, b: &ActorScore) -> Ordering {
    b.composite
        .total_cmp(&a.composite)
        .then_with(|| b.outcome_score.total_cmp(&a.outcome_score))
        .then_with(|| a.actor.cmp(&b.actor))
}

/// Score and rank qualifying aggregates.
pub fn rank(aggregates: &[ActorAggregate], config: &PipelineConfig) -> Vec<ActorScore> {
    let mut scores: Vec<ActorScore> = aggregates
        .iter()
        .map(|aggregate| {
            let quality_score = aggregate.quality.mean;
            let success_rate_pct = aggregate.success_rate_pct();
            let outcome = outcome_score(success_rate_pct, &config.outcome_curve);
            let composite =
                config.quality_weight * quality_score + config.outcome_weight * outcome;
            ActorScore {
                actor: aggregate.actor.clone(),
                quality_score,
                success_rate_pct,
                outcome_score: outcome,
                composite,
                rank: 0,
                percentile: 0.0,
                grade: grade(composite),
            }
        })
        .collect();
    scores.sort_by(compare_scores);
    let total = scores.len();
    for (idx, score) in scores.iter_mut().enumerate() {
        score.rank = idx + 1;
        score.percentile = (total - idx) as f64 / total as f64 * 100.0;
    }
    scores
}
