//! Narrative Markdown report and structured data dump.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::Serialize;

use crate::config::{AssessmentThresholds, OutcomeCurve};
use crate::constants::ranking::{GRADE_OK, GRADE_POOR};
use crate::constants::report::{TOP_PERFORMER_MIN, TOP_PERFORMER_SHARE};
use crate::data::{ActorAggregate, ActorScore, CanonicalActor, Grade};
use crate::errors::ScorecardError;
use crate::merge::MergeReport;
use crate::metrics::{pearson, SummaryStats};
use crate::pipeline::{AnalysisPeriod, RankedActor, RunSettings, ScorecardRun};
use crate::source::IngestionReport;
use crate::store::ReportVersion;
use crate::utils::normalize_inline_whitespace;

/// Number of strengths and improvements listed per actor.
pub const ASSESSMENT_ITEMS: usize = 2;

/// Narrative strengths and improvement areas for one ranked actor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Assessment {
    /// Exactly two strengths.
    pub strengths: Vec<String>,
    /// Exactly two improvement areas.
    pub improvements: Vec<String>,
}

/// Per-render facts that are not part of the computed run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReportContext {
    /// Render time shown in the header.
    pub generated_at: DateTime<Utc>,
    /// Version shown in the header and file names.
    pub version: ReportVersion,
}

fn fill_to_two(items: &mut Vec<String>, candidates: impl IntoIterator<Item = String>) {
    for candidate in candidates {
        if items.len() >= ASSESSMENT_ITEMS {
            break;
        }
        if !items.contains(&candidate) {
            items.push(candidate);
        }
    }
    items.truncate(ASSESSMENT_ITEMS);
}

/// Derive exactly two strengths and two improvement areas for an actor.
///
/// Threshold rules run first in priority order (quality, outcome rate, rank
/// position, score consistency); fallbacks fill whatever slots remain.
pub fn assess(
    score: &ActorScore,
    aggregate: &ActorAggregate,
    ranked_count: usize,
    thresholds: &AssessmentThresholds,
) -> Assessment {
    let quality = score.quality_score;
    let rate = score.success_rate_pct;
    let std = aggregate.quality.std;
    let rank = score.rank as f64;
    let population = ranked_count as f64;
    let per_case = aggregate.messages_per_case();

    let mut strengths = Vec::new();
    if quality >= thresholds.excellent_quality {
        strengths.push(format!(
            "Excellent message quality with {quality:.1}/100 quality score, consistently professional and engaging"
        ));
    } else if quality >= thresholds.good_quality {
        strengths.push(format!(
            "Good message quality with {quality:.1}/100 quality score and clear communication standards"
        ));
    }
    if rate >= thresholds.excellent_outcome_pct {
        strengths.push(format!(
            "Outstanding success rate at {rate:.1}%, effectively moves cases to a successful outcome"
        ));
    } else if rate >= thresholds.good_outcome_pct {
        strengths.push(format!("Strong success rate of {rate:.1}%, good at closing cases"));
    }
    if rank <= population * thresholds.top_share {
        strengths.push("Top-tier overall performance and a role model for the team".to_string());
    }
    if std < thresholds.consistent_std {
        strengths.push("Highly consistent message quality with reliable standards".to_string());
    }
    let mut strength_fallbacks = Vec::new();
    if aggregate.cases > thresholds.high_volume_cases {
        strength_fallbacks.push(format!(
            "High volume performer with {} cases handled",
            with_thousands(aggregate.cases)
        ));
    }
    if per_case > thresholds.engaged_messages_per_case {
        strength_fallbacks
            .push("Strong engagement with multiple follow-up messages per case".to_string());
    }
    if let Some(top) = aggregate.top_strengths.first() {
        strength_fallbacks.push(format!(
            "Most frequent message strength: {} ({} messages)",
            top.label, top.count
        ));
    }
    strength_fallbacks.push(format!(
        "Carries a full ranked workload of {} cases",
        with_thousands(aggregate.cases)
    ));
    strength_fallbacks.push(format!(
        "Contributes {} scored messages to the analysis",
        with_thousands(aggregate.messages)
    ));
    fill_to_two(&mut strengths, strength_fallbacks);

    let mut improvements = Vec::new();
    if quality < thresholds.ok_quality {
        improvements.push(
            "Message quality needs immediate attention: focus on professional tone and clear calls-to-action"
                .to_string(),
        );
    } else if quality < thresholds.good_quality {
        improvements.push(
            "Message quality needs improvement: work on consistency and engagement techniques"
                .to_string(),
        );
    } else if quality < thresholds.excellent_quality {
        improvements.push(
            "Refine message quality by strengthening advanced communication techniques"
                .to_string(),
        );
    }
    if rate < thresholds.ok_outcome_pct {
        improvements.push(
            "Success rate needs immediate attention and intensive coaching on closing strategies"
                .to_string(),
        );
    } else if rate < thresholds.good_outcome_pct {
        improvements.push(
            "Success rate below target: coach follow-up timing and value proposition".to_string(),
        );
    } else if rate < thresholds.excellent_outcome_pct {
        improvements.push(
            "Good success foundation: focus on advanced closing techniques for excellence"
                .to_string(),
        );
    }
    if rank > population * thresholds.bottom_share {
        improvements.push(
            "Overall performance needs attention with comprehensive coaching and support".to_string(),
        );
    }
    if std > thresholds.inconsistent_std {
        improvements.push(
            "Message quality is inconsistent: develop a standardized approach and templates"
                .to_string(),
        );
    }
    let follow_up =
        "Increase follow-up frequency, more touchpoints may improve success rates".to_string();
    let timing = "Optimize message timing and sequencing for better engagement".to_string();
    let mut improvement_fallbacks = Vec::new();
    if per_case < thresholds.low_follow_up_messages_per_case {
        improvement_fallbacks.push(follow_up);
        improvement_fallbacks.push(timing);
    } else {
        improvement_fallbacks.push(timing);
        if let Some(top) = aggregate.top_issues.first() {
            improvement_fallbacks.push(format!(
                "Address the most frequent message issue: {} ({} messages)",
                top.label, top.count
            ));
        }
        improvement_fallbacks.push(follow_up);
    }
    fill_to_two(&mut improvements, improvement_fallbacks);

    Assessment {
        strengths,
        improvements,
    }
}

/// Number of actors listed as top performers: max(5, 20%) capped at `ranked`.
pub fn top_performer_count(ranked: usize) -> usize {
    let share = (ranked as f64 * TOP_PERFORMER_SHARE).floor() as usize;
    share.max(TOP_PERFORMER_MIN).min(ranked)
}

fn with_thousands(value: usize) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Actor label safe for a single Markdown line.
fn display_name(actor: &CanonicalActor) -> String {
    normalize_inline_whitespace(actor.label())
}

fn percent(weight: f64) -> String {
    format!("{:.0}%", weight * 100.0)
}

fn curve_lines(curve: &OutcomeCurve) -> Vec<String> {
    let mut lines = vec![format!("  - up to {:.0}% success → 0", curve.floor_pct)];
    let mut lower = curve.floor_pct;
    for tier in &curve.tiers {
        lines.push(format!(
            "  - above {:.0}% up to {:.0}% → rate × {}",
            lower, tier.upper_pct, tier.multiplier
        ));
        lower = tier.upper_pct;
    }
    lines.push(format!(
        "  - above {:.0}% → rate × {} (uncapped, may exceed 100)",
        lower, curve.top_multiplier
    ));
    lines
}

fn header(lines: &mut Vec<String>, context: &ReportContext, period: Option<&AnalysisPeriod>) {
    lines.push("# Representative Performance Scorecard".to_string());
    lines.push("## Executive Summary".to_string());
    lines.push(format!(
        "**Generated:** {}",
        context.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    lines.push(format!("**Report Version:** v{}", context.version));
    match period {
        Some(period) => lines.push(format!(
            "**Analysis Period:** {} to {}",
            period.start.format("%Y-%m-%d %H:%M:%S"),
            period.end.format("%Y-%m-%d %H:%M:%S")
        )),
        None => lines.push(
            "**Analysis Period:** not available (no message timestamps)".to_string(),
        ),
    }
    lines.push(String::new());
}

fn key_metrics(lines: &mut Vec<String>, run: &ScorecardRun) {
    let ranked = &run.ranked;
    let cases: usize = ranked.iter().map(|entry| entry.aggregate.cases).sum();
    let messages: usize = ranked.iter().map(|entry| entry.aggregate.messages).sum();
    let rates: Vec<f64> = ranked.iter().map(|entry| entry.score.success_rate_pct).collect();
    let qualities: Vec<f64> = ranked.iter().map(|entry| entry.score.quality_score).collect();
    lines.push("## Key Performance Metrics".to_string());
    lines.push(String::new());
    lines.push(format!("- **Actors Ranked:** {}", ranked.len()));
    lines.push(format!("- **Total Cases:** {}", with_thousands(cases)));
    lines.push(format!("- **Total Messages Scored:** {}", with_thousands(messages)));
    lines.push(format!(
        "- **Average Success Rate:** {:.1}%",
        SummaryStats::from_values(&rates).mean
    ));
    lines.push(format!(
        "- **Average Quality Score:** {:.1}/100",
        SummaryStats::from_values(&qualities).mean
    ));
    lines.push(format!(
        "- **Minimum Cases Threshold:** {}",
        run.settings.min_cases
    ));
    lines.push(String::new());
}

fn top_performers(lines: &mut Vec<String>, run: &ScorecardRun) {
    let settings = &run.settings;
    let count = top_performer_count(run.ranked.len());
    lines.push(format!("## Top Performers (Top {count})"));
    lines.push(format!(
        "*Ranked by composite score: {} outcome + {} quality*",
        percent(settings.outcome_weight),
        percent(settings.quality_weight)
    ));
    lines.push(String::new());
    for entry in run.ranked.iter().take(count) {
        let score = &entry.score;
        lines.push(format!("### {}. {}", score.rank, display_name(&score.actor)));
        lines.push(format!(
            "- **Composite Score:** {:.1}/100 ({})",
            score.composite, score.grade
        ));
        lines.push(format!(
            "- **Success Rate:** {:.1}% → {:.1} outcome score ({} weight)",
            score.success_rate_pct,
            score.outcome_score,
            percent(settings.outcome_weight)
        ));
        lines.push(format!(
            "- **Quality Score:** {:.1}/100 ({} weight)",
            score.quality_score,
            percent(settings.quality_weight)
        ));
        lines.push(format!(
            "- **Cases Handled:** {}",
            with_thousands(entry.aggregate.cases)
        ));
        lines.push(String::new());
    }
}

fn individual_analysis(lines: &mut Vec<String>, run: &ScorecardRun) {
    let settings = &run.settings;
    let total = run.ranked.len();
    lines.push("## Individual Analysis".to_string());
    lines.push(String::new());
    for RankedActor {
        score,
        aggregate,
        assessment,
    } in &run.ranked
    {
        lines.push(format!("### {}", display_name(&score.actor)));
        lines.push(format!(
            "**Overall Grade:** {:.1}/100 ({})",
            score.composite, score.grade
        ));
        lines.push(format!(
            "**Rank:** #{} of {} (percentile {:.1})",
            score.rank, total, score.percentile
        ));
        lines.push(String::new());
        lines.push("**Performance Metrics:**".to_string());
        lines.push(format!(
            "- Quality Score: {:.1}/100 ({} weight; engagement {:.1}, tone {:.1})",
            score.quality_score,
            percent(settings.quality_weight),
            aggregate.engagement_mean,
            aggregate.tone_mean
        ));
        lines.push(format!(
            "- Success Rate: {:.1}% ({} of {} cases) → {:.1} outcome score ({} weight)",
            score.success_rate_pct,
            with_thousands(aggregate.successes),
            with_thousands(aggregate.cases),
            score.outcome_score,
            percent(settings.outcome_weight)
        ));
        lines.push(format!(
            "- Total Messages: {}",
            with_thousands(aggregate.messages)
        ));
        lines.push(format!(
            "- Avg Messages/Case: {:.1}",
            aggregate.messages_per_case()
        ));
        lines.push(format!(
            "- Message Quality Consistency: {:.1} std dev (median {:.1}, range {:.0}-{:.0})",
            aggregate.quality.std,
            aggregate.quality.median,
            aggregate.quality.min,
            aggregate.quality.max
        ));
        lines.push(String::new());
        lines.push("**Strengths:**".to_string());
        for strength in &assessment.strengths {
            lines.push(format!("- {strength}"));
        }
        lines.push(String::new());
        lines.push("**Areas for Improvement:**".to_string());
        for improvement in &assessment.improvements {
            lines.push(format!("- {improvement}"));
        }
        lines.push(String::new());
        if !aggregate.top_strengths.is_empty() || !aggregate.top_issues.is_empty() {
            lines.push("**Frequent Message Signals:**".to_string());
            for signal in &aggregate.top_strengths {
                lines.push(format!("- + {} ({})", signal.label, signal.count));
            }
            for signal in &aggregate.top_issues {
                lines.push(format!("- − {} ({})", signal.label, signal.count));
            }
            lines.push(String::new());
        }
        lines.push("---".to_string());
        lines.push(String::new());
    }
}

fn distribution(lines: &mut Vec<String>, run: &ScorecardRun) {
    let composites: Vec<f64> = run.ranked.iter().map(|entry| entry.score.composite).collect();
    let stats = SummaryStats::from_values(&composites);
    lines.push("## Performance Distribution".to_string());
    lines.push(String::new());
    lines.push("**Composite Score Distribution:**".to_string());
    lines.push(format!("- Mean: {:.1}", stats.mean));
    lines.push(format!("- Median: {:.1}", stats.median));
    lines.push(format!("- Standard Deviation: {:.1}", stats.std));
    lines.push(format!("- Range: {:.1} - {:.1}", stats.min, stats.max));
    lines.push(String::new());

    let total = run.ranked.len() as f64;
    lines.push("**Grade Distribution:**".to_string());
    for grade in Grade::ALL {
        let count = run
            .ranked
            .iter()
            .filter(|entry| entry.score.grade == grade)
            .count();
        if count > 0 {
            lines.push(format!(
                "- {}: {} ({:.1}%)",
                grade,
                count,
                count as f64 / total * 100.0
            ));
        }
    }
    lines.push(String::new());
}

fn insights(lines: &mut Vec<String>, run: &ScorecardRun) {
    let qualities: Vec<f64> = run.ranked.iter().map(|entry| entry.score.quality_score).collect();
    let rates: Vec<f64> = run
        .ranked
        .iter()
        .map(|entry| entry.score.success_rate_pct)
        .collect();
    lines.push("## Key Insights".to_string());
    lines.push(String::new());
    lines.push("**Performance Insights:**".to_string());
    match pearson(&qualities, &rates) {
        Some(correlation) => {
            lines.push(format!(
                "- Quality Score vs Success Rate Correlation: {correlation:.3}"
            ));
            let reading = if correlation > 0.3 {
                "Strong positive correlation: better message quality goes with higher success"
            } else if correlation > 0.1 {
                "Moderate correlation: message quality has some bearing on success"
            } else {
                "Weak correlation: factors beyond message quality drive success"
            };
            lines.push(format!("  → {reading}"));
        }
        None => lines.push(
            "- Quality Score vs Success Rate Correlation: not computable (fewer than two actors or no variation)"
                .to_string(),
        ),
    }
    lines.push(String::new());

    let top: Vec<&RankedActor> = run
        .ranked
        .iter()
        .take(top_performer_count(run.ranked.len()))
        .collect();
    let top_quality: Vec<f64> = top.iter().map(|entry| entry.score.quality_score).collect();
    let top_rates: Vec<f64> = top.iter().map(|entry| entry.score.success_rate_pct).collect();
    let top_std: Vec<f64> = top.iter().map(|entry| entry.aggregate.quality.std).collect();
    lines.push("**Patterns Among Top Performers:**".to_string());
    lines.push(format!(
        "- Average Quality Score: {:.1}/100",
        SummaryStats::from_values(&top_quality).mean
    ));
    lines.push(format!(
        "- Average Success Rate: {:.1}%",
        SummaryStats::from_values(&top_rates).mean
    ));
    lines.push(format!(
        "- Average Quality Std Dev: {:.1}",
        SummaryStats::from_values(&top_std).mean
    ));
    lines.push(String::new());
}

fn recommendations(lines: &mut Vec<String>, run: &ScorecardRun) {
    let thresholds = &run.settings.assessment;
    let attention = run
        .ranked
        .iter()
        .filter(|entry| entry.score.composite < GRADE_POOR)
        .count();
    let poor = run
        .ranked
        .iter()
        .filter(|entry| entry.score.composite >= GRADE_POOR && entry.score.composite < GRADE_OK)
        .count();
    let low_quality = run
        .ranked
        .iter()
        .filter(|entry| entry.score.quality_score < thresholds.ok_quality)
        .count();
    let low_outcome = run
        .ranked
        .iter()
        .filter(|entry| entry.score.success_rate_pct < thresholds.ok_outcome_pct)
        .count();

    let mut items = Vec::new();
    if attention > 0 {
        items.push(format!(
            "**Immediate Attention Required:** {attention} actor(s) scoring below {GRADE_POOR:.0}/100"
        ));
    }
    if poor > 0 {
        items.push(format!(
            "**Intensive Coaching Required:** {poor} actor(s) in the poor range ({GRADE_POOR:.0}-{GRADE_OK:.0})"
        ));
    }
    if low_quality > 0 {
        items.push(format!(
            "**Critical Quality Training:** {low_quality} actor(s) below the {:.0} quality threshold",
            thresholds.ok_quality
        ));
    }
    if low_outcome > 0 {
        items.push(format!(
            "**Critical Outcome Coaching:** {low_outcome} actor(s) below a {:.0}% success rate",
            thresholds.ok_outcome_pct
        ));
    }
    items.push(
        "**Best Practice Sharing:** run regular sessions featuring top performer techniques"
            .to_string(),
    );
    if run.ranked.iter().any(|entry| entry.score.actor.is_automation()) {
        items.push(
            "**Automation Alignment:** fold successful human patterns into automated messaging"
                .to_string(),
        );
    }

    lines.push("**Management Recommendations:**".to_string());
    for (idx, item) in items.iter().enumerate() {
        lines.push(format!("{}. {}", idx + 1, item));
    }
    lines.push(String::new());
}

fn excluded(lines: &mut Vec<String>, run: &ScorecardRun) {
    lines.push("## Excluded Actors".to_string());
    lines.push(String::new());
    if run.excluded.is_empty() {
        lines.push(format!(
            "All actors met the {}-case minimum.",
            run.settings.min_cases
        ));
    } else {
        lines.push(format!(
            "Below the {}-case minimum; aggregated but not ranked:",
            run.settings.min_cases
        ));
        for aggregate in &run.excluded {
            lines.push(format!(
                "- {}: {} case(s), {} success(es), {} message(s)",
                display_name(&aggregate.actor),
                with_thousands(aggregate.cases),
                with_thousands(aggregate.successes),
                with_thousands(aggregate.messages)
            ));
        }
    }
    lines.push(String::new());
}

fn methodology(
    lines: &mut Vec<String>,
    settings: &RunSettings,
    ingestion: Option<&IngestionReport>,
    merge: &MergeReport,
) {
    lines.push("## Methodology".to_string());
    lines.push(String::new());
    lines.push("**Scoring Framework:**".to_string());
    lines.push(format!(
        "- Composite Score = (Quality Score × {}) + (Outcome Score × {})",
        percent(settings.quality_weight),
        percent(settings.outcome_weight)
    ));
    lines.push(
        "- Quality Score = engagement (0-50) + tone (0-50), averaged over outbound messages"
            .to_string(),
    );
    lines.push(format!(
        "- Messages without a channel are scored with the {} rubric",
        settings.default_channel
    ));
    lines.push("- Outcome Score applies a multiplier to the success rate:".to_string());
    lines.extend(curve_lines(&settings.outcome_curve));
    lines.push(
        "- Success rates count unique (case, actor) pairs; message volume only feeds quality"
            .to_string(),
    );
    lines.push(format!(
        "- Minimum {} cases required for ranking",
        settings.min_cases
    ));
    lines.push("- Automated activity is tracked as its own actor".to_string());
    lines.push(String::new());

    lines.push("**Data Quality Summary:**".to_string());
    if let Some(ingestion) = ingestion {
        lines.push(format!(
            "- Rows read: {} message, {} outcome",
            with_thousands(ingestion.message_rows_read),
            with_thousands(ingestion.outcome_rows_read)
        ));
    }
    lines.push(format!(
        "- Message rows: {} ({} merged)",
        with_thousands(merge.message_rows),
        with_thousands(merge.merged_rows)
    ));
    lines.push(format!(
        "- Outcome rows: {} ({} unique cases merged)",
        with_thousands(merge.outcome_rows),
        with_thousands(merge.unique_cases)
    ));
    lines.push(format!(
        "- Non-outbound rows skipped: {}",
        with_thousands(merge.non_outbound_messages)
    ));
    let mut warnings = ingestion.map(IngestionReport::warnings).unwrap_or_default();
    warnings.extend(merge.warnings());
    if warnings.is_empty() {
        lines.push("- No data-quality warnings".to_string());
    } else {
        for warning in warnings {
            lines.push(format!("- {warning}"));
        }
    }
    lines.push(String::new());
}

/// Render the Markdown report for a completed run.
pub fn render(run: &ScorecardRun, context: &ReportContext) -> String {
    let mut lines = Vec::new();
    header(&mut lines, context, run.period.as_ref());
    key_metrics(&mut lines, run);
    if run.ranked.is_empty() {
        lines.push(format!(
            "No actor met the {}-case minimum; no ranking was produced.",
            run.settings.min_cases
        ));
        lines.push(String::new());
    } else {
        top_performers(&mut lines, run);
        individual_analysis(&mut lines, run);
        distribution(&mut lines, run);
        insights(&mut lines, run);
        recommendations(&mut lines, run);
    }
    excluded(&mut lines, run);
    methodology(
        &mut lines,
        &run.settings,
        run.ingestion.as_ref(),
        &run.merge_report,
    );
    lines.push(
        "*Scores are computed deterministically from the supplied datasets.*".to_string(),
    );
    let mut report = lines.join("\n");
    report.push('\n');
    report
}

/// Run-level metadata in the data dump.
#[derive(Clone, Debug, Serialize)]
pub struct DumpMetadata<'a> {
    /// Render time.
    pub generated_at: DateTime<Utc>,
    /// `major.minor` version string.
    pub version: String,
    /// Actors in the ranking.
    pub ranked_actors: usize,
    /// Actors below the case minimum.
    pub excluded_actors: usize,
    /// Span of timestamped messages.
    pub analysis_period: Option<&'a AnalysisPeriod>,
    /// Settings that shaped the run.
    pub settings: &'a RunSettings,
}

/// Structured companion to the Markdown report.
#[derive(Clone, Debug, Serialize)]
pub struct ReportDump<'a> {
    /// Run-level metadata.
    pub metadata: DumpMetadata<'a>,
    /// Ranked actors keyed by label, in rank order.
    pub actors: IndexMap<String, &'a RankedActor>,
    /// Actors below the case minimum.
    pub excluded: &'a [ActorAggregate],
    /// Absent when the run was built from typed records directly.
    pub ingestion: Option<&'a IngestionReport>,
    /// Data-quality counts from the merge.
    pub merge_report: &'a MergeReport,
}

/// Build the data dump for a run.
pub fn dump<'a>(run: &'a ScorecardRun, context: &ReportContext) -> ReportDump<'a> {
    let mut actors = IndexMap::with_capacity(run.ranked.len());
    for entry in &run.ranked {
        let label = entry.score.actor.label();
        let key = if actors.contains_key(label) {
            format!("{label} (#{})", entry.score.rank)
        } else {
            label.to_string()
        };
        actors.insert(key, entry);
    }
    ReportDump {
        metadata: DumpMetadata {
            generated_at: context.generated_at,
            version: context.version.to_string(),
            ranked_actors: run.ranked.len(),
            excluded_actors: run.excluded.len(),
            analysis_period: run.period.as_ref(),
            settings: &run.settings,
        },
        actors,
        excluded: &run.excluded,
        ingestion: run.ingestion.as_ref(),
        merge_report: &run.merge_report,
    }
}

/// Serialize the data dump as pretty-printed JSON.
pub fn dump_json(run: &ScorecardRun, context: &ReportContext) -> Result<String, ScorecardError> {
    Ok(serde_json::to_string_pretty(&dump(run, context))?)
}
