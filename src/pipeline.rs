//! End-to-end orchestration: merge, aggregate, rank, assess, publish.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use tracing::info;

use crate::aggregate::{aggregate, Aggregation};
use crate::config::{AssessmentThresholds, OutcomeCurve, PipelineConfig};
use crate::data::{
    ActorAggregate, ActorScore, CanonicalActor, Channel, MergedRecord, MessageRecord,
    OutcomeRecord,
};
use crate::errors::ScorecardError;
use crate::merge::{merge, MergeReport};
use crate::ranking::rank;
use crate::report::{assess, dump_json, render, Assessment, ReportContext};
use crate::scoring::QualityScorer;
use crate::source::{Datasets, IngestionReport};
use crate::store::{ReportStore, ReportVersion, SavedReport};

/// One ranked actor with everything the report says about it.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RankedActor {
    /// Composite score, rank, and grade.
    pub score: ActorScore,
    /// Per-actor roll-up the score came from.
    pub aggregate: ActorAggregate,
    /// Narrative strengths and improvements.
    pub assessment: Assessment,
}

/// Earliest and latest merged message timestamps.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct AnalysisPeriod {
    /// Earliest timestamp.
    pub start: DateTime<Utc>,
    /// Latest timestamp.
    pub end: DateTime<Utc>,
}

impl AnalysisPeriod {
    /// Span of the timestamped records, if any carry a timestamp.
    pub fn from_records(records: &[MergedRecord]) -> Option<Self> {
        let mut stamps = records.iter().filter_map(|record| record.sent_at);
        let first = stamps.next()?;
        let (start, end) = stamps.fold((first, first), |(start, end), stamp| {
            (start.min(stamp), end.max(stamp))
        });
        Some(Self { start, end })
    }
}

/// Settings that shaped a run, echoed in the report and dump.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RunSettings {
    /// Minimum distinct cases for ranking.
    pub min_cases: usize,
    /// Weight of the quality score.
    pub quality_weight: f64,
    /// Weight of the outcome score.
    pub outcome_weight: f64,
    /// Rubric for messages without a channel.
    pub default_channel: Channel,
    /// Success-rate transform.
    pub outcome_curve: OutcomeCurve,
    /// Assessment thresholds.
    pub assessment: AssessmentThresholds,
}

impl RunSettings {
    fn from_config(config: &PipelineConfig) -> Self {
        Self {
            min_cases: config.min_cases,
            quality_weight: config.quality_weight,
            outcome_weight: config.outcome_weight,
            default_channel: config.default_channel,
            outcome_curve: config.outcome_curve.clone(),
            assessment: config.assessment.clone(),
        }
    }
}

/// Result of a pipeline run, before rendering.
#[derive(Clone, Debug, PartialEq)]
pub struct ScorecardRun {
    /// Qualifying actors in rank order.
    pub ranked: Vec<RankedActor>,
    /// Actors below the minimum-case threshold.
    pub excluded: Vec<ActorAggregate>,
    /// Data-quality counts from the merge.
    pub merge_report: MergeReport,
    /// Row-level counts from loading, when the run started from raw tables.
    pub ingestion: Option<IngestionReport>,
    /// Span of timestamped messages.
    pub period: Option<AnalysisPeriod>,
    /// Settings echoed in the report.
    pub settings: RunSettings,
}

/// Rendered report and data dump, ready to store.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderedReport {
    /// Version and generation time.
    pub context: ReportContext,
    /// Markdown report body.
    pub markdown: String,
    /// Pretty-printed JSON dump.
    pub data: String,
}

/// Batch scorecard pipeline over one pair of datasets.
#[derive(Clone, Debug)]
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Build a pipeline after validating `config`.
    pub fn new(config: PipelineConfig) -> Result<Self, ScorecardError> {
        Ok(Self {
            config: config.validated()?,
        })
    }

    /// Validated configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Merge, validate, aggregate, and rank.
    ///
    /// Pure over its inputs: the same records always produce the same run.
    /// Integrity violations abort before any ranking is produced.
    pub fn run(
        &self,
        messages: &[MessageRecord],
        outcomes: &[OutcomeRecord],
    ) -> Result<ScorecardRun, ScorecardError> {
        let merged = merge(messages, outcomes, self.config.ignore_marker.as_deref())?;
        let scorer = QualityScorer::new(&self.config.rubrics);
        let Aggregation {
            qualifying,
            excluded,
        } = aggregate(
            &merged.records,
            &scorer,
            self.config.min_cases,
            self.config.top_signal_count,
        );
        let scores = rank(&qualifying, &self.config);
        let ranked_count = scores.len();
        let mut by_actor: HashMap<CanonicalActor, ActorAggregate> = qualifying
            .into_iter()
            .map(|aggregate| (aggregate.actor.clone(), aggregate))
            .collect();
        let ranked: Vec<RankedActor> = scores
            .into_iter()
            .filter_map(|score| {
                let aggregate = by_actor.remove(&score.actor)?;
                let assessment =
                    assess(&score, &aggregate, ranked_count, &self.config.assessment);
                Some(RankedActor {
                    score,
                    aggregate,
                    assessment,
                })
            })
            .collect();
        if let Some(leader) = ranked.first() {
            info!(
                "[scorecard:pipeline] ranked {} actor(s); leader '{}' at {:.1}",
                ranked.len(),
                leader.score.actor,
                leader.score.composite
            );
        } else {
            info!("[scorecard:pipeline] no actor met the minimum case threshold");
        }
        Ok(ScorecardRun {
            ranked,
            excluded,
            period: AnalysisPeriod::from_records(&merged.records),
            merge_report: merged.report,
            ingestion: None,
            settings: RunSettings::from_config(&self.config),
        })
    }

    /// Run over loaded datasets, carrying their ingestion counts into the report.
    pub fn run_datasets(&self, datasets: &Datasets) -> Result<ScorecardRun, ScorecardError> {
        let mut run = self.run(&datasets.messages, &datasets.outcomes)?;
        run.ingestion = Some(datasets.ingestion.clone());
        Ok(run)
    }

    /// Render the report and dump for an explicit version.
    pub fn render(
        &self,
        run: &ScorecardRun,
        version: ReportVersion,
        generated_at: DateTime<Utc>,
    ) -> Result<RenderedReport, ScorecardError> {
        let context = ReportContext {
            generated_at,
            version,
        };
        Ok(RenderedReport {
            markdown: render(run, &context),
            data: dump_json(run, &context)?,
            context,
        })
    }

    /// Render against the next free version in `store` without writing.
    pub fn preview<S: ReportStore + ?Sized>(
        &self,
        run: &ScorecardRun,
        store: &S,
        generated_at: DateTime<Utc>,
    ) -> Result<RenderedReport, ScorecardError> {
        let version = store.next_version(&self.config.versioning)?;
        self.render(run, version, generated_at)
    }

    /// Render and persist under the next free version.
    pub fn publish<S: ReportStore + ?Sized>(
        &self,
        run: &ScorecardRun,
        store: &mut S,
        generated_at: DateTime<Utc>,
    ) -> Result<SavedReport, ScorecardError> {
        let rendered = self.preview(run, store, generated_at)?;
        store.save(
            &self.config.versioning,
            rendered.context.version,
            &rendered.markdown,
            &rendered.data,
        )
    }
}
