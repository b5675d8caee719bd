#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

/// Per-actor roll-up of message quality and case outcomes.
pub mod aggregate;
/// Command-line runner shared by the `rep_scorecard` binary.
pub mod apps;
/// Pipeline configuration: rubrics, outcome curve, thresholds, columns.
pub mod config;
/// Centralized constants: sentinels, column names, rubric deltas, file layout.
pub mod constants;
/// Record, aggregate, and score types.
pub mod data;
/// Canonical actor reconciliation.
pub mod identity;
/// Dataset join, deduplication, and integrity gate.
pub mod merge;
/// Summary statistics and correlation helpers.
pub mod metrics;
/// End-to-end orchestration.
pub mod pipeline;
/// Composite scoring and ranking.
pub mod ranking;
/// Markdown report and JSON data dump.
pub mod report;
/// Message quality scoring.
pub mod scoring;
/// Tabular ingestion and schema validation.
pub mod source;
/// Versioned report persistence.
pub mod store;
/// Shared type aliases.
pub mod types;
/// Text normalization and phrase matching helpers.
pub mod utils;

mod errors;

pub use aggregate::{aggregate, Aggregation};
pub use config::{
    AssessmentThresholds, CallRubric, ColumnMapping, OutcomeCurve, OutcomeTier, PipelineConfig,
    ScoringRubrics, SmsRubric, VersioningConfig,
};
pub use data::{
    ActorAggregate, ActorScore, CanonicalActor, Channel, Direction, Grade, MergedRecord,
    MessageRecord, MessageScore, OutcomeRecord, SignalCount,
};
pub use errors::{IntegrityViolation, ScorecardError};
pub use merge::{merge, MergeOutput, MergeReport};
pub use pipeline::{Pipeline, RankedActor, RenderedReport, ScorecardRun};
pub use ranking::{outcome_score, rank};
pub use report::{assess, Assessment, ReportContext, ReportDump};
pub use scoring::{MessageEvaluator, QualityScorer};
pub use source::{load_json_lines, Datasets, IngestionReport, JsonLinesSource, TableSource};
pub use store::{FileReportStore, MemoryReportStore, ReportStore, ReportVersion, SavedReport};
pub use types::{ActorName, CaseId, SignalLabel};
