use serde::Serialize;
use std::borrow::Cow;

use crate::constants::columns::{
    AUTOMATION_FLAG, CASE_ID, MESSAGE_ACTOR, MESSAGE_CHANNEL, MESSAGE_DIRECTION, MESSAGE_SENT_AT,
    MESSAGE_TEXT, OUTCOME_ACTOR, OUTCOME_SUCCESS,
};
use crate::constants::ranking::{
    DEFAULT_MIN_CASES, OUTCOME_WEIGHT, QUALITY_WEIGHT, TOP_SIGNAL_COUNT,
};
use crate::constants::report::{DEFAULT_MAJOR, DEFAULT_MINOR_STEP, DEFAULT_PREFIX};
use crate::constants::scoring::IGNORE_MARKER;
use crate::data::Channel;
use crate::errors::ScorecardError;

/// Rubric vocabulary entry list.
pub type PhraseList = Vec<Cow<'static, str>>;

fn phrases(list: &[&'static str]) -> PhraseList {
    list.iter().map(|phrase| Cow::Borrowed(*phrase)).collect()
}

/// Acceptable message length band for a rubric (in characters).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LengthBand {
    /// Below this length the message is penalized as too short.
    pub too_short: usize,
    /// Above this length the message is penalized as too long.
    pub too_long: usize,
    /// Inclusive lower bound of the bonus band.
    pub ideal_min: usize,
    /// Inclusive upper bound of the bonus band.
    pub ideal_max: usize,
    /// Penalty applied above `too_long`.
    pub too_long_penalty: i32,
}

/// Vocabulary and length policy for SMS messages.
#[derive(Clone, Debug)]
pub struct SmsRubric {
    /// Length band for SMS bodies.
    pub length: LengthBand,
    /// Call-to-action phrases.
    pub call_to_action: PhraseList,
    /// Value-proposition vocabulary.
    pub value: PhraseList,
    /// Conversational/personal openers.
    pub openers: PhraseList,
    /// Unprofessional vocabulary; penalized per occurrence.
    pub unprofessional: PhraseList,
    /// Aggressive or pressuring phrases; penalized per phrase.
    pub aggressive: PhraseList,
    /// Helpful/supportive vocabulary.
    pub supportive: PhraseList,
    /// Courtesy vocabulary.
    pub courtesy: PhraseList,
    /// Penalty applied per aggressive phrase.
    pub aggressive_penalty: i32,
}

impl Default for SmsRubric {
    fn default() -> Self {
        Self {
            length: LengthBand {
                too_short: 10,
                too_long: 300,
                ideal_min: 50,
                ideal_max: 200,
                too_long_penalty: 15,
            },
            call_to_action: phrases(&[
                "ready",
                "start",
                "begin",
                "try",
                "tried",
                "trying",
                "deliver",
                "delivery",
                "deliveries",
                "dash",
                "dasher",
                "dashing",
                "sign up",
                "apply",
                "join",
                "interested",
                "want to",
                "can you",
                "would you",
            ]),
            value: phrases(&[
                "earn",
                "earning",
                "earnings",
                "money",
                "income",
                "flexible",
                "schedule",
                "tips",
                "delivery",
                "deliveries",
                "opportunity",
                "benefits",
                "pay",
                "pays",
                "paid",
                "paying",
            ]),
            openers: phrases(&[
                "hi",
                "hey",
                "hello",
                "good morning",
                "good afternoon",
                "hope you",
                "how are",
            ]),
            unprofessional: phrases(&["damn", "hell", "shit", "fuck", "crap", "stupid", "dumb"]),
            aggressive: phrases(&[
                "you need to",
                "you must",
                "immediately",
                "right now",
                "asap",
                "hurry up",
                "final notice",
            ]),
            supportive: phrases(&[
                "help",
                "support",
                "assist",
                "guide",
                "answer",
                "explain",
                "understand",
                "happy to",
                "glad to",
            ]),
            courtesy: phrases(&["thanks", "thank you", "please", "appreciate"]),
            aggressive_penalty: 15,
        }
    }
}

/// Vocabulary and length policy for call summaries.
#[derive(Clone, Debug)]
pub struct CallRubric {
    /// Length band for call summaries.
    pub length: LengthBand,
    /// Next-step/action phrases.
    pub action: PhraseList,
    /// Follow-up commitments.
    pub follow_up: PhraseList,
    /// Benefit vocabulary.
    pub benefit: PhraseList,
    /// Personal address vocabulary.
    pub personal: PhraseList,
    /// Unprofessional vocabulary; penalized per occurrence.
    pub unprofessional: PhraseList,
    /// Urgency/pressure phrases; penalized per phrase.
    pub urgency: PhraseList,
    /// Positive vocabulary.
    pub positive: PhraseList,
    /// Penalty applied per urgency phrase.
    pub urgency_penalty: i32,
}

impl Default for CallRubric {
    fn default() -> Self {
        Self {
            length: LengthBand {
                too_short: 20,
                too_long: 600,
                ideal_min: 80,
                ideal_max: 400,
                too_long_penalty: 10,
            },
            action: phrases(&[
                "start",
                "begin",
                "try",
                "test",
                "schedule",
                "scheduled",
                "book",
                "booked",
                "set up",
            ]),
            follow_up: phrases(&[
                "follow up",
                "followed up",
                "following up",
                "check in",
                "touch base",
                "call back",
                "callback",
            ]),
            benefit: phrases(&[
                "save", "earn", "benefit", "benefits", "money", "income", "profit", "bonus",
            ]),
            personal: phrases(&["you", "your", "specifically", "personally", "custom"]),
            unprofessional: phrases(&["damn", "hell", "shit", "fuck", "crap", "stupid", "dumb"]),
            urgency: phrases(&["immediately", "asap", "urgent", "right now"]),
            positive: phrases(&[
                "great",
                "excellent",
                "perfect",
                "awesome",
                "fantastic",
                "amazing",
            ]),
            urgency_penalty: 10,
        }
    }
}

/// Rubrics for every supported channel.
#[derive(Clone, Debug, Default)]
pub struct ScoringRubrics {
    /// Rubric for SMS messages.
    pub sms: SmsRubric,
    /// Rubric for call summaries.
    pub call: CallRubric,
}

/// One multiplier tier of the outcome transform.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct OutcomeTier {
    /// Inclusive upper bound of the tier, in percent.
    pub upper_pct: f64,
    /// Multiplier applied to the rate inside this tier.
    pub multiplier: f64,
}

/// Piecewise success-rate-to-score transform.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct OutcomeCurve {
    /// Rates at or below this percentage score zero.
    pub floor_pct: f64,
    /// Ascending tiers applied above the floor.
    pub tiers: Vec<OutcomeTier>,
    /// Multiplier above the last tier; intentionally uncapped.
    pub top_multiplier: f64,
}

impl Default for OutcomeCurve {
    fn default() -> Self {
        Self {
            floor_pct: 10.0,
            tiers: vec![
                OutcomeTier {
                    upper_pct: 20.0,
                    multiplier: 1.75,
                },
                OutcomeTier {
                    upper_pct: 30.0,
                    multiplier: 2.0,
                },
                OutcomeTier {
                    upper_pct: 33.0,
                    multiplier: 2.1,
                },
            ],
            top_multiplier: 2.2,
        }
    }
}

/// Thresholds driving strengths/improvements in the narrative report.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AssessmentThresholds {
    /// Quality at or above this reads as excellent.
    pub excellent_quality: f64,
    /// Quality at or above this reads as good.
    pub good_quality: f64,
    /// Quality below this needs immediate attention.
    pub ok_quality: f64,
    /// Success rate (percent) at or above this reads as outstanding.
    pub excellent_outcome_pct: f64,
    /// Success rate at or above this reads as strong.
    pub good_outcome_pct: f64,
    /// Success rate below this needs immediate attention.
    pub ok_outcome_pct: f64,
    /// Quality std below which an actor counts as consistent.
    pub consistent_std: f64,
    /// Quality std above which an actor counts as inconsistent.
    pub inconsistent_std: f64,
    /// Rank share counted as top tier (`rank <= n * share`).
    pub top_share: f64,
    /// Rank share beyond which an actor is bottom tier (`rank > n * share`).
    pub bottom_share: f64,
    /// Case count above which an actor is a high-volume performer.
    pub high_volume_cases: usize,
    /// Messages per case above which follow-up counts as strong.
    pub engaged_messages_per_case: f64,
    /// Messages per case below which follow-up counts as thin.
    pub low_follow_up_messages_per_case: f64,
}

impl Default for AssessmentThresholds {
    fn default() -> Self {
        Self {
            excellent_quality: 85.0,
            good_quality: 70.0,
            ok_quality: 50.0,
            excellent_outcome_pct: 50.0,
            good_outcome_pct: 40.0,
            ok_outcome_pct: 33.0,
            consistent_std: 15.0,
            inconsistent_std: 25.0,
            top_share: 0.2,
            bottom_share: 0.8,
            high_volume_cases: 200,
            engaged_messages_per_case: 2.0,
            low_follow_up_messages_per_case: 1.5,
        }
    }
}

/// Column names for the message table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MessageColumns {
    /// Case id column.
    pub case_id: Cow<'static, str>,
    /// Sending actor column.
    pub actor: Cow<'static, str>,
    /// Message body column.
    pub text: Cow<'static, str>,
    /// Direction column (`outbound`, `inbound`).
    pub direction: Cow<'static, str>,
    /// Automation flag column.
    pub automation: Cow<'static, str>,
    /// Optional; rows without it use the configured default channel.
    pub channel: Cow<'static, str>,
    /// Optional send timestamp.
    pub sent_at: Cow<'static, str>,
}

impl Default for MessageColumns {
    fn default() -> Self {
        Self {
            case_id: CASE_ID.into(),
            actor: MESSAGE_ACTOR.into(),
            text: MESSAGE_TEXT.into(),
            direction: MESSAGE_DIRECTION.into(),
            automation: AUTOMATION_FLAG.into(),
            channel: MESSAGE_CHANNEL.into(),
            sent_at: MESSAGE_SENT_AT.into(),
        }
    }
}

impl MessageColumns {
    /// Columns that must be present before ingestion starts.
    pub fn required(&self) -> [&str; 5] {
        [
            &self.case_id,
            &self.actor,
            &self.text,
            &self.direction,
            &self.automation,
        ]
    }
}

/// Column names for the outcome table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutcomeColumns {
    /// Case id column.
    pub case_id: Cow<'static, str>,
    /// Owning actor column.
    pub actor: Cow<'static, str>,
    /// Success flag column.
    pub success: Cow<'static, str>,
    /// Automation flag column.
    pub automation: Cow<'static, str>,
}

impl Default for OutcomeColumns {
    fn default() -> Self {
        Self {
            case_id: CASE_ID.into(),
            actor: OUTCOME_ACTOR.into(),
            success: OUTCOME_SUCCESS.into(),
            automation: AUTOMATION_FLAG.into(),
        }
    }
}

impl OutcomeColumns {
    /// Columns that must be present before ingestion starts.
    pub fn required(&self) -> [&str; 4] {
        [&self.case_id, &self.actor, &self.success, &self.automation]
    }
}

/// Column mapping for both input tables.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ColumnMapping {
    /// Message table columns.
    pub messages: MessageColumns,
    /// Outcome table columns.
    pub outcomes: OutcomeColumns,
}

/// Versioned output naming.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VersioningConfig {
    /// File name prefix (`<prefix>_v<major>.<minor>.md`).
    pub prefix: Cow<'static, str>,
    /// Major version used when no newer report exists.
    pub major: u32,
    /// Minor increment between runs.
    pub minor_step: u32,
}

impl Default for VersioningConfig {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_PREFIX.into(),
            major: DEFAULT_MAJOR,
            minor_step: DEFAULT_MINOR_STEP,
        }
    }
}

/// Top-level pipeline configuration.
#[derive(Clone, Debug)]
pub struct PipelineConfig {
    /// Minimum distinct cases an actor needs to appear in the ranking.
    pub min_cases: usize,
    /// Weight of the mean quality score in the composite.
    pub quality_weight: f64,
    /// Weight of the outcome score in the composite.
    pub outcome_weight: f64,
    /// Number of top strengths/issues kept per actor.
    pub top_signal_count: usize,
    /// Channel assumed for messages without a channel column value.
    pub default_channel: Channel,
    /// Messages containing this marker (case-insensitive) are skipped.
    pub ignore_marker: Option<Cow<'static, str>>,
    /// Per-channel message rubrics.
    pub rubrics: ScoringRubrics,
    /// Success-rate transform.
    pub outcome_curve: OutcomeCurve,
    /// Narrative assessment thresholds.
    pub assessment: AssessmentThresholds,
    /// Input column names.
    pub columns: ColumnMapping,
    /// Output file naming and versioning.
    pub versioning: VersioningConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            min_cases: DEFAULT_MIN_CASES,
            quality_weight: QUALITY_WEIGHT,
            outcome_weight: OUTCOME_WEIGHT,
            top_signal_count: TOP_SIGNAL_COUNT,
            default_channel: Channel::Sms,
            ignore_marker: Some(IGNORE_MARKER.into()),
            rubrics: ScoringRubrics::default(),
            outcome_curve: OutcomeCurve::default(),
            assessment: AssessmentThresholds::default(),
            columns: ColumnMapping::default(),
            versioning: VersioningConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Validate weights, the outcome curve, and versioning settings.
    pub fn validated(self) -> Result<Self, ScorecardError> {
        let curve = &self.outcome_curve;
        let numbers = [
            ("quality weight", self.quality_weight),
            ("outcome weight", self.outcome_weight),
            ("outcome floor", curve.floor_pct),
            ("top outcome multiplier", curve.top_multiplier),
        ]
        .into_iter()
        .chain(curve.tiers.iter().flat_map(|tier| {
            [
                ("outcome tier bound", tier.upper_pct),
                ("outcome tier multiplier", tier.multiplier),
            ]
        }));
        for (name, value) in numbers {
            if !value.is_finite() {
                return Err(ScorecardError::Configuration(format!(
                    "{name} must be a finite number, got {value}"
                )));
            }
        }
        if self.quality_weight < 0.0 || self.outcome_weight < 0.0 {
            return Err(ScorecardError::Configuration(
                "composite weights must be non-negative".to_string(),
            ));
        }
        if (self.quality_weight + self.outcome_weight - 1.0).abs() > 1e-6 {
            return Err(ScorecardError::Configuration(
                "composite weights must sum to 1.0".to_string(),
            ));
        }
        let mut previous = curve.floor_pct;
        for tier in &curve.tiers {
            if tier.upper_pct <= previous {
                return Err(ScorecardError::Configuration(format!(
                    "outcome tiers must ascend above the floor (tier upper bound {} <= {})",
                    tier.upper_pct, previous
                )));
            }
            if tier.multiplier < 0.0 {
                return Err(ScorecardError::Configuration(
                    "outcome multipliers must be non-negative".to_string(),
                ));
            }
            previous = tier.upper_pct;
        }
        if curve.top_multiplier < 0.0 {
            return Err(ScorecardError::Configuration(
                "outcome multipliers must be non-negative".to_string(),
            ));
        }
        if self.versioning.minor_step == 0 {
            return Err(ScorecardError::Configuration(
                "version minor step must be greater than zero".to_string(),
            ));
        }
        let prefix = self.versioning.prefix.as_ref();
        if prefix.is_empty() || prefix.contains(|c: char| c == '/' || c == '\\') {
            return Err(ScorecardError::Configuration(format!(
                "report prefix '{prefix}' must be a non-empty file name"
            )));
        }
        Ok(self)
    }
}
