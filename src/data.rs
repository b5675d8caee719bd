use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;

use crate::constants::identity::{AUTOMATION_ACTOR_LABEL, UNKNOWN_ACTOR_LABEL};
use crate::metrics::SummaryStats;

pub use crate::types::{ActorName, CaseId, SignalLabel};

/// Message direction relative to the outreach team.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    /// Sent by the outreach team.
    Outbound,
    /// Sent by the contact.
    Inbound,
    /// Any other or missing direction value.
    Other,
}

impl Direction {
    /// Parse a raw direction value (case-insensitive).
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "outbound" => Direction::Outbound,
            "inbound" => Direction::Inbound,
            _ => Direction::Other,
        }
    }
}

/// Communication channel a message was sent on.
///
/// Each channel is scored by its own rubric; adding a channel means adding a
/// variant and an evaluator, not branching on type strings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    /// Text message.
    #[default]
    Sms,
    /// Call summary written after a phone call.
    Call,
}

impl Channel {
    /// Parse a raw channel/task-type value (case-insensitive).
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "sms" | "text" => Some(Channel::Sms),
            "call" | "phone" => Some(Channel::Call),
            _ => None,
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Channel::Sms => write!(f, "SMS"),
            Channel::Call => write!(f, "Call"),
        }
    }
}

/// One communication attempt as ingested from the message table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MessageRecord {
    /// Case the message belongs to.
    pub case_id: CaseId,
    /// Raw actor name (may be missing).
    pub raw_actor: Option<ActorName>,
    /// Free-text body (may be missing).
    pub text: Option<String>,
    /// Direction relative to the outreach team.
    pub direction: Direction,
    /// True when the record belongs to automated outreach.
    pub automation: bool,
    /// Channel used to pick the rubric.
    pub channel: Channel,
    /// Send time, when the source provides one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sent_at: Option<DateTime<Utc>>,
}

/// One case's terminal result as ingested from the outcome table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OutcomeRecord {
    /// Case the outcome closes.
    pub case_id: CaseId,
    /// Raw owner name (may be missing).
    pub raw_actor: Option<ActorName>,
    /// True when the case converted.
    pub success: bool,
    /// True when automated outreach owned the case.
    pub automation: bool,
}

/// Reconciled identity used for all aggregation.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum CanonicalActor {
    /// A named human actor.
    Named(ActorName),
    /// The automation sentinel.
    Automation,
    /// A human record without a usable name.
    Unknown,
}

impl CanonicalActor {
    /// Display label; also the identifier used for deterministic ordering.
    pub fn label(&self) -> &str {
        match self {
            CanonicalActor::Named(name) => name,
            CanonicalActor::Automation => AUTOMATION_ACTOR_LABEL,
            CanonicalActor::Unknown => UNKNOWN_ACTOR_LABEL,
        }
    }

    /// True for the automation sentinel.
    pub fn is_automation(&self) -> bool {
        matches!(self, CanonicalActor::Automation)
    }

    fn variant_rank(&self) -> u8 {
        match self {
            CanonicalActor::Named(_) => 0,
            CanonicalActor::Automation => 1,
            CanonicalActor::Unknown => 2,
        }
    }
}

impl Ord for CanonicalActor {
    fn cmp(&self, other: &Self) -> Ordering {
        self.label()
            .cmp(other.label())
            .then_with(|| self.variant_rank().cmp(&other.variant_rank()))
    }
}

impl PartialOrd for CanonicalActor {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for CanonicalActor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for CanonicalActor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// Outbound message joined to its case outcome.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MergedRecord {
    /// Case the message belongs to.
    pub case_id: CaseId,
    /// Outcome-side actor; authoritative for all aggregation.
    pub actor: CanonicalActor,
    /// Message-side actor, kept for re-attribution diagnostics.
    pub message_actor: CanonicalActor,
    /// Message body as sent.
    pub text: String,
    /// Channel used to pick the rubric.
    pub channel: Channel,
    /// Outcome of the message's case.
    pub success: bool,
    /// Send time, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sent_at: Option<DateTime<Utc>>,
}

/// Rubric result for a single message.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct MessageScore {
    /// `engagement + tone`, always within `0..=100`.
    pub total: u32,
    /// Engagement component, within `0..=50`.
    pub engagement: u32,
    /// Tone component, within `0..=50`.
    pub tone: u32,
    /// Rubric signals the message satisfied.
    pub matched_signals: Vec<SignalLabel>,
    /// Rubric signals the message violated.
    pub violated_signals: Vec<SignalLabel>,
}

/// Frequency of one signal label across an actor's messages.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SignalCount {
    /// Signal label as emitted by the rubric.
    pub label: SignalLabel,
    /// Messages carrying the label.
    pub count: usize,
}

/// Per-actor roll-up of case outcomes and message quality.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ActorAggregate {
    /// Actor the roll-up belongs to.
    pub actor: CanonicalActor,
    /// Distinct cases attributed to the actor.
    pub cases: usize,
    /// Distinct successful cases attributed to the actor.
    pub successes: usize,
    /// `successes / cases`, within `[0, 1]`.
    pub success_rate: f64,
    /// Scored outbound messages.
    pub messages: usize,
    /// Statistics over per-message totals.
    pub quality: SummaryStats,
    /// Mean engagement component.
    pub engagement_mean: f64,
    /// Mean tone component.
    pub tone_mean: f64,
    /// Most frequent matched signals, most common first.
    pub top_strengths: Vec<SignalCount>,
    /// Most frequent violated signals, most common first.
    pub top_issues: Vec<SignalCount>,
}

impl ActorAggregate {
    /// Success rate expressed in percent.
    pub fn success_rate_pct(&self) -> f64 {
        self.success_rate * 100.0
    }

    /// Average scored messages per case.
    pub fn messages_per_case(&self) -> f64 {
        if self.cases == 0 {
            0.0
        } else {
            self.messages as f64 / self.cases as f64
        }
    }
}

/// Grade category derived from the composite score.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Grade {
    /// Composite of 80 or more.
    Excellent,
    /// Composite from 70 up to 80.
    Good,
    /// Composite from 60 up to 70.
    Ok,
    /// Composite from 50 up to 60.
    Poor,
    /// Composite below 50.
    AttentionNeeded,
}

impl Grade {
    /// All grades from best to worst.
    pub const ALL: [Grade; 5] = [
        Grade::Excellent,
        Grade::Good,
        Grade::Ok,
        Grade::Poor,
        Grade::AttentionNeeded,
    ];

    /// Report label with the letter grade.
    pub fn label(self) -> &'static str {
        match self {
            Grade::Excellent => "Excellent (A)",
            Grade::Good => "Good (B)",
            Grade::Ok => "OK (C)",
            Grade::Poor => "Poor (D)",
            Grade::AttentionNeeded => "Attention Needed (F)",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Final ranked score for one qualifying actor.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ActorScore {
    /// Ranked actor.
    pub actor: CanonicalActor,
    /// Mean per-message quality score (`0..=100`).
    pub quality_score: f64,
    /// Success rate in percent.
    pub success_rate_pct: f64,
    /// Piecewise-transformed outcome score (uncapped).
    pub outcome_score: f64,
    /// Weighted sum of quality and outcome scores.
    pub composite: f64,
    /// 1-based rank; 1 is best.
    pub rank: usize,
    /// Share of ranked actors at or below this rank, in percent.
    pub percentile: f64,
    /// Grade band of the composite.
    pub grade: Grade,
}
