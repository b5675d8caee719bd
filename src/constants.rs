/// Sentinel labels produced by identity reconciliation.
pub mod identity {
    /// Canonical label for every record tagged as automated outreach.
    pub const AUTOMATION_ACTOR_LABEL: &str = "AI Agent";
    /// Canonical label for human records with no usable actor name.
    pub const UNKNOWN_ACTOR_LABEL: &str = "Unknown";
}

/// Default column names expected in the two input tables.
pub mod columns {
    /// Case identifier column (both tables).
    pub const CASE_ID: &str = "opportunity_uuid";
    /// Automation flag column (both tables).
    pub const AUTOMATION_FLAG: &str = "ai_agent_tag";
    /// Raw actor column in the message table.
    pub const MESSAGE_ACTOR: &str = "task_owner";
    /// Free-text body column in the message table.
    pub const MESSAGE_TEXT: &str = "message";
    /// Direction column in the message table.
    pub const MESSAGE_DIRECTION: &str = "direction";
    /// Optional channel column in the message table.
    pub const MESSAGE_CHANNEL: &str = "task_type";
    /// Optional timestamp column in the message table.
    pub const MESSAGE_SENT_AT: &str = "task_datetime_cst";
    /// Raw actor column in the outcome table.
    pub const OUTCOME_ACTOR: &str = "owner_name";
    /// Success flag column in the outcome table.
    pub const OUTCOME_SUCCESS: &str = "successful_conversion";

    /// Dataset label used in diagnostics for the message table.
    pub const MESSAGES_DATASET: &str = "messages";
    /// Dataset label used in diagnostics for the outcome table.
    pub const OUTCOMES_DATASET: &str = "outcomes";
}

/// Rubric baselines, bounds, and deltas for message quality scoring.
pub mod scoring {
    /// Starting value for both rubric components.
    pub const COMPONENT_BASELINE: i32 = 40;
    /// Upper bound for each rubric component.
    pub const COMPONENT_MAX: i32 = 50;

    /// Uppercase-letter share above which a message reads as shouting.
    pub const CAPS_RATIO_LIMIT: f64 = 0.3;
    /// Question marks tolerated before the excess penalty applies.
    pub const QUESTION_CAP: usize = 3;

    /// Engagement penalty below the minimum length.
    pub const SHORT_PENALTY: i32 = 20;
    /// Engagement bonus for a call to action.
    pub const CTA_BONUS: i32 = 8;
    /// Engagement penalty when no call to action is found.
    pub const CTA_MISSING_PENALTY: i32 = 10;
    /// Engagement bonus for asking at least one question.
    pub const QUESTION_BONUS: i32 = 5;
    /// Engagement penalty past the question cap.
    pub const QUESTION_EXCESS_PENALTY: i32 = 5;
    /// Engagement bonus for naming a concrete benefit.
    pub const VALUE_BONUS: i32 = 5;
    /// Engagement bonus for a conversational opener.
    pub const OPENER_BONUS: i32 = 3;
    /// Engagement bonus inside the ideal length band.
    pub const LENGTH_BAND_BONUS: i32 = 5;

    /// Tone penalty per unprofessional word.
    pub const UNPROFESSIONAL_PENALTY: i32 = 25;
    /// Tone penalty for a lowercase standalone `i`.
    pub const LOWERCASE_I_PENALTY: i32 = 3;
    /// Tone penalty for shouting.
    pub const CAPS_PENALTY: i32 = 10;
    /// Tone bonus for sentence case with closing punctuation.
    pub const FORMATTING_BONUS: i32 = 3;
    /// Tone bonus for helpful vocabulary.
    pub const SUPPORTIVE_BONUS: i32 = 5;
    /// Tone bonus for courtesy vocabulary.
    pub const COURTESY_BONUS: i32 = 3;

    /// Case-insensitive marker used by reps to exclude a row from QA.
    pub const IGNORE_MARKER: &str = "ignore for analysis";
}

/// Defaults for aggregation, composite weighting, and grading.
pub mod ranking {
    /// Minimum distinct cases an actor needs to be ranked.
    pub const DEFAULT_MIN_CASES: usize = 100;
    /// Weight applied to the mean message quality score.
    pub const QUALITY_WEIGHT: f64 = 0.4;
    /// Weight applied to the transformed outcome score.
    pub const OUTCOME_WEIGHT: f64 = 0.6;
    /// Number of signal labels surfaced per actor and polarity.
    pub const TOP_SIGNAL_COUNT: usize = 5;

    /// Composite at or above this grades A.
    pub const GRADE_EXCELLENT: f64 = 80.0;
    /// Composite at or above this grades B.
    pub const GRADE_GOOD: f64 = 70.0;
    /// Composite at or above this grades C.
    pub const GRADE_OK: f64 = 60.0;
    /// Composite at or above this grades D; below is F.
    pub const GRADE_POOR: f64 = 50.0;
}

/// Report layout and versioned file naming.
pub mod report {
    /// Default prefix for versioned report files.
    pub const DEFAULT_PREFIX: &str = "rep_scorecard";
    /// Default output directory for the CLI.
    pub const DEFAULT_OUTPUT_DIR: &str = "reports";
    /// Marker between prefix and version in file names.
    pub const VERSION_MARKER: &str = "_v";
    /// Infix between prefix and the version marker for data dumps.
    pub const DATA_INFIX: &str = "_data";
    /// Extension used for Markdown reports.
    pub const REPORT_EXTENSION: &str = "md";
    /// Extension used for structured dumps.
    pub const DATA_EXTENSION: &str = "json";
    /// Major version assigned when no prior report exists.
    pub const DEFAULT_MAJOR: u32 = 1;
    /// Minor-version increment between consecutive runs.
    pub const DEFAULT_MINOR_STEP: u32 = 1;
    /// Share of ranked actors shown in the top-performer section.
    pub const TOP_PERFORMER_SHARE: f64 = 0.2;
    /// Minimum size of the top-performer section.
    pub const TOP_PERFORMER_MIN: usize = 5;
}
