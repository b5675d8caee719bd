//! Message quality rubric evaluation.
//!
//! Every message is scored on two components, engagement and tone, each
//! starting from a fixed baseline, adjusted by rubric deltas, and clamped to
//! `0..=50`. The total is their sum. Evaluation is a pure function of the
//! text: no state, no randomness. Missing or blank text scores zero with no
//! signals.

use std::borrow::Cow;

use crate::config::{CallRubric, LengthBand, ScoringRubrics, SmsRubric};
use crate::constants::scoring::{
    CAPS_PENALTY, CAPS_RATIO_LIMIT, COMPONENT_BASELINE, COMPONENT_MAX, COURTESY_BONUS, CTA_BONUS,
    CTA_MISSING_PENALTY, FORMATTING_BONUS, LENGTH_BAND_BONUS, LOWERCASE_I_PENALTY, OPENER_BONUS,
    QUESTION_BONUS, QUESTION_CAP, QUESTION_EXCESS_PENALTY, SHORT_PENALTY, SUPPORTIVE_BONUS,
    UNPROFESSIONAL_PENALTY, VALUE_BONUS,
};
use crate::data::{Channel, MessageScore};
use crate::types::SignalLabel;
use crate::utils::{
    is_sentence_formatted, lowercase_pronoun_only, uppercase_ratio, TextMatcher, WordMatch,
};

/// Scores one message for a specific channel.
pub trait MessageEvaluator {
    /// Channel this evaluator is responsible for.
    fn channel(&self) -> Channel;
    /// Score `text`; `None` or blank text yields the zero score.
    fn evaluate(&self, text: Option<&str>) -> MessageScore;
}

/// Running component totals and signal evidence for one message.
#[derive(Debug)]
struct RubricTally {
    engagement: i32,
    tone: i32,
    matched: Vec<SignalLabel>,
    violated: Vec<SignalLabel>,
}

impl RubricTally {
    fn new() -> Self {
        Self {
            engagement: COMPONENT_BASELINE,
            tone: COMPONENT_BASELINE,
            matched: Vec::new(),
            violated: Vec::new(),
        }
    }

    fn engagement(&mut self, delta: i32, label: impl Into<SignalLabel>) {
        self.engagement += delta;
        self.record(delta, label);
    }

    fn tone(&mut self, delta: i32, label: impl Into<SignalLabel>) {
        self.tone += delta;
        self.record(delta, label);
    }

    fn record(&mut self, delta: i32, label: impl Into<SignalLabel>) {
        if delta >= 0 {
            self.matched.push(label.into());
        } else {
            self.violated.push(label.into());
        }
    }

    fn length(&mut self, len: usize, band: &LengthBand) {
        if len < band.too_short {
            self.engagement(-SHORT_PENALTY, "Message too short");
        } else if len > band.too_long {
            self.engagement(
                -band.too_long_penalty,
                format!("Message exceeds {} character limit", band.too_long),
            );
        } else if (band.ideal_min..=band.ideal_max).contains(&len) {
            self.engagement(LENGTH_BAND_BONUS, "Optimal message length");
        }
    }

    fn unprofessional(&mut self, matcher: &TextMatcher, vocabulary: &[Cow<'static, str>]) {
        for word in vocabulary {
            for _ in 0..matcher.count_phrase(word, WordMatch::Exact) {
                self.tone(
                    -UNPROFESSIONAL_PENALTY,
                    format!("Unprofessional language: {word}"),
                );
            }
        }
    }

    fn presentation(&mut self, text: &str) {
        if uppercase_ratio(text) > CAPS_RATIO_LIMIT {
            self.tone(-CAPS_PENALTY, "Excessive capitalization");
        }
        if is_sentence_formatted(text) {
            self.tone(FORMATTING_BONUS, "Professional formatting");
        }
    }

    fn finish(self) -> MessageScore {
        let engagement = self.engagement.clamp(0, COMPONENT_MAX) as u32;
        let tone = self.tone.clamp(0, COMPONENT_MAX) as u32;
        MessageScore {
            total: engagement + tone,
            engagement,
            tone,
            matched_signals: self.matched,
            violated_signals: self.violated,
        }
    }
}

/// Text as sent; whitespace only decides blankness.
fn non_blank(text: Option<&str>) -> Option<&str> {
    text.filter(|text| !text.trim().is_empty())
}

/// Rubric evaluator for outbound SMS messages.
#[derive(Clone, Copy, Debug)]
pub struct SmsEvaluator<'a> {
    rubric: &'a SmsRubric,
}

impl<'a> SmsEvaluator<'a> {
    /// Evaluator over `rubric`.
    pub fn new(rubric: &'a SmsRubric) -> Self {
        Self { rubric }
    }
}

impl MessageEvaluator for SmsEvaluator<'_> {
    fn channel(&self) -> Channel {
        Channel::Sms
    }

    fn evaluate(&self, text: Option<&str>) -> MessageScore {
        let Some(text) = non_blank(text) else {
            return MessageScore::default();
        };
        let rubric = self.rubric;
        let matcher = TextMatcher::new(text);
        let mut tally = RubricTally::new();

        tally.length(text.chars().count(), &rubric.length);
        if matcher.first_match(&rubric.call_to_action).is_some() {
            tally.engagement(CTA_BONUS, "Contains clear call-to-action");
        } else {
            tally.engagement(-CTA_MISSING_PENALTY, "Missing clear call-to-action");
        }
        let questions = text.matches('?').count();
        if questions >= 1 {
            tally.engagement(QUESTION_BONUS, "Engages with questions");
        }
        if questions > QUESTION_CAP {
            tally.engagement(-QUESTION_EXCESS_PENALTY, "Too many questions");
        }
        if matcher.first_match(&rubric.value).is_some() {
            tally.engagement(VALUE_BONUS, "Mentions value proposition");
        }
        if matcher.first_match(&rubric.openers).is_some() {
            tally.engagement(OPENER_BONUS, "Personal, conversational tone");
        }

        tally.unprofessional(&matcher, &rubric.unprofessional);
        for phrase in matcher.matches(&rubric.aggressive) {
            tally.tone(
                -rubric.aggressive_penalty,
                format!("Aggressive tone: {phrase}"),
            );
        }
        if lowercase_pronoun_only(text) {
            tally.tone(-LOWERCASE_I_PENALTY, "Grammar: lowercase 'i'");
        }
        tally.presentation(text);
        if matcher.first_match(&rubric.supportive).is_some() {
            tally.tone(SUPPORTIVE_BONUS, "Helpful and supportive tone");
        }
        if matcher.first_match(&rubric.courtesy).is_some() {
            tally.tone(COURTESY_BONUS, "Courteous tone");
        }

        tally.finish()
    }
}

/// Rubric evaluator for call summaries.
#[derive(Clone, Copy, Debug)]
pub struct CallEvaluator<'a> {
    rubric: &'a CallRubric,
}

impl<'a> CallEvaluator<'a> {
    /// Evaluator over `rubric`.
    pub fn new(rubric: &'a CallRubric) -> Self {
        Self { rubric }
    }
}

impl MessageEvaluator for CallEvaluator<'_> {
    fn channel(&self) -> Channel {
        Channel::Call
    }

    fn evaluate(&self, text: Option<&str>) -> MessageScore {
        let Some(text) = non_blank(text) else {
            return MessageScore::default();
        };
        let rubric = self.rubric;
        let matcher = TextMatcher::new(text);
        let mut tally = RubricTally::new();

        tally.length(text.chars().count(), &rubric.length);
        if matcher.first_match(&rubric.action).is_some() {
            tally.engagement(CTA_BONUS, "Sets a clear next step");
        } else {
            tally.engagement(-CTA_MISSING_PENALTY, "Missing clear next step");
        }
        if matcher.first_match(&rubric.follow_up).is_some() {
            tally.engagement(QUESTION_BONUS, "Commits to follow-up");
        }
        if matcher.first_match(&rubric.benefit).is_some() {
            tally.engagement(VALUE_BONUS, "Mentions benefits");
        }
        if matcher.first_match(&rubric.personal).is_some() {
            tally.engagement(OPENER_BONUS, "Personal address");
        }

        tally.unprofessional(&matcher, &rubric.unprofessional);
        for phrase in matcher.matches(&rubric.urgency) {
            tally.tone(
                -rubric.urgency_penalty,
                format!("Pressure language: {phrase}"),
            );
        }
        tally.presentation(text);
        if matcher.first_match(&rubric.positive).is_some() {
            tally.tone(SUPPORTIVE_BONUS, "Positive framing");
        }

        tally.finish()
    }
}

/// Channel-dispatching scorer built from the configured rubrics.
#[derive(Clone, Copy, Debug)]
pub struct QualityScorer<'a> {
    sms: SmsEvaluator<'a>,
    call: CallEvaluator<'a>,
}

impl<'a> QualityScorer<'a> {
    /// One evaluator per channel, borrowing `rubrics`.
    pub fn new(rubrics: &'a ScoringRubrics) -> Self {
        Self {
            sms: SmsEvaluator::new(&rubrics.sms),
            call: CallEvaluator::new(&rubrics.call),
        }
    }

    /// Evaluator responsible for `channel`.
    pub fn evaluator(&self, channel: Channel) -> &dyn MessageEvaluator {
        match channel {
            Channel::Sms => &self.sms,
            Channel::Call => &self.call,
        }
    }

    /// Score `text` with the rubric for `channel`.
    pub fn score(&self, channel: Channel, text: Option<&str>) -> MessageScore {
        self.evaluator(channel).evaluate(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sms(text: &str) -> MessageScore {
        let rubrics = ScoringRubrics::default();
        QualityScorer::new(&rubrics).score(Channel::Sms, Some(text))
    }

    fn call(text: &str) -> MessageScore {
        let rubrics = ScoringRubrics::default();
        QualityScorer::new(&rubrics).score(Channel::Call, Some(text))
    }

    #[test]
    fn polite_call_to_action_scores_high() {
        let score = sms("Thanks! Can you make a delivery this week?");
        assert_eq!(score.engagement, 50);
        assert_eq!(score.tone, 46);
        assert_eq!(score.total, 96);
        assert!(score.violated_signals.is_empty());
        assert!(score
            .matched_signals
            .contains(&"Contains clear call-to-action".to_string()));
        assert!(score.matched_signals.contains(&"Courteous tone".to_string()));
    }

    #[test]
    fn shouting_pressure_zeroes_tone() {
        let score = sms("YOU MUST START IMMEDIATELY");
        assert_eq!(score.tone, 0);
        assert_eq!(score.engagement, 48);
        assert_eq!(score.total, 48);
        assert!(score
            .violated_signals
            .contains(&"Aggressive tone: you must".to_string()));
        assert!(score
            .violated_signals
            .contains(&"Aggressive tone: immediately".to_string()));
        assert!(score
            .violated_signals
            .contains(&"Excessive capitalization".to_string()));
    }

    #[test]
    fn empty_and_missing_text_score_zero_without_signals() {
        let rubrics = ScoringRubrics::default();
        let scorer = QualityScorer::new(&rubrics);
        for channel in [Channel::Sms, Channel::Call] {
            for text in [None, Some(""), Some("   \n\t")] {
                let score = scorer.score(channel, text);
                assert_eq!(score, MessageScore::default());
            }
        }
    }

    #[test]
    fn unprofessional_words_penalize_per_occurrence() {
        let once = sms("That was a dumb idea. Can you start?");
        let twice = sms("That was a dumb dumb idea. Can you start?");
        assert_eq!(once.tone, 40 + 3 - 25);
        assert_eq!(twice.tone, 0);
        assert_eq!(
            twice
                .violated_signals
                .iter()
                .filter(|label| *label == "Unprofessional language: dumb")
                .count(),
            2
        );
    }

    #[test]
    fn greetings_are_not_mistaken_for_profanity() {
        let score = sms("Hello Sam, hope you are well. Ready to start dashing this week?");
        assert!(score
            .violated_signals
            .iter()
            .all(|label| !label.starts_with("Unprofessional")));
        assert!(score
            .matched_signals
            .contains(&"Personal, conversational tone".to_string()));
    }

    #[test]
    fn inflected_vocabulary_still_earns_its_signals() {
        let supportive = sms("We are always helpful and supportive.");
        assert!(supportive
            .matched_signals
            .contains(&"Helpful and supportive tone".to_string()));

        let started = sms("Have you started delivering yet?");
        assert!(started
            .matched_signals
            .contains(&"Contains clear call-to-action".to_string()));
        assert!(!started
            .violated_signals
            .contains(&"Missing clear call-to-action".to_string()));

        let paid = sms("Drivers here earned more and got paid weekly");
        assert!(paid
            .matched_signals
            .contains(&"Mentions value proposition".to_string()));
    }

    #[test]
    fn profanity_matches_exact_words_only() {
        let score = sms("Hello! Crapshoot odds aside, are you ready to start?");
        assert!(score
            .violated_signals
            .iter()
            .all(|label| !label.starts_with("Unprofessional")));
    }

    #[test]
    fn surrounding_whitespace_is_scored_as_sent() {
        let padded = sms("  Ready to start this week?");
        let plain = sms("Ready to start this week?");
        assert!(plain.matched_signals.contains(&"Professional formatting".to_string()));
        assert!(!padded.matched_signals.contains(&"Professional formatting".to_string()));
        assert_eq!(plain.tone - padded.tone, 3);
    }

    #[test]
    fn question_bonus_turns_into_penalty_past_the_cap() {
        let few = sms("Set? Go? Up?");
        let many = sms("Set? Go? Up? On?");
        assert!(few.matched_signals.contains(&"Engages with questions".to_string()));
        assert!(many.violated_signals.contains(&"Too many questions".to_string()));
        assert_eq!(few.engagement - many.engagement, 5);
    }

    #[test]
    fn length_band_applies_penalties_and_bonus() {
        let short = sms("Start?");
        assert!(short.violated_signals.contains(&"Message too short".to_string()));
        let long = sms(&format!("Ready to start? {}", "word ".repeat(80)));
        assert!(long
            .violated_signals
            .contains(&"Message exceeds 300 character limit".to_string()));
        let ideal = sms("Hi Sam, are you ready to start earning with flexible hours?");
        assert!(ideal.matched_signals.contains(&"Optimal message length".to_string()));
    }

    #[test]
    fn lowercase_pronoun_is_flagged() {
        let score = sms("hey i can help you start today");
        assert!(score
            .violated_signals
            .contains(&"Grammar: lowercase 'i'".to_string()));
    }

    #[test]
    fn components_stay_bounded_for_varied_inputs() {
        let samples = [
            "x",
            "damn hell shit fuck crap stupid dumb",
            "YOU NEED TO SIGN UP RIGHT NOW ASAP, FINAL NOTICE, HURRY UP!!!",
            "Hi! Happy to help you start earning. Thanks, please reply?",
            "?????",
            &"Earn money with flexible schedule and tips. ".repeat(20),
        ];
        for text in samples {
            for score in [sms(text), call(text)] {
                assert!(score.engagement <= 50);
                assert!(score.tone <= 50);
                assert_eq!(score.total, score.engagement + score.tone);
                assert!(score.total <= 100);
            }
        }
    }

    #[test]
    fn call_summaries_use_their_own_rubric() {
        let score = call(
            "Spoke with the driver about the bonus, scheduled a follow up call for Friday. Great conversation.",
        );
        assert!(score.matched_signals.contains(&"Sets a clear next step".to_string()));
        assert!(score.matched_signals.contains(&"Commits to follow-up".to_string()));
        assert!(score.matched_signals.contains(&"Mentions benefits".to_string()));
        assert!(score.matched_signals.contains(&"Positive framing".to_string()));
        assert_eq!(score.engagement, 50);

        let pressured = call("Told them to start asap, urgent");
        assert!(pressured
            .violated_signals
            .contains(&"Pressure language: asap".to_string()));
        assert!(pressured
            .violated_signals
            .contains(&"Pressure language: urgent".to_string()));
    }

    #[test]
    fn scorer_dispatches_by_channel() {
        let rubrics = ScoringRubrics::default();
        let scorer = QualityScorer::new(&rubrics);
        assert_eq!(scorer.evaluator(Channel::Sms).channel(), Channel::Sms);
        assert_eq!(scorer.evaluator(Channel::Call).channel(), Channel::Call);
    }
}
