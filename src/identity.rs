//! Canonical actor reconciliation.
//!
//! The same rule is applied to the message stream and the outcome stream so
//! a case is never attributed to two different actors across datasets.

use crate::data::{CanonicalActor, MessageRecord, OutcomeRecord};

/// Map a raw actor name and automation flag onto a canonical actor.
///
/// Automation wins over any raw name; blank or missing names become
/// [`CanonicalActor::Unknown`]; anything else is kept verbatim.
pub fn reconcile(raw_actor: Option<&str>, automation: bool) -> CanonicalActor {
    if automation {
        return CanonicalActor::Automation;
    }
    match raw_actor {
        Some(name) if !name.trim().is_empty() => CanonicalActor::Named(name.to_string()),
        _ => CanonicalActor::Unknown,
    }
}

/// Canonical actor for a message row.
pub fn message_actor(record: &MessageRecord) -> CanonicalActor {
    reconcile(record.raw_actor.as_deref(), record.automation)
}

/// Canonical actor for an outcome row.
pub fn outcome_actor(record: &OutcomeRecord) -> CanonicalActor {
    reconcile(record.raw_actor.as_deref(), record.automation)
}
