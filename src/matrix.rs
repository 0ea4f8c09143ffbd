//! Access levels and the static feature matrix.
//!
//! Once the engine has computed a coarse access level, individual
//! capabilities are gated by a pure table lookup. No I/O, no mutation:
//! a FREE subject can pass the general access check and still be denied
//! a subscriber-only feature.

use serde::{Deserialize, Serialize};

/// Coarse access tier derived per request from identity plus entitlement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccessLevel {
    /// No authenticated subject.
    Anonymous,
    /// Authenticated subject without an active subscription.
    Free,
    /// Active or trialing subscription (or an equivalent grace grant).
    Subscriber,
}

impl AccessLevel {
    /// Derive the access level from (subject present?, entitled?).
    pub fn from_parts(subject_present: bool, entitled: bool) -> Self {
        match (subject_present, entitled) {
            (false, _) => AccessLevel::Anonymous,
            (true, false) => AccessLevel::Free,
            (true, true) => AccessLevel::Subscriber,
        }
    }
}

/// Gated product capabilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Feature {
    /// Start and run a diagnostic test.
    DiagnosticRun,
    /// View the basic diagnostic summary (score, domain breakdown).
    DiagnosticSummaryBasic,
    /// View the full summary including question-level details.
    DiagnosticSummaryFull,
    /// Read question explanations.
    Explanations,
    /// Create unlimited, domain-targeted practice sessions.
    PracticeSession,
    /// Create quota-limited practice sessions on the free tier.
    PracticeSessionFreeQuota,
}

/// Whether `level` may use `feature`.
///
/// Anonymous visitors get one diagnostic run and its basic summary to try
/// the product. Free accounts additionally see the full summary and a
/// small practice quota. Subscribers get everything.
pub fn can_use_feature(level: AccessLevel, feature: Feature) -> bool {
    use AccessLevel::*;
    use Feature::*;

    match (level, feature) {
        (_, DiagnosticRun) => true,
        (_, DiagnosticSummaryBasic) => true,

        (Anonymous, DiagnosticSummaryFull) => false,
        (Free | Subscriber, DiagnosticSummaryFull) => true,

        (Subscriber, Explanations) => true,
        (Anonymous | Free, Explanations) => false,

        (Subscriber, PracticeSession) => true,
        (Anonymous | Free, PracticeSession) => false,

        (Anonymous, PracticeSessionFreeQuota) => false,
        (Free | Subscriber, PracticeSessionFreeQuota) => true,
    }
}
