//! Structured denial reporting.
//!
//! Denials are reported to an injected sink so the decision core stays
//! pure and independently testable. Reporting is fire-and-forget: the
//! trait is infallible by signature, and a sink that drops events on the
//! floor must never affect the access decision.

use serde::Serialize;
use std::fmt;

/// Why a request was denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DenialReason {
    /// No authenticated subject on the request.
    Unauthenticated,
    /// Authenticated subject without an active subscription.
    NotSubscriber,
}

impl fmt::Display for DenialReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DenialReason::Unauthenticated => f.write_str("unauthenticated"),
            DenialReason::NotSubscriber => f.write_str("not_subscriber"),
        }
    }
}

/// One denied request.
///
/// Carries only routing identifiers and the reason — never secret
/// material or raw credential values.
#[derive(Debug, Clone, Serialize)]
pub struct DenialEvent {
    /// Route the caller was denied on.
    pub route: String,
    /// Authenticated subject, when one was present.
    pub subject_id: Option<String>,
    /// Why the request was denied.
    pub reason: DenialReason,
    /// Upstream request correlation id, when the transport supplied one.
    pub request_id: Option<String>,
}

/// Destination for denial events.
pub trait DenialSink: Send + Sync {
    /// Record one denial. Must not block the caller for long and cannot
    /// fail; drop the event if the backing channel is unavailable.
    fn record_denial(&self, event: &DenialEvent);
}

/// Default sink that discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl DenialSink for NoopSink {
    fn record_denial(&self, _event: &DenialEvent) {}
}

/// Sink that collects events in memory for assertions.
#[cfg(any(test, feature = "test-seams"))]
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: std::sync::Mutex<Vec<DenialEvent>>,
}

#[cfg(any(test, feature = "test-seams"))]
impl RecordingSink {
    /// Create an empty recording sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events recorded so far.
    pub fn events(&self) -> Vec<DenialEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }
}

#[cfg(any(test, feature = "test-seams"))]
impl DenialSink for RecordingSink {
    fn record_denial(&self, event: &DenialEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reason_display_matches_wire_names() {
        assert_eq!(DenialReason::Unauthenticated.to_string(), "unauthenticated");
        assert_eq!(DenialReason::NotSubscriber.to_string(), "not_subscriber");
    }

    #[test]
    fn event_serializes_for_analytics() {
        let event = DenialEvent {
            route: "/api/practice".to_string(),
            subject_id: Some("user-1".to_string()),
            reason: DenialReason::NotSubscriber,
            request_id: None,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["route"], "/api/practice");
        assert_eq!(json["reason"], "not_subscriber");
        assert_eq!(json["subject_id"], "user-1");
    }

    #[test]
    fn recording_sink_collects() {
        let sink = RecordingSink::new();
        sink.record_denial(&DenialEvent {
            route: "/api/explanations".to_string(),
            subject_id: None,
            reason: DenialReason::Unauthenticated,
            request_id: Some("req-42".to_string()),
        });
        let events = sink.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].reason, DenialReason::Unauthenticated);
    }
}
