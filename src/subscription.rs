//! Subscription records and the entitlement resolver.
//!
//! The persistent account store is an external collaborator reached
//! through [`SubscriptionStore`]. This module owns the pure rule that
//! turns a raw subscription record into a boolean entitlement, and the
//! fail-closed wrapper around the store lookup.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::clock::Clock;
use crate::errors::PaygateError;

/// Processor-side subscription status, as stored in the account store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    /// Paid and current.
    Active,
    /// In a free trial.
    Trialing,
    /// A renewal payment failed.
    PastDue,
    /// Subscription has been canceled.
    Canceled,
    /// Initial payment not yet completed.
    Incomplete,
    /// Initial payment window elapsed without completion.
    IncompleteExpired,
    /// Payment retries exhausted.
    Unpaid,
    /// Collection paused by the merchant.
    Paused,
    /// Any status this build does not know about. Never entitled.
    #[serde(other)]
    Unknown,
}

/// A subscription row as read from the account store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionRecord {
    /// Current processor status.
    pub status: SubscriptionStatus,
    /// Whether the subscription is set to lapse at the period boundary.
    #[serde(default)]
    pub cancel_at_period_end: bool,
    /// End of the current billing period, if known.
    #[serde(default)]
    pub current_period_end: Option<DateTime<Utc>>,
}

/// Read interface to the account store.
///
/// Implementations must bound their lookup time (connection and query
/// timeouts); the engine treats any error exactly like "no record": the
/// subject resolves to not entitled, the failure is logged, and a later
/// request or TTL expiry retries naturally.
pub trait SubscriptionStore: Send + Sync {
    /// Fetch the subject's most recent subscription record, if any.
    fn find_latest_subscription(
        &self,
        subject_id: &str,
    ) -> Result<Option<SubscriptionRecord>, PaygateError>;
}

/// Pure entitlement rule over a subscription record.
///
/// Entitled iff the status is `active` or `trialing`, and — when the
/// subscription is set to lapse and a period end is recorded — the period
/// has not ended yet. A lapsing subscription with no recorded period end
/// still grants, matching the store's write-side guarantees. Every other
/// status resolves to false regardless of period fields.
pub fn compute_entitlement(record: &SubscriptionRecord, now: DateTime<Utc>) -> bool {
    match record.status {
        SubscriptionStatus::Active | SubscriptionStatus::Trialing => {
            match (record.cancel_at_period_end, record.current_period_end) {
                (true, Some(period_end)) => now < period_end,
                _ => true,
            }
        }
        _ => false,
    }
}

/// Resolve a subject's entitlement through the store, fail-closed.
///
/// `Ok(None)` and `Err` both resolve to `false`; errors are logged here
/// and never propagate further.
pub fn resolve_entitlement(
    store: &dyn SubscriptionStore,
    subject_id: &str,
    clock: &dyn Clock,
) -> bool {
    match store.find_latest_subscription(subject_id) {
        Ok(Some(record)) => compute_entitlement(&record, clock.now_utc()),
        Ok(None) => false,
        Err(error) => {
            tracing::warn!(subject_id, %error, "subscription lookup failed, resolving to not entitled");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::MockClock;

    fn record(
        status: SubscriptionStatus,
        cancel_at_period_end: bool,
        current_period_end: Option<&str>,
    ) -> SubscriptionRecord {
        SubscriptionRecord {
            status,
            cancel_at_period_end,
            current_period_end: current_period_end.map(|s| {
                DateTime::parse_from_rfc3339(s)
                    .expect("valid RFC 3339")
                    .with_timezone(&Utc)
            }),
        }
    }

    fn now() -> DateTime<Utc> {
        MockClock::from_rfc3339("2025-06-01T09:00:00Z").now_utc()
    }

    #[test]
    fn active_grants() {
        let rec = record(SubscriptionStatus::Active, false, Some("2025-07-01T00:00:00Z"));
        assert!(compute_entitlement(&rec, now()));
    }

    #[test]
    fn trialing_grants() {
        let rec = record(SubscriptionStatus::Trialing, false, None);
        assert!(compute_entitlement(&rec, now()));
    }

    #[test]
    fn active_ignores_period_end_without_cancellation() {
        // Period end in the past is irrelevant while the subscription renews.
        let rec = record(SubscriptionStatus::Active, false, Some("2025-01-01T00:00:00Z"));
        assert!(compute_entitlement(&rec, now()));
    }

    #[test]
    fn lapsing_with_future_period_end_grants() {
        let rec = record(SubscriptionStatus::Active, true, Some("2025-07-01T00:00:00Z"));
        assert!(compute_entitlement(&rec, now()));
    }

    #[test]
    fn lapsing_with_past_period_end_denies() {
        let rec = record(SubscriptionStatus::Active, true, Some("2025-05-01T00:00:00Z"));
        assert!(!compute_entitlement(&rec, now()));
    }

    #[test]
    fn lapsing_without_period_end_grants() {
        let rec = record(SubscriptionStatus::Trialing, true, None);
        assert!(compute_entitlement(&rec, now()));
    }

    #[test]
    fn inactive_statuses_never_grant() {
        for status in [
            SubscriptionStatus::PastDue,
            SubscriptionStatus::Canceled,
            SubscriptionStatus::Incomplete,
            SubscriptionStatus::IncompleteExpired,
            SubscriptionStatus::Unpaid,
            SubscriptionStatus::Paused,
            SubscriptionStatus::Unknown,
        ] {
            let rec = record(status, false, Some("2099-01-01T00:00:00Z"));
            assert!(!compute_entitlement(&rec, now()), "{:?} granted", status);
        }
    }

    #[test]
    fn status_serde_round_trip() {
        let status: SubscriptionStatus = serde_json::from_str("\"past_due\"").unwrap();
        assert_eq!(status, SubscriptionStatus::PastDue);
        assert_eq!(serde_json::to_string(&status).unwrap(), "\"past_due\"");
    }

    #[test]
    fn unrecognized_status_maps_to_unknown() {
        let status: SubscriptionStatus = serde_json::from_str("\"some_future_state\"").unwrap();
        assert_eq!(status, SubscriptionStatus::Unknown);
    }

    struct FailingStore;

    impl SubscriptionStore for FailingStore {
        fn find_latest_subscription(
            &self,
            _subject_id: &str,
        ) -> Result<Option<SubscriptionRecord>, PaygateError> {
            Err(PaygateError::StoreError("connection refused".to_string()))
        }
    }

    struct EmptyStore;

    impl SubscriptionStore for EmptyStore {
        fn find_latest_subscription(
            &self,
            _subject_id: &str,
        ) -> Result<Option<SubscriptionRecord>, PaygateError> {
            Ok(None)
        }
    }

    #[test]
    fn store_error_resolves_to_not_entitled() {
        let clock = MockClock::from_rfc3339("2025-06-01T09:00:00Z");
        assert!(!resolve_entitlement(&FailingStore, "user-1", &clock));
    }

    #[test]
    fn missing_record_resolves_to_not_entitled() {
        let clock = MockClock::from_rfc3339("2025-06-01T09:00:00Z");
        assert!(!resolve_entitlement(&EmptyStore, "user-1", &clock));
    }
}
