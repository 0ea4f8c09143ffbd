//! Access decision engine.
//!
//! Composes the grace credential, the entitlement cache, the subscription
//! resolver, and the feature matrix into one per-request allow/deny
//! decision. Decision order:
//!
//! 1. Enforcement kill switch off → allow, nothing else runs.
//! 2. Grace credential verifies → allow (the post-checkout bridge).
//! 3. No authenticated subject → deny `unauthenticated`.
//! 4. Subject entitled (cache → resolver → store on miss) → allow.
//! 5. Otherwise → deny `not_subscriber` with a structured denial record.
//!
//! Nothing in here returns an error: every failure path inside the
//! decision resolves to a boolean, and denial reporting is best-effort.

use std::sync::Arc;

use once_cell::sync::OnceCell;

use crate::cache::EntitlementCache;
use crate::carrier::{CredentialCarrier, IssuedCredential};
use crate::clock::{Clock, SystemClock};
use crate::config::{Enforcement, PaygateConfig};
use crate::credential;
use crate::errors::PaygateError;
use crate::matrix::{can_use_feature, AccessLevel, Feature};
use crate::sink::{DenialEvent, DenialReason, DenialSink, NoopSink};
use crate::subscription::{resolve_entitlement, SubscriptionStore};

static MISSING_SECRET_WARNED: OnceCell<()> = OnceCell::new();

/// The inputs the engine needs from one request.
#[derive(Debug, Clone, Copy)]
pub struct AccessRequest<'a> {
    /// Route being protected, for denial records.
    pub route: &'a str,
    /// Authenticated subject id, when the caller has one.
    pub subject_id: Option<&'a str>,
    /// Transport-level correlation id, when one was supplied.
    pub request_id: Option<&'a str>,
}

/// Outcome of one access decision.
///
/// `clear_credential` instructs the HTTP layer to expire the grace
/// credential on the response (see [`AccessEngine::clear_credential`]);
/// it is set once real entitlement makes the credential redundant, or
/// when an invalid credential accompanies an authoritative result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    /// Whether the request may proceed.
    pub allowed: bool,
    /// Access level computed for this request.
    pub level: AccessLevel,
    /// Denial reason, present iff not allowed.
    pub reason: Option<DenialReason>,
    /// Whether the caller should expire the grace credential in its response.
    pub clear_credential: bool,
}

impl Decision {
    fn allow(level: AccessLevel, clear_credential: bool) -> Self {
        Self {
            allowed: true,
            level,
            reason: None,
            clear_credential,
        }
    }

    /// Feature-level gate on top of the general decision.
    ///
    /// Pure and side-effect-free: an allowed request can still be denied
    /// a capability its access level does not cover.
    pub fn permits(&self, feature: Feature) -> bool {
        self.allowed && can_use_feature(self.level, feature)
    }
}

/// Per-request access decisions for a subscription-gated product.
///
/// Create one engine per process and share it: the entitlement cache it
/// owns is the only mutable state, and it is internally synchronized.
pub struct AccessEngine {
    config: PaygateConfig,
    clock: Arc<dyn Clock>,
    cache: EntitlementCache,
    store: Arc<dyn SubscriptionStore>,
    sink: Arc<dyn DenialSink>,
}

impl AccessEngine {
    /// Create an engine over the given subscription store.
    ///
    /// Uses the system clock and the no-op denial sink.
    ///
    /// # Errors
    /// Returns an error if configuration validation fails.
    pub fn new(
        config: PaygateConfig,
        store: Arc<dyn SubscriptionStore>,
    ) -> Result<Self, PaygateError> {
        Self::build(config, store, Arc::new(SystemClock))
    }

    /// Create an engine with a custom clock (for testing).
    #[cfg(any(test, feature = "test-seams"))]
    pub fn new_with_clock(
        config: PaygateConfig,
        store: Arc<dyn SubscriptionStore>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, PaygateError> {
        Self::build(config, store, clock)
    }

    fn build(
        config: PaygateConfig,
        store: Arc<dyn SubscriptionStore>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, PaygateError> {
        config.validate()?;

        // Missing secret is a degraded-but-running state: grace credentials
        // never verify, the authoritative path still works. Warn once at
        // startup, not per request.
        if config.signing_secret.is_none() && MISSING_SECRET_WARNED.set(()).is_ok() {
            tracing::warn!(
                "no signing secret configured; grace credentials will fail verification"
            );
        }

        let cache = EntitlementCache::new(
            config.cache_capacity,
            config.positive_ttl,
            config.negative_ttl,
        );

        Ok(Self {
            config,
            clock,
            cache,
            store,
            sink: Arc::new(NoopSink),
        })
    }

    /// Replace the denial sink.
    pub fn with_sink(mut self, sink: Arc<dyn DenialSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Decide whether this request may proceed.
    pub fn decide(&self, request: &AccessRequest<'_>, carrier: &dyn CredentialCarrier) -> Decision {
        if self.config.enforcement == Enforcement::Off {
            return Decision::allow(AccessLevel::Subscriber, false);
        }

        let credential_value = carrier.get(credential::GRACE_CREDENTIAL_NAME);
        let credential_present = credential_value.is_some();
        let grace_valid = credential_value.as_deref().is_some_and(|value| {
            credential::verify_value(
                value,
                self.config.signing_secret.as_deref(),
                self.config.grace_max_age,
                self.clock.as_ref(),
            )
        });

        if grace_valid {
            // The credential is redundant once the store confirms the
            // subscription; consult the truth opportunistically so it is
            // cleared in the same request that first confirms entitlement.
            let confirmed = request
                .subject_id
                .is_some_and(|subject_id| self.entitlement(subject_id));
            return Decision::allow(AccessLevel::Subscriber, confirmed);
        }

        let Some(subject_id) = request.subject_id else {
            return self.deny(
                request,
                DenialReason::Unauthenticated,
                AccessLevel::Anonymous,
                false,
            );
        };

        if self.entitlement(subject_id) {
            // A credential that reached this point is stale or invalid;
            // the authoritative result supersedes it either way.
            return Decision::allow(AccessLevel::Subscriber, credential_present);
        }

        self.deny(
            request,
            DenialReason::NotSubscriber,
            AccessLevel::Free,
            credential_present,
        )
    }

    /// Access level for a subject, for feature-matrix gating on routes
    /// that serve multiple tiers.
    pub fn access_level(&self, subject_id: Option<&str>) -> AccessLevel {
        let entitled = subject_id.is_some_and(|subject_id| self.entitlement(subject_id));
        AccessLevel::from_parts(subject_id.is_some(), entitled)
    }

    /// Issue a fresh grace credential for a just-completed checkout.
    ///
    /// # Errors
    /// Returns [`PaygateError::SigningSecretMissing`] when no secret is
    /// configured. Issuance is the one fallible credential operation;
    /// verification always fails closed instead.
    pub fn issue_grace_credential(&self) -> Result<IssuedCredential, PaygateError> {
        let secret = self
            .config
            .signing_secret
            .as_deref()
            .ok_or(PaygateError::SigningSecretMissing)?;
        Ok(credential::issue(
            secret,
            self.config.grace_max_age,
            self.config.secure_credentials,
            self.clock.as_ref(),
        ))
    }

    /// The expired credential to attach when a decision asks for clearing.
    pub fn clear_credential(&self) -> IssuedCredential {
        credential::clear(self.config.secure_credentials)
    }

    /// Verify the grace credential on a carrier without a full decision.
    pub fn verify_grace_credential(&self, carrier: &dyn CredentialCarrier) -> bool {
        credential::verify(
            carrier,
            self.config.signing_secret.as_deref(),
            self.config.grace_max_age,
            self.clock.as_ref(),
        )
    }

    /// The current configuration.
    pub fn config(&self) -> &PaygateConfig {
        &self.config
    }

    /// Drop all cached entitlements so the next lookups hit the store.
    pub fn reset_cache(&self) {
        self.cache.clear();
    }

    /// Cache → resolver → store, fail-closed.
    fn entitlement(&self, subject_id: &str) -> bool {
        if let Some(cached) = self.cache.get(subject_id, self.clock.as_ref()) {
            return cached;
        }
        let entitled = resolve_entitlement(self.store.as_ref(), subject_id, self.clock.as_ref());
        self.cache.set(subject_id, entitled, self.clock.as_ref());
        entitled
    }

    fn deny(
        &self,
        request: &AccessRequest<'_>,
        reason: DenialReason,
        level: AccessLevel,
        clear_credential: bool,
    ) -> Decision {
        let event = DenialEvent {
            route: request.route.to_string(),
            subject_id: request.subject_id.map(str::to_string),
            reason,
            request_id: request.request_id.map(str::to_string),
        };
        tracing::warn!(
            route = %event.route,
            subject_id = ?event.subject_id,
            request_id = ?event.request_id,
            %reason,
            "access denied"
        );
        self.sink.record_denial(&event);

        Decision {
            allowed: false,
            level,
            reason: Some(reason),
            clear_credential,
        }
    }
}
