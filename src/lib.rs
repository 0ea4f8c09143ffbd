//! # Paygate
//!
//! **Subscription entitlement enforcement for server-side Rust.**
//!
//! Paygate is the access-control core of a subscription-gated product: for
//! every protected operation it decides whether the caller may proceed,
//! and it issues a short-lived **grace credential** right after checkout
//! to bridge the latency before subscription state propagates from the
//! payment processor to the account store.
//!
//! ## Features
//!
//! - **Fail-closed decisions** — store errors, missing records, and broken
//!   credentials all resolve to deny; nothing throws past the boundary
//! - **HMAC-SHA256 grace credentials** — tamper-evident, time-limited,
//!   stateless tokens verified in constant time
//! - **Bounded entitlement cache** — strict LRU with asymmetric TTLs
//!   (positive results live longer than negative ones)
//! - **Static feature matrix** — pure capability gating per access level
//! - **Injected collaborators** — subscription store, denial sink, and
//!   clock are traits, so the decision core tests deterministically
//!
//! ## Quickstart
//!
//! ```no_run
//! use paygate::{AccessEngine, AccessRequest, EmptyCarrier, PaygateConfig, SubscriptionStore};
//! use std::sync::Arc;
//!
//! fn gate(store: Arc<dyn SubscriptionStore>) -> Result<(), paygate::PaygateError> {
//!     let config = PaygateConfig {
//!         signing_secret: Some("server-side secret".to_string()),
//!         ..PaygateConfig::default()
//!     };
//!     let engine = AccessEngine::new(config, store)?;
//!
//!     let request = AccessRequest {
//!         route: "/api/practice",
//!         subject_id: Some("account-123"),
//!         request_id: None,
//!     };
//!     let decision = engine.decide(&request, &EmptyCarrier);
//!
//!     if decision.allowed {
//!         // proceed; if decision.clear_credential, expire the grace
//!         // cookie on the response via engine.clear_credential()
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Trust model
//!
//! The grace credential is deliberately **not** bound to a subject: it
//! only bridges a few minutes on the client that just completed checkout.
//! Anything longer-lived goes through the authoritative subscription
//! store. Tampered and expired credentials are indistinguishable to
//! callers, and the credential value never appears in logs or denial
//! events.
//!
//! ## Configuration
//!
//! - `signing_secret` — HMAC secret; absent makes verification fail closed
//! - `enforcement` — global kill switch (`Off` allows everything)
//! - `cache_capacity`, `positive_ttl`, `negative_ttl` — entitlement cache
//! - `grace_max_age` — accepted credential lifetime (default 900s)
//!
//! See [`PaygateConfig`] for full documentation.

#![deny(warnings)]
#![deny(missing_docs)]

// Core modules
pub mod clock;
pub mod config;
pub mod errors;

// Credential layer
pub mod carrier;
pub mod credential;

// Entitlement layer
pub mod cache;
pub mod subscription;

// Policy layer
pub mod matrix;
pub mod sink;

// Engine (main public API)
pub mod engine;

// Re-exports for public API
pub use cache::EntitlementCache;
pub use carrier::{
    CookieHeaderCarrier, CredentialAttributes, CredentialCarrier, EmptyCarrier, IssuedCredential,
    SameSite,
};
pub use clock::{Clock, SystemClock};
pub use config::{Enforcement, PaygateConfig};
pub use credential::GRACE_CREDENTIAL_NAME;
pub use engine::{AccessEngine, AccessRequest, Decision};
pub use errors::PaygateError;
pub use matrix::{can_use_feature, AccessLevel, Feature};
pub use sink::{DenialEvent, DenialReason, DenialSink, NoopSink};
pub use subscription::{
    compute_entitlement, SubscriptionRecord, SubscriptionStatus, SubscriptionStore,
};

#[cfg(any(test, feature = "test-seams"))]
pub use clock::MockClock;
#[cfg(any(test, feature = "test-seams"))]
pub use sink::RecordingSink;
