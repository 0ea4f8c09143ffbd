//! Paygate error types.
//!
//! The decision path itself never surfaces these: every failure inside
//! `AccessEngine::decide` degrades to a deny (or an allow, for the grace
//! window). Errors exist only at the construction and issuance boundaries,
//! and for `SubscriptionStore` implementations to report lookup failures.

use thiserror::Error;

/// Errors that can occur outside the allow/deny decision path.
#[derive(Debug, Error)]
pub enum PaygateError {
    /// Configuration is invalid.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// No signing secret configured, so a grace credential cannot be issued.
    #[error("No signing secret configured")]
    SigningSecretMissing,

    /// The subscription store failed or timed out during a lookup.
    ///
    /// The engine never propagates this; it resolves the lookup to
    /// "not entitled" and logs the failure.
    #[error("Subscription store error: {0}")]
    StoreError(String),
}
