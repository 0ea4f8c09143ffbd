//! Paygate configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Global enforcement mode.
///
/// `Off` is an operational escape hatch, not per-user state: with
/// enforcement off every request is allowed and no other check runs.
/// The serde names match the `BILLING_ENFORCEMENT` values the original
/// deployment used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Enforcement {
    /// Require an active subscription (or a valid grace credential).
    ActiveRequired,
    /// Kill switch: allow everything, skip all checks.
    ///
    /// Unrecognized mode strings also land here, so a typo'd or
    /// not-yet-known mode defaults open rather than locking everyone out.
    #[serde(other)]
    Off,
}

/// Configuration for the access-control core.
///
/// Constructed explicitly and handed to [`AccessEngine::new`](crate::AccessEngine::new);
/// there is no hidden global state, so tests can build isolated engines
/// with their own cache and TTLs.
#[derive(Debug, Clone)]
pub struct PaygateConfig {
    /// Server-side secret for signing grace credentials.
    ///
    /// `None` makes credential verification fail closed (never panic):
    /// issuance errors, verification returns `false`, and the engine logs
    /// a single startup warning.
    pub signing_secret: Option<String>,

    /// Global enforcement mode.
    pub enforcement: Enforcement,

    /// Maximum number of subjects held in the entitlement cache.
    pub cache_capacity: usize,

    /// How long a cached "entitled" result is served without revalidation.
    pub positive_ttl: Duration,

    /// How long a cached "not entitled" result is served.
    ///
    /// Shorter than [`positive_ttl`](Self::positive_ttl) on purpose: a newly
    /// paying user expects near-immediate unlock, so negative results are
    /// revalidated more aggressively.
    pub negative_ttl: Duration,

    /// Accepted lifetime of a grace credential after issuance.
    pub grace_max_age: Duration,

    /// Whether issued credentials carry the `secure` transport attribute.
    /// Enabled in production, disabled for local plain-HTTP development.
    pub secure_credentials: bool,
}

impl Default for PaygateConfig {
    fn default() -> Self {
        Self {
            signing_secret: None,
            enforcement: Enforcement::ActiveRequired,
            cache_capacity: 1000,
            positive_ttl: Duration::from_secs(60),
            negative_ttl: Duration::from_secs(30),
            grace_max_age: Duration::from_secs(900),
            secure_credentials: true,
        }
    }
}

impl PaygateConfig {
    /// Validate configuration for obvious errors.
    pub fn validate(&self) -> Result<(), crate::PaygateError> {
        if self.cache_capacity == 0 {
            return Err(crate::PaygateError::ConfigError(
                "cache_capacity must be at least 1".to_string(),
            ));
        }
        if self.positive_ttl.is_zero() || self.negative_ttl.is_zero() {
            return Err(crate::PaygateError::ConfigError(
                "cache TTLs must be non-zero".to_string(),
            ));
        }
        if self.grace_max_age.is_zero() {
            return Err(crate::PaygateError::ConfigError(
                "grace_max_age must be non-zero".to_string(),
            ));
        }
        if let Some(secret) = &self.signing_secret {
            if secret.is_empty() {
                return Err(crate::PaygateError::ConfigError(
                    "signing_secret must not be empty when set".to_string(),
                ));
            }
        }
        Ok(())
    }
}
