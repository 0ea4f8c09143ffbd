//! Grace credential issuance and verification.
//!
//! Right after checkout the payment processor has confirmed the purchase
//! but the subscription record has not yet propagated to the account
//! store. The grace credential bridges that window: a tamper-evident,
//! time-limited capability token, deliberately not bound to a subject,
//! carried by the same client that just completed the purchase.
//!
//! Verification is fail-closed and fail-silent: any problem (missing
//! secret, absent value, malformed encoding, signature mismatch, expired
//! timestamp) yields `false`, never an error. A denial here simply falls
//! through to the authoritative subscription check.

pub mod sign;
pub mod token;

pub use token::{clear, issue, verify, verify_value, GRACE_CREDENTIAL_NAME};
