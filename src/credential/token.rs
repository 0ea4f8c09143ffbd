//! Grace token encoding, issuance, and verification.
//!
//! Wire format: `base64url(payload) "." base64url(tag)` where the payload
//! is JSON `{"iat": <epoch seconds>, "nonce": <hex>}` and the tag is
//! HMAC-SHA256 over the exact payload bytes. The token is stateless: no
//! server-side record exists, validity is recomputed from the signature
//! and the elapsed time at verification.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::carrier::{CredentialAttributes, CredentialCarrier, IssuedCredential, SameSite};
use crate::clock::Clock;
use crate::credential::sign::{sign, tags_match};

/// Name under which the grace credential travels.
pub const GRACE_CREDENTIAL_NAME: &str = "checkout_grace";

/// Random bytes per token, hex-encoded into the payload.
const NONCE_LEN: usize = 16;

/// Tolerance for issued-at timestamps ahead of the verifying clock.
const MAX_FUTURE_SKEW_SECONDS: i64 = 60;

#[derive(Debug, Serialize, Deserialize)]
struct GracePayload {
    /// Issued-at, whole seconds since the Unix epoch.
    iat: i64,
    /// Random nonce so two tokens issued in the same second differ.
    nonce: String,
}

fn attributes(secure: bool, max_age: Duration) -> CredentialAttributes {
    CredentialAttributes {
        http_only: true,
        secure,
        same_site: SameSite::Lax,
        path: "/",
        max_age,
    }
}

/// Issue a fresh grace credential.
///
/// The caller attaches the result to the HTTP response. The token is not
/// bound to a subject: anyone holding the value is trusted for the grace
/// window, which only bridges a few minutes on the same client right
/// after a purchase.
pub fn issue(
    secret: &str,
    max_age: Duration,
    secure: bool,
    clock: &dyn Clock,
) -> IssuedCredential {
    let mut nonce = [0u8; NONCE_LEN];
    rand::thread_rng().fill_bytes(&mut nonce);

    let payload = GracePayload {
        iat: clock.now_epoch(),
        nonce: hex::encode(nonce),
    };
    // GracePayload serialization cannot fail: two plain fields, no maps.
    let payload_bytes = serde_json::to_vec(&payload).unwrap_or_default();
    let tag = sign(secret.as_bytes(), &payload_bytes);

    let value = format!(
        "{}.{}",
        URL_SAFE_NO_PAD.encode(&payload_bytes),
        URL_SAFE_NO_PAD.encode(&tag)
    );

    IssuedCredential {
        name: GRACE_CREDENTIAL_NAME,
        value,
        attributes: attributes(secure, max_age),
    }
}

/// An expired, empty credential instructing the client to drop the value.
pub fn clear(secure: bool) -> IssuedCredential {
    IssuedCredential {
        name: GRACE_CREDENTIAL_NAME,
        value: String::new(),
        attributes: attributes(secure, Duration::ZERO),
    }
}

/// Verify a grace credential read from a request carrier.
///
/// Returns `false` — never an error — when the secret is unconfigured,
/// the carrier has no value, decoding fails, the signature mismatches,
/// or the token is older than `max_age`. Tampered and expired tokens are
/// indistinguishable to the caller.
pub fn verify(
    carrier: &dyn CredentialCarrier,
    secret: Option<&str>,
    max_age: Duration,
    clock: &dyn Clock,
) -> bool {
    match carrier.get(GRACE_CREDENTIAL_NAME) {
        Some(value) => verify_value(&value, secret, max_age, clock),
        None => false,
    }
}

/// Verify an already-extracted credential value.
pub fn verify_value(
    value: &str,
    secret: Option<&str>,
    max_age: Duration,
    clock: &dyn Clock,
) -> bool {
    let Some(secret) = secret else {
        return false;
    };

    let Some((encoded_payload, encoded_tag)) = value.split_once('.') else {
        return false;
    };
    let Ok(payload_bytes) = URL_SAFE_NO_PAD.decode(encoded_payload) else {
        return false;
    };
    let Ok(presented_tag) = URL_SAFE_NO_PAD.decode(encoded_tag) else {
        return false;
    };

    // Signature first: the timestamp is attacker-controlled until the tag
    // over the exact payload bytes checks out.
    let expected_tag = sign(secret.as_bytes(), &payload_bytes);
    if !tags_match(&expected_tag, &presented_tag) {
        return false;
    }

    let Ok(payload) = serde_json::from_slice::<GracePayload>(&payload_bytes) else {
        return false;
    };

    let age_seconds = clock.now_epoch() - payload.iat;
    if age_seconds > max_age.as_secs() as i64 {
        return false;
    }
    if age_seconds < -MAX_FUTURE_SKEW_SECONDS {
        return false;
    }

    true
}
