//! HMAC-SHA256 signing over credential payloads.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Compute the HMAC-SHA256 tag of `payload` under `secret`.
pub fn sign(secret: &[u8], payload: &[u8]) -> Vec<u8> {
    // HMAC-SHA256 accepts keys of any length, so new_from_slice cannot
    // actually fail here; an empty secret is rejected at config time.
    let mut mac = match HmacSha256::new_from_slice(secret) {
        Ok(mac) => mac,
        Err(_) => return Vec::new(),
    };
    mac.update(payload);
    mac.finalize().into_bytes().to_vec()
}

/// Constant-time comparison of a presented tag against the expected tag.
///
/// Length mismatch is an immediate reject; equal-length tags are compared
/// without early exit so verification latency leaks nothing about where
/// two tags diverge.
pub fn tags_match(expected: &[u8], presented: &[u8]) -> bool {
    if expected.len() != presented.len() {
        return false;
    }
    expected.ct_eq(presented).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_is_deterministic() {
        let a = sign(b"secret", b"payload");
        let b = sign(b"secret", b"payload");
        assert_eq!(a, b);
        assert_eq!(a.len(), 32);
    }

    #[test]
    fn sign_depends_on_secret() {
        assert_ne!(sign(b"secret-a", b"payload"), sign(b"secret-b", b"payload"));
    }

    #[test]
    fn sign_depends_on_payload() {
        assert_ne!(sign(b"secret", b"payload-a"), sign(b"secret", b"payload-b"));
    }

    #[test]
    fn tags_match_accepts_equal() {
        let tag = sign(b"secret", b"payload");
        assert!(tags_match(&tag, &tag.clone()));
    }

    #[test]
    fn tags_match_rejects_single_bit_flip() {
        let tag = sign(b"secret", b"payload");
        for bit in 0..8 {
            let mut flipped = tag.clone();
            flipped[0] ^= 1 << bit;
            assert!(!tags_match(&tag, &flipped));
        }
    }

    #[test]
    fn tags_match_rejects_length_mismatch() {
        let tag = sign(b"secret", b"payload");
        assert!(!tags_match(&tag, &tag[..16]));
        assert!(!tags_match(&tag, b""));
    }
}
