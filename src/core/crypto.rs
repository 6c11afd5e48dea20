//! Crypto Primitives
//!
//! SHA-256, HMAC-SHA256, hex codec and the byte-to-double fold.
//! Every protocol participant (server, client, auditor) must produce
//! bit-identical outputs from these four operations; the whole
//! commit-reveal scheme hangs on that.

use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

/// 256-bit digest (32 bytes).
pub type Digest32 = [u8; 32];

type HmacSha256 = Hmac<Sha256>;

/// Divisor for the 8-byte fold: 2^64 as a double.
const TWO_POW_64: f64 = 18_446_744_073_709_551_616.0;

/// SHA-256 of raw bytes.
pub fn sha256(data: &[u8]) -> Digest32 {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// SHA-256 of raw bytes, hex encoded.
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(sha256(data))
}

/// HMAC-SHA256 over `msg` with `key`.
pub fn hmac_sha256(key: &[u8], msg: &[u8]) -> Digest32 {
    let mut mac = HmacSha256::new_from_slice(key)
        .expect("HMAC-SHA256 accepts keys of any length");
    mac.update(msg);
    mac.finalize().into_bytes().into()
}

/// HMAC-SHA256, hex encoded.
pub fn hmac_sha256_hex(key: &[u8], msg: &[u8]) -> String {
    hex::encode(hmac_sha256(key, msg))
}

/// Fold the first 8 digest bytes (big-endian) into a double.
///
/// The fold is `(hi * 2^32 + lo) / 2^64` computed in unsigned 64-bit
/// arithmetic, so every implementation that reads the same 8 bytes gets
/// the exact same double. Uniform over `[0, 1)` for practical purposes;
/// the handful of integers within half an ulp of 2^64 round to exactly
/// 1.0, identically everywhere.
pub fn bytes_to_double(digest: &Digest32) -> f64 {
    let hi = u32::from_be_bytes([digest[0], digest[1], digest[2], digest[3]]) as u64;
    let lo = u32::from_be_bytes([digest[4], digest[5], digest[6], digest[7]]) as u64;
    let folded = (hi << 32) | lo;
    folded as f64 / TWO_POW_64
}

/// Decode a hex string into bytes. Returns `None` on malformed input.
pub fn hex_decode(s: &str) -> Option<Vec<u8>> {
    hex::decode(s).ok()
}

/// Check that a string is exactly 64 lower-or-upper hex characters
/// (the shape of every commitment and seed in the protocol).
pub fn is_hex64(s: &str) -> bool {
    s.len() == 64 && s.bytes().all(|b| b.is_ascii_hexdigit())
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_known_vectors() {
        // NIST vectors. These values must never change.
        assert_eq!(
            sha256_hex(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_hmac_sha256_rfc4231() {
        // RFC 4231 test case 2.
        let tag = hmac_sha256_hex(b"Jefe", b"what do ya want for nothing?");
        assert_eq!(
            tag,
            "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"
        );
    }

    #[test]
    fn test_hmac_key_independence() {
        let a = hmac_sha256(b"key-a", b"message");
        let b = hmac_sha256(b"key-b", b"message");
        assert_ne!(a, b);
    }

    #[test]
    fn test_bytes_to_double_range() {
        let zeros = [0u8; 32];
        assert_eq!(bytes_to_double(&zeros), 0.0);

        let mut half = [0u8; 32];
        half[0] = 0x80;
        assert_eq!(bytes_to_double(&half), 0.5);

        // 2^64 - 1 is not representable as f64 and rounds up: the fold
        // of an all-ones prefix is exactly 1.0 on every platform.
        let ones = [0xFFu8; 32];
        assert_eq!(bytes_to_double(&ones), 1.0);

        // Clear headroom below the rounding edge (the f64 ulp near 2^64
        // is 2048) stays under 1.0.
        let mut below = [0xFFu8; 32];
        below[6] = 0x00;
        let v = bytes_to_double(&below);
        assert!(v < 1.0);
        assert!(v > 0.9999999999);
    }

    #[test]
    fn test_bytes_to_double_uses_first_eight_bytes_only() {
        let mut a = [0u8; 32];
        let mut b = [0u8; 32];
        a[..8].copy_from_slice(&[1, 2, 3, 4, 5, 6, 7, 8]);
        b[..8].copy_from_slice(&[1, 2, 3, 4, 5, 6, 7, 8]);
        b[8..].fill(0xAB);
        assert_eq!(bytes_to_double(&a), bytes_to_double(&b));
    }

    #[test]
    fn test_hex64_shape() {
        assert!(is_hex64(&"00".repeat(32)));
        assert!(is_hex64(&"ab".repeat(32)));
        assert!(!is_hex64(&"00".repeat(31)));
        assert!(!is_hex64(&"zz".repeat(32)));
    }

    #[test]
    fn test_hex_roundtrip() {
        let bytes = sha256(b"roundtrip");
        let encoded = hex::encode(bytes);
        assert_eq!(hex_decode(&encoded).unwrap(), bytes.to_vec());
    }
}
