//! # Digest — SHA-256 Helpers
//!
//! All content addressing in the stack is SHA-256: a DID is the truncated
//! digest of its genesis operation, and operation `prev` links address their
//! predecessor's digest. The helpers here are the single hashing path so the
//! digest primitive is swapped in one place if it ever needs to be.

use sha2::{Digest, Sha256};

/// Compute the SHA-256 digest of `data`.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let hash = Sha256::digest(data);
    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(&hash);
    bytes
}

/// Render the SHA-256 digest of `data` as a lowercase hex string.
pub fn sha256_hex(data: &[u8]) -> String {
    sha256(data).iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_sha256_vector() {
        // SHA256("") — verified against Python hashlib.sha256(b"").hexdigest()
        assert_eq!(
            sha256_hex(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        // SHA256("abc")
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_deterministic() {
        assert_eq!(sha256(b"didcell"), sha256(b"didcell"));
        assert_ne!(sha256(b"didcell"), sha256(b"didcel"));
    }

    #[test]
    fn test_hex_is_64_chars() {
        let hex = sha256_hex(b"x");
        assert_eq!(hex.len(), 64);
        assert!(hex.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
