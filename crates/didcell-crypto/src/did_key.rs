//! # did:key Parsing — Multibase + Multicodec
//!
//! Rotation keys are declared as `did:key` strings:
//!
//! ```text
//! did:key:z<base58btc( multicodec_prefix || compressed_sec1_point )>
//! ```
//!
//! | Prefix        | Curve     | Point encoding          |
//! |---------------|-----------|-------------------------|
//! | `0xe7 0x01`   | secp256k1 | SEC1 compressed, 33 B   |
//! | `0x80 0x24`   | P-256     | SEC1 compressed, 33 B   |
//!
//! Unknown multibase prefixes and multicodec tags are rejected (fail-closed).
//! Base58btc is implemented here — the workspace's dependency set has no
//! base58 crate to lean on, and the codec is as small as the hex and base32
//! helpers the stack already hand-rolls.

use didcell_core::CryptoError;

/// Multicodec tag for a secp256k1 public key.
pub const MULTICODEC_SECP256K1: [u8; 2] = [0xe7, 0x01];

/// Multicodec tag for a P-256 public key.
pub const MULTICODEC_P256: [u8; 2] = [0x80, 0x24];

const BASE58_ALPHABET: &[u8; 58] =
    b"123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

/// A parsed rotation key, scheme selected by its multicodec tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RotationKey {
    /// Rotation key class 1: secp256k1.
    Secp256k1(k256::ecdsa::VerifyingKey),
    /// Rotation key class 2: NIST P-256.
    P256(p256::ecdsa::VerifyingKey),
}

/// Parse a `did:key:z...` string into a verifying key.
pub fn parse_did_key(text: &str) -> Result<RotationKey, CryptoError> {
    let multibase = text
        .strip_prefix("did:key:")
        .ok_or_else(|| CryptoError::KeyError(format!("not a did:key: {text}")))?;
    let payload = multibase
        .strip_prefix('z')
        .ok_or_else(|| CryptoError::KeyError("unsupported multibase prefix".into()))?;
    let decoded = base58_decode(payload)
        .ok_or_else(|| CryptoError::KeyError("invalid base58btc payload".into()))?;
    if decoded.len() < 2 {
        return Err(CryptoError::KeyError("multicodec prefix missing".into()));
    }
    let (prefix, point) = decoded.split_at(2);
    match [prefix[0], prefix[1]] {
        MULTICODEC_SECP256K1 => k256::ecdsa::VerifyingKey::from_sec1_bytes(point)
            .map(RotationKey::Secp256k1)
            .map_err(|e| CryptoError::KeyError(format!("bad secp256k1 point: {e}"))),
        MULTICODEC_P256 => p256::ecdsa::VerifyingKey::from_sec1_bytes(point)
            .map(RotationKey::P256)
            .map_err(|e| CryptoError::KeyError(format!("bad p256 point: {e}"))),
        other => Err(CryptoError::KeyError(format!(
            "unknown multicodec prefix {:02x}{:02x}",
            other[0], other[1]
        ))),
    }
}

/// Render a multicodec-tagged public key as a `did:key` string.
pub(crate) fn encode_did_key(prefix: [u8; 2], compressed_point: &[u8]) -> String {
    let mut payload = Vec::with_capacity(2 + compressed_point.len());
    payload.extend_from_slice(&prefix);
    payload.extend_from_slice(compressed_point);
    format!("did:key:z{}", base58_encode(&payload))
}

fn base58_encode(data: &[u8]) -> String {
    let zeros = data.iter().take_while(|&&b| b == 0).count();
    let mut digits: Vec<u8> = Vec::with_capacity(data.len() * 2);
    for &byte in &data[zeros..] {
        let mut carry = usize::from(byte);
        for digit in digits.iter_mut() {
            carry += usize::from(*digit) << 8;
            *digit = (carry % 58) as u8;
            carry /= 58;
        }
        while carry > 0 {
            digits.push((carry % 58) as u8);
            carry /= 58;
        }
    }
    let mut out = String::with_capacity(zeros + digits.len());
    out.extend(std::iter::repeat('1').take(zeros));
    out.extend(
        digits
            .iter()
            .rev()
            .map(|&d| BASE58_ALPHABET[usize::from(d)] as char),
    );
    out
}

fn base58_decode(text: &str) -> Option<Vec<u8>> {
    let ones = text.bytes().take_while(|&b| b == b'1').count();
    let mut bytes: Vec<u8> = Vec::with_capacity(text.len());
    for ch in text.bytes().skip(ones) {
        let mut carry = BASE58_ALPHABET.iter().position(|&a| a == ch)?;
        for byte in bytes.iter_mut() {
            carry += usize::from(*byte) * 58;
            *byte = (carry & 0xff) as u8;
            carry >>= 8;
        }
        while carry > 0 {
            bytes.push((carry & 0xff) as u8);
            carry >>= 8;
        }
    }
    let mut out = vec![0u8; ones];
    out.extend(bytes.iter().rev());
    Some(out)
}
