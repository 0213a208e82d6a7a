//! # ECDSA Signing and Verification
//!
//! Compact-signature ECDSA over the two supported rotation-key curves.
//!
//! ## Security Invariant
//!
//! - Signatures are 64-byte compact `r || s`. Any other length fails to
//!   parse.
//! - `s` must be in the low half of the curve order. A high-S signature is
//!   `CryptoError::HighS`, never silently normalized — both curves' signers
//!   here emit low-S, so accepting the high form would admit a second valid
//!   encoding of every signature.
//! - The message is hashed with SHA-256 inside the verifier; callers pass
//!   the raw signed bytes, not a digest.
//! - Private keys are never exposed; keypair `Debug` prints a placeholder.

use didcell_core::CryptoError;
use k256::ecdsa::signature::hazmat::PrehashSigner;
use k256::ecdsa::signature::Verifier;

use crate::did_key::{encode_did_key, RotationKey, MULTICODEC_P256, MULTICODEC_SECP256K1};

/// Length of a compact `r || s` signature.
pub const COMPACT_SIGNATURE_LEN: usize = 64;

/// A keypair that can author identity operations: one trait over both
/// rotation-key curves, so callers building or signing operation chains
/// stay independent of the scheme each key uses.
pub trait Signer {
    /// Sign `message` (SHA-256 prehash), returning a low-S compact signature.
    fn sign(&self, message: &[u8]) -> Vec<u8>;
    /// The `did:key` rendering of the public key.
    fn did(&self) -> String;
}

impl Signer for Secp256k1Keypair {
    fn sign(&self, message: &[u8]) -> Vec<u8> {
        Secp256k1Keypair::sign(self, message)
    }
    fn did(&self) -> String {
        Secp256k1Keypair::did(self)
    }
}

impl Signer for P256Keypair {
    fn sign(&self, message: &[u8]) -> Vec<u8> {
        P256Keypair::sign(self, message)
    }
    fn did(&self) -> String {
        P256Keypair::did(self)
    }
}

/// Verify a compact ECDSA signature over `message` with the scheme implied
/// by the key.
pub fn verify_signature(
    key: &RotationKey,
    message: &[u8],
    signature: &[u8],
) -> Result<(), CryptoError> {
    if signature.len() != COMPACT_SIGNATURE_LEN {
        return Err(CryptoError::InvalidSignature(format!(
            "expected {COMPACT_SIGNATURE_LEN} bytes, got {}",
            signature.len()
        )));
    }
    match key {
        RotationKey::Secp256k1(vk) => {
            let sig = k256::ecdsa::Signature::from_slice(signature)
                .map_err(|e| CryptoError::InvalidSignature(e.to_string()))?;
            if sig.normalize_s().is_some() {
                return Err(CryptoError::HighS);
            }
            vk.verify(message, &sig)
                .map_err(|_| CryptoError::VerificationFailed)
        }
        RotationKey::P256(vk) => {
            let sig = p256::ecdsa::Signature::from_slice(signature)
                .map_err(|e| CryptoError::InvalidSignature(e.to_string()))?;
            if sig.normalize_s().is_some() {
                return Err(CryptoError::HighS);
            }
            vk.verify(message, &sig)
                .map_err(|_| CryptoError::VerificationFailed)
        }
    }
}

/// A secp256k1 keypair (rotation key class 1).
///
/// Does not implement `Serialize` — private keys must not be accidentally
/// serialized into logs, fixtures, or artifacts.
pub struct Secp256k1Keypair {
    signing_key: k256::ecdsa::SigningKey,
}

impl Secp256k1Keypair {
    /// Generate a new random keypair.
    pub fn generate() -> Self {
        Self {
            signing_key: k256::ecdsa::SigningKey::random(&mut rand::rngs::OsRng),
        }
    }

    /// Deterministic keypair from a 32-byte seed (the scalar itself).
    pub fn from_seed(seed: &[u8; 32]) -> Result<Self, CryptoError> {
        k256::ecdsa::SigningKey::from_bytes(seed.into())
            .map(|signing_key| Self { signing_key })
            .map_err(|e| CryptoError::KeyError(format!("bad secp256k1 seed: {e}")))
    }

    /// The verifying half.
    pub fn verifying_key(&self) -> RotationKey {
        RotationKey::Secp256k1(*self.signing_key.verifying_key())
    }

    /// The `did:key` rendering of the public key.
    pub fn did(&self) -> String {
        let point = self.signing_key.verifying_key().to_encoded_point(true);
        encode_did_key(MULTICODEC_SECP256K1, point.as_bytes())
    }

    /// Sign `message` (SHA-256 prehash), returning a low-S compact signature.
    pub fn sign(&self, message: &[u8]) -> Vec<u8> {
        let digest = didcell_core::sha256(message);
        let sig: k256::ecdsa::Signature = self
            .signing_key
            .sign_prehash(&digest)
            .expect("rfc6979 signing is infallible");
        let sig = sig.normalize_s().unwrap_or(sig);
        sig.to_bytes().to_vec()
    }
}

impl std::fmt::Debug for Secp256k1Keypair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Secp256k1Keypair(<private>)")
    }
}

/// A NIST P-256 keypair (rotation key class 2).
pub struct P256Keypair {
    signing_key: p256::ecdsa::SigningKey,
}

impl P256Keypair {
    /// Generate a new random keypair.
    pub fn generate() -> Self {
        Self {
            signing_key: p256::ecdsa::SigningKey::random(&mut rand::rngs::OsRng),
        }
    }

    /// Deterministic keypair from a 32-byte seed (the scalar itself).
    pub fn from_seed(seed: &[u8; 32]) -> Result<Self, CryptoError> {
        p256::ecdsa::SigningKey::from_bytes(seed.into())
            .map(|signing_key| Self { signing_key })
            .map_err(|e| CryptoError::KeyError(format!("bad p256 seed: {e}")))
    }

    /// The verifying half.
    pub fn verifying_key(&self) -> RotationKey {
        RotationKey::P256(*self.signing_key.verifying_key())
    }

    /// The `did:key` rendering of the public key.
    pub fn did(&self) -> String {
        let point = self.signing_key.verifying_key().to_encoded_point(true);
        encode_did_key(MULTICODEC_P256, point.as_bytes())
    }

    /// Sign `message` (SHA-256 prehash), returning a low-S compact signature.
    pub fn sign(&self, message: &[u8]) -> Vec<u8> {
        let digest = didcell_core::sha256(message);
        let sig: p256::ecdsa::Signature = self
            .signing_key
            .sign_prehash(&digest)
            .expect("rfc6979 signing is infallible");
        let sig = sig.normalize_s().unwrap_or(sig);
        sig.to_bytes().to_vec()
    }
}

impl std::fmt::Debug for P256Keypair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "P256Keypair(<private>)")
    }
}
