//! # didcell-crypto — Rotation-Key Signature Schemes
//!
//! The two signature schemes a DID's rotation keys may use:
//!
//! - **secp256k1** ECDSA (rotation key class 1), via `k256`.
//! - **NIST P-256** ECDSA (rotation key class 2), via `p256`.
//!
//! The scheme is selected per key from its `did:key` multicodec tag, never
//! globally. Verification hashes the message with SHA-256 and requires
//! compact 64-byte `r || s` signatures with a low-S `s` component — a high-S
//! signature is rejected, not normalized.
//!
//! ## Crate Policy
//!
//! - Private keys are never serialized or logged; keypair `Debug` impls
//!   print a placeholder.
//! - No mocking of cryptographic operations in tests — all tests use real
//!   keys, real SHA-256, real curve arithmetic.

pub mod did_key;
pub mod ecdsa;

pub use did_key::{parse_did_key, RotationKey};
pub use ecdsa::{verify_signature, P256Keypair, Secp256k1Keypair, Signer, COMPACT_SIGNATURE_LEN};
