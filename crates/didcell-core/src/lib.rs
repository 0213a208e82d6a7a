//! # didcell-core — Foundational Types for the didcell Stack
//!
//! This crate is the bedrock of the didcell verifier workspace. It defines
//! the type-system primitives every other crate builds on. Every other crate
//! in the workspace depends on `didcell-core`; it depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for domain primitives.** `Did`, `LocalId`, `TypeId` —
//!    all newtypes with validated constructors. No bare byte slices for
//!    identifiers.
//!
//! 2. **One terminal error taxonomy.** Verification is deterministic and
//!    non-retryable: every failure surfaces as exactly one of the five
//!    [`VerifyError`] kinds. Per-subsystem error enums convert into it via
//!    `#[from]`, so a failing stage keeps its attribution.
//!
//! 3. **Content-derived identity.** A `Did` is never minted randomly — it is
//!    the truncated SHA-256 of a genesis operation's bytes, and `LocalId` is
//!    its fixed on-chain text rendering. Both directions are validated.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `didcell-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.
//! - All public types derive `Debug` and `Clone`.

pub mod base32;
pub mod digest;
pub mod error;
pub mod identity;

// Re-export primary types for ergonomic imports.
pub use digest::{sha256, sha256_hex};
pub use error::{CodecError, CryptoError, PlcError, VerifyError};
pub use identity::{Did, IdentityError, LocalId, TypeId, DID_RAW_LEN, LOCAL_ID_PREFIX, TYPE_ID_LEN};
