//! # didcell-molecule — Fixed-Layout Binary Schema Codec
//!
//! Encodes and decodes the two on-chain structures of the DID cell protocol:
//!
//! - [`DidCellData`] — the persisted cell payload, a versioned union wrapping
//!   a document blob and an optional local id.
//! - [`DidCellWitness`] — the transient per-transaction authorization record:
//!   operation history, witness signature, rotation-key index list.
//!
//! The wire format is molecule: field offsets and length prefixes are part of
//! the format, not ad hoc. Layout primitives live in [`layout`]; the typed
//! schemas in [`schema`].
//!
//! ## Security Invariant
//!
//! Decoding uses the exact expected schema, never a permissive superset. A
//! table whose field count differs from the schema — including a witness
//! encoded under an extended layout with an extra trailing padding field —
//! is rejected with `CodecError::FieldCountMismatch`, even when its leading
//! fields match byte-for-byte.
//!
//! ## Crate Policy
//!
//! - Encode is lossless: `decode(encode(x)) == x` for every valid `x`.
//! - No serde on wire types — the byte layout is the contract.

pub mod layout;
pub mod schema;

pub use schema::{DidCellData, DidCellDataV1, DidCellWitness, PlcAuthorization};
