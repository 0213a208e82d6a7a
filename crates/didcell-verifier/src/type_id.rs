//! # Type Identifier — Uniqueness Binding
//!
//! A DID cell's type script carries a 20-byte argument derived from the
//! creating transaction: BLAKE2b-256 (personalization `ckb-default-hash`)
//! over the serialized first input reference followed by the output index
//! as a little-endian u64, truncated to 20 bytes.
//!
//! Because the first input can only be spent once, the identifier is unique
//! to the creation transaction; because updates must keep the same type
//! script, it is constant across the cell's whole lifetime.

use didcell_core::{TypeId, TYPE_ID_LEN};

const PERSONALIZATION: &[u8; 16] = b"ckb-default-hash";

/// Derive the type identifier for a cell created by this transaction.
pub fn derive_type_id(first_input_reference: &[u8], output_index: u64) -> TypeId {
    let hash = blake2b_simd::Params::new()
        .hash_length(32)
        .personal(PERSONALIZATION)
        .to_state()
        .update(first_input_reference)
        .update(&output_index.to_le_bytes())
        .finalize();
    let mut raw = [0u8; TYPE_ID_LEN];
    raw.copy_from_slice(&hash.as_bytes()[..TYPE_ID_LEN]);
    TypeId::from_raw(raw)
}
