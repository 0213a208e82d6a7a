//! # CID — DAG-CBOR Content Identifiers
//!
//! An operation's `prev` field addresses its predecessor by CIDv1:
//!
//! ```text
//! b<base32( 0x01 0x71 0x12 0x20 || sha256(bytes) )>
//!    │       │    │    │    └─ digest length (32)
//!    │       │    │    └─ multihash code: sha2-256
//!    │       │    └─ codec: dag-cbor
//!    │       └─ CID version 1
//!    └─ multibase prefix: base32 lowercase, no padding
//! ```

use didcell_core::{base32, sha256};

const CID_HEADER: [u8; 4] = [0x01, 0x71, 0x12, 0x20];

/// Compute the CIDv1 string addressing `bytes` as a DAG-CBOR block.
pub fn dag_cbor_cid(bytes: &[u8]) -> String {
    let digest = sha256(bytes);
    let mut cid_bytes = Vec::with_capacity(CID_HEADER.len() + digest.len());
    cid_bytes.extend_from_slice(&CID_HEADER);
    cid_bytes.extend_from_slice(&digest);
    format!("b{}", base32::encode(&cid_bytes))
}
