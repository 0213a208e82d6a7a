//! # Schema Types — DID Cell Data and Witness
//!
//! The typed view of the wire format:
//!
//! ```text
//! table DidCellDataV1 {            union DidCellData {
//!     document: Bytes,                 DidCellDataV1,      // item id 0
//!     local_id: BytesOpt,          }
//! }
//!
//! table PlcAuthorization {         table DidCellWitness {
//!     history: BytesVec,               local_id_authorization: PlcAuthorization,
//!     sig: Bytes,                  }
//!     rotation_key_indices: Uint8Vec,
//! }
//! ```
//!
//! `DidCellData` is an open union: adding a document-format version means
//! adding a variant here, and every consumption site matches exhaustively so
//! the addition is a compile-time-checked change. Unknown item ids are a
//! decode error, not a fallthrough.

use didcell_core::CodecError;

use crate::layout;

/// Item id of the only currently defined cell-data version.
const DID_CELL_DATA_V1: u32 = 0;

/// Version 1 of the persisted DID cell payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DidCellDataV1 {
    /// Opaque document blob. Understood by higher layers; the verifier only
    /// checks well-formedness, never contents.
    pub document: Vec<u8>,
    /// Present only while the cell is associated with an off-chain DID.
    /// Byte-identical across every update once set.
    pub local_id: Option<Vec<u8>>,
}

impl DidCellDataV1 {
    /// Decode from the union variant's body.
    fn decode_body(buf: &[u8]) -> Result<Self, CodecError> {
        let fields = layout::table_fields(buf, 2)?;
        let document = layout::fixvec_bytes(fields[0])?.to_vec();
        let local_id = match layout::option_body(fields[1]) {
            None => None,
            Some(body) => Some(layout::fixvec_bytes(body)?.to_vec()),
        };
        Ok(Self { document, local_id })
    }

    fn encode_body(&self) -> Vec<u8> {
        let document = layout::encode_fixvec_bytes(&self.document);
        let local_id = match &self.local_id {
            None => Vec::new(),
            Some(bytes) => layout::encode_fixvec_bytes(bytes),
        };
        layout::encode_table(&[document, local_id])
    }
}

/// The persisted cell payload: a discriminated union over document-format
/// versions. One variant is currently defined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DidCellData {
    /// Version 1 layout.
    V1(DidCellDataV1),
}

impl DidCellData {
    /// Decode a cell-data payload with the exact expected schema.
    pub fn decode(buf: &[u8]) -> Result<Self, CodecError> {
        let (item_id, body) = layout::union_body(buf)?;
        match item_id {
            DID_CELL_DATA_V1 => Ok(Self::V1(DidCellDataV1::decode_body(body)?)),
            other => Err(CodecError::UnknownUnionId(other)),
        }
    }

    /// Encode losslessly; `decode(encode(x)) == x`.
    pub fn encode(&self) -> Vec<u8> {
        match self {
            Self::V1(v1) => layout::encode_union(DID_CELL_DATA_V1, &v1.encode_body()),
        }
    }

    /// The inner payload, version-independent.
    pub fn as_v1(&self) -> &DidCellDataV1 {
        match self {
            Self::V1(v1) => v1,
        }
    }
}

/// The authorization record carried in the transaction witness: the DID
/// operation history plus the witness-level signature that binds the newest
/// operation to this transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlcAuthorization {
    /// Operation blobs, oldest first. The first element is the genesis
    /// operation.
    pub history: Vec<Vec<u8>>,
    /// Signature over the transaction hash by a currently-valid rotation key.
    pub sig: Vec<u8>,
    /// One key index per operation, each selecting a position in the key set
    /// active at that point, optionally plus a final entry for the witness
    /// signature.
    pub rotation_key_indices: Vec<u8>,
}

impl PlcAuthorization {
    fn decode_body(buf: &[u8]) -> Result<Self, CodecError> {
        let fields = layout::table_fields(buf, 3)?;
        let history = layout::dynvec_items(fields[0])?
            .into_iter()
            .map(|item| layout::fixvec_bytes(item).map(<[u8]>::to_vec))
            .collect::<Result<Vec<_>, _>>()?;
        let sig = layout::fixvec_bytes(fields[1])?.to_vec();
        let rotation_key_indices = layout::fixvec_bytes(fields[2])?.to_vec();
        Ok(Self {
            history,
            sig,
            rotation_key_indices,
        })
    }

    fn encode_body(&self) -> Vec<u8> {
        let history_items: Vec<Vec<u8>> = self
            .history
            .iter()
            .map(|op| layout::encode_fixvec_bytes(op))
            .collect();
        layout::encode_table(&[
            layout::encode_table(&history_items),
            layout::encode_fixvec_bytes(&self.sig),
            layout::encode_fixvec_bytes(&self.rotation_key_indices),
        ])
    }
}

/// The DID witness: wraps the authorization record. Exists only transiently
/// per verification call, reconstructed from each transaction's witness.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DidCellWitness {
    /// The authorization record for the local-id association.
    pub local_id_authorization: PlcAuthorization,
}

impl DidCellWitness {
    /// Decode a witness with the exact expected schema. A structurally
    /// similar layout with extra trailing fields is rejected.
    pub fn decode(buf: &[u8]) -> Result<Self, CodecError> {
        let fields = layout::table_fields(buf, 1)?;
        Ok(Self {
            local_id_authorization: PlcAuthorization::decode_body(fields[0])?,
        })
    }

    /// Encode losslessly; `decode(encode(x)) == x`.
    pub fn encode(&self) -> Vec<u8> {
        layout::encode_table(&[self.local_id_authorization.encode_body()])
    }
}
