//! # Error Types — Terminal Verification Errors
//!
//! Defines the error types used throughout the didcell stack. All errors use
//! `thiserror` for derive-based `Display` and `Error` implementations.
//!
//! ## Design
//!
//! - Verification is deterministic: re-running with the same inputs yields
//!   the same outcome. Every variant is terminal — there is no retry path
//!   and no partial acceptance.
//! - Subsystem errors (`CodecError`, `CryptoError`, `PlcError`) convert into
//!   the top-level [`VerifyError`] so a rejection names the stage that
//!   produced it without leaking partial state.
//! - Signature-chain failures are undifferentiated on purpose: a wrong key,
//!   an out-of-range index, and a corrupt signature all collapse into
//!   `InvalidSignatureChain`. The one carve-out is the index/history length
//!   check, which rejects before any cryptographic work runs.

use thiserror::Error;

/// Top-level outcome of verifying one transaction. Terminal, non-retryable.
#[derive(Error, Debug)]
pub enum VerifyError {
    /// Schema decode failure: truncated buffer, bad union discriminant,
    /// inconsistent length or offset fields, or a near-miss schema with
    /// extra trailing fields.
    #[error("malformed encoding: {0}")]
    MalformedEncoding(#[from] CodecError),

    /// Wrong input/output cardinality, or a type-identifier argument whose
    /// length or derivation does not match the attempted transition.
    #[error("invalid transaction shape: {0}")]
    InvalidShape(String),

    /// The local id changed across an update, or a newly derived local id
    /// disagrees with the signed operation history.
    #[error("local id mismatch: {0}")]
    LocalIdMismatch(String),

    /// Some step of the signature-chain walk failed: an unparseable
    /// operation, a broken prev link, an out-of-range key index, or a
    /// signature that does not verify.
    #[error("invalid signature chain: {0}")]
    InvalidSignatureChain(String),

    /// The rotation-key index list and the operation history disagree in
    /// length. Checked before any cryptography runs.
    #[error("history length mismatch: {indices} key indices for {operations} operations")]
    HistoryLengthMismatch {
        /// Number of entries in the rotation-key index list.
        indices: usize,
        /// Number of operations in the supplied history.
        operations: usize,
    },
}

/// Error decoding or encoding the fixed-layout binary schemas.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// The buffer ended before the structure did.
    #[error("truncated buffer: need {needed} bytes at offset {offset}, have {available}")]
    Truncated {
        /// Byte offset at which the read was attempted.
        offset: usize,
        /// Bytes required to satisfy the read.
        needed: usize,
        /// Bytes actually remaining.
        available: usize,
    },

    /// A union carried an item id this schema does not define.
    #[error("unknown union discriminant {0}")]
    UnknownUnionId(u32),

    /// A table's field count differs from the expected schema. Extra
    /// trailing fields are rejected: decoding uses the exact schema, not a
    /// permissive superset.
    #[error("table field count {actual} does not match schema ({expected})")]
    FieldCountMismatch {
        /// Field count the schema defines.
        expected: usize,
        /// Field count found in the buffer.
        actual: usize,
    },

    /// A size, offset, or length field is inconsistent with the buffer.
    #[error("inconsistent layout: {0}")]
    InconsistentLayout(String),

    /// A required piece of encoded data is absent entirely.
    #[error("missing data: {0}")]
    MissingData(String),

    /// The document blob is not a well-formed CBOR item.
    #[error("document is not well-formed cbor")]
    MalformedDocument,
}

/// Error in signature-scheme operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// Key parsing failed: bad multibase, unknown multicodec prefix, or an
    /// invalid curve point.
    #[error("key error: {0}")]
    KeyError(String),

    /// Signature bytes could not be parsed as a compact ECDSA signature.
    #[error("invalid signature encoding: {0}")]
    InvalidSignature(String),

    /// The signature's `s` component is in the high half of the curve
    /// order. High-S signatures are rejected, never normalized.
    #[error("signature s component is not low-S")]
    HighS,

    /// The signature did not verify against the key and message.
    #[error("signature verification failed")]
    VerificationFailed,
}

/// Error in the PLC operation-history walk.
#[derive(Error, Debug)]
pub enum PlcError {
    /// An operation could not be parsed. Unparseable operations are a hard
    /// failure, never a silent skip.
    #[error("invalid operation at position {position}: {reason}")]
    InvalidOperation {
        /// Zero-based position in the history.
        position: usize,
        /// What failed to parse.
        reason: String,
    },

    /// The history is empty. A genesis operation is always required.
    #[error("empty operation history")]
    EmptyHistory,

    /// The first operation is not a genesis operation (its `prev` field is
    /// not null).
    #[error("first operation is not a genesis operation")]
    NotGenesis,

    /// An operation's `prev` link does not address its predecessor.
    #[error("operation {position} prev link does not match predecessor")]
    InvalidPrev {
        /// Zero-based position of the operation with the bad link.
        position: usize,
    },

    /// A rotation-key index selected a position outside the active key set.
    #[error("rotation key index {index} out of range for key set of {available}")]
    KeyIndexOutOfRange {
        /// The index that was requested.
        index: usize,
        /// Size of the key set active at that point.
        available: usize,
    },

    /// The rotation-key index list and history lengths disagree.
    #[error("{indices} key indices for {operations} operations")]
    HistoryLengthMismatch {
        /// Number of entries in the rotation-key index list.
        indices: usize,
        /// Number of operations in the supplied history.
        operations: usize,
    },

    /// The DID derived from the genesis operation disagrees with the DID
    /// claimed by the cell.
    #[error("derived DID does not match the claimed identity")]
    DidMismatch,

    /// A cryptographic step failed.
    #[error(transparent)]
    Crypto(#[from] CryptoError),
}

impl From<PlcError> for VerifyError {
    fn from(e: PlcError) -> Self {
        match e {
            PlcError::HistoryLengthMismatch {
                indices,
                operations,
            } => VerifyError::HistoryLengthMismatch {
                indices,
                operations,
            },
            PlcError::DidMismatch => VerifyError::LocalIdMismatch(e.to_string()),
            other => VerifyError::InvalidSignatureChain(other.to_string()),
        }
    }
}

impl From<CryptoError> for VerifyError {
    fn from(e: CryptoError) -> Self {
        VerifyError::InvalidSignatureChain(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_mismatch_keeps_its_kind() {
        let e: VerifyError = PlcError::HistoryLengthMismatch {
            indices: 3,
            operations: 1,
        }
        .into();
        assert!(matches!(
            e,
            VerifyError::HistoryLengthMismatch {
                indices: 3,
                operations: 1
            }
        ));
    }

    #[test]
    fn test_crypto_failures_collapse_into_signature_chain() {
        let e: VerifyError = PlcError::Crypto(CryptoError::HighS).into();
        assert!(matches!(e, VerifyError::InvalidSignatureChain(_)));

        let e: VerifyError = PlcError::KeyIndexOutOfRange {
            index: 9,
            available: 2,
        }
        .into();
        assert!(matches!(e, VerifyError::InvalidSignatureChain(_)));
    }

    #[test]
    fn test_did_mismatch_maps_to_local_id_mismatch() {
        let e: VerifyError = PlcError::DidMismatch.into();
        assert!(matches!(e, VerifyError::LocalIdMismatch(_)));
    }

    #[test]
    fn test_codec_error_display_names_the_offset() {
        let e = CodecError::Truncated {
            offset: 12,
            needed: 4,
            available: 1,
        };
        let s = e.to_string();
        assert!(s.contains("offset 12"));
        assert!(s.contains("need 4"));
    }
}
