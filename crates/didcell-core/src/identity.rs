//! # Domain Identity Newtypes
//!
//! Newtype wrappers for the three identifier kinds in the stack. These
//! prevent accidental identifier confusion — you cannot pass a raw type-id
//! argument where a local id is expected.
//!
//! ## Derivation Chain
//!
//! ```text
//! genesis operation bytes
//!   └─ sha256, first 15 bytes ──▶ Did (binary, 15 bytes)
//!        └─ "did:plc:" + base32 ──▶ LocalId (raw UTF-8 bytes, on-chain)
//! ```
//!
//! A `TypeId` is unrelated to the DID: it is the 20-byte uniqueness argument
//! carried by the cell's type script, derived from the creating transaction.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::base32;
use crate::digest::sha256;

/// Length of a binary `did:plc` identifier: 24 base32 characters = 120 bits.
pub const DID_RAW_LEN: usize = 15;

/// Text prefix of a rendered `did:plc` identifier.
pub const LOCAL_ID_PREFIX: &str = "did:plc:";

/// Length of a type-identifier script argument.
pub const TYPE_ID_LEN: usize = 20;

/// Error parsing an identifier from untrusted bytes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdentityError {
    /// The local id is not valid UTF-8, lacks the `did:plc:` prefix, or its
    /// base32 payload does not decode to exactly [`DID_RAW_LEN`] bytes.
    #[error("invalid did:plc local id: {0}")]
    InvalidLocalId(String),

    /// A type-identifier argument was not exactly [`TYPE_ID_LEN`] bytes.
    #[error("type id must be {TYPE_ID_LEN} bytes, got {0}")]
    BadTypeIdLength(usize),
}

/// A binary `did:plc` identifier — the content-addressed identity derived
/// from a genesis operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Did([u8; DID_RAW_LEN]);

impl Did {
    /// Derive the DID for a genesis operation from its exact encoded bytes.
    ///
    /// The identifier is the first 120 bits of `sha256(genesis_bytes)` —
    /// equivalently, the first 24 base32 characters of the digest.
    pub fn from_genesis_bytes(genesis_bytes: &[u8]) -> Self {
        let digest = sha256(genesis_bytes);
        let mut raw = [0u8; DID_RAW_LEN];
        raw.copy_from_slice(&digest[..DID_RAW_LEN]);
        Self(raw)
    }

    /// Construct from raw identifier bytes.
    pub fn from_raw(raw: [u8; DID_RAW_LEN]) -> Self {
        Self(raw)
    }

    /// The raw identifier bytes.
    pub fn as_bytes(&self) -> &[u8; DID_RAW_LEN] {
        &self.0
    }

    /// Parse a `did:plc:...` string.
    pub fn parse(text: &str) -> Result<Self, IdentityError> {
        let payload = text
            .strip_prefix(LOCAL_ID_PREFIX)
            .ok_or_else(|| IdentityError::InvalidLocalId(format!("missing prefix: {text}")))?;
        let raw = base32::decode(payload)
            .ok_or_else(|| IdentityError::InvalidLocalId(format!("bad base32: {payload}")))?;
        let raw: [u8; DID_RAW_LEN] = raw
            .try_into()
            .map_err(|v: Vec<u8>| IdentityError::InvalidLocalId(format!("{} bytes", v.len())))?;
        Ok(Self(raw))
    }
}

impl std::fmt::Display for Did {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", LOCAL_ID_PREFIX, base32::encode(&self.0))
    }
}

/// The chain-native byte rendering of a DID: the `did:plc:...` string stored
/// as raw UTF-8 bytes in cell data, compared byte-for-byte across updates.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LocalId(Vec<u8>);

impl LocalId {
    /// Wrap raw on-chain bytes. No validation — cell data is untrusted until
    /// [`LocalId::to_did`] succeeds.
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// The canonical local id for a DID.
    pub fn from_did(did: &Did) -> Self {
        Self(did.to_string().into_bytes())
    }

    /// The raw bytes as stored on chain.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Parse the bytes back into the DID they render.
    pub fn to_did(&self) -> Result<Did, IdentityError> {
        let text = std::str::from_utf8(&self.0)
            .map_err(|_| IdentityError::InvalidLocalId("not utf-8".into()))?;
        Did::parse(text)
    }
}

impl From<&Did> for LocalId {
    fn from(did: &Did) -> Self {
        LocalId::from_did(did)
    }
}

/// The 20-byte type-identifier argument that makes a DID cell unique and
/// continuous across updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeId([u8; TYPE_ID_LEN]);

impl TypeId {
    /// Construct from exactly 20 bytes.
    pub fn from_raw(raw: [u8; TYPE_ID_LEN]) -> Self {
        Self(raw)
    }

    /// The raw argument bytes.
    pub fn as_bytes(&self) -> &[u8; TYPE_ID_LEN] {
        &self.0
    }
}

impl TryFrom<&[u8]> for TypeId {
    type Error = IdentityError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        let raw: [u8; TYPE_ID_LEN] = bytes
            .try_into()
            .map_err(|_| IdentityError::BadTypeIdLength(bytes.len()))?;
        Ok(Self(raw))
    }
}

impl std::fmt::Display for TypeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for b in &self.0 {
            write!(f, "{b:02x}")?;
        }
        Ok(())
    }
}
