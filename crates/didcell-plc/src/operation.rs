//! # Identity Operations — DAG-CBOR Decode, Canonical Encode, Authoring
//!
//! One entry in a DID's operation log. Three kinds exist on the wire:
//!
//! - `plc_operation` — the regular form; declares the full rotation-key set.
//! - `create` — the legacy genesis form; its rotation keys are
//!   `[recoveryKey, signingKey]` in that order.
//! - `plc_tombstone` — deactivates the identity; declares no keys, so
//!   nothing can be authorized after it.
//!
//! ## Canonical Encoding
//!
//! The signing input for an operation is its DAG-CBOR encoding with the
//! `sig` field removed: definite lengths, minimal integer widths, and map
//! keys sorted length-first then bytewise. Every verification and every
//! authoring path flows through [`encode_canonical`], so there is exactly
//! one byte producer for signed material.
//!
//! Anything unparseable — not a map, unknown `type`, non-text keys, missing
//! mandatory fields — is a hard failure. The verifier never skips an
//! operation it cannot read.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use ciborium::Value;
use didcell_crypto::Signer;
use thiserror::Error;

use crate::cid::dag_cbor_cid;

/// Error reading or authoring a single operation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OperationError {
    /// The bytes are not a CBOR map.
    #[error("operation is not a CBOR map")]
    NotAMap,

    /// A map key is not a text string.
    #[error("operation has a non-text map key")]
    NonTextKey,

    /// A mandatory field is absent.
    #[error("missing field `{0}`")]
    MissingField(&'static str),

    /// A field is present with the wrong CBOR type.
    #[error("field `{0}` has the wrong type")]
    BadField(&'static str),

    /// The `type` field names an unknown operation kind.
    #[error("unknown operation type `{0}`")]
    UnknownType(String),

    /// CBOR serialization failed while encoding.
    #[error("cbor encoding failed: {0}")]
    Encode(String),

    /// The embedded signature is not valid base64url.
    #[error("signature is not base64url: {0}")]
    BadSignatureEncoding(String),
}

/// The kind of an operation, from its `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    /// Legacy genesis form.
    Create,
    /// Regular operation.
    PlcOperation,
    /// Deactivation marker.
    Tombstone,
}

/// A parsed identity operation, together with its exact wire bytes.
#[derive(Debug, Clone)]
pub struct Operation {
    bytes: Vec<u8>,
    entries: Vec<(Value, Value)>,
    kind: OperationKind,
    prev: Option<String>,
    sig: String,
    rotation_keys: Vec<String>,
}

fn field<'a>(entries: &'a [(Value, Value)], name: &str) -> Option<&'a Value> {
    entries.iter().find_map(|(k, v)| match k {
        Value::Text(text) if text == name => Some(v),
        _ => None,
    })
}

fn text_field(
    entries: &[(Value, Value)],
    name: &'static str,
) -> Result<String, OperationError> {
    match field(entries, name) {
        Some(Value::Text(text)) => Ok(text.clone()),
        Some(_) => Err(OperationError::BadField(name)),
        None => Err(OperationError::MissingField(name)),
    }
}

impl Operation {
    /// Parse one operation from its exact encoded bytes.
    pub fn parse(bytes: &[u8]) -> Result<Self, OperationError> {
        let value: Value = ciborium::de::from_reader(bytes)
            .map_err(|_| OperationError::NotAMap)?;
        let Value::Map(entries) = value else {
            return Err(OperationError::NotAMap);
        };
        if entries.iter().any(|(k, _)| !matches!(k, Value::Text(_))) {
            return Err(OperationError::NonTextKey);
        }

        let kind = match text_field(&entries, "type")?.as_str() {
            "create" => OperationKind::Create,
            "plc_operation" => OperationKind::PlcOperation,
            "plc_tombstone" => OperationKind::Tombstone,
            other => return Err(OperationError::UnknownType(other.to_string())),
        };

        let prev = match field(&entries, "prev") {
            Some(Value::Null) => None,
            Some(Value::Text(cid)) => Some(cid.clone()),
            Some(_) => return Err(OperationError::BadField("prev")),
            None => return Err(OperationError::MissingField("prev")),
        };

        let sig = text_field(&entries, "sig")?;

        let rotation_keys = match kind {
            OperationKind::PlcOperation => match field(&entries, "rotationKeys") {
                Some(Value::Array(items)) => items
                    .iter()
                    .map(|item| match item {
                        Value::Text(text) => Ok(text.clone()),
                        _ => Err(OperationError::BadField("rotationKeys")),
                    })
                    .collect::<Result<Vec<_>, _>>()?,
                Some(_) => return Err(OperationError::BadField("rotationKeys")),
                None => return Err(OperationError::MissingField("rotationKeys")),
            },
            // The legacy form authorizes its recovery key first, then the
            // signing key.
            OperationKind::Create => vec![
                text_field(&entries, "recoveryKey")?,
                text_field(&entries, "signingKey")?,
            ],
            OperationKind::Tombstone => Vec::new(),
        };

        Ok(Self {
            bytes: bytes.to_vec(),
            entries,
            kind,
            prev,
            sig,
            rotation_keys,
        })
    }

    /// The exact bytes this operation arrived as.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// The operation kind.
    pub fn kind(&self) -> OperationKind {
        self.kind
    }

    /// The predecessor CID, or `None` for a genesis operation.
    pub fn prev(&self) -> Option<&str> {
        self.prev.as_deref()
    }

    /// Whether this operation starts a log.
    pub fn is_genesis(&self) -> bool {
        self.prev.is_none()
    }

    /// The rotation-key set this operation declares. Empty for a tombstone:
    /// nothing can be authorized after one.
    pub fn rotation_keys(&self) -> &[String] {
        &self.rotation_keys
    }

    /// The embedded signature, decoded from base64url.
    pub fn sig_bytes(&self) -> Result<Vec<u8>, OperationError> {
        URL_SAFE_NO_PAD
            .decode(&self.sig)
            .map_err(|e| OperationError::BadSignatureEncoding(e.to_string()))
    }

    /// The canonical signing input: this operation without its `sig` field.
    pub fn unsigned_bytes(&self) -> Result<Vec<u8>, OperationError> {
        let unsigned: Vec<(Value, Value)> = self
            .entries
            .iter()
            .filter(|(k, _)| !matches!(k, Value::Text(t) if t == "sig"))
            .cloned()
            .collect();
        encode_canonical(&Value::Map(unsigned))
    }
}

/// Whether `bytes` parse as one CBOR item. Cell documents stay opaque to the
/// verifier, but they must at least be readable by the layers above.
pub fn well_formed_cbor(bytes: &[u8]) -> bool {
    ciborium::de::from_reader::<Value, _>(bytes).is_ok()
}

// ── Canonical encoding ───────────────────────────────────────────────

fn canonical_value(value: &Value) -> Result<Value, OperationError> {
    match value {
        Value::Map(entries) => {
            let mut sorted = entries
                .iter()
                .map(|(k, v)| {
                    if !matches!(k, Value::Text(_)) {
                        return Err(OperationError::NonTextKey);
                    }
                    Ok((k.clone(), canonical_value(v)?))
                })
                .collect::<Result<Vec<_>, _>>()?;
            // DAG-CBOR map ordering: shorter keys first, ties bytewise.
            sorted.sort_by(|(a, _), (b, _)| {
                let a = match a {
                    Value::Text(t) => t.as_bytes(),
                    _ => &[],
                };
                let b = match b {
                    Value::Text(t) => t.as_bytes(),
                    _ => &[],
                };
                (a.len(), a).cmp(&(b.len(), b))
            });
            Ok(Value::Map(sorted))
        }
        Value::Array(items) => Ok(Value::Array(
            items
                .iter()
                .map(canonical_value)
                .collect::<Result<Vec<_>, _>>()?,
        )),
        other => Ok(other.clone()),
    }
}

/// Encode a value as canonical DAG-CBOR.
pub fn encode_canonical(value: &Value) -> Result<Vec<u8>, OperationError> {
    let canonical = canonical_value(value)?;
    let mut buf = Vec::new();
    ciborium::ser::into_writer(&canonical, &mut buf)
        .map_err(|e| OperationError::Encode(e.to_string()))?;
    Ok(buf)
}

// ── Authoring ────────────────────────────────────────────────────────
//
// Mirrors the upstream operation-log tooling closely enough to produce
// chains the verifier accepts; used by the CLI and the integration tests.

fn text(s: &str) -> Value {
    Value::Text(s.to_string())
}

/// Build an unsigned genesis operation declaring the given keys and service
/// endpoints.
pub fn genesis_operation(
    signing_key: &str,
    rotation_keys: &[String],
    handle: &str,
    pds: &str,
) -> Value {
    Value::Map(vec![
        (text("type"), text("plc_operation")),
        (
            text("verificationMethods"),
            Value::Map(vec![(text("atproto"), text(signing_key))]),
        ),
        (
            text("rotationKeys"),
            Value::Array(rotation_keys.iter().map(|k| text(k)).collect()),
        ),
        (
            text("alsoKnownAs"),
            Value::Array(vec![text(handle)]),
        ),
        (
            text("services"),
            Value::Map(vec![(
                text("atproto_pds"),
                Value::Map(vec![
                    (text("type"), text("AtprotoPersonalDataServer")),
                    (text("endpoint"), text(pds)),
                ]),
            )]),
        ),
        (text("prev"), Value::Null),
    ])
}

/// Clone a predecessor into a new unsigned operation: drop `sig`, point
/// `prev` at the predecessor, then apply `edit` to the entry list.
fn derived_operation(
    prev: &Operation,
    edit: impl FnOnce(&mut Vec<(Value, Value)>),
) -> Value {
    let mut entries: Vec<(Value, Value)> = prev
        .entries
        .iter()
        .filter(|(k, _)| !matches!(k, Value::Text(t) if t == "sig"))
        .cloned()
        .collect();
    let cid = dag_cbor_cid(prev.bytes());
    for (k, v) in entries.iter_mut() {
        if matches!(k, Value::Text(t) if t == "prev") {
            *v = text(&cid);
        }
    }
    edit(&mut entries);
    Value::Map(entries)
}

/// Build an unsigned operation replacing the handle.
pub fn update_handle_operation(prev: &Operation, handle: &str) -> Value {
    derived_operation(prev, |entries| {
        for (k, v) in entries.iter_mut() {
            if matches!(k, Value::Text(t) if t == "alsoKnownAs") {
                *v = Value::Array(vec![text(handle)]);
            }
        }
    })
}

/// Build an unsigned operation replacing the rotation-key set.
pub fn update_rotation_keys_operation(prev: &Operation, keys: &[String]) -> Value {
    derived_operation(prev, |entries| {
        for (k, v) in entries.iter_mut() {
            if matches!(k, Value::Text(t) if t == "rotationKeys") {
                *v = Value::Array(keys.iter().map(|key| text(key)).collect());
            }
        }
    })
}

/// Build an unsigned tombstone pointing at the predecessor.
pub fn tombstone_operation(prev: &Operation) -> Value {
    Value::Map(vec![
        (text("type"), text("plc_tombstone")),
        (text("prev"), text(&dag_cbor_cid(prev.bytes()))),
    ])
}

/// Sign an unsigned operation and return its exact wire bytes.
pub fn sign_operation(
    unsigned: Value,
    signer: &dyn Signer,
) -> Result<Vec<u8>, OperationError> {
    let Value::Map(mut entries) = unsigned else {
        return Err(OperationError::NotAMap);
    };
    let signing_input = encode_canonical(&Value::Map(entries.clone()))?;
    let sig = URL_SAFE_NO_PAD.encode(signer.sign(&signing_input));
    entries.push((text("sig"), text(&sig)));
    encode_canonical(&Value::Map(entries))
}
