//! # Transition Classification and Gating
//!
//! Transition selection is by transaction shape, not an explicit flag: the
//! number of DID-typed cells consumed and created picks the transition, and
//! a gate pipeline then authorizes it.
//!
//! Gate order is deterministic and documented: type-id argument length →
//! derived type-id (genesis only) → cardinality → payload decode → document
//! well-formedness → local-id rules → signature chain. Shape errors
//! therefore take precedence over signature errors when both apply.

use didcell_core::{CodecError, Did, LocalId, TypeId, VerifyError};
use didcell_molecule::{DidCellData, DidCellWitness};
use didcell_plc::{validate_operation_history, well_formed_cbor};
use tracing::debug;

use crate::transaction::{CellHost, CellSource};
use crate::type_id::derive_type_id;

/// The accepted lifecycle transitions. Rejection is the error path of
/// [`verify_transaction`], not a variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// A DID cell was created.
    Genesis,
    /// An existing DID cell's document was replaced.
    Update,
    /// A DID cell was destroyed.
    Deactivate,
}

impl std::fmt::Display for Transition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Genesis => "GENESIS",
            Self::Update => "UPDATE",
            Self::Deactivate => "DEACTIVATE",
        };
        f.write_str(s)
    }
}

/// Verify one transaction's DID cell group. Pure and side-effect-free;
/// every failure is terminal.
pub fn verify_transaction(host: &impl CellHost) -> Result<Transition, VerifyError> {
    let args = host.type_script_args();
    let type_id = TypeId::try_from(args.as_slice())
        .map_err(|e| VerifyError::InvalidShape(e.to_string()))?;

    let inputs = host.group_cell_count(CellSource::GroupInput);
    let outputs = host.group_cell_count(CellSource::GroupOutput);
    debug!(inputs, outputs, %type_id, "classifying did cell transition");

    let transition = match (inputs, outputs) {
        (0, 1) => {
            verify_genesis(host, &type_id)?;
            Transition::Genesis
        }
        (1, 1) => {
            verify_update(host)?;
            Transition::Update
        }
        // Deactivation has no further constraints beyond its shape.
        (1, 0) => Transition::Deactivate,
        (inputs, outputs) => {
            return Err(VerifyError::InvalidShape(format!(
                "{inputs} did inputs and {outputs} did outputs fit no transition"
            )));
        }
    };
    debug!(%transition, "did cell transition accepted");
    Ok(transition)
}

fn group_data(
    host: &impl CellHost,
    source: CellSource,
) -> Result<DidCellData, VerifyError> {
    let bytes = host
        .cell_data(0, source)
        .ok_or_else(|| CodecError::MissingData(format!("{source:?} cell data")))?;
    Ok(DidCellData::decode(&bytes)?)
}

fn verify_genesis(host: &impl CellHost, type_id: &TypeId) -> Result<(), VerifyError> {
    // The argument must be derived from this very transaction.
    let expected = derive_type_id(&host.first_input_reference(), host.did_output_index());
    if *type_id != expected {
        return Err(VerifyError::InvalidShape(format!(
            "type id {type_id} is not derived from the first input (expected {expected})"
        )));
    }

    let data = group_data(host, CellSource::GroupOutput)?;
    let cell = data.as_v1();
    if !well_formed_cbor(&cell.document) {
        return Err(CodecError::MalformedDocument.into());
    }

    // No local id: the cell is minted without a did:plc association and
    // needs no authorization.
    let Some(local_id) = &cell.local_id else {
        debug!("genesis without did:plc association");
        return Ok(());
    };

    let did = claimed_did(local_id)?;
    authorize(host, &did)
}

fn verify_update(host: &impl CellHost) -> Result<(), VerifyError> {
    let prev = group_data(host, CellSource::GroupInput)?;
    let cur = group_data(host, CellSource::GroupOutput)?;
    let (prev, cur) = (prev.as_v1(), cur.as_v1());

    if !well_formed_cbor(&prev.document) || !well_formed_cbor(&cur.document) {
        return Err(CodecError::MalformedDocument.into());
    }

    // The document may change freely; the association may not.
    if prev.local_id != cur.local_id {
        return Err(VerifyError::LocalIdMismatch(
            "local id changed across update".into(),
        ));
    }

    match &cur.local_id {
        None => Ok(()),
        Some(local_id) => {
            let did = claimed_did(local_id)?;
            authorize(host, &did)
        }
    }
}

fn claimed_did(local_id: &[u8]) -> Result<Did, VerifyError> {
    LocalId::new(local_id.to_vec())
        .to_did()
        .map_err(|e| VerifyError::LocalIdMismatch(e.to_string()))
}

/// Decode the witness and run the signature chain against the claimed DID.
fn authorize(host: &impl CellHost, did: &Did) -> Result<(), VerifyError> {
    let witness_bytes = host
        .did_witness()
        .ok_or_else(|| CodecError::MissingData("witness for did:plc association".into()))?;
    let witness = DidCellWitness::decode(&witness_bytes)?;
    let auth = &witness.local_id_authorization;

    debug!(
        operations = auth.history.len(),
        indices = auth.rotation_key_indices.len(),
        "validating operation history"
    );
    validate_operation_history(
        did,
        &auth.history,
        &auth.rotation_key_indices,
        &host.tx_hash(),
        &auth.sig,
    )?;
    Ok(())
}
