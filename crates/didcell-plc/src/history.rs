//! # Signature-Chain Validation
//!
//! The walk that authorizes an operation history:
//!
//! 1. The first operation must be genesis (`prev` null) and must derive the
//!    claimed DID.
//! 2. Each operation's `prev` must address its predecessor by CID.
//! 3. Each operation's embedded signature must verify against the key set
//!    active *before* it — the genesis operation against its own declared
//!    set — at the position named by its rotation-key index.
//! 4. The witness-level signature must verify over the transaction hash
//!    against the key set active *after* the newest operation.
//!
//! The index list carries one entry per operation, optionally plus a final
//! entry naming the witness-signature key; when the final entry is absent
//! the last operation's index is reused. Any other length is a
//! length-mismatch rejection before any cryptographic work runs.
//!
//! Failures are fail-fast and undifferentiated: wrong key, out-of-range
//! index, unparseable operation, and corrupt signature all reject the same
//! way.

use didcell_core::{Did, PlcError};
use didcell_crypto::{parse_did_key, verify_signature};

use crate::cid::dag_cbor_cid;
use crate::operation::Operation;

fn parse_op(position: usize, bytes: &[u8]) -> Result<Operation, PlcError> {
    Operation::parse(bytes).map_err(|e| PlcError::InvalidOperation {
        position,
        reason: e.to_string(),
    })
}

fn key_at<'a>(set: &'a [String], index: usize) -> Result<&'a str, PlcError> {
    set.get(index)
        .map(String::as_str)
        .ok_or(PlcError::KeyIndexOutOfRange {
            index,
            available: set.len(),
        })
}

/// Validate a full operation history and the witness signature binding its
/// newest operation to `message` (the transaction's canonical hash).
pub fn validate_operation_history(
    claimed_did: &Did,
    history: &[Vec<u8>],
    rotation_key_indices: &[u8],
    message: &[u8],
    witness_sig: &[u8],
) -> Result<(), PlcError> {
    if history.is_empty() {
        return Err(PlcError::EmptyHistory);
    }
    let operations = history.len();
    let indices = rotation_key_indices.len();
    // One index per operation; the witness entry is optional.
    if indices != operations && indices != operations + 1 {
        return Err(PlcError::HistoryLengthMismatch {
            indices,
            operations,
        });
    }

    let genesis = parse_op(0, &history[0])?;
    if !genesis.is_genesis() {
        return Err(PlcError::NotGenesis);
    }
    if Did::from_genesis_bytes(&history[0]) != *claimed_did {
        return Err(PlcError::DidMismatch);
    }

    // Genesis self-authorizes: its embedded signature verifies against its
    // own declared set.
    verify_embedded(0, &genesis, genesis.rotation_keys(), rotation_key_indices[0])?;

    let mut active_keys = genesis.rotation_keys().to_vec();
    let mut prev_cid = dag_cbor_cid(genesis.bytes());

    for (position, bytes) in history.iter().enumerate().skip(1) {
        let op = parse_op(position, bytes)?;
        if op.prev() != Some(prev_cid.as_str()) {
            return Err(PlcError::InvalidPrev { position });
        }
        verify_embedded(position, &op, &active_keys, rotation_key_indices[position])?;
        active_keys = op.rotation_keys().to_vec();
        prev_cid = dag_cbor_cid(op.bytes());
    }

    // The witness signature must come from a key still valid as of the
    // newest operation.
    let witness_index = if indices == operations + 1 {
        rotation_key_indices[operations]
    } else {
        rotation_key_indices[operations - 1]
    };
    let key = parse_did_key(key_at(&active_keys, usize::from(witness_index))?)?;
    verify_signature(&key, message, witness_sig)?;
    Ok(())
}

fn verify_embedded(
    position: usize,
    op: &Operation,
    set: &[String],
    index: u8,
) -> Result<(), PlcError> {
    let key = parse_did_key(key_at(set, usize::from(index))?)?;
    let signing_input = op
        .unsigned_bytes()
        .map_err(|e| PlcError::InvalidOperation {
            position,
            reason: e.to_string(),
        })?;
    let sig = op.sig_bytes().map_err(|e| {
        didcell_core::CryptoError::InvalidSignature(e.to_string())
    })?;
    verify_signature(&key, &signing_input, &sig)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operation::{
        genesis_operation, sign_operation, tombstone_operation, update_handle_operation,
        update_rotation_keys_operation,
    };
    use didcell_crypto::{P256Keypair, Secp256k1Keypair};

    struct Chain {
        did: Did,
        history: Vec<Vec<u8>>,
        indices: Vec<u8>,
        rk1: Secp256k1Keypair,
        rk2: P256Keypair,
    }

    fn genesis_chain() -> Chain {
        let rk1 = Secp256k1Keypair::from_seed(&[3u8; 32]).unwrap();
        let rk2 = P256Keypair::from_seed(&[4u8; 32]).unwrap();
        let unsigned = genesis_operation(
            &rk1.did(),
            &[rk1.did(), rk2.did()],
            "at://alice.example.com",
            "https://example.com",
        );
        let genesis = sign_operation(unsigned, &rk1).unwrap();
        Chain {
            did: Did::from_genesis_bytes(&genesis),
            history: vec![genesis],
            indices: vec![0],
            rk1,
            rk2,
        }
    }

    /// Genesis plus three updates: handle change (rk1), handle change
    /// (rk2, the P-256 key), and a rotation-key update adding a third key.
    fn long_chain() -> (Chain, Secp256k1Keypair) {
        let mut chain = genesis_chain();
        let last = Operation::parse(chain.history.last().unwrap()).unwrap();

        let op = sign_operation(
            update_handle_operation(&last, "at://ali.example2.com"),
            &chain.rk1,
        )
        .unwrap();
        let last = Operation::parse(&op).unwrap();
        chain.history.push(op);
        chain.indices.push(0);

        let op = sign_operation(
            update_handle_operation(&last, "at://ali.example2.com"),
            &chain.rk2,
        )
        .unwrap();
        let last = Operation::parse(&op).unwrap();
        chain.history.push(op);
        chain.indices.push(1);

        let rk3 = Secp256k1Keypair::from_seed(&[5u8; 32]).unwrap();
        let op = sign_operation(
            update_rotation_keys_operation(
                &last,
                &[chain.rk1.did(), chain.rk2.did(), rk3.did()],
            ),
            &chain.rk1,
        )
        .unwrap();
        chain.history.push(op);
        chain.indices.push(0);

        (chain, rk3)
    }

    const TX_HASH: [u8; 32] = [0xab; 32];

    #[test]
    fn test_single_op_chain_with_reused_index() {
        let chain = genesis_chain();
        let witness_sig = chain.rk1.sign(&TX_HASH);
        validate_operation_history(&chain.did, &chain.history, &[0], &TX_HASH, &witness_sig)
            .unwrap();
    }

    #[test]
    fn test_single_op_chain_with_explicit_witness_index() {
        let chain = genesis_chain();
        let witness_sig = chain.rk2.sign(&TX_HASH);
        validate_operation_history(
            &chain.did,
            &chain.history,
            &[0, 1],
            &TX_HASH,
            &witness_sig,
        )
        .unwrap();
    }

    #[test]
    fn test_wrong_witness_key_index_fails() {
        let chain = genesis_chain();
        let witness_sig = chain.rk1.sign(&TX_HASH);
        // Key 1 exists but did not produce this signature.
        assert!(matches!(
            validate_operation_history(
                &chain.did,
                &chain.history,
                &[0, 1],
                &TX_HASH,
                &witness_sig,
            ),
            Err(PlcError::Crypto(_))
        ));
    }

    #[test]
    fn test_multi_op_chain_across_both_curves() {
        let (mut chain, rk3) = long_chain();
        chain.indices.push(2); // witness signed by the newly added key
        let witness_sig = rk3.sign(&TX_HASH);
        validate_operation_history(
            &chain.did,
            &chain.history,
            &chain.indices,
            &TX_HASH,
            &witness_sig,
        )
        .unwrap();
    }

    #[test]
    fn test_flipping_final_signature_bit_fails() {
        let chain = genesis_chain();
        let mut witness_sig = chain.rk1.sign(&TX_HASH);
        witness_sig[17] ^= 1;
        assert!(matches!(
            validate_operation_history(&chain.did, &chain.history, &[0], &TX_HASH, &witness_sig),
            Err(PlcError::Crypto(_))
        ));
    }

    #[test]
    fn test_tampered_operation_signature_fails() {
        let (chain, rk3) = long_chain();
        let mut history = chain.history.clone();
        // Flip one byte inside the second operation's body.
        let mid = history[1].len() / 2;
        history[1][mid] ^= 0x01;
        let witness_sig = rk3.sign(&TX_HASH);
        let mut indices = chain.indices.clone();
        indices.push(2);
        assert!(
            validate_operation_history(&chain.did, &history, &indices, &TX_HASH, &witness_sig)
                .is_err()
        );
    }

    #[test]
    fn test_empty_history_rejected() {
        let chain = genesis_chain();
        assert!(matches!(
            validate_operation_history(&chain.did, &[], &[], &TX_HASH, &[0u8; 64]),
            Err(PlcError::EmptyHistory)
        ));
    }

    #[test]
    fn test_length_mismatch_rejected_before_crypto() {
        let chain = genesis_chain();
        // Garbage signature: must never be looked at.
        for indices in [vec![], vec![0u8, 0, 0]] {
            assert!(matches!(
                validate_operation_history(
                    &chain.did,
                    &chain.history,
                    &indices,
                    &TX_HASH,
                    b"not-a-signature",
                ),
                Err(PlcError::HistoryLengthMismatch { .. })
            ));
        }
    }

    #[test]
    fn test_non_genesis_first_op_rejected() {
        let chain = genesis_chain();
        let genesis = Operation::parse(&chain.history[0]).unwrap();
        let update = sign_operation(
            update_handle_operation(&genesis, "at://bob.example.com"),
            &chain.rk1,
        )
        .unwrap();
        let did = Did::from_genesis_bytes(&update);
        assert!(matches!(
            validate_operation_history(&did, &[update], &[0], &TX_HASH, &[0u8; 64]),
            Err(PlcError::NotGenesis)
        ));
    }

    #[test]
    fn test_did_mismatch_rejected() {
        let chain = genesis_chain();
        let other = Did::from_genesis_bytes(b"some other genesis");
        let witness_sig = chain.rk1.sign(&TX_HASH);
        assert!(matches!(
            validate_operation_history(&other, &chain.history, &[0], &TX_HASH, &witness_sig),
            Err(PlcError::DidMismatch)
        ));
    }

    #[test]
    fn test_broken_prev_link_rejected() {
        let chain = genesis_chain();
        // Build the update against a different genesis so its prev CID
        // points elsewhere.
        let foreign = {
            let rk = Secp256k1Keypair::from_seed(&[9u8; 32]).unwrap();
            let unsigned = genesis_operation(
                &rk.did(),
                &[chain.rk1.did()],
                "at://carol.example.com",
                "https://example.com",
            );
            sign_operation(unsigned, &chain.rk1).unwrap()
        };
        let foreign_op = Operation::parse(&foreign).unwrap();
        let update = sign_operation(
            update_handle_operation(&foreign_op, "at://dave.example.com"),
            &chain.rk1,
        )
        .unwrap();
        let history = vec![chain.history[0].clone(), update];
        let witness_sig = chain.rk1.sign(&TX_HASH);
        assert!(matches!(
            validate_operation_history(&chain.did, &history, &[0, 0], &TX_HASH, &witness_sig),
            Err(PlcError::InvalidPrev { position: 1 })
        ));
    }

    #[test]
    fn test_unparseable_operation_is_hard_failure() {
        let chain = genesis_chain();
        let mut history = chain.history.clone();
        history.push(b"\xffgarbage".to_vec());
        let witness_sig = chain.rk1.sign(&TX_HASH);
        assert!(matches!(
            validate_operation_history(&chain.did, &history, &[0, 0], &TX_HASH, &witness_sig),
            Err(PlcError::InvalidOperation { position: 1, .. })
        ));
    }

    #[test]
    fn test_out_of_range_genesis_index_rejected() {
        let chain = genesis_chain();
        let witness_sig = chain.rk1.sign(&TX_HASH);
        assert!(matches!(
            validate_operation_history(&chain.did, &chain.history, &[9], &TX_HASH, &witness_sig),
            Err(PlcError::KeyIndexOutOfRange {
                index: 9,
                available: 2
            })
        ));
    }

    #[test]
    fn test_nothing_authorizes_after_tombstone() {
        let chain = genesis_chain();
        let genesis = Operation::parse(&chain.history[0]).unwrap();
        let tomb = sign_operation(tombstone_operation(&genesis), &chain.rk1).unwrap();
        let history = vec![chain.history[0].clone(), tomb];
        let witness_sig = chain.rk1.sign(&TX_HASH);
        // The tombstone itself verifies (signed by a then-valid key), but
        // the witness signature has no key set left to verify against.
        assert!(matches!(
            validate_operation_history(&chain.did, &history, &[0, 0], &TX_HASH, &witness_sig),
            Err(PlcError::KeyIndexOutOfRange { available: 0, .. })
        ));
    }
}
