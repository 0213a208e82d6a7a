//! Shared fixtures: an in-memory transaction host and a real PLC identity
//! with a signed operation chain. No mocked cryptography — every chain is
//! built with real keys and verified with real curve arithmetic.

use didcell_core::{Did, LocalId};
use didcell_crypto::{P256Keypair, Secp256k1Keypair};
use didcell_molecule::{DidCellData, DidCellDataV1, DidCellWitness, PlcAuthorization};
use didcell_plc::operation::{
    genesis_operation, sign_operation, update_handle_operation, update_rotation_keys_operation,
};
use didcell_plc::Operation;
use didcell_verifier::{derive_type_id, CellHost, CellSource};

pub const FIRST_INPUT: &[u8] = b"outpoint:9e2f/0";
pub const TX_HASH: [u8; 32] = [0x5a; 32];

/// An in-memory transaction: DID-group cells, witness, and script args.
pub struct MockTx {
    pub args: Vec<u8>,
    pub inputs: Vec<Vec<u8>>,
    pub outputs: Vec<Vec<u8>>,
    pub witness: Option<Vec<u8>>,
    pub tx_hash: [u8; 32],
}

impl CellHost for MockTx {
    fn tx_hash(&self) -> [u8; 32] {
        self.tx_hash
    }
    fn type_script_args(&self) -> Vec<u8> {
        self.args.clone()
    }
    fn group_cell_count(&self, source: CellSource) -> usize {
        match source {
            CellSource::GroupInput => self.inputs.len(),
            CellSource::GroupOutput => self.outputs.len(),
        }
    }
    fn cell_data(&self, index: usize, source: CellSource) -> Option<Vec<u8>> {
        match source {
            CellSource::GroupInput => self.inputs.get(index).cloned(),
            CellSource::GroupOutput => self.outputs.get(index).cloned(),
        }
    }
    fn did_witness(&self) -> Option<Vec<u8>> {
        self.witness.clone()
    }
    fn first_input_reference(&self) -> Vec<u8> {
        FIRST_INPUT.to_vec()
    }
    fn did_output_index(&self) -> u64 {
        0
    }
}

/// A PLC identity with its keys and signed operation history.
pub struct Identity {
    pub did: Did,
    pub history: Vec<Vec<u8>>,
    pub rotation_key_indices: Vec<u8>,
    pub rotation_key_1: Secp256k1Keypair,
    pub rotation_key_2: P256Keypair,
}

impl Identity {
    /// A fresh identity with a single genesis operation signed by rotation
    /// key 1.
    pub fn new(seed: u8) -> Self {
        let rotation_key_1 = Secp256k1Keypair::from_seed(&[seed; 32]).unwrap();
        let rotation_key_2 = P256Keypair::from_seed(&[seed.wrapping_add(1); 32]).unwrap();
        let unsigned = genesis_operation(
            &rotation_key_1.did(),
            &[rotation_key_1.did(), rotation_key_2.did()],
            "at://alice.example.com",
            "https://example.com",
        );
        let genesis = sign_operation(unsigned, &rotation_key_1).unwrap();
        Self {
            did: Did::from_genesis_bytes(&genesis),
            history: vec![genesis],
            rotation_key_indices: vec![0],
            rotation_key_1,
            rotation_key_2,
        }
    }

    /// Append handle updates and a rotation-key update, exercising both
    /// curves, mirroring the upstream generator's longer chains.
    pub fn with_more_ops(mut self) -> Self {
        let last = Operation::parse(self.history.last().unwrap()).unwrap();
        let op = sign_operation(
            update_handle_operation(&last, "at://ali.example2.com"),
            &self.rotation_key_1,
        )
        .unwrap();
        let last = Operation::parse(&op).unwrap();
        self.history.push(op);
        self.rotation_key_indices.push(0);

        let op = sign_operation(
            update_handle_operation(&last, "at://ali.example2.com"),
            &self.rotation_key_2,
        )
        .unwrap();
        let last = Operation::parse(&op).unwrap();
        self.history.push(op);
        self.rotation_key_indices.push(1);

        let new_key = Secp256k1Keypair::from_seed(&[0x77; 32]).unwrap();
        let op = sign_operation(
            update_rotation_keys_operation(
                &last,
                &[
                    self.rotation_key_1.did(),
                    self.rotation_key_2.did(),
                    new_key.did(),
                ],
            ),
            &self.rotation_key_1,
        )
        .unwrap();
        self.history.push(op);
        self.rotation_key_indices.push(0);
        self
    }

    /// The on-chain rendering of this identity.
    pub fn local_id(&self) -> Vec<u8> {
        LocalId::from_did(&self.did).as_bytes().to_vec()
    }

    /// Sign the transaction hash with rotation key `index` and produce the
    /// encoded witness, appending the explicit witness index entry.
    pub fn witness(&self, index: u8, tx_hash: &[u8; 32]) -> Vec<u8> {
        let sig = match index {
            0 => self.rotation_key_1.sign(tx_hash),
            1 => self.rotation_key_2.sign(tx_hash),
            other => panic!("fixture has no rotation key {other}"),
        };
        let mut indices = self.rotation_key_indices.clone();
        indices.push(index);
        DidCellWitness {
            local_id_authorization: PlcAuthorization {
                history: self.history.clone(),
                sig,
                rotation_key_indices: indices,
            },
        }
        .encode()
    }
}

/// Encode a cell payload holding `document` and an optional local id.
pub fn cell_data(document: &[u8], local_id: Option<Vec<u8>>) -> Vec<u8> {
    DidCellData::V1(DidCellDataV1 {
        document: document.to_vec(),
        local_id,
    })
    .encode()
}

/// A CBOR document fixture: an empty map.
pub fn empty_document() -> Vec<u8> {
    vec![0xa0]
}

/// A CBOR document fixture: `{"key": "hello, world"}`.
pub fn sample_document() -> Vec<u8> {
    let mut buf = Vec::new();
    ciborium::ser::into_writer(
        &ciborium::Value::Map(vec![(
            ciborium::Value::Text("key".into()),
            ciborium::Value::Text("hello, world".into()),
        )]),
        &mut buf,
    )
    .unwrap();
    buf
}

/// A genesis transaction for `identity`, correctly derived args included.
pub fn genesis_tx(identity: &Identity, associate: bool) -> MockTx {
    let local_id = associate.then(|| identity.local_id());
    let witness = associate.then(|| identity.witness(0, &TX_HASH));
    MockTx {
        args: derive_type_id(FIRST_INPUT, 0).as_bytes().to_vec(),
        inputs: Vec::new(),
        outputs: vec![cell_data(&empty_document(), local_id)],
        witness,
        tx_hash: TX_HASH,
    }
}

/// An update transaction replacing the document, association untouched.
pub fn update_tx(identity: &Identity, associate: bool) -> MockTx {
    let local_id = associate.then(|| identity.local_id());
    let witness = associate.then(|| identity.witness(0, &TX_HASH));
    MockTx {
        args: vec![0u8; 20],
        inputs: vec![cell_data(&empty_document(), local_id.clone())],
        outputs: vec![cell_data(&sample_document(), local_id)],
        witness,
        tx_hash: TX_HASH,
    }
}
