//! # Transaction View — The Injected Host Capability
//!
//! The verifier never talks to a chain directly. The execution environment
//! implements [`CellHost`] over whatever its native transaction structure
//! is: cell enumeration scoped to the DID type-script group, the canonical
//! transaction hash, the already-unwrapped DID witness bytes, and the two
//! ingredients of type-id derivation.
//!
//! Keeping the host behind a trait keeps the core independent of any one
//! chain SDK and makes the state machine testable against in-memory
//! transactions.

/// Which side of the transaction a group cell lives on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellSource {
    /// Consumed cells carrying the DID type script.
    GroupInput,
    /// Created cells carrying the DID type script.
    GroupOutput,
}

/// One transaction, as seen from the DID type-script group being verified.
pub trait CellHost {
    /// The transaction's canonical hash — the message the witness-level
    /// signature covers.
    fn tx_hash(&self) -> [u8; 32];

    /// Arguments of the DID type script (the type-identifier candidate).
    fn type_script_args(&self) -> Vec<u8>;

    /// Number of DID-typed cells on the given side.
    fn group_cell_count(&self, source: CellSource) -> usize;

    /// Data payload of the DID-typed cell at `index` on the given side.
    fn cell_data(&self, index: usize, source: CellSource) -> Option<Vec<u8>>;

    /// The DID witness bytes for this transaction, if any. The host strips
    /// its own witness framing before handing them over.
    fn did_witness(&self) -> Option<Vec<u8>>;

    /// The serialized reference to the transaction's first input — the
    /// uniqueness seed for type-id derivation on genesis.
    fn first_input_reference(&self) -> Vec<u8>;

    /// Index of the DID-typed output among all transaction outputs.
    fn did_output_index(&self) -> u64;
}
