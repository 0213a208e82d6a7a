//! # didcell-verifier — DID Cell Transition State Machine
//!
//! The entry point of the stack: given one transaction's view of a DID-typed
//! cell group, decide whether the transition it attempts — genesis, update,
//! or deactivation — is authorized, and reject everything else.
//!
//! ```text
//! (0 in, 1 out) ──▶ Genesis      args derived from first input; witness
//!                                required iff the cell claims a local id
//! (1 in, 1 out) ──▶ Update       local id byte-identical; document free
//! (1 in, 0 out) ──▶ Deactivate   always accepted once the shape matches
//! anything else ──▶ Reject
//! ```
//!
//! The transaction environment is an injected capability: implement
//! [`CellHost`] and hand it to [`verify_transaction`]. The verifier is a
//! pure function of that view — no I/O, no shared state, safe to call
//! concurrently across unrelated transactions.
//!
//! Validation is a fail-fast pipeline: type-id argument, shape, payload
//! decode, document well-formedness, local-id rules, signature chain. The
//! first failing stage rejects; nothing after it runs. When both a shape
//! and a signature problem exist, the shape error wins — cardinality is
//! cheaper to check and the ordering keeps failure attribution stable.

pub mod machine;
pub mod transaction;
pub mod type_id;

pub use machine::{verify_transaction, Transition};
pub use transaction::{CellHost, CellSource};
pub use type_id::derive_type_id;
