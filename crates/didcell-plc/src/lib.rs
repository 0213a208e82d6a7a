//! # didcell-plc — PLC Operation History Model
//!
//! The append-only identity log a DID cell binds to. This crate owns the
//! protocol-side half of verification:
//!
//! - [`operation`] — decoding one DAG-CBOR identity operation, canonical
//!   re-encoding of its unsigned form (the signing input), and builders for
//!   authoring signed operations.
//! - [`cid`] — the content identifier an operation's `prev` field uses to
//!   address its predecessor.
//! - [`history`] — the signature-chain walk: every operation must be signed
//!   by a rotation key authorized as of its predecessor, and the
//!   witness-level signature by a key still valid after the newest
//!   operation.
//!
//! The verifier core consumes this crate through
//! [`history::validate_operation_history`]; operations stay opaque blobs
//! everywhere else.
//!
//! ## Crate Policy
//!
//! - An operation that cannot be parsed is a hard failure, never a skip.
//! - Fail-fast: the walk stops at the first failing step.
//! - Bounded work: one pass over the history, no recursion into untrusted
//!   structure beyond CBOR nesting.

pub mod cid;
pub mod history;
pub mod operation;

pub use history::validate_operation_history;
pub use operation::{well_formed_cbor, Operation};
