//! Core types for the Pact runtime.
//!
//! This crate contains the pieces that do not depend on runtime values:
//! - `BinaryOp` / `UnaryOp` - Operator tags the backend dispatches on
//! - `Relationship` - One point of the four-valued contract lattice
//! - `ContextMode` - Checked/unchecked evaluation switch
//! - `Fault` - The single error type surfaced to the host
//! - `FastHashMap` and the deterministic hashing helpers

pub mod fault;
pub mod hash;
pub mod mode;
pub mod ops;
pub mod relation;

pub use fault::{Fault, FaultKind, Result};
pub use hash::{FastHashMap, fast_map_new, fast_map_with_capacity, hash_f64, hash_str};
pub use mode::ContextMode;
pub use ops::{BinaryOp, UnaryOp};
pub use relation::Relationship;
