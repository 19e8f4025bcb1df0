//! Pact runtime core.
//!
//! Values, contracts, operator dispatch, slots, functions, collections,
//! intern pools and the interpreter context. The backend that compiles
//! scripts calls into this crate through the `Value` entry points
//! (`binary_operation`, `unary_operation`, `invoke`, `get_slot`,
//! `set_slot`, `get_indexed`, `set_indexed`) and never the other way round.

#![allow(clippy::new_without_default)]
#![allow(clippy::len_without_is_empty)]
#![allow(clippy::should_implement_trait)]
#![allow(clippy::unnecessary_cast)]
#![allow(clippy::type_complexity)]
#![allow(clippy::wrong_self_convention)]

pub mod boundary;
pub mod collection;
pub mod config;
pub mod context;
pub mod contract;
pub mod function;
pub mod intern;
mod ops;
pub mod slot;
pub mod snapshot;
pub mod value;

pub use collection::{
    ArrayValue, ListValue, ScriptIterator, SequenceIterator, StructuralIterator, VoidSkipping,
    drain, infer_contract, iterator_contract,
};
pub use config::RuntimeConfig;
pub use context::{CallFrame, Context, OMIT_VOID_YIELDS, ScriptCache, ScriptEntry};
pub use contract::{
    ArrayContract, BUILTIN_CONTRACTS, CompositeContract, Contract, FunctionContract, Parameter,
};
pub use function::{FunctionBody, FunctionValue, NativeFn};
pub use intern::{InternKind, InternPools};
pub use slot::{RuntimeSlot, SlotAttributes, StorageSlot};
pub use snapshot::{SlotSnapshot, SnapshotData, ValueSnapshot};
pub use value::{Appendable, CompositeObject, Value, ValueKind};

pub use pact_core::{BinaryOp, ContextMode, Fault, FaultKind, Relationship, Result, UnaryOp};
