//! Arrays, lists and the iterator protocol.

mod array;
mod infer;
mod iter;
mod list;

pub use array::ArrayValue;
pub use infer::infer_contract;
pub use iter::{
    ScriptIterator, SequenceIterator, StructuralIterator, VoidSkipping, drain, iterator_contract,
};
pub use list::ListValue;

use crate::context::Context;
use crate::contract::Contract;
use crate::value::Value;
use pact_core::{Fault, Result};
use tracing::trace;

/// Reads an index operand. Booleans count as 0 and 1.
pub(crate) fn index_of(value: &Value) -> Result<i64> {
    match value {
        Value::Integer(i) => Ok(*i),
        Value::Boolean(b) => Ok(*b as i64),
        other => Err(Fault::binding(Contract::Integer, other.contract())),
    }
}

/// Shared write policy for array and list cells: Checked faults,
/// Unchecked drops the write. `Ok(None)` means the write is dropped.
pub(crate) fn admit(element: &Contract, value: &Value, ctx: &Context) -> Result<Option<Value>> {
    let actual = value.contract();
    if element.accepts(&actual) {
        return element.convert(value, ctx).map(Some);
    }
    if ctx.is_checked() {
        Err(Fault::binding(element, actual))
    } else {
        trace!(target: "pact::ops", expected = %element, actual = %actual, "cell write dropped");
        Ok(None)
    }
}

/// Shared out-of-range policy for cell writes.
pub(crate) fn out_of_range(index: i64, length: usize, ctx: &Context) -> Result<()> {
    if ctx.is_checked() {
        Err(Fault::IndexOutOfRange { index, length })
    } else {
        trace!(target: "pact::ops", index, length, "cell write out of range dropped");
        Ok(())
    }
}
