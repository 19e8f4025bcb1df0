use super::{OperatorTable, overflow};
use crate::context::Context;
use crate::value::{Appendable, Value, ValueKind};
use pact_core::{BinaryOp, Result};
use std::sync::Arc;
use tracing::trace;

/// Longest string repetition may build, in bytes.
pub(crate) const MAX_REPEAT_BYTES: usize = 1 << 30;

/// Text of `left` followed by the text of `right`.
pub(super) fn concat(left: &Value, right: &Value) -> Value {
    let mut out = String::new();
    out.append_value(left);
    out.append_value(right);
    Value::string(out)
}

impl OperatorTable for Arc<str> {
    fn kind(&self) -> ValueKind {
        ValueKind::String
    }

    fn to_value(&self) -> Value {
        Value::String(self.clone())
    }

    fn zero(&self) -> Value {
        Value::string("")
    }

    fn defined(&self, op: BinaryOp, right: &Value, ctx: &Context) -> Option<Result<Value>> {
        match (op, right) {
            (BinaryOp::Add, r) if r.is_primitive() => Some(Ok(concat(&self.to_value(), r))),
            (BinaryOp::Multiply, Value::Integer(n)) => {
                let n = usize::try_from(*n).ok()?;
                Some(repeat(self, n, ctx))
            }
            (op, Value::String(r)) if op.is_comparison() => {
                let ord = self.as_ref().cmp(r.as_ref());
                let result = match op {
                    BinaryOp::Equal => ord.is_eq(),
                    BinaryOp::NotEqual => ord.is_ne(),
                    BinaryOp::LessThan => ord.is_lt(),
                    BinaryOp::LessThanOrEqual => ord.is_le(),
                    BinaryOp::GreaterThan => ord.is_gt(),
                    _ => ord.is_ge(),
                };
                Some(Ok(Value::Boolean(result)))
            }
            _ => None,
        }
    }
}

fn repeat(text: &str, count: usize, ctx: &Context) -> Result<Value> {
    match text.len().checked_mul(count) {
        Some(len) if len <= MAX_REPEAT_BYTES => Ok(Value::string(text.repeat(count))),
        _ if ctx.is_checked() => Err(overflow(BinaryOp::Multiply)),
        _ => {
            trace!(target: "pact::ops", count, "oversized repetition yields Void");
            Ok(Value::Void)
        }
    }
}
