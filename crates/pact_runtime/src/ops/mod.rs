//! Operator dispatch.
//!
//! Every value kind implements [`OperatorTable`]. A binary operation tries
//! three tiers in order:
//! 1. the kind's own table for the right operand's kind;
//! 2. the Void rule when the right operand is Void;
//! 3. strict equality for `==`/`!=`, otherwise Void when Unchecked and an
//!    UnsupportedOperation fault when Checked.
//!
//! A Void left operand behaves as the zero element of the right operand's
//! kind.

mod numeric;
mod structural;
mod text;

use crate::context::Context;
use crate::value::{Value, ValueKind};
use pact_core::{BinaryOp, Fault, Result, UnaryOp};
use tracing::{debug, trace};

pub(crate) trait OperatorTable {
    fn kind(&self) -> ValueKind;

    fn to_value(&self) -> Value;

    /// Identity of the kind's additive or empty form.
    fn zero(&self) -> Value;

    /// Tier 1. `None` when the kind does not define `op` for `right`.
    fn defined(&self, op: BinaryOp, right: &Value, ctx: &Context) -> Option<Result<Value>>;

    /// Tier 2.
    fn against_void(&self, op: BinaryOp, ctx: &Context) -> Result<Value> {
        void_rule(self, op, ctx)
    }

    fn unary(&self, _op: UnaryOp, _ctx: &Context) -> Option<Result<Value>> {
        None
    }

    fn binary(&self, op: BinaryOp, right: &Value, ctx: &Context) -> Result<Value> {
        if let Some(result) = self.defined(op, right, ctx) {
            return result;
        }
        if right.is_void() {
            return self.against_void(op, ctx);
        }
        match op {
            BinaryOp::Equal => Ok(Value::Boolean(self.to_value() == *right)),
            BinaryOp::NotEqual => Ok(Value::Boolean(self.to_value() != *right)),
            _ => unsupported_binary(op, self.kind(), right.kind(), ctx),
        }
    }
}

/// The generic Void rule: additive and disjunctive operators keep the left
/// operand, multiplicative and conjunctive ones yield its zero, equality
/// compares against the zero.
pub(crate) fn void_rule<T: OperatorTable + ?Sized>(
    table: &T,
    op: BinaryOp,
    ctx: &Context,
) -> Result<Value> {
    match op {
        BinaryOp::Add
        | BinaryOp::Subtract
        | BinaryOp::BitwiseOr
        | BinaryOp::ExclusiveOr
        | BinaryOp::LeftShift
        | BinaryOp::RightShift
        | BinaryOp::OrElse => Ok(table.to_value()),
        BinaryOp::Multiply | BinaryOp::BitwiseAnd | BinaryOp::AndAlso => Ok(table.zero()),
        BinaryOp::Equal => Ok(Value::Boolean(table.to_value() == table.zero())),
        BinaryOp::NotEqual => Ok(Value::Boolean(table.to_value() != table.zero())),
        _ => unsupported_binary(op, table.kind(), ValueKind::Void, ctx),
    }
}

pub(crate) fn unsupported_binary(
    op: BinaryOp,
    left: ValueKind,
    right: ValueKind,
    ctx: &Context,
) -> Result<Value> {
    if ctx.is_checked() {
        debug!(target: "pact::ops", %op, %left, %right, "unsupported operation");
        Err(Fault::unsupported(op, left, right))
    } else {
        trace!(target: "pact::ops", %op, %left, %right, "unsupported operation yields Void");
        Ok(Value::Void)
    }
}

fn unsupported_unary(op: UnaryOp, operand: ValueKind, ctx: &Context) -> Result<Value> {
    if ctx.is_checked() {
        debug!(target: "pact::ops", %op, %operand, "unsupported unary operation");
        Err(Fault::unsupported(op, operand, ""))
    } else {
        trace!(target: "pact::ops", %op, %operand, "unsupported unary operation yields Void");
        Ok(Value::Void)
    }
}

/// Checked-mode overflow fault.
pub(crate) fn overflow(op: impl std::fmt::Display) -> Fault {
    debug!(target: "pact::ops", %op, "arithmetic overflow");
    Fault::overflow(op)
}

fn void_left(op: BinaryOp, right: &Value, ctx: &Context) -> Result<Value> {
    if right.is_void() {
        return Ok(match op {
            BinaryOp::Equal | BinaryOp::LessThanOrEqual | BinaryOp::GreaterThanOrEqual => {
                Value::TRUE
            }
            BinaryOp::NotEqual | BinaryOp::LessThan | BinaryOp::GreaterThan => Value::FALSE,
            _ => Value::Void,
        });
    }
    let zero = right.contract().from_void();
    if zero.is_void() {
        return unsupported_binary(op, ValueKind::Void, right.kind(), ctx);
    }
    zero.binary_operation(op, right, ctx)
}

impl Value {
    /// `self op right` under the context's mode.
    pub fn binary_operation(&self, op: BinaryOp, right: &Value, ctx: &Context) -> Result<Value> {
        match self {
            Value::Void => void_left(op, right, ctx),
            Value::Boolean(b) => b.binary(op, right, ctx),
            Value::Integer(i) => i.binary(op, right, ctx),
            Value::Real(r) => r.binary(op, right, ctx),
            Value::String(s) => s.binary(op, right, ctx),
            Value::Contract(c) => c.binary(op, right, ctx),
            Value::Array(a) => a.binary(op, right, ctx),
            Value::List(l) => l.binary(op, right, ctx),
            Value::Object(o) => o.binary(op, right, ctx),
            Value::Function(f) => f.binary(op, right, ctx),
            Value::Iterator(i) => i.binary(op, right, ctx),
        }
    }

    /// `op self` under the context's mode. VoidCheck answers for every
    /// kind; other operators on Void yield Void.
    pub fn unary_operation(&self, op: UnaryOp, ctx: &Context) -> Result<Value> {
        if op == UnaryOp::VoidCheck {
            return Ok(Value::Boolean(self.is_void()));
        }
        let handled = match self {
            Value::Void => return Ok(Value::Void),
            Value::Boolean(b) => b.unary(op, ctx),
            Value::Integer(i) => i.unary(op, ctx),
            Value::Real(r) => r.unary(op, ctx),
            Value::String(s) => s.unary(op, ctx),
            Value::Contract(c) => c.unary(op, ctx),
            Value::Array(a) => a.unary(op, ctx),
            Value::List(l) => l.unary(op, ctx),
            Value::Object(o) => o.unary(op, ctx),
            Value::Function(f) => f.unary(op, ctx),
            Value::Iterator(i) => i.unary(op, ctx),
        };
        handled.unwrap_or_else(|| unsupported_unary(op, self.kind(), ctx))
    }
}
