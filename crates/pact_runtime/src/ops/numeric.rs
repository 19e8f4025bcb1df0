//! Boolean, Integer and Real operator tables.
//!
//! Booleans promote to Integer (true is 1) and Integers to Real when the
//! operands differ in kind.

use super::text::concat;
use super::{OperatorTable, overflow, void_rule};
use crate::context::Context;
use crate::value::{Value, ValueKind};
use pact_core::{BinaryOp, Fault, Result, UnaryOp};
use std::cmp::Ordering;

fn compare(op: BinaryOp, ord: Option<Ordering>) -> Option<Value> {
    let result = match (op, ord) {
        (BinaryOp::Equal, o) => o == Some(Ordering::Equal),
        (BinaryOp::NotEqual, o) => o != Some(Ordering::Equal),
        (BinaryOp::LessThan, o) => o == Some(Ordering::Less),
        (BinaryOp::LessThanOrEqual, o) => matches!(o, Some(Ordering::Less | Ordering::Equal)),
        (BinaryOp::GreaterThan, o) => o == Some(Ordering::Greater),
        (BinaryOp::GreaterThanOrEqual, o) => {
            matches!(o, Some(Ordering::Greater | Ordering::Equal))
        }
        _ => return None,
    };
    Some(Value::Boolean(result))
}

/// Checked result when the mode is Checked, wrapped result otherwise.
fn arith(op: BinaryOp, checked: Option<i64>, wrapped: i64, ctx: &Context) -> Result<Value> {
    if ctx.is_checked() {
        checked.map(Value::Integer).ok_or_else(|| overflow(op))
    } else {
        Ok(Value::Integer(wrapped))
    }
}

fn wrapping_pow(mut base: i64, mut exp: u64) -> i64 {
    let mut acc: i64 = 1;
    while exp > 0 {
        if exp & 1 == 1 {
            acc = acc.wrapping_mul(base);
        }
        base = base.wrapping_mul(base);
        exp >>= 1;
    }
    acc
}

fn integer_pow(a: i64, b: i64, ctx: &Context) -> Result<Value> {
    if b < 0 {
        let (x, y) = (a as f64, b as f64);
        return finite(BinaryOp::Power, x, y, x.powf(y), ctx);
    }
    let checked = u32::try_from(b).ok().and_then(|e| a.checked_pow(e));
    arith(BinaryOp::Power, checked, wrapping_pow(a, b as u64), ctx)
}

fn shift(op: BinaryOp, a: i64, b: i64, ctx: &Context) -> Result<Value> {
    let in_range = (0..64).contains(&b);
    if ctx.is_checked() {
        if !in_range {
            return Err(overflow(op));
        }
        let shifted = if op == BinaryOp::LeftShift { a << b } else { a >> b };
        if op == BinaryOp::LeftShift && shifted >> b != a {
            return Err(overflow(op));
        }
        return Ok(Value::Integer(shifted));
    }
    let amount = b as u32;
    Ok(Value::Integer(if op == BinaryOp::LeftShift {
        a.wrapping_shl(amount)
    } else {
        a.wrapping_shr(amount)
    }))
}

pub(super) fn integer_binary(op: BinaryOp, a: i64, b: i64, ctx: &Context) -> Option<Result<Value>> {
    Some(match op {
        BinaryOp::Add => arith(op, a.checked_add(b), a.wrapping_add(b), ctx),
        BinaryOp::Subtract => arith(op, a.checked_sub(b), a.wrapping_sub(b), ctx),
        BinaryOp::Multiply => arith(op, a.checked_mul(b), a.wrapping_mul(b), ctx),
        BinaryOp::Divide if b == 0 => Err(Fault::DivideByZero),
        BinaryOp::Divide => arith(op, a.checked_div(b), a.wrapping_div(b), ctx),
        BinaryOp::Modulo if b == 0 => Err(Fault::DivideByZero),
        BinaryOp::Modulo => arith(op, a.checked_rem(b), a.wrapping_rem(b), ctx),
        BinaryOp::Power => integer_pow(a, b, ctx),
        BinaryOp::BitwiseAnd => Ok(Value::Integer(a & b)),
        BinaryOp::BitwiseOr => Ok(Value::Integer(a | b)),
        BinaryOp::ExclusiveOr => Ok(Value::Integer(a ^ b)),
        BinaryOp::LeftShift | BinaryOp::RightShift => shift(op, a, b, ctx),
        _ => return compare(op, Some(a.cmp(&b))).map(Ok),
    })
}

/// Checked mode faults when finite operands produce a non-finite result.
fn finite(op: BinaryOp, a: f64, b: f64, r: f64, ctx: &Context) -> Result<Value> {
    if ctx.is_checked() && a.is_finite() && b.is_finite() && !r.is_finite() {
        Err(overflow(op))
    } else {
        Ok(Value::Real(r))
    }
}

pub(super) fn real_binary(op: BinaryOp, a: f64, b: f64, ctx: &Context) -> Option<Result<Value>> {
    Some(match op {
        BinaryOp::Add => finite(op, a, b, a + b, ctx),
        BinaryOp::Subtract => finite(op, a, b, a - b, ctx),
        BinaryOp::Multiply => finite(op, a, b, a * b, ctx),
        BinaryOp::Divide | BinaryOp::Modulo if b == 0.0 && ctx.is_checked() => {
            Err(Fault::DivideByZero)
        }
        BinaryOp::Divide => finite(op, a, b, a / b, ctx),
        BinaryOp::Modulo => finite(op, a, b, a % b, ctx),
        BinaryOp::Power => finite(op, a, b, a.powf(b), ctx),
        _ => return compare(op, a.partial_cmp(&b)).map(Ok),
    })
}

/// Void rule shared by the numeric kinds: division by Void divides by
/// zero, Void as exponent yields one, relations compare against zero.
fn numeric_void<T: OperatorTable + ?Sized>(
    table: &T,
    one: Value,
    op: BinaryOp,
    ctx: &Context,
) -> Result<Value> {
    match op {
        BinaryOp::Divide | BinaryOp::Modulo => Err(Fault::DivideByZero),
        BinaryOp::Power => Ok(one),
        op if op.is_relational() => table.binary(op, &table.zero(), ctx),
        _ => void_rule(table, op, ctx),
    }
}

fn step(op: UnaryOp) -> i64 {
    match op {
        UnaryOp::PreIncrement | UnaryOp::PostIncrement => 1,
        _ => -1,
    }
}

impl OperatorTable for bool {
    fn kind(&self) -> ValueKind {
        ValueKind::Boolean
    }

    fn to_value(&self) -> Value {
        Value::Boolean(*self)
    }

    fn zero(&self) -> Value {
        Value::Boolean(false)
    }

    fn defined(&self, op: BinaryOp, right: &Value, ctx: &Context) -> Option<Result<Value>> {
        let a = *self;
        match right {
            Value::Boolean(b) => {
                let b = *b;
                let logical = match op {
                    BinaryOp::AndAlso | BinaryOp::BitwiseAnd => Some(a && b),
                    BinaryOp::OrElse | BinaryOp::BitwiseOr => Some(a || b),
                    BinaryOp::ExclusiveOr => Some(a ^ b),
                    _ => None,
                };
                match logical {
                    Some(r) => Some(Ok(Value::Boolean(r))),
                    None => integer_binary(op, a as i64, b as i64, ctx),
                }
            }
            Value::Integer(b) => integer_binary(op, a as i64, *b, ctx),
            Value::Real(b) => real_binary(op, a as i64 as f64, *b, ctx),
            Value::String(_) if op == BinaryOp::Add => Some(Ok(concat(&self.to_value(), right))),
            _ => None,
        }
    }

    fn against_void(&self, op: BinaryOp, ctx: &Context) -> Result<Value> {
        numeric_void(self, Value::Integer(1), op, ctx)
    }

    fn unary(&self, op: UnaryOp, ctx: &Context) -> Option<Result<Value>> {
        let a = *self as i64;
        Some(match op {
            UnaryOp::Not | UnaryOp::OnesComplement => Ok(Value::Boolean(!*self)),
            UnaryOp::Plus => Ok(Value::Integer(a)),
            UnaryOp::Negate => Ok(Value::Integer(-a)),
            op if op.is_step() => return integer_binary(BinaryOp::Add, a, step(op), ctx),
            _ => return None,
        })
    }
}

impl OperatorTable for i64 {
    fn kind(&self) -> ValueKind {
        ValueKind::Integer
    }

    fn to_value(&self) -> Value {
        Value::Integer(*self)
    }

    fn zero(&self) -> Value {
        Value::Integer(0)
    }

    fn defined(&self, op: BinaryOp, right: &Value, ctx: &Context) -> Option<Result<Value>> {
        match right {
            Value::Integer(b) => integer_binary(op, *self, *b, ctx),
            Value::Boolean(b) => integer_binary(op, *self, *b as i64, ctx),
            Value::Real(b) => real_binary(op, *self as f64, *b, ctx),
            Value::String(_) if op == BinaryOp::Add => Some(Ok(concat(&self.to_value(), right))),
            _ => None,
        }
    }

    fn against_void(&self, op: BinaryOp, ctx: &Context) -> Result<Value> {
        numeric_void(self, Value::Integer(1), op, ctx)
    }

    fn unary(&self, op: UnaryOp, ctx: &Context) -> Option<Result<Value>> {
        let a = *self;
        Some(match op {
            UnaryOp::Plus => Ok(Value::Integer(a)),
            UnaryOp::Negate => {
                if ctx.is_checked() {
                    a.checked_neg().map(Value::Integer).ok_or_else(|| overflow(op))
                } else {
                    Ok(Value::Integer(a.wrapping_neg()))
                }
            }
            UnaryOp::OnesComplement => Ok(Value::Integer(!a)),
            op if op.is_step() => return integer_binary(BinaryOp::Add, a, step(op), ctx),
            _ => return None,
        })
    }
}

impl OperatorTable for f64 {
    fn kind(&self) -> ValueKind {
        ValueKind::Real
    }

    fn to_value(&self) -> Value {
        Value::Real(*self)
    }

    fn zero(&self) -> Value {
        Value::Real(0.0)
    }

    fn defined(&self, op: BinaryOp, right: &Value, ctx: &Context) -> Option<Result<Value>> {
        let b = match right {
            Value::Real(b) => *b,
            Value::Integer(b) => *b as f64,
            Value::Boolean(b) => *b as i64 as f64,
            Value::String(_) if op == BinaryOp::Add => {
                return Some(Ok(concat(&self.to_value(), right)));
            }
            _ => return None,
        };
        real_binary(op, *self, b, ctx)
    }

    fn against_void(&self, op: BinaryOp, ctx: &Context) -> Result<Value> {
        numeric_void(self, Value::Real(1.0), op, ctx)
    }

    fn unary(&self, op: UnaryOp, _ctx: &Context) -> Option<Result<Value>> {
        Some(Ok(Value::Real(match op {
            UnaryOp::Plus => *self,
            UnaryOp::Negate => -*self,
            op if op.is_step() => *self + step(op) as f64,
            _ => return None,
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pact_core::{ContextMode, FaultKind};

    fn run(left: Value, op: BinaryOp, right: Value, ctx: &Context) -> Result<Value> {
        left.binary_operation(op, &right, ctx)
    }

    #[test]
    fn boolean_promotes_to_integer() {
        let ctx = Context::new();
        assert_eq!(
            run(Value::TRUE, BinaryOp::Add, Value::Integer(5), &ctx).unwrap(),
            Value::Integer(6)
        );
        assert_eq!(
            run(Value::TRUE, BinaryOp::AndAlso, Value::FALSE, &ctx).unwrap(),
            Value::FALSE
        );
        assert_eq!(
            run(Value::TRUE, BinaryOp::Multiply, Value::Real(2.5), &ctx).unwrap(),
            Value::Real(2.5)
        );
    }

    #[test]
    fn checked_overflow_faults_unchecked_wraps() {
        let ctx = Context::new();
        let err = run(Value::Integer(i64::MAX), BinaryOp::Add, Value::Integer(1), &ctx).unwrap_err();
        assert_eq!(err.kind(), FaultKind::Overflow);
        let loose = ctx.update_mode(ContextMode::Unchecked);
        assert_eq!(
            run(Value::Integer(i64::MAX), BinaryOp::Add, Value::Integer(1), &loose).unwrap(),
            Value::Integer(i64::MIN)
        );
        let err = Value::Integer(i64::MIN).unary_operation(UnaryOp::Negate, &ctx).unwrap_err();
        assert_eq!(err.kind(), FaultKind::Overflow);
    }

    #[test]
    fn division_by_zero_faults_in_both_modes() {
        let ctx = Context::new();
        let loose = ctx.update_mode(ContextMode::Unchecked);
        for c in [&ctx, &loose] {
            let err = run(Value::Integer(10), BinaryOp::Divide, Value::Integer(0), c).unwrap_err();
            assert_eq!(err.kind(), FaultKind::DivideByZero);
            let err = run(Value::Integer(10), BinaryOp::Divide, Value::Void, c).unwrap_err();
            assert_eq!(err.kind(), FaultKind::DivideByZero);
        }
        let err = run(Value::Real(1.0), BinaryOp::Divide, Value::Real(0.0), &ctx).unwrap_err();
        assert_eq!(err.kind(), FaultKind::DivideByZero);
        assert_eq!(
            run(Value::Real(1.0), BinaryOp::Divide, Value::Real(0.0), &loose).unwrap(),
            Value::Real(f64::INFINITY)
        );
    }

    #[test]
    fn void_rules_for_numbers() {
        let ctx = Context::new();
        assert_eq!(run(Value::Integer(7), BinaryOp::Add, Value::Void, &ctx).unwrap(), Value::Integer(7));
        assert_eq!(
            run(Value::Integer(7), BinaryOp::Multiply, Value::Void, &ctx).unwrap(),
            Value::Integer(0)
        );
        assert_eq!(run(Value::Integer(7), BinaryOp::Power, Value::Void, &ctx).unwrap(), Value::Integer(1));
        assert_eq!(run(Value::Integer(0), BinaryOp::Equal, Value::Void, &ctx).unwrap(), Value::TRUE);
        assert_eq!(run(Value::Real(-1.0), BinaryOp::LessThan, Value::Void, &ctx).unwrap(), Value::TRUE);
        assert_eq!(run(Value::Integer(3), BinaryOp::NotEqual, Value::Void, &ctx).unwrap(), Value::TRUE);
    }

    #[test]
    fn mixed_comparisons_promote() {
        let ctx = Context::new();
        assert_eq!(run(Value::Integer(1), BinaryOp::Equal, Value::Real(1.0), &ctx).unwrap(), Value::TRUE);
        assert_eq!(run(Value::Real(0.5), BinaryOp::LessThan, Value::TRUE, &ctx).unwrap(), Value::TRUE);
        assert_eq!(
            run(Value::Real(f64::NAN), BinaryOp::Equal, Value::Real(f64::NAN), &ctx).unwrap(),
            Value::FALSE
        );
    }

    #[test]
    fn powers_and_shifts() {
        let ctx = Context::new();
        assert_eq!(run(Value::Integer(2), BinaryOp::Power, Value::Integer(10), &ctx).unwrap(), Value::Integer(1024));
        assert_eq!(run(Value::Integer(2), BinaryOp::Power, Value::Integer(-1), &ctx).unwrap(), Value::Real(0.5));
        let err = run(Value::Integer(2), BinaryOp::Power, Value::Integer(64), &ctx).unwrap_err();
        assert_eq!(err.kind(), FaultKind::Overflow);
        assert_eq!(run(Value::Integer(1), BinaryOp::LeftShift, Value::Integer(4), &ctx).unwrap(), Value::Integer(16));
        let err = run(Value::Integer(1), BinaryOp::LeftShift, Value::Integer(64), &ctx).unwrap_err();
        assert_eq!(err.kind(), FaultKind::Overflow);
    }

    #[test]
    fn real_overflow_is_checked() {
        let ctx = Context::new();
        let err = run(Value::Real(f64::MAX), BinaryOp::Multiply, Value::Real(2.0), &ctx).unwrap_err();
        assert_eq!(err.kind(), FaultKind::Overflow);
        let loose = ctx.update_mode(ContextMode::Unchecked);
        assert_eq!(
            run(Value::Real(f64::MAX), BinaryOp::Multiply, Value::Real(2.0), &loose).unwrap(),
            Value::Real(f64::INFINITY)
        );
    }

    #[test]
    fn steps_and_complements() {
        let ctx = Context::new();
        assert_eq!(Value::Integer(4).unary_operation(UnaryOp::PreIncrement, &ctx).unwrap(), Value::Integer(5));
        assert_eq!(Value::Real(1.5).unary_operation(UnaryOp::PostDecrement, &ctx).unwrap(), Value::Real(0.5));
        assert_eq!(Value::Integer(0).unary_operation(UnaryOp::OnesComplement, &ctx).unwrap(), Value::Integer(-1));
        assert_eq!(Value::TRUE.unary_operation(UnaryOp::Not, &ctx).unwrap(), Value::FALSE);
        let err = run(Value::Integer(1), BinaryOp::AndAlso, Value::Integer(1), &ctx).unwrap_err();
        assert_eq!(err.kind(), FaultKind::UnsupportedOperation);
    }
}
