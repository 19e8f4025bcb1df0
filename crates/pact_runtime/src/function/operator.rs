//! Operators reified as first-class callables.

use super::FunctionValue;
use crate::context::Context;
use crate::contract::{Contract, Parameter};
use crate::value::Value;
use pact_core::{BinaryOp, UnaryOp, hash_str};

impl FunctionValue {
    /// Two-argument function applying `op`. Independently built wrappers of
    /// the same operator compare equal.
    pub fn binary_operator(op: BinaryOp) -> FunctionValue {
        FunctionValue::native(
            op.symbol(),
            vec![
                Parameter::new("left", Contract::Super),
                Parameter::new("right", Contract::Super),
            ],
            Contract::Super,
            move |ctx: &Context, args: &[Value]| args[0].binary_operation(op, &args[1], ctx),
        )
        .with_fingerprint(hash_str(&format!("binary:{op:?}")))
        .transparent()
    }

    pub fn unary_operator(op: UnaryOp) -> FunctionValue {
        FunctionValue::native(
            op.symbol(),
            vec![Parameter::new("operand", Contract::Super)],
            Contract::Super,
            move |ctx: &Context, args: &[Value]| args[0].unary_operation(op, ctx),
        )
        .with_fingerprint(hash_str(&format!("unary:{op:?}")))
        .transparent()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn reified_operators_apply_and_compare() {
        let ctx = Context::new();
        let plus = Arc::new(FunctionValue::binary_operator(BinaryOp::Add));
        assert_eq!(
            plus.invoke(&[Value::Integer(2), Value::Integer(40)], &ctx).unwrap(),
            Value::Integer(42)
        );
        assert_eq!(*plus, FunctionValue::binary_operator(BinaryOp::Add));
        assert_ne!(*plus, FunctionValue::binary_operator(BinaryOp::Subtract));

        let neg = Arc::new(FunctionValue::unary_operator(UnaryOp::Negate));
        assert_eq!(neg.invoke(&[Value::Real(1.5)], &ctx).unwrap(), Value::Real(-1.5));
        assert_ne!(*neg, FunctionValue::unary_operator(UnaryOp::Plus));
    }
}
