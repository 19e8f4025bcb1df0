//! Composition, overload combination and partial binding.
//!
//! Every result is transparent: the functions it wraps push their own
//! frames when they run.

use super::{FunctionBody, FunctionValue};
use crate::context::Context;
use crate::contract::{Contract, FunctionContract, Parameter};
use crate::value::Value;
use pact_core::{Fault, Result};
use std::sync::Arc;

impl FunctionValue {
    /// `left * right`. When `left` returns a value and `right` takes at
    /// least one parameter, the left result becomes the right function's
    /// first argument; otherwise both run over disjoint argument windows.
    pub fn compose(left: &Arc<FunctionValue>, right: &Arc<FunctionValue>) -> Result<FunctionValue> {
        let curry = !left.returns().is_void() && right.arity() >= 1;
        let mut parameters: Vec<Parameter> = left.parameters().to_vec();
        if curry {
            let head = &right.parameters()[0];
            if !head.contract.accepts(left.returns()) {
                return Err(Fault::binding(&head.contract, left.returns()));
            }
            parameters.extend(right.parameters()[1..].iter().cloned());
        } else {
            parameters.extend(right.parameters().iter().cloned());
        }
        let contract = FunctionContract::new(parameters, right.returns().clone());
        Ok(FunctionValue::from_parts(
            Arc::from(format!("{}*{}", left.name(), right.name())),
            Arc::new(contract),
            FunctionBody::Composed {
                left: left.clone(),
                right: right.clone(),
                curry,
            },
        )
        .transparent())
    }

    /// `left + right`: an overload set tried in insertion order. Nested
    /// sets are flattened and equal members kept once.
    pub fn combine(left: &Arc<FunctionValue>, right: &Arc<FunctionValue>) -> FunctionValue {
        let mut members: Vec<Arc<FunctionValue>> = Vec::new();
        for f in [left, right] {
            match f.body() {
                FunctionBody::Overloaded(inner) => {
                    for m in inner {
                        push_member(&mut members, m);
                    }
                }
                _ => push_member(&mut members, f),
            }
        }
        let returns = members
            .iter()
            .map(|m| m.returns().clone())
            .reduce(|a, b| a.widen(&b))
            .unwrap_or(Contract::Void);
        let parameters = members
            .first()
            .map(|m| m.parameters().to_vec())
            .unwrap_or_default();
        FunctionValue::from_parts(
            Arc::from(format!("{}+{}", left.name(), right.name())),
            Arc::new(FunctionContract::new(parameters, returns)),
            FunctionBody::Overloaded(members),
        )
        .transparent()
    }

    /// `base & object`: pre-binds every parameter whose name matches a
    /// slot of `object`. The result takes the remaining parameters in
    /// their original order.
    pub fn unify(base: &Arc<FunctionValue>, object: &Value, ctx: &Context) -> Result<FunctionValue> {
        let Value::Object(fields) = object else {
            return Err(Fault::binding("Composite", object.contract()));
        };
        let mut bound = Vec::with_capacity(base.arity());
        let mut remaining = Vec::new();
        for p in base.parameters() {
            if fields.has_slot(&p.name) {
                let value = fields.get_slot(&p.name)?.get_value(ctx)?;
                bound.push(Some(p.contract.convert(&value, ctx)?));
            } else {
                bound.push(None);
                remaining.push(p.clone());
            }
        }
        Ok(FunctionValue::from_parts(
            Arc::from(format!("{}&", base.name())),
            Arc::new(FunctionContract::new(remaining, base.returns().clone())),
            FunctionBody::Unified {
                base: base.clone(),
                bound,
            },
        )
        .transparent())
    }
}

fn push_member(members: &mut Vec<Arc<FunctionValue>>, f: &Arc<FunctionValue>) {
    if !members.iter().any(|m| m == f) {
        members.push(f.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::CompositeObject;
    use pact_core::FaultKind;

    fn add() -> Arc<FunctionValue> {
        Arc::new(FunctionValue::native(
            "add",
            vec![
                Parameter::new("a", Contract::Integer),
                Parameter::new("b", Contract::Integer),
            ],
            Contract::Integer,
            |_, args| match (&args[0], &args[1]) {
                (Value::Integer(a), Value::Integer(b)) => Ok(Value::Integer(a + b)),
                _ => Ok(Value::Void),
            },
        ))
    }

    fn show() -> Arc<FunctionValue> {
        Arc::new(FunctionValue::native(
            "show",
            vec![Parameter::new("x", Contract::Integer)],
            Contract::String,
            |_, args| Ok(Value::string(args[0].to_text())),
        ))
    }

    #[test]
    fn composition_curries_through_the_left_result() {
        let ctx = Context::new();
        let f = Arc::new(FunctionValue::compose(&add(), &show()).unwrap());
        assert_eq!(f.arity(), 2);
        assert_eq!(
            f.invoke(&[Value::Integer(2), Value::Integer(3)], &ctx).unwrap(),
            Value::from("5")
        );
    }

    #[test]
    fn composition_without_currying_uses_disjoint_windows() {
        let ctx = Context::new();
        let log = Arc::new(FunctionValue::native("log", vec![], Contract::Void, |_, _| Ok(Value::Void)));
        let f = Arc::new(FunctionValue::compose(&log, &show()).unwrap());
        assert_eq!(f.arity(), 1);
        assert_eq!(f.invoke(&[Value::Integer(8)], &ctx).unwrap(), Value::from("8"));
    }

    #[test]
    fn composition_rejects_incompatible_shapes() {
        let err = FunctionValue::compose(&show(), &show()).unwrap_err();
        assert_eq!(err.kind(), FaultKind::ContractBinding);
    }

    #[test]
    fn combination_deduplicates_members() {
        let a = show();
        let set = Arc::new(FunctionValue::combine(&a, &a));
        match set.body() {
            FunctionBody::Overloaded(members) => assert_eq!(members.len(), 1),
            _ => panic!("expected an overload set"),
        }
        let wider = FunctionValue::combine(&set, &add());
        match wider.body() {
            FunctionBody::Overloaded(members) => assert_eq!(members.len(), 2),
            _ => panic!("expected an overload set"),
        }
    }

    #[test]
    fn unification_binds_by_name() {
        let ctx = Context::new();
        let fields = CompositeObject::new();
        fields.define_value("b", Value::Integer(10));
        let bound = Arc::new(FunctionValue::unify(&add(), &Value::from(fields), &ctx).unwrap());
        assert_eq!(bound.arity(), 1);
        assert_eq!(&*bound.parameters()[0].name, "a");
        assert_eq!(bound.invoke(&[Value::Integer(1)], &ctx).unwrap(), Value::Integer(11));
    }
}
