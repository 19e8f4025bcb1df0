//! Contract-directed coercion and void values.

use super::Contract;
use crate::collection::{ArrayValue, ListValue};
use crate::context::Context;
use crate::function::FunctionValue;
use crate::slot::{RuntimeSlot, SlotAttributes, StorageSlot};
use crate::value::{CompositeObject, Value};
use pact_core::{Fault, Result};
use std::sync::Arc;

impl Contract {
    /// Coerces `value` to this contract. Widening conversions always
    /// succeed; Real to Integer truncates. Values this contract cannot
    /// hold fault with ContractBinding.
    pub fn convert(&self, value: &Value, ctx: &Context) -> Result<Value> {
        match (self, value) {
            (Contract::Void, _) => Ok(Value::Void),
            (Contract::Super, _) => Ok(value.clone()),
            (_, Value::Void) => Ok(self.from_void()),
            (Contract::Boolean, Value::Boolean(_))
            | (Contract::Integer, Value::Integer(_))
            | (Contract::Real, Value::Real(_))
            | (Contract::String, Value::String(_))
            | (Contract::Meta, Value::Contract(_))
            | (Contract::Dimensional, Value::Array(_) | Value::List(_)) => Ok(value.clone()),
            (Contract::Integer, Value::Boolean(b)) => Ok(Value::Integer(*b as i64)),
            (Contract::Integer, Value::Real(r)) => truncate(*r, ctx),
            (Contract::Real, Value::Integer(i)) => Ok(Value::Real(*i as f64)),
            (Contract::Real, Value::Boolean(b)) => Ok(Value::Real(if *b { 1.0 } else { 0.0 })),
            (Contract::Array(target), Value::Array(a)) if target.rank == a.rank() => {
                if a.element() == &target.element {
                    return Ok(value.clone());
                }
                if !target.element.accepts(a.element()) {
                    return Err(Fault::binding(self, value.contract()));
                }
                let cells = a
                    .cells()
                    .into_iter()
                    .map(|c| c.map(|v| target.element.convert(&v, ctx)).transpose())
                    .collect::<Result<Vec<_>>>()?;
                Ok(Value::from(ArrayValue::from_cells(
                    target.element.clone(),
                    a.dims(),
                    cells,
                )))
            }
            (Contract::Array(target), Value::List(l)) if target.rank == 1 => {
                if l.declared() == Some(&target.element) {
                    return Ok(value.clone());
                }
                if !target.element.accepts(&l.element()) {
                    return Err(Fault::binding(self, value.contract()));
                }
                let list = ListValue::with_element(target.element.clone());
                for v in l.values() {
                    list.push(&v, ctx)?;
                }
                Ok(Value::from(list))
            }
            _ if self.accepts(&value.contract()) => Ok(value.clone()),
            _ => Err(Fault::binding(self, value.contract())),
        }
    }

    /// The value a Void converts to under this contract.
    pub fn from_void(&self) -> Value {
        match self {
            Contract::Void | Contract::Super | Contract::Complement(_) => Value::Void,
            Contract::Boolean => Value::Boolean(false),
            Contract::Integer => Value::Integer(0),
            Contract::Real => Value::Real(0.0),
            Contract::String => Value::string(""),
            Contract::Meta => Value::Contract(Contract::Void),
            Contract::Dimensional => Value::from(ArrayValue::new(Contract::Super, &[0])),
            Contract::Array(a) => {
                let dims = vec![0; a.rank.max(1)];
                Value::from(ArrayValue::new(a.element.clone(), &dims))
            }
            Contract::Function(f) => Value::from(FunctionValue::void_of(f.clone())),
            Contract::Composite(c) => {
                let object = CompositeObject::new();
                for (name, contract) in &c.slots {
                    let slot = StorageSlot::assigned(
                        name.clone(),
                        contract.clone(),
                        SlotAttributes::None,
                        contract.from_void(),
                    );
                    object.define_slot(name.clone(), RuntimeSlot::Storage(Arc::new(slot)));
                }
                Value::from(object)
            }
            Contract::Union(ops) | Contract::Intersection(ops) => {
                ops.first().map_or(Value::Void, Contract::from_void)
            }
        }
    }
}

fn truncate(r: f64, ctx: &Context) -> Result<Value> {
    // i64::MAX as f64 rounds up to 2^63, which is already out of range.
    if r.is_finite() && r >= i64::MIN as f64 && r < i64::MAX as f64 {
        Ok(Value::Integer(r.trunc() as i64))
    } else if ctx.is_checked() {
        Err(Fault::binding(Contract::Integer, format!("Real({r})")))
    } else {
        Ok(Value::Integer(r as i64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pact_core::{ContextMode, FaultKind};

    #[test]
    fn widening_and_truncation() {
        let ctx = Context::new();
        assert_eq!(
            Contract::Integer.convert(&Value::Boolean(true), &ctx).unwrap(),
            Value::Integer(1)
        );
        assert_eq!(
            Contract::Real.convert(&Value::Integer(3), &ctx).unwrap(),
            Value::Real(3.0)
        );
        assert_eq!(
            Contract::Integer.convert(&Value::Real(-2.9), &ctx).unwrap(),
            Value::Integer(-2)
        );
    }

    #[test]
    fn out_of_range_truncation_follows_the_mode() {
        let ctx = Context::new();
        let err = Contract::Integer.convert(&Value::Real(1e300), &ctx).unwrap_err();
        assert_eq!(err.kind(), FaultKind::ContractBinding);
        let loose = ctx.update_mode(ContextMode::Unchecked);
        assert_eq!(
            Contract::Integer.convert(&Value::Real(1e300), &loose).unwrap(),
            Value::Integer(i64::MAX)
        );
        assert_eq!(
            Contract::Integer.convert(&Value::Real(f64::NAN), &loose).unwrap(),
            Value::Integer(0)
        );
    }

    #[test]
    fn void_converts_to_the_void_value() {
        let ctx = Context::new();
        assert_eq!(Contract::String.convert(&Value::Void, &ctx).unwrap(), Value::from(""));
        assert_eq!(Contract::Void.convert(&Value::Integer(4), &ctx).unwrap(), Value::Void);
        assert_eq!(Contract::Super.convert(&Value::Integer(4), &ctx).unwrap(), Value::Integer(4));
    }

    #[test]
    fn incompatible_values_fault() {
        let ctx = Context::new();
        let err = Contract::Integer.convert(&Value::from("1"), &ctx).unwrap_err();
        assert_eq!(err.kind(), FaultKind::ContractBinding);
        let err = Contract::Boolean.convert(&Value::Integer(1), &ctx).unwrap_err();
        assert_eq!(err.kind(), FaultKind::ContractBinding);
    }

    #[test]
    fn arrays_convert_element_wise() {
        let ctx = Context::new();
        let ints = Value::from(ArrayValue::infer(vec![Value::Integer(1), Value::Integer(2)]));
        let reals = Contract::array(Contract::Real, 1).convert(&ints, &ctx).unwrap();
        assert_eq!(reals.contract(), Contract::array(Contract::Real, 1));
        assert_eq!(
            reals.as_array().unwrap().values(),
            vec![Value::Real(1.0), Value::Real(2.0)]
        );
        let err = Contract::array(Contract::Integer, 2).convert(&ints, &ctx).unwrap_err();
        assert_eq!(err.kind(), FaultKind::ContractBinding);
    }

    #[test]
    fn structural_void_values() {
        let shape = Contract::composite([("x", Contract::Integer), ("name", Contract::String)]);
        let v = shape.from_void();
        assert_eq!(v.contract(), shape);
        let empty = Contract::array(Contract::String, 2).from_void();
        assert_eq!(empty.as_array().unwrap().dims(), &[0, 0]);
        assert_eq!(Contract::Meta.from_void(), Value::Contract(Contract::Void));
    }
}
