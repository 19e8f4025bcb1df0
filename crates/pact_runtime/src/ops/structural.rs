//! Contract, container, object, function and iterator operator tables.

use super::OperatorTable;
use crate::collection::{ArrayValue, ListValue, ScriptIterator};
use crate::context::Context;
use crate::contract::Contract;
use crate::function::FunctionValue;
use crate::value::{CompositeObject, Value, ValueKind};
use pact_core::{BinaryOp, Relationship, Result, UnaryOp};
use std::sync::Arc;

impl OperatorTable for Contract {
    fn kind(&self) -> ValueKind {
        ValueKind::Contract
    }

    fn to_value(&self) -> Value {
        Value::Contract(self.clone())
    }

    fn zero(&self) -> Value {
        Value::Contract(Contract::Void)
    }

    fn defined(&self, op: BinaryOp, right: &Value, _ctx: &Context) -> Option<Result<Value>> {
        let Value::Contract(other) = right else {
            return None;
        };
        let rel = self.relationship(other);
        let value = match op {
            BinaryOp::BitwiseOr => Value::Contract(Contract::union([self.clone(), other.clone()])),
            BinaryOp::BitwiseAnd => {
                Value::Contract(Contract::intersection([self.clone(), other.clone()]))
            }
            BinaryOp::Equal => Value::Boolean(rel == Relationship::TheSame),
            BinaryOp::NotEqual => Value::Boolean(rel != Relationship::TheSame),
            BinaryOp::LessThan => Value::Boolean(rel == Relationship::Subset),
            BinaryOp::LessThanOrEqual => {
                Value::Boolean(matches!(rel, Relationship::Subset | Relationship::TheSame))
            }
            BinaryOp::GreaterThan => Value::Boolean(rel == Relationship::Superset),
            BinaryOp::GreaterThanOrEqual => Value::Boolean(rel.is_assignable()),
            _ => return None,
        };
        Some(Ok(value))
    }

    fn unary(&self, op: UnaryOp, _ctx: &Context) -> Option<Result<Value>> {
        match op {
            UnaryOp::Not | UnaryOp::OnesComplement => {
                Some(Ok(Value::Contract(Contract::complement(self.clone()))))
            }
            _ => None,
        }
    }
}

impl OperatorTable for Arc<ArrayValue> {
    fn kind(&self) -> ValueKind {
        ValueKind::Array
    }

    fn to_value(&self) -> Value {
        Value::Array(self.clone())
    }

    fn zero(&self) -> Value {
        let dims = vec![0; self.rank()];
        Value::from(ArrayValue::new(self.element().clone(), &dims))
    }

    fn defined(&self, op: BinaryOp, right: &Value, ctx: &Context) -> Option<Result<Value>> {
        match (op, right) {
            (BinaryOp::Add, Value::Array(_) | Value::List(_)) => Some(
                ArrayValue::concat(&[self.to_value(), right.clone()], ctx).map(Value::from),
            ),
            _ => None,
        }
    }
}

impl OperatorTable for Arc<ListValue> {
    fn kind(&self) -> ValueKind {
        ValueKind::List
    }

    fn to_value(&self) -> Value {
        Value::List(self.clone())
    }

    fn zero(&self) -> Value {
        Value::from(ListValue::new())
    }

    fn defined(&self, op: BinaryOp, right: &Value, _ctx: &Context) -> Option<Result<Value>> {
        let tail = match (op, right) {
            (BinaryOp::Add, Value::List(l)) => l.values(),
            (BinaryOp::Add, Value::Array(a)) => a.values(),
            _ => return None,
        };
        let mut items = self.values();
        items.extend(tail);
        Some(Ok(Value::from(ListValue::from_values(items))))
    }
}

impl OperatorTable for Arc<CompositeObject> {
    fn kind(&self) -> ValueKind {
        ValueKind::Object
    }

    fn to_value(&self) -> Value {
        Value::Object(self.clone())
    }

    fn zero(&self) -> Value {
        Value::from(CompositeObject::new())
    }

    fn defined(&self, op: BinaryOp, right: &Value, _ctx: &Context) -> Option<Result<Value>> {
        match (op, right) {
            (BinaryOp::Add, Value::Object(o)) => Some(Ok(Value::from(self.merge(o)))),
            _ => None,
        }
    }
}

impl OperatorTable for Arc<FunctionValue> {
    fn kind(&self) -> ValueKind {
        ValueKind::Function
    }

    fn to_value(&self) -> Value {
        Value::Function(self.clone())
    }

    fn zero(&self) -> Value {
        Value::from(FunctionValue::void_of(self.contract().clone()))
    }

    fn defined(&self, op: BinaryOp, right: &Value, ctx: &Context) -> Option<Result<Value>> {
        match (op, right) {
            (BinaryOp::Multiply, Value::Function(g)) => {
                Some(FunctionValue::compose(self, g).map(Value::from))
            }
            (BinaryOp::Add, Value::Function(g)) => {
                Some(Ok(Value::from(FunctionValue::combine(self, g))))
            }
            (BinaryOp::BitwiseAnd, Value::Object(_)) => {
                Some(FunctionValue::unify(self, right, ctx).map(Value::from))
            }
            _ => None,
        }
    }
}

impl OperatorTable for Arc<dyn ScriptIterator> {
    fn kind(&self) -> ValueKind {
        ValueKind::Iterator
    }

    fn to_value(&self) -> Value {
        Value::Iterator(self.clone())
    }

    fn zero(&self) -> Value {
        Value::Void
    }

    fn defined(&self, _op: BinaryOp, _right: &Value, _ctx: &Context) -> Option<Result<Value>> {
        None
    }
}
