//! Member, index and call entry points used by the backend.

use super::Value;
use crate::collection::{ScriptIterator, index_of};
use crate::context::Context;
use crate::contract::{Contract, Parameter};
use crate::function::FunctionValue;
use crate::slot::{IndexerSlot, RuntimeSlot};
use pact_core::{Fault, Result};
use smallvec::SmallVec;
use std::sync::Arc;
use tracing::trace;

impl Value {
    /// Resolves a named member. Objects look up their own slots; the other
    /// kinds expose a fixed set of read-only builtin members.
    pub fn get_slot(&self, name: &str, _ctx: &Context) -> Result<RuntimeSlot> {
        let member = match (self, name) {
            (Value::Object(o), _) => return o.get_slot(name),
            (Value::String(s), "length") => Value::Integer(s.chars().count() as i64),
            (Value::Array(a), "length") => Value::Integer(a.len() as i64),
            (Value::Array(a), "rank") => Value::Integer(a.rank() as i64),
            (Value::Array(a), "get") => Value::from(a.getter_function()),
            (Value::Array(a), "set") => Value::from(a.setter_function()),
            (Value::Array(a), "flatten") => {
                let array = a.clone();
                Value::from(
                    FunctionValue::native(
                        "flatten",
                        Vec::new(),
                        Contract::array(a.element().clone(), 1),
                        move |_: &Context, _: &[Value]| Ok(Value::from(array.flatten())),
                    )
                    .with_owner(self.clone()),
                )
            }
            (Value::List(l), "count") => Value::Integer(l.len() as i64),
            (Value::List(l), "add") => Value::from(l.adder_function()),
            (Value::List(l), "get") => Value::from(l.getter_function()),
            (Value::List(l), "set") => Value::from(l.setter_function()),
            (Value::Iterator(i), "has_next") => {
                return Ok(RuntimeSlot::property(
                    "has_next",
                    Some(Arc::new(iterator_member(i, "has_next", Contract::Boolean))),
                    None,
                ));
            }
            (Value::Iterator(i), "get_next") => {
                Value::from(iterator_member(i, "get_next", Contract::Super))
            }
            (Value::Function(f), "arity") => Value::Integer(f.arity() as i64),
            _ => {
                trace!(target: "pact::ops", kind = self.type_name(), member = name, "member not found");
                return Err(Fault::SlotNotFound(format!("{}.{}", self.type_name(), name)));
            }
        };
        Ok(RuntimeSlot::constant(name, member))
    }

    pub fn set_slot(&self, name: &str, value: &Value, ctx: &Context) -> Result<()> {
        self.get_slot(name, ctx)?.set_value(value, ctx)
    }

    pub fn get_indexed(&self, indices: &[Value], ctx: &Context) -> Result<Value> {
        match self {
            Value::Array(a) => a.get(&read_indices(indices)?),
            Value::List(l) => Ok(l.get(single_index(indices)?)),
            Value::String(s) => {
                let i = single_index(indices)?;
                let ch = usize::try_from(i).ok().and_then(|i| s.chars().nth(i));
                Ok(ch.map_or_else(|| Value::string(""), |c| Value::string(c.to_string())))
            }
            other => not_indexable(other, ctx),
        }
    }

    pub fn set_indexed(&self, indices: &[Value], value: &Value, ctx: &Context) -> Result<()> {
        match self {
            Value::Array(a) => a.set(&read_indices(indices)?, value, ctx),
            Value::List(l) => l.set(single_index(indices)?, value, ctx),
            other => not_indexable(other, ctx).map(|_| ()),
        }
    }

    /// An indexer slot over `indices`, routed through the value's bound
    /// get/set callables.
    pub fn index_slot(&self, indices: &[Value], ctx: &Context) -> Result<RuntimeSlot> {
        let (getter, setter) = match self {
            Value::Array(a) => (
                Arc::new(a.getter_function()),
                Some(Arc::new(a.setter_function())),
            ),
            Value::List(l) => (
                Arc::new(l.getter_function()),
                Some(Arc::new(l.setter_function())),
            ),
            Value::String(_) => {
                let text = self.clone();
                let getter = FunctionValue::native(
                    "get",
                    vec![Parameter::new("index", Contract::Integer)],
                    Contract::String,
                    move |ctx: &Context, args: &[Value]| text.get_indexed(args, ctx),
                )
                .with_owner(self.clone());
                (Arc::new(getter), None)
            }
            other => {
                not_indexable(other, ctx)?;
                return Err(Fault::SlotNotFound(format!("{}[]", other.type_name())));
            }
        };
        Ok(RuntimeSlot::Indexer(Arc::new(IndexerSlot {
            getter,
            setter,
            indices: indices.iter().cloned().collect(),
        })))
    }

    /// Calls a function value. A contract value called with one argument
    /// converts it.
    pub fn invoke(&self, args: &[Value], ctx: &Context) -> Result<Value> {
        match self {
            Value::Function(f) => f.invoke(args, ctx),
            Value::Contract(c) if args.len() == 1 => c.convert(&args[0], ctx),
            other if ctx.is_checked() => Err(Fault::unsupported("()", other.type_name(), "")),
            _ => Ok(Value::Void),
        }
    }
}

fn iterator_member(iter: &Arc<dyn ScriptIterator>, name: &'static str, returns: Contract) -> FunctionValue {
    let it = iter.clone();
    let call = move |ctx: &Context, _: &[Value]| -> Result<Value> {
        if name == "has_next" {
            it.has_next(ctx).map(Value::Boolean)
        } else {
            it.get_next(ctx)
        }
    };
    FunctionValue::native(name, Vec::new(), returns, call).with_owner(Value::Iterator(iter.clone()))
}

fn read_indices(indices: &[Value]) -> Result<SmallVec<[i64; 4]>> {
    indices.iter().map(index_of).collect()
}

fn single_index(indices: &[Value]) -> Result<i64> {
    match indices {
        [i] => index_of(i),
        _ => Err(Fault::mismatch(
            "[]",
            format!("expected 1 index, got {}", indices.len()),
        )),
    }
}

fn not_indexable(value: &Value, ctx: &Context) -> Result<Value> {
    if ctx.is_checked() {
        Err(Fault::unsupported("[]", value.type_name(), "Integer"))
    } else {
        trace!(target: "pact::ops", kind = value.type_name(), "index on non-indexable value");
        Ok(Value::Void)
    }
}
