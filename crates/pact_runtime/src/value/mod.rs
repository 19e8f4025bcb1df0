//! Runtime value representation.
//!
//! A closed set of value kinds. Every value carries exactly one contract,
//! inferred on demand for containers. Heap kinds are shared through `Arc`
//! so values can cross into the fork-join helpers.

mod access;
pub mod object;
mod text;

use crate::collection::{ArrayValue, ListValue, ScriptIterator};
use crate::contract::Contract;
use crate::function::FunctionValue;
use std::fmt;
use std::sync::Arc;

pub use object::CompositeObject;
pub use text::Appendable;

#[derive(Clone)]
pub enum Value {
    Void,
    Boolean(bool),
    Integer(i64),
    Real(f64),
    String(Arc<str>),
    Contract(Contract),
    Array(Arc<ArrayValue>),
    List(Arc<ListValue>),
    Object(Arc<CompositeObject>),
    Function(Arc<FunctionValue>),
    Iterator(Arc<dyn ScriptIterator>),
}

/// Kind tag used as the left/right key of operator dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Void,
    Boolean,
    Integer,
    Real,
    String,
    Contract,
    Array,
    List,
    Object,
    Function,
    Iterator,
}

impl ValueKind {
    pub fn name(self) -> &'static str {
        match self {
            ValueKind::Void => "Void",
            ValueKind::Boolean => "Boolean",
            ValueKind::Integer => "Integer",
            ValueKind::Real => "Real",
            ValueKind::String => "String",
            ValueKind::Contract => "Contract",
            ValueKind::Array => "Array",
            ValueKind::List => "List",
            ValueKind::Object => "Object",
            ValueKind::Function => "Function",
            ValueKind::Iterator => "Iterator",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Value {
    pub const TRUE: Value = Value::Boolean(true);
    pub const FALSE: Value = Value::Boolean(false);

    pub fn string(s: impl Into<Arc<str>>) -> Self {
        Value::String(s.into())
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Void => ValueKind::Void,
            Value::Boolean(_) => ValueKind::Boolean,
            Value::Integer(_) => ValueKind::Integer,
            Value::Real(_) => ValueKind::Real,
            Value::String(_) => ValueKind::String,
            Value::Contract(_) => ValueKind::Contract,
            Value::Array(_) => ValueKind::Array,
            Value::List(_) => ValueKind::List,
            Value::Object(_) => ValueKind::Object,
            Value::Function(_) => ValueKind::Function,
            Value::Iterator(_) => ValueKind::Iterator,
        }
    }

    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.kind().name()
    }

    #[inline]
    pub fn is_void(&self) -> bool {
        matches!(self, Value::Void)
    }

    /// Boolean, Integer, Real and String: the kinds the intern pools and
    /// the first dispatch tier treat as convertible primitives.
    pub fn is_primitive(&self) -> bool {
        matches!(
            self,
            Value::Boolean(_) | Value::Integer(_) | Value::Real(_) | Value::String(_)
        )
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_real(&self) -> Option<f64> {
        match self {
            Value::Real(r) => Some(*r),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_contract(&self) -> Option<&Contract> {
        match self {
            Value::Contract(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&Arc<FunctionValue>> {
        match self {
            Value::Function(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Arc<ArrayValue>> {
        match self {
            Value::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&Arc<ListValue>> {
        match self {
            Value::List(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Arc<CompositeObject>> {
        match self {
            Value::Object(o) => Some(o),
            _ => None,
        }
    }

    /// The single contract this value carries.
    pub fn contract(&self) -> Contract {
        match self {
            Value::Void => Contract::Void,
            Value::Boolean(_) => Contract::Boolean,
            Value::Integer(_) => Contract::Integer,
            Value::Real(_) => Contract::Real,
            Value::String(_) => Contract::String,
            Value::Contract(_) => Contract::Meta,
            Value::Array(a) => a.contract(),
            Value::List(l) => l.contract(),
            Value::Object(o) => o.contract(),
            Value::Function(f) => Contract::Function(f.contract().clone()),
            Value::Iterator(_) => crate::collection::iterator_contract(),
        }
    }

    /// Text form used by concatenation and diagnostics.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        out.append_value(self);
        out
    }
}

impl PartialEq for Value {
    /// Strict equality: kinds must match. Cross-kind numeric comparison is
    /// the business of `binary_operation`.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Void, Value::Void) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Real(a), Value::Real(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Contract(a), Value::Contract(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => Arc::ptr_eq(a, b) || a.content_eq(b),
            (Value::List(a), Value::List(b)) => Arc::ptr_eq(a, b) || a.content_eq(b),
            (Value::Object(a), Value::Object(b)) => Arc::ptr_eq(a, b),
            (Value::Function(a), Value::Function(b)) => a == b,
            (Value::Iterator(a), Value::Iterator(b)) => {
                std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
            }
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Void => f.write_str("Void"),
            Value::Boolean(b) => f.debug_tuple("Boolean").field(b).finish(),
            Value::Integer(i) => f.debug_tuple("Integer").field(i).finish(),
            Value::Real(r) => f.debug_tuple("Real").field(r).finish(),
            Value::String(s) => f.debug_tuple("String").field(s).finish(),
            Value::Contract(c) => write!(f, "Contract({c})"),
            Value::Array(a) => write!(f, "Array({}, {:?})", a.contract(), a.values()),
            Value::List(l) => write!(f, "List({:?})", l.values()),
            Value::Object(o) => write!(f, "Object({})", o.contract()),
            Value::Function(func) => write!(f, "Function({})", func.name()),
            Value::Iterator(_) => f.write_str("Iterator"),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<f64> for Value {
    fn from(r: f64) -> Self {
        Value::Real(r)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.into())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s.into())
    }
}

impl From<Contract> for Value {
    fn from(c: Contract) -> Self {
        Value::Contract(c)
    }
}

impl From<FunctionValue> for Value {
    fn from(f: FunctionValue) -> Self {
        Value::Function(Arc::new(f))
    }
}

impl From<Arc<FunctionValue>> for Value {
    fn from(f: Arc<FunctionValue>) -> Self {
        Value::Function(f)
    }
}

impl From<ArrayValue> for Value {
    fn from(a: ArrayValue) -> Self {
        Value::Array(Arc::new(a))
    }
}

impl From<ListValue> for Value {
    fn from(l: ListValue) -> Self {
        Value::List(Arc::new(l))
    }
}

impl From<CompositeObject> for Value {
    fn from(o: CompositeObject) -> Self {
        Value::Object(Arc::new(o))
    }
}
