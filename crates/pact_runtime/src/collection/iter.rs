//! The has_next / get_next iteration protocol.

use crate::context::{Context, OMIT_VOID_YIELDS};
use crate::contract::Contract;
use crate::value::Value;
use pact_core::{Fault, Result};
use parking_lot::Mutex;
use std::sync::Arc;

/// External, single-pass iteration.
pub trait ScriptIterator: Send + Sync {
    fn has_next(&self, ctx: &Context) -> Result<bool>;

    /// Consumes the next element; faults EndOfCollection when none is left.
    fn get_next(&self, ctx: &Context) -> Result<Value>;
}

impl std::fmt::Debug for dyn ScriptIterator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ScriptIterator")
    }
}

/// The structural contract every iterator satisfies.
pub fn iterator_contract() -> Contract {
    Contract::composite([
        ("has_next", Contract::Boolean),
        ("get_next", Contract::function(Vec::new(), Contract::Super)),
    ])
}

/// Drains the remaining elements.
pub fn drain(iter: &dyn ScriptIterator, ctx: &Context) -> Result<Vec<Value>> {
    let mut out = Vec::new();
    while iter.has_next(ctx)? {
        out.push(iter.get_next(ctx)?);
    }
    Ok(out)
}

struct SequenceState {
    source: Box<dyn Iterator<Item = Value> + Send>,
    pending: Option<Value>,
    exhausted: bool,
}

impl SequenceState {
    fn probe(&mut self) -> bool {
        if self.pending.is_some() {
            return true;
        }
        if self.exhausted {
            return false;
        }
        match self.source.next() {
            Some(v) => {
                self.pending = Some(v);
                true
            }
            None => {
                self.exhausted = true;
                false
            }
        }
    }
}

/// Lazily adapts a native sequence. The source is pulled one element at a
/// time, so infinite sources are fine.
pub struct SequenceIterator {
    state: Mutex<SequenceState>,
}

impl SequenceIterator {
    pub fn new<I>(source: I) -> Self
    where
        I: IntoIterator<Item = Value>,
        I::IntoIter: Send + 'static,
    {
        Self {
            state: Mutex::new(SequenceState {
                source: Box::new(source.into_iter()),
                pending: None,
                exhausted: false,
            }),
        }
    }
}

impl ScriptIterator for SequenceIterator {
    fn has_next(&self, _ctx: &Context) -> Result<bool> {
        Ok(self.state.lock().probe())
    }

    fn get_next(&self, _ctx: &Context) -> Result<Value> {
        let mut state = self.state.lock();
        if !state.probe() {
            return Err(Fault::EndOfCollection);
        }
        state.pending.take().ok_or(Fault::EndOfCollection)
    }
}

/// Adapts any value exposing a boolean `has_next` member and a
/// zero-argument `get_next` callable.
pub struct StructuralIterator {
    target: Value,
}

impl StructuralIterator {
    pub fn new(target: Value) -> Self {
        Self { target }
    }

    /// Whether `value` exposes both protocol members.
    pub fn qualifies(value: &Value) -> bool {
        match value {
            Value::Object(o) => o.has_slot("has_next") && o.has_slot("get_next"),
            _ => false,
        }
    }

    fn member(&self, name: &str, ctx: &Context) -> Result<Value> {
        let value = self.target.get_slot(name, ctx)?.get_value(ctx)?;
        match value {
            Value::Function(f) => f.invoke(&[], ctx),
            other => Ok(other),
        }
    }
}

impl ScriptIterator for StructuralIterator {
    fn has_next(&self, ctx: &Context) -> Result<bool> {
        match self.member("has_next", ctx)? {
            Value::Boolean(b) => Ok(b),
            other => Err(Fault::binding(Contract::Boolean, other.contract())),
        }
    }

    fn get_next(&self, ctx: &Context) -> Result<Value> {
        match self.target.get_slot("get_next", ctx)?.get_value(ctx)? {
            Value::Function(f) => f.invoke(&[], ctx),
            other => Err(Fault::binding(
                Contract::function(Vec::new(), Contract::Super),
                other.contract(),
            )),
        }
    }
}

/// Skips Void elements of the wrapped iterator.
pub struct VoidSkipping {
    inner: Arc<dyn ScriptIterator>,
    pending: Mutex<Option<Value>>,
}

impl VoidSkipping {
    pub fn new(inner: Arc<dyn ScriptIterator>) -> Self {
        Self {
            inner,
            pending: Mutex::new(None),
        }
    }
}

impl ScriptIterator for VoidSkipping {
    fn has_next(&self, ctx: &Context) -> Result<bool> {
        let mut pending = self.pending.lock();
        if pending.is_some() {
            return Ok(true);
        }
        while self.inner.has_next(ctx)? {
            let v = self.inner.get_next(ctx)?;
            if !v.is_void() {
                *pending = Some(v);
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn get_next(&self, ctx: &Context) -> Result<Value> {
        if !self.has_next(ctx)? {
            return Err(Fault::EndOfCollection);
        }
        self.pending.lock().take().ok_or(Fault::EndOfCollection)
    }
}

impl Value {
    /// An iterator over this value. Arrays, lists and strings iterate their
    /// elements, objects qualify structurally. With the `omit_void_yields`
    /// flag set, Void elements are skipped.
    pub fn iterate(&self, ctx: &Context) -> Result<Arc<dyn ScriptIterator>> {
        let iter: Arc<dyn ScriptIterator> = match self {
            Value::Iterator(i) => i.clone(),
            Value::Array(a) => Arc::new(SequenceIterator::new(a.values())),
            Value::List(l) => Arc::new(SequenceIterator::new(l.values())),
            Value::String(s) => {
                let chars: Vec<Value> = s.chars().map(|c| Value::string(c.to_string())).collect();
                Arc::new(SequenceIterator::new(chars))
            }
            v if StructuralIterator::qualifies(v) => Arc::new(StructuralIterator::new(v.clone())),
            other => return Err(Fault::binding(iterator_contract(), other.contract())),
        };
        if ctx.flag_enabled(OMIT_VOID_YIELDS) {
            Ok(Arc::new(VoidSkipping::new(iter)))
        } else {
            Ok(iter)
        }
    }
}
