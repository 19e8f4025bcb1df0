//! Canonicalization of boxed primitive values.
//!
//! One append-only table per primitive kind, owned by a context and shared
//! by every context derived from it. A table maps a deterministic 64-bit
//! key to the canonical instance: the value itself for integers and
//! booleans, a content hash for strings and reals. Hash collisions are
//! resolved by probing the next key. Entries are never evicted.

use crate::value::Value;
use pact_core::{FastHashMap, Fault, Result, fast_map_with_capacity, hash_f64, hash_str};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InternKind {
    Boolean,
    Integer,
    Real,
    String,
}

impl InternKind {
    pub fn of(value: &Value) -> Option<Self> {
        match value {
            Value::Boolean(_) => Some(InternKind::Boolean),
            Value::Integer(_) => Some(InternKind::Integer),
            Value::Real(_) => Some(InternKind::Real),
            Value::String(_) => Some(InternKind::String),
            _ => None,
        }
    }
}

trait Internable: Clone {
    fn key(&self) -> u64;
    fn same(&self, other: &Self) -> bool;
}

impl Internable for bool {
    fn key(&self) -> u64 {
        *self as u64
    }
    fn same(&self, other: &Self) -> bool {
        self == other
    }
}

impl Internable for i64 {
    fn key(&self) -> u64 {
        *self as u64
    }
    fn same(&self, other: &Self) -> bool {
        self == other
    }
}

impl Internable for f64 {
    fn key(&self) -> u64 {
        hash_f64(*self)
    }
    fn same(&self, other: &Self) -> bool {
        self.to_bits() == other.to_bits()
    }
}

impl Internable for Arc<str> {
    fn key(&self) -> u64 {
        hash_str(self)
    }
    fn same(&self, other: &Self) -> bool {
        **self == **other
    }
}

struct InternTable<T> {
    kind: InternKind,
    entries: FastHashMap<u64, T>,
}

impl<T: Internable> InternTable<T> {
    fn with_capacity(kind: InternKind, cap: usize) -> Self {
        Self {
            kind,
            entries: fast_map_with_capacity(cap),
        }
    }

    /// Finds the key holding `value`, or the first free key on its probe path.
    fn probe(&self, value: &T) -> (u64, bool) {
        let mut key = value.key();
        loop {
            match self.entries.get(&key) {
                Some(existing) if existing.same(value) => return (key, true),
                Some(_) => key = key.wrapping_add(1),
                None => return (key, false),
            }
        }
    }

    fn intern(&mut self, value: &T) -> (u64, T) {
        let (key, found) = self.probe(value);
        if found {
            if let Some(existing) = self.entries.get(&key) {
                return (key, existing.clone());
            }
        }
        let cap = self.entries.capacity();
        if self.entries.len() == cap {
            debug!(target: "pact::intern", kind = ?self.kind, capacity = cap, "intern table growing");
        }
        self.entries.insert(key, value.clone());
        (key, value.clone())
    }

    fn contains(&self, value: &T) -> bool {
        self.probe(value).1
    }

    fn lookup(&self, key: u64) -> Option<T> {
        self.entries.get(&key).cloned()
    }
}

pub struct InternPools {
    booleans: Mutex<InternTable<bool>>,
    integers: Mutex<InternTable<i64>>,
    reals: Mutex<InternTable<f64>>,
    strings: Mutex<InternTable<Arc<str>>>,
}

impl InternPools {
    pub fn with_capacity(cap: usize) -> Self {
        Self {
            booleans: Mutex::new(InternTable::with_capacity(InternKind::Boolean, 2)),
            integers: Mutex::new(InternTable::with_capacity(InternKind::Integer, cap)),
            reals: Mutex::new(InternTable::with_capacity(InternKind::Real, cap)),
            strings: Mutex::new(InternTable::with_capacity(InternKind::String, cap)),
        }
    }

    /// Interns a primitive and returns its key.
    pub fn intern(&self, value: &Value) -> Result<u64> {
        self.canonicalize(value).map(|(key, _)| key)
    }

    /// Interns a primitive and returns its key together with the canonical
    /// instance; interned strings share one allocation.
    pub fn canonicalize(&self, value: &Value) -> Result<(u64, Value)> {
        Ok(match value {
            Value::Boolean(b) => {
                let (k, v) = self.booleans.lock().intern(b);
                (k, Value::Boolean(v))
            }
            Value::Integer(i) => {
                let (k, v) = self.integers.lock().intern(i);
                (k, Value::Integer(v))
            }
            Value::Real(r) => {
                let (k, v) = self.reals.lock().intern(r);
                (k, Value::Real(v))
            }
            Value::String(s) => {
                let (k, v) = self.strings.lock().intern(s);
                (k, Value::String(v))
            }
            other => {
                return Err(Fault::binding(
                    "Boolean | Integer | Real | String",
                    other.contract(),
                ));
            }
        })
    }

    pub fn is_interned(&self, value: &Value) -> bool {
        match value {
            Value::Boolean(b) => self.booleans.lock().contains(b),
            Value::Integer(i) => self.integers.lock().contains(i),
            Value::Real(r) => self.reals.lock().contains(r),
            Value::String(s) => self.strings.lock().contains(s),
            _ => false,
        }
    }

    pub fn lookup(&self, kind: InternKind, id: u64) -> Option<Value> {
        match kind {
            InternKind::Boolean => self.booleans.lock().lookup(id).map(Value::Boolean),
            InternKind::Integer => self.integers.lock().lookup(id).map(Value::Integer),
            InternKind::Real => self.reals.lock().lookup(id).map(Value::Real),
            InternKind::String => self.strings.lock().lookup(id).map(Value::String),
        }
    }

    pub fn len(&self, kind: InternKind) -> usize {
        match kind {
            InternKind::Boolean => self.booleans.lock().entries.len(),
            InternKind::Integer => self.integers.lock().entries.len(),
            InternKind::Real => self.reals.lock().entries.len(),
            InternKind::String => self.strings.lock().entries.len(),
        }
    }
}

impl Default for InternPools {
    fn default() -> Self {
        Self::with_capacity(256)
    }
}
