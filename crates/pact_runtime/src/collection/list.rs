use super::{admit, index_of, infer_contract, out_of_range};
use crate::context::Context;
use crate::contract::{Contract, Parameter};
use crate::function::FunctionValue;
use crate::value::Value;
use parking_lot::RwLock;
use pact_core::Result;
use std::sync::Arc;

/// Growable one-dimensional sequence.
///
/// Without a declared element contract the element contract is inferred
/// from the current items. The inferred contract is cached; every mutation
/// drops the cache and the next read recomputes it.
pub struct ListValue {
    declared: Option<Contract>,
    items: RwLock<Vec<Value>>,
    inferred: RwLock<Option<Contract>>,
}

impl ListValue {
    pub fn new() -> Self {
        Self::from_values(Vec::new())
    }

    pub fn from_values(values: Vec<Value>) -> Self {
        Self {
            declared: None,
            items: RwLock::new(values),
            inferred: RwLock::new(None),
        }
    }

    /// Empty list whose writes are checked against `element`.
    pub fn with_element(element: Contract) -> Self {
        Self {
            declared: Some(element),
            items: RwLock::new(Vec::new()),
            inferred: RwLock::new(None),
        }
    }

    pub fn declared(&self) -> Option<&Contract> {
        self.declared.as_ref()
    }

    pub fn element(&self) -> Contract {
        if let Some(declared) = &self.declared {
            return declared.clone();
        }
        if let Some(cached) = self.inferred.read().as_ref() {
            return cached.clone();
        }
        // Filled under the items lock.
        let items = self.items.read();
        let inferred = infer_contract(&items);
        *self.inferred.write() = Some(inferred.clone());
        inferred
    }

    pub fn contract(&self) -> Contract {
        Contract::array(self.element(), 1)
    }

    /// Called with the items write lock held.
    fn invalidate(&self) {
        if self.declared.is_none() {
            *self.inferred.write() = None;
        }
    }

    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }

    pub fn values(&self) -> Vec<Value> {
        self.items.read().clone()
    }

    pub fn content_eq(&self, other: &ListValue) -> bool {
        self.values() == other.values()
    }

    /// Checks `value` against the declared element contract, if any.
    fn admit(&self, value: &Value, ctx: &Context) -> Result<Option<Value>> {
        match &self.declared {
            Some(element) => admit(element, value, ctx),
            None => Ok(Some(value.clone())),
        }
    }

    pub fn push(&self, value: &Value, ctx: &Context) -> Result<()> {
        if let Some(v) = self.admit(value, ctx)? {
            let mut items = self.items.write();
            items.push(v);
            self.invalidate();
        }
        Ok(())
    }

    pub fn insert(&self, index: i64, value: &Value, ctx: &Context) -> Result<()> {
        let len = self.len();
        if index < 0 || index as usize > len {
            return out_of_range(index, len, ctx);
        }
        if let Some(v) = self.admit(value, ctx)? {
            let mut items = self.items.write();
            items.insert(index as usize, v);
            self.invalidate();
        }
        Ok(())
    }

    /// Removes and returns the item at `index`; Void when out of range in
    /// Unchecked mode.
    pub fn remove_at(&self, index: i64, ctx: &Context) -> Result<Value> {
        let mut items = self.items.write();
        if index < 0 || index as usize >= items.len() {
            let len = items.len();
            drop(items);
            return out_of_range(index, len, ctx).map(|_| Value::Void);
        }
        let removed = items.remove(index as usize);
        self.invalidate();
        Ok(removed)
    }

    pub fn clear(&self) {
        let mut items = self.items.write();
        items.clear();
        self.invalidate();
    }

    pub fn get(&self, index: i64) -> Value {
        let items = self.items.read();
        if index >= 0 && (index as usize) < items.len() {
            return items[index as usize].clone();
        }
        drop(items);
        self.element().from_void()
    }

    pub fn set(&self, index: i64, value: &Value, ctx: &Context) -> Result<()> {
        let len = self.len();
        if index < 0 || index as usize >= len {
            return out_of_range(index, len, ctx);
        }
        if let Some(v) = self.admit(value, ctx)? {
            let mut items = self.items.write();
            if let Some(cell) = items.get_mut(index as usize) {
                *cell = v;
            }
            self.invalidate();
        }
        Ok(())
    }

    pub fn getter_function(self: &Arc<Self>) -> FunctionValue {
        let list = self.clone();
        FunctionValue::native(
            "get",
            vec![Parameter::new("index", Contract::Integer)],
            Contract::Super,
            move |_: &Context, args: &[Value]| Ok(list.get(index_of(&args[0])?)),
        )
        .with_owner(Value::List(self.clone()))
    }

    pub fn setter_function(self: &Arc<Self>) -> FunctionValue {
        let list = self.clone();
        FunctionValue::native(
            "set",
            vec![
                Parameter::new("index", Contract::Integer),
                Parameter::new("value", Contract::Super),
            ],
            Contract::Void,
            move |ctx: &Context, args: &[Value]| {
                list.set(index_of(&args[0])?, &args[1], ctx)?;
                Ok(Value::Void)
            },
        )
        .with_owner(Value::List(self.clone()))
    }

    pub fn adder_function(self: &Arc<Self>) -> FunctionValue {
        let list = self.clone();
        FunctionValue::native(
            "add",
            vec![Parameter::new("value", Contract::Super)],
            Contract::Void,
            move |ctx: &Context, args: &[Value]| {
                list.push(&args[0], ctx)?;
                Ok(Value::Void)
            },
        )
        .with_owner(Value::List(self.clone()))
    }
}

impl Default for ListValue {
    fn default() -> Self {
        Self::new()
    }
}
