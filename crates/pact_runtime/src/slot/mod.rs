//! Runtime storage slots.
//!
//! A slot holds or computes one value. Storage slots own their value;
//! named-proxy, property and indexer slots delegate reads and writes to
//! another value or to callables.

use crate::context::Context;
use crate::contract::Contract;
use crate::function::FunctionValue;
use crate::value::Value;
use pact_core::{Fault, Result, UnaryOp};
use parking_lot::RwLock;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::sync::Arc;
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SlotAttributes {
    #[default]
    None,
    /// Writable only while unassigned.
    Immutable,
    /// Computed by an initializer on first read.
    Lazy,
}

pub type SlotInitializer = Arc<dyn Fn(&Context) -> Result<Value> + Send + Sync>;

enum StorageState {
    Unassigned,
    Pending(SlotInitializer),
    Assigned(Value),
}

/// A plain storage cell bound to a contract.
pub struct StorageSlot {
    name: Arc<str>,
    contract: Contract,
    attributes: SlotAttributes,
    state: RwLock<StorageState>,
}

impl StorageSlot {
    pub fn new(name: impl Into<Arc<str>>, contract: Contract, attributes: SlotAttributes) -> Self {
        Self {
            name: name.into(),
            contract,
            attributes,
            state: RwLock::new(StorageState::Unassigned),
        }
    }

    /// A slot bound to `value` at declaration. The value must already
    /// satisfy `contract`.
    pub fn assigned(
        name: impl Into<Arc<str>>,
        contract: Contract,
        attributes: SlotAttributes,
        value: Value,
    ) -> Self {
        Self {
            name: name.into(),
            contract,
            attributes,
            state: RwLock::new(StorageState::Assigned(value)),
        }
    }

    pub fn lazy<F>(name: impl Into<Arc<str>>, contract: Contract, init: F) -> Self
    where
        F: Fn(&Context) -> Result<Value> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            contract,
            attributes: SlotAttributes::Lazy,
            state: RwLock::new(StorageState::Pending(Arc::new(init))),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_assigned(&self) -> bool {
        matches!(*self.state.read(), StorageState::Assigned(_))
    }

    fn get_value(&self, ctx: &Context) -> Result<Value> {
        let init = match &*self.state.read() {
            StorageState::Assigned(v) => return Ok(v.clone()),
            StorageState::Unassigned => return Err(Fault::UnassignedSlotReading(self.name.to_string())),
            StorageState::Pending(init) => init.clone(),
        };
        // The lock is released while the initializer runs.
        let computed = self.contract.convert(&init(ctx)?, ctx)?;
        let mut state = self.state.write();
        match &*state {
            StorageState::Assigned(v) => Ok(v.clone()),
            _ => {
                *state = StorageState::Assigned(computed.clone());
                Ok(computed)
            }
        }
    }

    fn set_value(&self, value: &Value, ctx: &Context) -> Result<()> {
        let actual = value.contract();
        if !self.contract.accepts(&actual) {
            return Err(Fault::binding(&self.contract, actual));
        }
        let v = self.contract.convert(value, ctx)?;
        let mut state = self.state.write();
        if self.attributes == SlotAttributes::Immutable
            && matches!(*state, StorageState::Assigned(_))
        {
            return Err(Fault::ConstantCannotBeChanged(self.name.to_string()));
        }
        *state = StorageState::Assigned(v);
        Ok(())
    }

    fn delete_value(&self) -> Result<()> {
        if self.attributes == SlotAttributes::Immutable {
            return Err(Fault::ConstantCannotBeChanged(self.name.to_string()));
        }
        *self.state.write() = StorageState::Unassigned;
        Ok(())
    }
}

/// Forwards to the named slot of an owner value.
pub struct NamedProxySlot {
    pub owner: Value,
    pub name: Arc<str>,
}

/// Getter/setter pair. A missing setter makes the property read-only.
pub struct PropertySlot {
    pub name: Arc<str>,
    pub contract: Contract,
    pub getter: Option<Arc<FunctionValue>>,
    pub setter: Option<Arc<FunctionValue>>,
}

impl PropertySlot {
    fn write(&self, value: &Value, ctx: &Context) -> Result<()> {
        match &self.setter {
            Some(setter) => setter.invoke(std::slice::from_ref(value), ctx).map(|_| ()),
            None if ctx.is_checked() => Err(Fault::ConstantCannotBeChanged(self.name.to_string())),
            None => {
                trace!(target: "pact::ops", property = &*self.name, "write to read-only property dropped");
                Ok(())
            }
        }
    }
}

/// Element access routed through a value's bound get/set callables.
pub struct IndexerSlot {
    pub getter: Arc<FunctionValue>,
    pub setter: Option<Arc<FunctionValue>>,
    pub indices: SmallVec<[Value; 4]>,
}

impl IndexerSlot {
    fn write(&self, value: &Value, ctx: &Context) -> Result<()> {
        let Some(setter) = &self.setter else {
            return if ctx.is_checked() {
                Err(Fault::ConstantCannotBeChanged(self.getter.name().to_string()))
            } else {
                Ok(())
            };
        };
        let mut args: SmallVec<[Value; 4]> = self.indices.clone();
        args.push(value.clone());
        setter.invoke(&args, ctx).map(|_| ())
    }
}

#[derive(Clone)]
pub enum RuntimeSlot {
    Storage(Arc<StorageSlot>),
    NamedProxy(Arc<NamedProxySlot>),
    Property(Arc<PropertySlot>),
    Indexer(Arc<IndexerSlot>),
}

impl std::fmt::Debug for RuntimeSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let variant = match self {
            RuntimeSlot::Storage(_) => "Storage",
            RuntimeSlot::NamedProxy(_) => "NamedProxy",
            RuntimeSlot::Property(_) => "Property",
            RuntimeSlot::Indexer(_) => "Indexer",
        };
        f.debug_struct("RuntimeSlot").field("kind", &variant).finish_non_exhaustive()
    }
}

impl RuntimeSlot {
    /// Unassigned storage.
    pub fn storage(name: impl Into<Arc<str>>, contract: Contract) -> Self {
        RuntimeSlot::Storage(Arc::new(StorageSlot::new(name, contract, SlotAttributes::None)))
    }

    /// Immutable storage holding `value` under the value's own contract.
    pub fn constant(name: impl Into<Arc<str>>, value: Value) -> Self {
        let contract = value.contract();
        RuntimeSlot::Storage(Arc::new(StorageSlot::assigned(
            name,
            contract,
            SlotAttributes::Immutable,
            value,
        )))
    }

    pub fn proxy(owner: Value, name: impl Into<Arc<str>>) -> Self {
        RuntimeSlot::NamedProxy(Arc::new(NamedProxySlot {
            owner,
            name: name.into(),
        }))
    }

    pub fn property(
        name: impl Into<Arc<str>>,
        getter: Option<Arc<FunctionValue>>,
        setter: Option<Arc<FunctionValue>>,
    ) -> Self {
        let contract = getter
            .as_ref()
            .map_or(Contract::Super, |g| g.returns().clone());
        RuntimeSlot::Property(Arc::new(PropertySlot {
            name: name.into(),
            contract,
            getter,
            setter,
        }))
    }

    pub fn get_value(&self, ctx: &Context) -> Result<Value> {
        match self {
            RuntimeSlot::Storage(s) => s.get_value(ctx),
            RuntimeSlot::NamedProxy(p) => p.owner.get_slot(&p.name, ctx)?.get_value(ctx),
            RuntimeSlot::Property(p) => match &p.getter {
                Some(getter) => getter.invoke(&[], ctx),
                None => Err(Fault::UnassignedSlotReading(p.name.to_string())),
            },
            RuntimeSlot::Indexer(i) => i.getter.invoke(&i.indices, ctx),
        }
    }

    pub fn set_value(&self, value: &Value, ctx: &Context) -> Result<()> {
        match self {
            RuntimeSlot::Storage(s) => s.set_value(value, ctx),
            RuntimeSlot::NamedProxy(p) => p.owner.get_slot(&p.name, ctx)?.set_value(value, ctx),
            RuntimeSlot::Property(p) => p.write(value, ctx),
            RuntimeSlot::Indexer(i) => i.write(value, ctx),
        }
    }

    /// Clears the slot. Storage returns to unassigned; computed slots are
    /// written with Void.
    pub fn delete_value(&self, ctx: &Context) -> Result<()> {
        match self {
            RuntimeSlot::Storage(s) => s.delete_value(),
            RuntimeSlot::NamedProxy(p) => p.owner.get_slot(&p.name, ctx)?.delete_value(ctx),
            RuntimeSlot::Property(p) => p.write(&Value::Void, ctx),
            RuntimeSlot::Indexer(i) => i.write(&Value::Void, ctx),
        }
    }

    pub fn contract(&self) -> Contract {
        match self {
            RuntimeSlot::Storage(s) => s.contract.clone(),
            RuntimeSlot::NamedProxy(p) => match &p.owner {
                Value::Object(o) => o.slot_contract(&p.name).unwrap_or(Contract::Super),
                _ => Contract::Super,
            },
            RuntimeSlot::Property(p) => p.contract.clone(),
            RuntimeSlot::Indexer(i) => i.getter.returns().clone(),
        }
    }

    pub fn attributes(&self) -> SlotAttributes {
        match self {
            RuntimeSlot::Storage(s) => s.attributes,
            RuntimeSlot::Property(p) if p.setter.is_none() => SlotAttributes::Immutable,
            _ => SlotAttributes::None,
        }
    }

    /// Applies a unary operator to the slot's value. Increments and
    /// decrements store the stepped value and return the new value for
    /// prefix forms, the old one for postfix forms.
    pub fn apply_unary(&self, op: UnaryOp, ctx: &Context) -> Result<Value> {
        let old = self.get_value(ctx)?;
        let new = old.unary_operation(op, ctx)?;
        if !op.is_step() {
            return Ok(new);
        }
        self.set_value(&new, ctx)?;
        Ok(if op.is_postfix() { old } else { new })
    }
}

/// Reads every slot, on the rayon pool when there are enough of them.
pub fn materialize(slots: &[RuntimeSlot], ctx: &Context) -> Result<Vec<Value>> {
    if ctx.should_fork(slots.len()) {
        slots.par_iter().map(|s| s.get_value(ctx)).collect()
    } else {
        slots.iter().map(|s| s.get_value(ctx)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::Parameter;
    use crate::value::CompositeObject;
    use pact_core::{ContextMode, FaultKind};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn storage_reads_require_assignment() {
        let ctx = Context::new();
        let slot = RuntimeSlot::storage("x", Contract::Integer);
        assert_eq!(
            slot.get_value(&ctx).unwrap_err().kind(),
            FaultKind::UnassignedSlotReading
        );
        slot.set_value(&Value::Boolean(true), &ctx).unwrap();
        assert_eq!(slot.get_value(&ctx).unwrap(), Value::Integer(1));
        let err = slot.set_value(&Value::from("no"), &ctx).unwrap_err();
        assert_eq!(err.kind(), FaultKind::ContractBinding);
        slot.delete_value(&ctx).unwrap();
        assert!(slot.get_value(&ctx).is_err());
    }

    #[test]
    fn constants_reject_writes() {
        let ctx = Context::new();
        let slot = RuntimeSlot::constant("pi", Value::Real(2.5));
        let err = slot.set_value(&Value::Real(1.0), &ctx).unwrap_err();
        assert_eq!(err.kind(), FaultKind::ConstantCannotBeChanged);
        assert_eq!(slot.attributes(), SlotAttributes::Immutable);
    }

    #[test]
    fn lazy_slots_initialize_once() {
        let ctx = Context::new();
        let runs = Arc::new(AtomicUsize::new(0));
        let counter = runs.clone();
        let slot = RuntimeSlot::Storage(Arc::new(StorageSlot::lazy("v", Contract::Real, move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(Value::Integer(2))
        })));
        assert_eq!(slot.get_value(&ctx).unwrap(), Value::Real(2.0));
        assert_eq!(slot.get_value(&ctx).unwrap(), Value::Real(2.0));
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn read_only_property_depends_on_mode() {
        let ctx = Context::new();
        let getter = Arc::new(FunctionValue::native("answer", vec![], Contract::Integer, |_, _| {
            Ok(Value::Integer(42))
        }));
        let slot = RuntimeSlot::property("answer", Some(getter), None);
        assert_eq!(slot.get_value(&ctx).unwrap(), Value::Integer(42));
        let err = slot.set_value(&Value::Integer(1), &ctx).unwrap_err();
        assert_eq!(err.kind(), FaultKind::ConstantCannotBeChanged);
        let loose = ctx.update_mode(ContextMode::Unchecked);
        slot.set_value(&Value::Integer(1), &loose).unwrap();
    }

    #[test]
    fn property_setter_receives_the_value() {
        let ctx = Context::new();
        let store = Arc::new(StorageSlot::new("backing", Contract::String, SlotAttributes::None));
        let (read, write) = (store.clone(), store.clone());
        let getter = Arc::new(FunctionValue::native("get", vec![], Contract::String, move |ctx, _| {
            read.get_value(ctx)
        }));
        let setter = Arc::new(FunctionValue::native(
            "set",
            vec![Parameter::new("value", Contract::String)],
            Contract::Void,
            move |ctx, args| write.set_value(&args[0], ctx).map(|_| Value::Void),
        ));
        let slot = RuntimeSlot::property("name", Some(getter), Some(setter));
        slot.set_value(&Value::from("pact"), &ctx).unwrap();
        assert_eq!(slot.get_value(&ctx).unwrap(), Value::from("pact"));
    }

    #[test]
    fn proxies_forward_to_the_owner() {
        let ctx = Context::new();
        let owner = CompositeObject::new();
        owner.define_slot("count", RuntimeSlot::storage("count", Contract::Integer));
        let owner = Value::from(owner);
        let proxy = RuntimeSlot::proxy(owner.clone(), "count");
        proxy.set_value(&Value::Integer(3), &ctx).unwrap();
        assert_eq!(owner.get_slot("count", &ctx).unwrap().get_value(&ctx).unwrap(), Value::Integer(3));
        assert_eq!(proxy.contract(), Contract::Integer);
    }

    #[test]
    fn step_operators_store_back() {
        let ctx = Context::new();
        let slot = RuntimeSlot::storage("i", Contract::Integer);
        slot.set_value(&Value::Integer(5), &ctx).unwrap();
        assert_eq!(slot.apply_unary(UnaryOp::PostIncrement, &ctx).unwrap(), Value::Integer(5));
        assert_eq!(slot.get_value(&ctx).unwrap(), Value::Integer(6));
        assert_eq!(slot.apply_unary(UnaryOp::PreDecrement, &ctx).unwrap(), Value::Integer(5));
        assert_eq!(slot.apply_unary(UnaryOp::Negate, &ctx).unwrap(), Value::Integer(-5));
        assert_eq!(slot.get_value(&ctx).unwrap(), Value::Integer(5));
    }

    #[test]
    fn materialize_reads_every_slot_in_order() {
        let ctx = Context::new();
        let slots: Vec<RuntimeSlot> = (0..16)
            .map(|i| RuntimeSlot::constant(format!("a{i}"), Value::Integer(i)))
            .collect();
        let values = materialize(&slots, &ctx).unwrap();
        assert_eq!(values, (0..16).map(Value::Integer).collect::<Vec<_>>());
        let mut with_gap = slots.clone();
        with_gap.push(RuntimeSlot::storage("late", Contract::Integer));
        assert!(materialize(&with_gap, &ctx).is_err());
    }

    #[test]
    fn immutable_slot_takes_exactly_one_first_write() {
        let ctx = Context::new();
        let slot = RuntimeSlot::Storage(Arc::new(StorageSlot::new(
            "once",
            Contract::Integer,
            SlotAttributes::Immutable,
        )));
        let wins = AtomicUsize::new(0);
        std::thread::scope(|s| {
            for t in 0..8 {
                let (slot, ctx, wins) = (&slot, &ctx, &wins);
                s.spawn(move || {
                    for _ in 0..50 {
                        match slot.set_value(&Value::Integer(t), ctx) {
                            Ok(()) => {
                                wins.fetch_add(1, Ordering::SeqCst);
                            }
                            Err(e) => assert_eq!(e.kind(), FaultKind::ConstantCannotBeChanged),
                        }
                    }
                });
            }
        });
        assert_eq!(wins.load(Ordering::SeqCst), 1);
        assert!(slot.get_value(&ctx).is_ok());
    }
}
