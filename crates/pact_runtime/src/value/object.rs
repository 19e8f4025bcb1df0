use crate::contract::{CompositeContract, Contract};
use crate::slot::{RuntimeSlot, SlotAttributes, StorageSlot};
use crate::value::Value;
use indexmap::IndexMap;
use pact_core::{Fault, Result};
use parking_lot::RwLock;
use std::sync::Arc;

/// Insertion-ordered map of named runtime slots.
pub struct CompositeObject {
    slots: RwLock<IndexMap<Arc<str>, RuntimeSlot>>,
}

impl CompositeObject {
    pub fn new() -> Self {
        Self {
            slots: RwLock::new(IndexMap::new()),
        }
    }

    /// Binds `slot` under `name`, replacing any previous binding.
    pub fn define_slot(&self, name: impl Into<Arc<str>>, slot: RuntimeSlot) {
        self.slots.write().insert(name.into(), slot);
    }

    /// Binds a mutable storage slot holding `value` under the value's
    /// contract.
    pub fn define_value(&self, name: impl Into<Arc<str>>, value: Value) {
        let name = name.into();
        let slot = StorageSlot::assigned(name.clone(), value.contract(), SlotAttributes::None, value);
        self.define_slot(name, RuntimeSlot::Storage(Arc::new(slot)));
    }

    pub fn get_slot(&self, name: &str) -> Result<RuntimeSlot> {
        self.slots
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| Fault::SlotNotFound(name.to_string()))
    }

    /// Replaces an existing binding; unknown names fault.
    pub fn set_slot(&self, name: &str, slot: RuntimeSlot) -> Result<()> {
        match self.slots.write().get_mut(name) {
            Some(existing) => {
                *existing = slot;
                Ok(())
            }
            None => Err(Fault::SlotNotFound(name.to_string())),
        }
    }

    pub fn remove_slot(&self, name: &str) -> Option<RuntimeSlot> {
        self.slots.write().shift_remove(name)
    }

    pub fn has_slot(&self, name: &str) -> bool {
        self.slots.read().contains_key(name)
    }

    pub fn slot_names(&self) -> Vec<Arc<str>> {
        self.slots.read().keys().cloned().collect()
    }

    pub(crate) fn slots(&self) -> Vec<(Arc<str>, RuntimeSlot)> {
        self.slots
            .read()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    pub fn slot_contract(&self, name: &str) -> Option<Contract> {
        self.slots.read().get(name).map(RuntimeSlot::contract)
    }

    pub fn len(&self) -> usize {
        self.slots.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contract(&self) -> Contract {
        let slots = self
            .slots
            .read()
            .iter()
            .map(|(name, slot)| (name.clone(), slot.contract()))
            .collect();
        Contract::Composite(Arc::new(CompositeContract { slots }))
    }

    /// New object holding the slots of `self` then `other`; on a name
    /// clash the slot of `other` wins. Slots are shared, not copied.
    pub fn merge(&self, other: &CompositeObject) -> CompositeObject {
        let merged = CompositeObject::new();
        for (name, slot) in self.slots().into_iter().chain(other.slots()) {
            merged.define_slot(name, slot);
        }
        merged
    }
}

impl Default for CompositeObject {
    fn default() -> Self {
        Self::new()
    }
}
