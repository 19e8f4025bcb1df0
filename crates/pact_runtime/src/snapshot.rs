//! Structural snapshots of values.
//!
//! A snapshot is the value's contract plus its backing data, independent
//! of the in-memory representation. Functions and iterators have no data
//! form and refuse to snapshot. Objects keep their storage slots only;
//! computed slots (proxies, properties, indexers) are dropped.

use crate::collection::{ArrayValue, ListValue};
use crate::context::Context;
use crate::contract::Contract;
use crate::slot::{RuntimeSlot, SlotAttributes, StorageSlot};
use crate::value::{CompositeObject, Value};
use pact_core::{Fault, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueSnapshot {
    pub contract: Contract,
    pub data: SnapshotData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SnapshotData {
    Void,
    Boolean(bool),
    Integer(i64),
    Real(f64),
    String(Arc<str>),
    Contract(Contract),
    Array {
        dims: Vec<usize>,
        cells: Vec<Option<ValueSnapshot>>,
    },
    List {
        declared: Option<Contract>,
        items: Vec<ValueSnapshot>,
    },
    Object(Vec<SlotSnapshot>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotSnapshot {
    pub name: Arc<str>,
    pub contract: Contract,
    #[serde(default)]
    pub attributes: SlotAttributes,
    /// `None` for a slot that was never assigned.
    pub value: Option<ValueSnapshot>,
}

impl Value {
    pub fn snapshot(&self, ctx: &Context) -> Result<ValueSnapshot> {
        let data = match self {
            Value::Void => SnapshotData::Void,
            Value::Boolean(b) => SnapshotData::Boolean(*b),
            Value::Integer(i) => SnapshotData::Integer(*i),
            Value::Real(r) => SnapshotData::Real(*r),
            Value::String(s) => SnapshotData::String(s.clone()),
            Value::Contract(c) => SnapshotData::Contract(c.clone()),
            Value::Array(a) => SnapshotData::Array {
                dims: a.dims().to_vec(),
                cells: a
                    .cells()
                    .iter()
                    .map(|cell| cell.as_ref().map(|v| v.snapshot(ctx)).transpose())
                    .collect::<Result<_>>()?,
            },
            Value::List(l) => SnapshotData::List {
                declared: l.declared().cloned(),
                items: l
                    .values()
                    .iter()
                    .map(|v| v.snapshot(ctx))
                    .collect::<Result<_>>()?,
            },
            Value::Object(o) => {
                let slots = snapshot_slots(o, ctx)?;
                let contract =
                    Contract::composite(slots.iter().map(|s| (s.name.clone(), s.contract.clone())));
                return Ok(ValueSnapshot {
                    contract,
                    data: SnapshotData::Object(slots),
                });
            }
            Value::Function(_) | Value::Iterator(_) => {
                return Err(Fault::NotSerializable(self.type_name().to_string()));
            }
        };
        Ok(ValueSnapshot {
            contract: self.contract(),
            data,
        })
    }
}

fn snapshot_slots(object: &CompositeObject, ctx: &Context) -> Result<Vec<SlotSnapshot>> {
    let mut out = Vec::new();
    for (name, slot) in object.slots() {
        let RuntimeSlot::Storage(storage) = &slot else {
            continue;
        };
        let value = if storage.is_assigned() {
            Some(slot.get_value(ctx)?.snapshot(ctx)?)
        } else {
            None
        };
        out.push(SlotSnapshot {
            name,
            contract: slot.contract(),
            attributes: slot.attributes(),
            value,
        });
    }
    Ok(out)
}

impl ValueSnapshot {
    /// Rebuilds the value. The rebuilt value must satisfy the recorded
    /// contract.
    pub fn restore(&self, ctx: &Context) -> Result<Value> {
        let value = match &self.data {
            SnapshotData::Void => Value::Void,
            SnapshotData::Boolean(b) => Value::Boolean(*b),
            SnapshotData::Integer(i) => Value::Integer(*i),
            SnapshotData::Real(r) => Value::Real(*r),
            SnapshotData::String(s) => Value::String(s.clone()),
            SnapshotData::Contract(c) => Value::Contract(c.clone()),
            SnapshotData::Array { dims, cells } => self.restore_array(dims, cells, ctx)?,
            SnapshotData::List { declared, items } => {
                let values = items
                    .iter()
                    .map(|s| s.restore(ctx))
                    .collect::<Result<Vec<_>>>()?;
                match declared {
                    Some(element) => {
                        let list = ListValue::with_element(element.clone());
                        for v in &values {
                            list.push(v, ctx)?;
                        }
                        Value::from(list)
                    }
                    None => Value::from(ListValue::from_values(values)),
                }
            }
            SnapshotData::Object(slots) => {
                let object = CompositeObject::new();
                for s in slots {
                    let storage = match &s.value {
                        Some(v) => StorageSlot::assigned(
                            s.name.clone(),
                            s.contract.clone(),
                            s.attributes,
                            s.contract.convert(&v.restore(ctx)?, ctx)?,
                        ),
                        None => StorageSlot::new(s.name.clone(), s.contract.clone(), s.attributes),
                    };
                    object.define_slot(s.name.clone(), RuntimeSlot::Storage(Arc::new(storage)));
                }
                Value::from(object)
            }
        };
        let actual = value.contract();
        if !self.contract.accepts(&actual) {
            return Err(Fault::binding(&self.contract, actual));
        }
        Ok(value)
    }

    fn restore_array(
        &self,
        dims: &[usize],
        cells: &[Option<ValueSnapshot>],
        ctx: &Context,
    ) -> Result<Value> {
        let Some(shape) = self.contract.as_array() else {
            return Err(Fault::binding("array contract", &self.contract));
        };
        let len = dims.iter().try_fold(1usize, |acc, &d| acc.checked_mul(d));
        if dims.len() != shape.rank || len != Some(cells.len()) {
            return Err(Fault::binding(
                &self.contract,
                format!("array of {} cells over {:?}", cells.len(), dims),
            ));
        }
        let cells = cells
            .iter()
            .map(|cell| {
                cell.as_ref()
                    .map(|s| {
                        let v = s.restore(ctx)?;
                        let actual = v.contract();
                        if !shape.element.accepts(&actual) {
                            return Err(Fault::binding(&shape.element, actual));
                        }
                        shape.element.convert(&v, ctx)
                    })
                    .transpose()
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Value::from(ArrayValue::from_cells(
            shape.element.clone(),
            dims,
            cells,
        )))
    }
}
