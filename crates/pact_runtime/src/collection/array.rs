use super::{admit, index_of, infer_contract, out_of_range};
use crate::context::Context;
use crate::contract::{Contract, Parameter};
use crate::function::FunctionValue;
use crate::value::Value;
use pact_core::{Fault, Result};
use parking_lot::RwLock;
use rayon::prelude::*;
use smallvec::SmallVec;
use std::sync::Arc;

/// Dense multi-dimensional array with a fixed rank and element contract.
/// Cells never written read as the element contract's void value.
pub struct ArrayValue {
    element: Contract,
    dims: SmallVec<[usize; 2]>,
    cells: RwLock<Vec<Option<Value>>>,
}

enum Offset {
    At(usize),
    Outside { index: i64, length: usize },
}

impl ArrayValue {
    pub fn new(element: Contract, dims: &[usize]) -> Self {
        let dims: SmallVec<[usize; 2]> = if dims.is_empty() {
            SmallVec::from_slice(&[0])
        } else {
            SmallVec::from_slice(dims)
        };
        let len = dims.iter().product();
        Self {
            element,
            dims,
            cells: RwLock::new(vec![None; len]),
        }
    }

    /// One-dimensional array of `values` whose element contract is the
    /// widened contract of the values.
    pub fn infer(values: Vec<Value>) -> Self {
        let element = infer_contract(&values);
        Self::from_cells(element, &[values.len()], values.into_iter().map(Some).collect())
    }

    /// One-dimensional array of `element`, converting every value.
    pub fn from_values(element: Contract, values: &[Value], ctx: &Context) -> Result<Self> {
        let cells = values
            .iter()
            .map(|v| element.convert(v, ctx).map(Some))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::from_cells(element, &[values.len()], cells))
    }

    pub(crate) fn from_cells(element: Contract, dims: &[usize], cells: Vec<Option<Value>>) -> Self {
        Self {
            element,
            dims: SmallVec::from_slice(dims),
            cells: RwLock::new(cells),
        }
    }

    pub fn element(&self) -> &Contract {
        &self.element
    }

    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    #[inline]
    pub fn rank(&self) -> usize {
        self.dims.len()
    }

    /// Total cell count across all dimensions.
    pub fn len(&self) -> usize {
        self.cells.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contract(&self) -> Contract {
        Contract::array(self.element.clone(), self.rank())
    }

    fn offset(&self, indices: &[i64]) -> Result<Offset> {
        if indices.len() != self.rank() {
            return Err(Fault::mismatch(
                "[]",
                format!("expected {} indices, got {}", self.rank(), indices.len()),
            ));
        }
        let mut offset = 0usize;
        for (&index, &length) in indices.iter().zip(self.dims.iter()) {
            if index < 0 || index as u64 >= length as u64 {
                return Ok(Offset::Outside { index, length });
            }
            offset = offset * length + index as usize;
        }
        Ok(Offset::At(offset))
    }

    pub fn get(&self, indices: &[i64]) -> Result<Value> {
        Ok(match self.offset(indices)? {
            Offset::At(i) => match &self.cells.read()[i] {
                Some(v) => v.clone(),
                None => self.element.from_void(),
            },
            Offset::Outside { .. } => self.element.from_void(),
        })
    }

    pub fn set(&self, indices: &[i64], value: &Value, ctx: &Context) -> Result<()> {
        match self.offset(indices)? {
            Offset::At(i) => {
                if let Some(v) = admit(&self.element, value, ctx)? {
                    self.cells.write()[i] = Some(v);
                }
                Ok(())
            }
            Offset::Outside { index, length } => out_of_range(index, length, ctx),
        }
    }

    pub(crate) fn cells(&self) -> Vec<Option<Value>> {
        self.cells.read().clone()
    }

    /// Cell values in row-major order.
    pub fn values(&self) -> Vec<Value> {
        self.cells
            .read()
            .iter()
            .map(|c| c.clone().unwrap_or_else(|| self.element.from_void()))
            .collect()
    }

    pub fn flatten(&self) -> ArrayValue {
        let cells = self.cells();
        let len = cells.len();
        Self::from_cells(self.element.clone(), &[len], cells)
    }

    pub fn content_eq(&self, other: &ArrayValue) -> bool {
        self.dims == other.dims && self.element == other.element && self.values() == other.values()
    }

    /// Flattened concatenation of arrays and lists into a new array whose
    /// element contract widens every part's element contract.
    pub fn concat(parts: &[Value], ctx: &Context) -> Result<ArrayValue> {
        let mut element = Contract::Void;
        let mut sources: Vec<Vec<Value>> = Vec::with_capacity(parts.len());
        for part in parts {
            let (e, values) = match part {
                Value::Array(a) => (a.element.clone(), a.values()),
                Value::List(l) => (l.element(), l.values()),
                other => return Err(Fault::binding(Contract::Dimensional, other.contract())),
            };
            element = element.widen(&e);
            sources.push(values);
        }
        let mut starts = Vec::with_capacity(sources.len());
        let mut total = 0usize;
        for s in &sources {
            starts.push(total);
            total += s.len();
        }
        let locate = |i: usize| {
            let part = starts.partition_point(|&s| s <= i) - 1;
            Some(sources[part][i - starts[part]].clone())
        };
        let cells: Vec<Option<Value>> = if ctx.should_fork(total) {
            (0..total).into_par_iter().map(locate).collect()
        } else {
            (0..total).map(locate).collect()
        };
        Ok(Self::from_cells(element, &[total], cells))
    }

    fn index_parameters(&self) -> Vec<Parameter> {
        if self.rank() == 1 {
            return vec![Parameter::new("index", Contract::Integer)];
        }
        (0..self.rank())
            .map(|d| Parameter::new(format!("index{d}"), Contract::Integer))
            .collect()
    }

    /// `get` as a bound callable taking one Integer per dimension.
    pub fn getter_function(self: &Arc<Self>) -> FunctionValue {
        let array = self.clone();
        FunctionValue::native(
            "get",
            self.index_parameters(),
            self.element.clone(),
            move |_: &Context, args: &[Value]| {
                let indices = args.iter().map(index_of).collect::<Result<SmallVec<[i64; 4]>>>()?;
                array.get(&indices)
            },
        )
        .with_owner(Value::Array(self.clone()))
    }

    /// `set` as a bound callable: one Integer per dimension, then the value.
    /// The value is checked by the array's own write policy.
    pub fn setter_function(self: &Arc<Self>) -> FunctionValue {
        let array = self.clone();
        let mut parameters = self.index_parameters();
        parameters.push(Parameter::new("value", Contract::Super));
        FunctionValue::native(
            "set",
            parameters,
            Contract::Void,
            move |ctx: &Context, args: &[Value]| {
                let (value, indices) = match args.split_last() {
                    Some(split) => split,
                    None => return Ok(Value::Void),
                };
                let indices = indices.iter().map(index_of).collect::<Result<SmallVec<[i64; 4]>>>()?;
                array.set(&indices, value, ctx)?;
                Ok(Value::Void)
            },
        )
        .with_owner(Value::Array(self.clone()))
    }
}
