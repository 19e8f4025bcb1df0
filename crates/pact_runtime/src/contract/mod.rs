//! Contracts: the runtime type descriptors every value carries.
//!
//! Builtins are unit variants and therefore process-wide singletons.
//! Structural contracts (array, function, composite) and compound ones
//! (union, intersection, complement) are built per use and shared through
//! `Arc`.

mod convert;
mod lattice;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

pub use lattice::BUILTIN_CONTRACTS;

#[derive(Clone, Serialize, Deserialize)]
pub enum Contract {
    Void,
    /// Top of the lattice.
    Super,
    Boolean,
    Integer,
    Real,
    String,
    /// Family of all arrays regardless of element and rank.
    Dimensional,
    /// Contract of contracts.
    Meta,
    Array(Arc<ArrayContract>),
    Function(Arc<FunctionContract>),
    Composite(Arc<CompositeContract>),
    Union(Arc<[Contract]>),
    Intersection(Arc<[Contract]>),
    Complement(Arc<Contract>),
}

#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrayContract {
    pub element: Contract,
    pub rank: usize,
}

#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: Arc<str>,
    pub contract: Contract,
}

impl Parameter {
    pub fn new(name: impl Into<Arc<str>>, contract: Contract) -> Self {
        Self {
            name: name.into(),
            contract,
        }
    }
}

#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionContract {
    pub parameters: Vec<Parameter>,
    pub returns: Contract,
}

impl FunctionContract {
    pub fn new(parameters: Vec<Parameter>, returns: Contract) -> Self {
        Self {
            parameters,
            returns,
        }
    }

    #[inline]
    pub fn arity(&self) -> usize {
        self.parameters.len()
    }
}

#[derive(Clone, Default, Serialize, Deserialize)]
pub struct CompositeContract {
    pub slots: IndexMap<Arc<str>, Contract>,
}

impl PartialEq for CompositeContract {
    // Slot order is presentation only.
    fn eq(&self, other: &Self) -> bool {
        self.slots.len() == other.slots.len()
            && self
                .slots
                .iter()
                .all(|(name, c)| other.slots.get(name).is_some_and(|o| o == c))
    }
}

impl Contract {
    pub fn array(element: Contract, rank: usize) -> Self {
        Contract::Array(Arc::new(ArrayContract { element, rank }))
    }

    pub fn function(parameters: Vec<Parameter>, returns: Contract) -> Self {
        Contract::Function(Arc::new(FunctionContract::new(parameters, returns)))
    }

    pub fn composite<I, N>(slots: I) -> Self
    where
        I: IntoIterator<Item = (N, Contract)>,
        N: Into<Arc<str>>,
    {
        Contract::Composite(Arc::new(CompositeContract {
            slots: slots.into_iter().map(|(n, c)| (n.into(), c)).collect(),
        }))
    }

    /// Builds a union, flattening nested unions and dropping duplicates.
    /// An empty union is Void; a single operand is returned as is.
    pub fn union<I: IntoIterator<Item = Contract>>(operands: I) -> Self {
        let mut flat: Vec<Contract> = Vec::new();
        for c in operands {
            match c {
                Contract::Union(inner) => {
                    for c in inner.iter() {
                        push_unique(&mut flat, c.clone());
                    }
                }
                other => push_unique(&mut flat, other),
            }
        }
        match flat.len() {
            0 => Contract::Void,
            1 => flat.pop().unwrap_or(Contract::Void),
            _ => Contract::Union(flat.into()),
        }
    }

    /// Builds an intersection. An empty intersection is Super.
    pub fn intersection<I: IntoIterator<Item = Contract>>(operands: I) -> Self {
        let mut flat: Vec<Contract> = Vec::new();
        for c in operands {
            match c {
                Contract::Intersection(inner) => {
                    for c in inner.iter() {
                        push_unique(&mut flat, c.clone());
                    }
                }
                other => push_unique(&mut flat, other),
            }
        }
        match flat.len() {
            0 => Contract::Super,
            1 => flat.pop().unwrap_or(Contract::Super),
            _ => Contract::Intersection(flat.into()),
        }
    }

    pub fn complement(operand: Contract) -> Self {
        match operand {
            Contract::Complement(inner) => (*inner).clone(),
            other => Contract::Complement(Arc::new(other)),
        }
    }

    pub fn is_builtin(&self) -> bool {
        matches!(
            self,
            Contract::Void
                | Contract::Super
                | Contract::Boolean
                | Contract::Integer
                | Contract::Real
                | Contract::String
                | Contract::Dimensional
                | Contract::Meta
        )
    }

    pub fn is_compound(&self) -> bool {
        matches!(
            self,
            Contract::Union(_) | Contract::Intersection(_) | Contract::Complement(_)
        )
    }

    #[inline]
    pub fn is_void(&self) -> bool {
        matches!(self, Contract::Void)
    }

    pub fn as_function(&self) -> Option<&Arc<FunctionContract>> {
        match self {
            Contract::Function(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Arc<ArrayContract>> {
        match self {
            Contract::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn name(&self) -> String {
        self.to_string()
    }
}

fn push_unique(into: &mut Vec<Contract>, c: Contract) {
    if !into.iter().any(|e| e == &c) {
        into.push(c);
    }
}

/// Order-insensitive comparison of compound operand lists.
fn same_members(a: &[Contract], b: &[Contract]) -> bool {
    a.len() == b.len() && a.iter().all(|x| b.iter().any(|y| x == y))
}

impl PartialEq for Contract {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Contract::Void, Contract::Void)
            | (Contract::Super, Contract::Super)
            | (Contract::Boolean, Contract::Boolean)
            | (Contract::Integer, Contract::Integer)
            | (Contract::Real, Contract::Real)
            | (Contract::String, Contract::String)
            | (Contract::Dimensional, Contract::Dimensional)
            | (Contract::Meta, Contract::Meta) => true,
            (Contract::Array(a), Contract::Array(b)) => Arc::ptr_eq(a, b) || a == b,
            (Contract::Function(a), Contract::Function(b)) => Arc::ptr_eq(a, b) || a == b,
            (Contract::Composite(a), Contract::Composite(b)) => Arc::ptr_eq(a, b) || a == b,
            (Contract::Union(a), Contract::Union(b))
            | (Contract::Intersection(a), Contract::Intersection(b)) => same_members(a, b),
            (Contract::Complement(a), Contract::Complement(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Contract {}

impl fmt::Display for Contract {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Contract::Void => f.write_str("Void"),
            Contract::Super => f.write_str("Super"),
            Contract::Boolean => f.write_str("Boolean"),
            Contract::Integer => f.write_str("Integer"),
            Contract::Real => f.write_str("Real"),
            Contract::String => f.write_str("String"),
            Contract::Dimensional => f.write_str("Dimensional"),
            Contract::Meta => f.write_str("Meta"),
            Contract::Array(a) => {
                write!(f, "{}[", a.element)?;
                for _ in 1..a.rank {
                    f.write_str(",")?;
                }
                f.write_str("]")
            }
            Contract::Function(func) => {
                f.write_str("(")?;
                for (i, p) in func.parameters.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {}", p.name, p.contract)?;
                }
                write!(f, ") -> {}", func.returns)
            }
            Contract::Composite(c) => {
                f.write_str("{")?;
                for (i, (name, slot)) in c.slots.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{name}: {slot}")?;
                }
                f.write_str("}")
            }
            Contract::Union(ops) => write_joined(f, ops, " | "),
            Contract::Intersection(ops) => write_joined(f, ops, " & "),
            Contract::Complement(inner) => write!(f, "~{inner}"),
        }
    }
}

fn write_joined(f: &mut fmt::Formatter<'_>, ops: &[Contract], sep: &str) -> fmt::Result {
    f.write_str("(")?;
    for (i, c) in ops.iter().enumerate() {
        if i > 0 {
            f.write_str(sep)?;
        }
        write!(f, "{c}")?;
    }
    f.write_str(")")
}

impl fmt::Debug for Contract {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Contract({self})")
    }
}
