//! First-class callables.
//!
//! Every function is one `FunctionValue` whose body is a closed variant:
//! a native primitive, a composition, an overload set or a partial
//! binding. One interpreter in `invoke` evaluates all four.

mod algebra;
mod invoke;
mod operator;

use crate::context::Context;
use crate::contract::{Contract, FunctionContract, Parameter};
use crate::value::Value;
use pact_core::Result;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

pub type NativeFn = Arc<dyn Fn(&Context, &[Value]) -> Result<Value> + Send + Sync>;

static NEXT_FUNCTION_ID: AtomicU64 = AtomicU64::new(1);

fn next_id() -> u64 {
    NEXT_FUNCTION_ID.fetch_add(1, Ordering::Relaxed)
}

pub enum FunctionBody {
    Primitive {
        call: NativeFn,
        /// Behavior identity shared by independently built instances of
        /// the same callable, such as reified operators.
        fingerprint: Option<u64>,
    },
    Composed {
        left: Arc<FunctionValue>,
        right: Arc<FunctionValue>,
        /// The left result feeds the right function's first parameter.
        curry: bool,
    },
    Overloaded(Vec<Arc<FunctionValue>>),
    Unified {
        base: Arc<FunctionValue>,
        /// One entry per base parameter; `Some` entries are pre-bound.
        bound: Vec<Option<Value>>,
    },
}

pub struct FunctionValue {
    id: u64,
    name: Arc<str>,
    contract: Arc<FunctionContract>,
    owner: Option<Value>,
    transparent: bool,
    body: FunctionBody,
}

impl FunctionValue {
    /// A native primitive.
    pub fn native<F>(
        name: impl Into<Arc<str>>,
        parameters: Vec<Parameter>,
        returns: Contract,
        call: F,
    ) -> Self
    where
        F: Fn(&Context, &[Value]) -> Result<Value> + Send + Sync + 'static,
    {
        Self::from_parts(
            name.into(),
            Arc::new(FunctionContract::new(parameters, returns)),
            FunctionBody::Primitive {
                call: Arc::new(call),
                fingerprint: None,
            },
        )
    }

    pub(crate) fn from_parts(
        name: Arc<str>,
        contract: Arc<FunctionContract>,
        body: FunctionBody,
    ) -> Self {
        Self {
            id: next_id(),
            name,
            contract,
            owner: None,
            transparent: false,
            body,
        }
    }

    /// Hides the function from the visible call stack.
    pub fn transparent(mut self) -> Self {
        self.transparent = true;
        self
    }

    pub fn with_owner(mut self, owner: Value) -> Self {
        self.owner = Some(owner);
        self
    }

    pub fn with_fingerprint(mut self, fingerprint: u64) -> Self {
        if let FunctionBody::Primitive { fingerprint: fp, .. } = &mut self.body {
            *fp = Some(fingerprint);
        }
        self
    }

    /// Transparent function of `contract` that ignores its arguments and
    /// returns the void value of the return contract.
    pub fn void_of(contract: Arc<FunctionContract>) -> Self {
        let returns = contract.returns.clone();
        Self::from_parts(
            Arc::from("void"),
            contract,
            FunctionBody::Primitive {
                call: Arc::new(move |_: &Context, _: &[Value]| Ok(returns.from_void())),
                fingerprint: None,
            },
        )
        .transparent()
    }

    #[inline]
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn contract(&self) -> &Arc<FunctionContract> {
        &self.contract
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.contract.parameters
    }

    pub fn returns(&self) -> &Contract {
        &self.contract.returns
    }

    #[inline]
    pub fn arity(&self) -> usize {
        self.contract.arity()
    }

    pub fn owner(&self) -> Option<&Value> {
        self.owner.as_ref()
    }

    #[inline]
    pub fn is_transparent(&self) -> bool {
        self.transparent
    }

    pub fn body(&self) -> &FunctionBody {
        &self.body
    }
}

impl PartialEq for FunctionValue {
    /// Identity, lifted structurally over the algebra variants. Primitives
    /// with a behavior fingerprint also match by fingerprint and contract.
    fn eq(&self, other: &Self) -> bool {
        if self.id == other.id {
            return true;
        }
        match (&self.body, &other.body) {
            (
                FunctionBody::Primitive {
                    fingerprint: Some(a),
                    ..
                },
                FunctionBody::Primitive {
                    fingerprint: Some(b),
                    ..
                },
            ) => a == b && self.contract == other.contract,
            (
                FunctionBody::Composed {
                    left: l1,
                    right: r1,
                    curry: c1,
                },
                FunctionBody::Composed {
                    left: l2,
                    right: r2,
                    curry: c2,
                },
            ) => c1 == c2 && l1 == l2 && r1 == r2,
            (FunctionBody::Overloaded(a), FunctionBody::Overloaded(b)) => {
                a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x == y)
            }
            (
                FunctionBody::Unified {
                    base: b1,
                    bound: x1,
                },
                FunctionBody::Unified {
                    base: b2,
                    bound: x2,
                },
            ) => b1 == b2 && x1 == x2,
            _ => false,
        }
    }
}

impl fmt::Debug for FunctionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "FunctionValue({}: {})",
            self.name,
            Contract::Function(self.contract.clone())
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> FunctionValue {
        FunctionValue::native(
            "id",
            vec![Parameter::new("x", Contract::Super)],
            Contract::Super,
            |_, args| Ok(args[0].clone()),
        )
    }

    #[test]
    fn primitives_compare_by_identity() {
        let a = Arc::new(identity());
        let b = Arc::new(identity());
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
    }

    #[test]
    fn fingerprints_lift_identity() {
        let a = identity().with_fingerprint(9);
        let b = identity().with_fingerprint(9);
        let c = identity().with_fingerprint(10);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn void_function_returns_void_value() {
        let f = Arc::new(FunctionValue::void_of(Arc::new(FunctionContract::new(
            vec![Parameter::new("x", Contract::Integer)],
            Contract::String,
        ))));
        let ctx = Context::new();
        assert!(f.is_transparent());
        assert_eq!(f.invoke(&[Value::Integer(1)], &ctx).unwrap(), Value::from(""));
    }
}
