//! The invocation protocol.

use super::{FunctionBody, FunctionValue};
use crate::context::Context;
use crate::contract::{Contract, Parameter};
use crate::slot::{self, RuntimeSlot, SlotAttributes, StorageSlot};
use crate::value::Value;
use pact_core::{Fault, Result};
use rayon::prelude::*;
use smallvec::SmallVec;
use std::sync::Arc;
use tracing::{debug, trace};

type Args = SmallVec<[Value; 4]>;

impl FunctionValue {
    /// Checks and coerces `args`, runs the body in a new call frame unless
    /// the function is transparent, and coerces the result to the declared
    /// return contract.
    pub fn invoke(self: &Arc<Self>, args: &[Value], ctx: &Context) -> Result<Value> {
        if let FunctionBody::Overloaded(members) = &self.body {
            return self.invoke_overloaded(members, args, ctx);
        }
        let args = self.bind_arguments(args, ctx)?;
        let entered;
        let call_ctx = if self.transparent {
            ctx
        } else {
            entered = ctx.enter(self.clone());
            &entered
        };
        let result = self.run_body(&args, call_ctx)?;
        match &self.contract.returns {
            Contract::Void => Ok(Value::Void),
            returns => returns.convert(&result, ctx),
        }
    }

    /// Materializes every slot and invokes with the resulting values.
    pub fn invoke_slots(self: &Arc<Self>, slots: &[RuntimeSlot], ctx: &Context) -> Result<Value> {
        let args = slot::materialize(slots, ctx)?;
        self.invoke(&args, ctx)
    }

    /// Whether `args` would pass this function's arity and parameter
    /// checks. For overload sets, whether some member would.
    pub fn accepts_arguments(&self, args: &[Value]) -> bool {
        match &self.body {
            FunctionBody::Overloaded(members) => members.iter().any(|m| m.accepts_arguments(args)),
            _ => {
                self.arity() == args.len()
                    && self
                        .parameters()
                        .iter()
                        .zip(args)
                        .all(|(p, a)| p.contract.accepts(&a.contract()))
            }
        }
    }

    /// Binds `args` to fresh storage slots named after the parameters.
    pub fn materialize_parameters(&self, args: &[Value], ctx: &Context) -> Result<Vec<(Arc<str>, RuntimeSlot)>> {
        let args = self.bind_arguments(args, ctx)?;
        self.parameters()
            .iter()
            .zip(args)
            .map(|(p, v)| {
                let slot =
                    StorageSlot::assigned(p.name.clone(), p.contract.clone(), SlotAttributes::None, v);
                Ok((p.name.clone(), RuntimeSlot::Storage(Arc::new(slot))))
            })
            .collect()
    }

    fn bind_arguments(&self, args: &[Value], ctx: &Context) -> Result<Args> {
        if args.len() != self.arity() {
            debug!(
                target: "pact::invoke",
                function = self.name(),
                expected = self.arity(),
                actual = args.len(),
                "arity mismatch"
            );
            return Err(Fault::mismatch(
                self.name(),
                format!("expected {} arguments, got {}", self.arity(), args.len()),
            ));
        }
        let params = self.parameters();
        let rejected = |(i, (p, a)): (usize, (&Parameter, &Value))| {
            (!p.contract.accepts(&a.contract())).then_some(i)
        };
        let failed = if ctx.should_fork(params.len()) {
            params
                .par_iter()
                .zip(args.par_iter())
                .enumerate()
                .find_map_first(rejected)
        } else {
            params.iter().zip(args.iter()).enumerate().find_map(rejected)
        };
        if let Some(i) = failed {
            let (p, a) = (&params[i], &args[i]);
            debug!(
                target: "pact::invoke",
                function = self.name(),
                parameter = &*p.name,
                "argument rejected"
            );
            return Err(Fault::mismatch(
                self.name(),
                format!(
                    "parameter {} expects {}, got {}",
                    p.name,
                    p.contract,
                    a.contract()
                ),
            ));
        }
        params
            .iter()
            .zip(args)
            .map(|(p, a)| p.contract.convert(a, ctx))
            .collect()
    }

    fn run_body(&self, args: &[Value], ctx: &Context) -> Result<Value> {
        match &self.body {
            FunctionBody::Primitive { call, .. } => call(ctx, args),
            FunctionBody::Composed { left, right, curry } => {
                let (left_args, right_args) = args.split_at(left.arity());
                let head = left.invoke(left_args, ctx)?;
                if *curry {
                    let mut full: Args = SmallVec::with_capacity(right_args.len() + 1);
                    full.push(head);
                    full.extend(right_args.iter().cloned());
                    right.invoke(&full, ctx)
                } else {
                    right.invoke(right_args, ctx)
                }
            }
            FunctionBody::Unified { base, bound } => {
                let mut supplied = args.iter();
                let mut full: Args = SmallVec::with_capacity(bound.len());
                for b in bound {
                    match b {
                        Some(v) => full.push(v.clone()),
                        None => full.push(supplied.next().cloned().unwrap_or(Value::Void)),
                    }
                }
                base.invoke(&full, ctx)
            }
            FunctionBody::Overloaded(members) => self.invoke_overloaded(members, args, ctx),
        }
    }

    fn invoke_overloaded(
        &self,
        members: &[Arc<FunctionValue>],
        args: &[Value],
        ctx: &Context,
    ) -> Result<Value> {
        for (i, member) in members.iter().enumerate() {
            if member.accepts_arguments(args) {
                trace!(target: "pact::invoke", function = self.name(), overload = i, "overload selected");
                return member.invoke(args, ctx);
            }
        }
        let found: Vec<String> = args.iter().map(|a| a.contract().to_string()).collect();
        debug!(target: "pact::invoke", function = self.name(), "no overload matched");
        Err(Fault::mismatch(
            self.name(),
            format!("no overload accepts ({})", found.join(", ")),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pact_core::FaultKind;

    fn doubler() -> Arc<FunctionValue> {
        Arc::new(FunctionValue::native(
            "double",
            vec![Parameter::new("x", Contract::Integer)],
            Contract::Integer,
            |_, args| match &args[0] {
                Value::Integer(i) => Ok(Value::Integer(i * 2)),
                other => Err(Fault::binding(Contract::Integer, other.contract())),
            },
        ))
    }

    #[test]
    fn arguments_are_coerced_to_parameters() {
        let ctx = Context::new();
        assert_eq!(doubler().invoke(&[Value::Boolean(true)], &ctx).unwrap(), Value::Integer(2));
        assert_eq!(doubler().invoke(&[Value::Void], &ctx).unwrap(), Value::Integer(0));
    }

    #[test]
    fn arity_and_parameter_mismatches_fault() {
        let ctx = Context::new();
        let err = doubler().invoke(&[], &ctx).unwrap_err();
        assert_eq!(err.kind(), FaultKind::FunctionArgumentsMismatch);
        let err = doubler().invoke(&[Value::from("x")], &ctx).unwrap_err();
        assert_eq!(err.kind(), FaultKind::FunctionArgumentsMismatch);
    }

    #[test]
    fn void_return_discards_the_result() {
        let ctx = Context::new();
        let f = Arc::new(FunctionValue::native("noop", vec![], Contract::Void, |_, _| {
            Ok(Value::Integer(5))
        }));
        assert_eq!(f.invoke(&[], &ctx).unwrap(), Value::Void);
    }

    #[test]
    fn incompatible_return_faults() {
        let ctx = Context::new();
        let f = Arc::new(FunctionValue::native("bad", vec![], Contract::Integer, |_, _| {
            Ok(Value::from("text"))
        }));
        assert_eq!(f.invoke(&[], &ctx).unwrap_err().kind(), FaultKind::ContractBinding);
    }

    #[test]
    fn frames_are_visible_inside_the_body_only() {
        let ctx = Context::new();
        let f = Arc::new(FunctionValue::native("frames", vec![], Contract::Integer, |ctx, _| {
            let names: Vec<String> = ctx.call_stack().iter().map(|f| f.name().to_string()).collect();
            assert_eq!(names, vec!["frames".to_string()]);
            Ok(Value::Integer(ctx.depth() as i64))
        }));
        assert_eq!(f.invoke(&[], &ctx).unwrap(), Value::Integer(1));
        assert_eq!(ctx.depth(), 0);

        let hidden = Arc::new(
            FunctionValue::native("hidden", vec![], Contract::Integer, |ctx, _| {
                Ok(Value::Integer(ctx.depth() as i64))
            })
            .transparent(),
        );
        assert_eq!(hidden.invoke(&[], &ctx).unwrap(), Value::Integer(0));
    }

    #[test]
    fn materialized_parameters_hold_coerced_values() {
        let ctx = Context::new();
        let slots = doubler().materialize_parameters(&[Value::Boolean(true)], &ctx).unwrap();
        assert_eq!(&*slots[0].0, "x");
        assert_eq!(slots[0].1.get_value(&ctx).unwrap(), Value::Integer(1));
    }

    #[test]
    fn invoke_from_slots() {
        let ctx = Context::new();
        let slot = RuntimeSlot::constant("n", Value::Integer(21));
        assert_eq!(doubler().invoke_slots(&[slot], &ctx).unwrap(), Value::Integer(42));
    }
}
