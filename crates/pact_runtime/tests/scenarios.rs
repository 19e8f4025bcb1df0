mod common;

use common::{checked, function, ints, unchecked};
use pact_runtime::{
    BinaryOp, CompositeObject, Contract, FaultKind, ListValue, OMIT_VOID_YIELDS, RuntimeSlot,
    ScriptIterator, SequenceIterator, UnaryOp, Value, drain,
};
use std::sync::Arc;

#[test]
fn boolean_plus_integer_is_integer() {
    let ctx = checked();
    let r = Value::TRUE
        .binary_operation(BinaryOp::Add, &Value::Integer(5), &ctx)
        .unwrap();
    assert_eq!(r, Value::Integer(6));
}

#[test]
fn dividing_by_void_divides_by_zero() {
    let ctx = checked();
    let err = Value::Integer(10)
        .binary_operation(BinaryOp::Divide, &Value::Void, &ctx)
        .unwrap_err();
    assert_eq!(err.kind(), FaultKind::DivideByZero);
}

#[test]
fn overflow_faults_when_checked_and_wraps_when_not() {
    let max = Value::Integer(i64::MAX);
    let one = Value::Integer(1);
    let err = max
        .binary_operation(BinaryOp::Add, &one, &checked())
        .unwrap_err();
    assert_eq!(err.kind(), FaultKind::Overflow);
    assert_eq!(
        max.binary_operation(BinaryOp::Add, &one, &unchecked()).unwrap(),
        Value::Integer(i64::MIN)
    );
}

#[test]
fn composition_feeds_the_left_result_forward() {
    let ctx = checked();
    let f = function("f", &[("x", Contract::Integer)], Contract::Integer, |_, args| {
        Ok(Value::Integer(args[0].as_integer().unwrap_or(0) * 10))
    });
    let g = function("g", &[("n", Contract::Integer)], Contract::String, |_, args| {
        Ok(Value::string(format!("<{}>", args[0])))
    });
    let fg = Value::Function(f)
        .binary_operation(BinaryOp::Multiply, &Value::Function(g), &ctx)
        .unwrap();
    assert_eq!(fg.invoke(&[Value::Integer(3)], &ctx).unwrap(), Value::from("<30>"));
}

#[test]
fn overload_set_dispatches_on_argument_contracts() {
    let ctx = checked();
    let f1 = function("f1", &[("x", Contract::Integer)], Contract::String, |_, _| {
        Ok(Value::from("f1"))
    });
    let f2 = function("f2", &[("s", Contract::String)], Contract::String, |_, _| {
        Ok(Value::from("f2"))
    });
    let set = Value::Function(f1)
        .binary_operation(BinaryOp::Add, &Value::Function(f2), &ctx)
        .unwrap();
    assert_eq!(set.invoke(&[Value::from("hi")], &ctx).unwrap(), Value::from("f2"));
    assert_eq!(set.invoke(&[Value::Integer(1)], &ctx).unwrap(), Value::from("f1"));
    let err = set.invoke(&[Value::Real(1.5)], &ctx).unwrap_err();
    assert_eq!(err.kind(), FaultKind::FunctionArgumentsMismatch);
}

#[test]
fn native_sequence_yields_then_ends() {
    let ctx = checked();
    let it = SequenceIterator::new(ints(&[1, 2, 3]));
    let mut seen = Vec::new();
    while it.has_next(&ctx).unwrap() {
        seen.push(it.get_next(&ctx).unwrap());
    }
    assert_eq!(seen, ints(&[1, 2, 3]));
    let err = it.get_next(&ctx).unwrap_err();
    assert_eq!(err.kind(), FaultKind::EndOfCollection);
}

#[test]
fn structural_objects_iterate() {
    let ctx = checked();
    let counter = Arc::new(parking_lot::Mutex::new(0i64));
    let has = counter.clone();
    let next = counter.clone();
    let obj = CompositeObject::new();
    obj.define_value(
        "has_next",
        Value::Function(function("has_next", &[], Contract::Boolean, move |_, _| {
            Ok(Value::Boolean(*has.lock() < 2))
        })),
    );
    obj.define_value(
        "get_next",
        Value::Function(function("get_next", &[], Contract::Integer, move |_, _| {
            let mut n = next.lock();
            *n += 1;
            Ok(Value::Integer(*n))
        })),
    );
    let it = Value::from(obj).iterate(&ctx).unwrap();
    assert_eq!(drain(&*it, &ctx).unwrap(), ints(&[1, 2]));
}

#[test]
fn void_yields_are_skipped_when_flagged() {
    let ctx = checked().with_flag(OMIT_VOID_YIELDS, Value::TRUE);
    let list = Value::from(ListValue::from_values(vec![
        Value::Integer(1),
        Value::Void,
        Value::Integer(2),
    ]));
    let it = list.iterate(&ctx).unwrap();
    assert_eq!(drain(&*it, &ctx).unwrap(), ints(&[1, 2]));
    let plain = list.iterate(&checked()).unwrap();
    assert_eq!(drain(&*plain, &checked()).unwrap().len(), 3);
}

#[test]
fn slot_increments_store_and_report() {
    let ctx = checked();
    let slot = RuntimeSlot::storage("n", Contract::Integer);
    slot.set_value(&Value::Integer(5), &ctx).unwrap();
    assert_eq!(slot.apply_unary(UnaryOp::PostIncrement, &ctx).unwrap(), Value::Integer(5));
    assert_eq!(slot.apply_unary(UnaryOp::PreIncrement, &ctx).unwrap(), Value::Integer(7));
    assert_eq!(slot.get_value(&ctx).unwrap(), Value::Integer(7));
}

#[test]
fn unification_then_call_through_an_object() {
    let ctx = checked();
    let area = function(
        "area",
        &[("w", Contract::Integer), ("h", Contract::Integer)],
        Contract::Integer,
        |_, args| {
            let w = args[0].as_integer().unwrap_or(0);
            let h = args[1].as_integer().unwrap_or(0);
            Ok(Value::Integer(w * h))
        },
    );
    let fields = CompositeObject::new();
    fields.define_value("h", Value::Integer(4));
    let bound = Value::Function(area)
        .binary_operation(BinaryOp::BitwiseAnd, &Value::from(fields), &ctx)
        .unwrap();
    assert_eq!(bound.invoke(&[Value::Integer(3)], &ctx).unwrap(), Value::Integer(12));
}

#[test]
fn unsupported_operations_degrade_when_unchecked() {
    let list = Value::from(ListValue::new());
    let err = list
        .binary_operation(BinaryOp::Divide, &Value::Integer(2), &checked())
        .unwrap_err();
    assert_eq!(err.kind(), FaultKind::UnsupportedOperation);
    assert_eq!(
        list.binary_operation(BinaryOp::Divide, &Value::Integer(2), &unchecked())
            .unwrap(),
        Value::Void
    );
}

#[test]
fn contracts_compare_on_the_lattice() {
    let ctx = checked();
    let int = Value::from(Contract::Integer);
    let real = Value::from(Contract::Real);
    assert_eq!(int.binary_operation(BinaryOp::LessThan, &real, &ctx).unwrap(), Value::TRUE);
    assert_eq!(real.binary_operation(BinaryOp::GreaterThanOrEqual, &int, &ctx).unwrap(), Value::TRUE);
    assert_eq!(int.binary_operation(BinaryOp::Equal, &real, &ctx).unwrap(), Value::FALSE);
}
