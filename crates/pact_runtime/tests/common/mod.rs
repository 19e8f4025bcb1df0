#![allow(dead_code)]

use pact_runtime::{Context, ContextMode, Contract, FunctionValue, Parameter, Result, Value};
use std::sync::{Arc, Once};

static TRACING: Once = Once::new();

/// Routes runtime logs through the test harness' captured output.
/// Set `RUST_LOG=pact=trace` to see them.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

pub fn checked() -> Context {
    init_tracing();
    Context::new()
}

pub fn unchecked() -> Context {
    checked().update_mode(ContextMode::Unchecked)
}

pub fn function<F>(name: &str, params: &[(&str, Contract)], returns: Contract, call: F) -> Arc<FunctionValue>
where
    F: Fn(&Context, &[Value]) -> Result<Value> + Send + Sync + 'static,
{
    let params = params
        .iter()
        .map(|(n, c)| Parameter::new(*n, c.clone()))
        .collect();
    Arc::new(FunctionValue::native(name, params, returns, call))
}

pub fn ints(values: &[i64]) -> Vec<Value> {
    values.iter().copied().map(Value::Integer).collect()
}
