use crate::contract::Contract;
use crate::value::Value;
use rayon::prelude::*;

/// Lists at least this long infer their element contract on the rayon pool.
const INFERENCE_PARALLEL_MIN: usize = 64;

/// Widened contract of `values`; Void for an empty slice.
pub fn infer_contract(values: &[Value]) -> Contract {
    if values.len() >= INFERENCE_PARALLEL_MIN {
        values
            .par_iter()
            .map(Value::contract)
            .reduce(|| Contract::Void, |a, b| a.widen(&b))
    } else {
        values
            .iter()
            .fold(Contract::Void, |acc, v| acc.widen(&v.contract()))
    }
}
