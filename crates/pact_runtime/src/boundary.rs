//! Adapter for the boundary with the backend.
//!
//! Core logic always receives its `Context` explicitly. The backend's
//! emitted code sometimes cannot thread one through, so this module keeps a
//! per-thread ambient context that is installed for the duration of
//! [`enter`] and restored afterwards, including when the callee faults or
//! unwinds.

use crate::context::Context;
use crate::contract::Contract;
use crate::value::Value;
use pact_core::{Fault, Result};
use std::cell::RefCell;
use std::sync::Arc;

thread_local! {
    static AMBIENT: RefCell<Option<Context>> = const { RefCell::new(None) };
}

/// Restores the previously installed ambient context on drop.
struct AmbientGuard {
    saved: Option<Context>,
}

impl Drop for AmbientGuard {
    fn drop(&mut self) {
        let saved = self.saved.take();
        AMBIENT.with(|slot| *slot.borrow_mut() = saved);
    }
}

/// Installs `ctx` as the ambient context while `f` runs.
pub fn enter<T>(ctx: &Context, f: impl FnOnce() -> T) -> T {
    let saved = AMBIENT.with(|slot| slot.borrow_mut().replace(ctx.clone()));
    let _guard = AmbientGuard { saved };
    f()
}

/// The ambient context installed by the innermost [`enter`] on this thread.
pub fn current() -> Option<Context> {
    AMBIENT.with(|slot| slot.borrow().clone())
}

/// Validates a member name handed over by the backend.
pub fn expect_identifier(value: &Value) -> Result<Arc<str>> {
    match value {
        Value::String(s) if is_identifier(s) => Ok(s.clone()),
        other => Err(Fault::IdentifierExpected(other.to_text())),
    }
}

/// Validates a contract operand handed over by the backend.
pub fn expect_contract(value: &Value) -> Result<Contract> {
    match value {
        Value::Contract(c) => Ok(c.clone()),
        other => Err(Fault::ContractExpected(other.type_name().to_string())),
    }
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_')
}
