//! The immutable evaluation context threaded through every call.
//!
//! A `Context` is a cheap snapshot. The `update_*` methods return a derived
//! context that shares the intern pools and the script cache with its
//! parent and overrides exactly one field. The call stack is a persistent
//! list of frames: entering a function derives a child context, so leaving
//! it needs no cleanup on any exit path.

use crate::config::RuntimeConfig;
use crate::function::FunctionValue;
use crate::intern::InternPools;
use crate::value::{CompositeObject, Value};
use pact_core::{ContextMode, FastHashMap, Result, fast_map_new};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, trace};

/// Side-table flag: iteration skips Void elements.
pub const OMIT_VOID_YIELDS: &str = "omit_void_yields";

/// Compiled script entry point produced by the backend.
pub type ScriptEntry = Arc<dyn Fn(&Context) -> Result<Value> + Send + Sync>;

/// Compiled scripts keyed by the backend's script key.
pub struct ScriptCache {
    entries: Mutex<FastHashMap<String, ScriptEntry>>,
}

impl ScriptCache {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(fast_map_new()),
        }
    }

    pub fn get(&self, key: &str) -> Option<ScriptEntry> {
        self.entries.lock().get(key).cloned()
    }

    pub fn insert(&self, key: impl Into<String>, entry: ScriptEntry) {
        self.entries.lock().insert(key.into(), entry);
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the cached entry for `key`, compiling it on a miss. The lock
    /// is released while `compile` runs so nested compiles can use the
    /// cache; if two compiles race, the first inserted entry wins.
    pub fn get_or_compile<F>(&self, key: &str, compile: F) -> Result<ScriptEntry>
    where
        F: FnOnce() -> Result<ScriptEntry>,
    {
        if let Some(entry) = self.get(key) {
            trace!(target: "pact::context", key, "script cache hit");
            return Ok(entry);
        }
        debug!(target: "pact::context", key, "compiling script");
        let compiled = compile()?;
        let mut entries = self.entries.lock();
        Ok(entries.entry(key.to_string()).or_insert(compiled).clone())
    }
}

impl Default for ScriptCache {
    fn default() -> Self {
        Self::new()
    }
}

/// One entry of the visible call stack.
pub struct CallFrame {
    pub function: Arc<FunctionValue>,
    pub parent: Option<Arc<CallFrame>>,
    pub depth: usize,
}

#[derive(Clone)]
pub struct Context {
    global: Value,
    arguments: Arc<[Value]>,
    cache: Arc<ScriptCache>,
    pools: Arc<InternPools>,
    mode: ContextMode,
    debug: bool,
    parallel_threshold: usize,
    side_table: Arc<FastHashMap<String, Value>>,
    frame: Option<Arc<CallFrame>>,
}

impl Context {
    pub fn new() -> Self {
        Self::with_config(&RuntimeConfig::default())
    }

    pub fn with_config(config: &RuntimeConfig) -> Self {
        let mut side_table = fast_map_new();
        if config.omit_void_yields {
            side_table.insert(OMIT_VOID_YIELDS.to_string(), Value::Boolean(true));
        }
        Self {
            global: Value::Object(Arc::new(CompositeObject::new())),
            arguments: Arc::from(Vec::new()),
            cache: Arc::new(ScriptCache::new()),
            pools: Arc::new(InternPools::with_capacity(config.intern_capacity)),
            mode: config.mode,
            debug: config.debug,
            parallel_threshold: config.parallel_threshold.max(1),
            side_table: Arc::new(side_table),
            frame: None,
        }
    }

    pub fn global(&self) -> &Value {
        &self.global
    }

    pub fn arguments(&self) -> &[Value] {
        &self.arguments
    }

    pub fn cache(&self) -> &ScriptCache {
        &self.cache
    }

    pub fn pools(&self) -> &InternPools {
        &self.pools
    }

    #[inline]
    pub fn mode(&self) -> ContextMode {
        self.mode
    }

    #[inline]
    pub fn is_checked(&self) -> bool {
        self.mode.is_checked()
    }

    pub fn debug(&self) -> bool {
        self.debug
    }

    pub fn parallel_threshold(&self) -> usize {
        self.parallel_threshold
    }

    /// Whether a bulk operation over `count` items should fork.
    #[inline]
    pub(crate) fn should_fork(&self, count: usize) -> bool {
        count > 1 && count >= self.parallel_threshold
    }

    pub fn update_mode(&self, mode: ContextMode) -> Self {
        trace!(target: "pact::context", ?mode, "context mode updated");
        Self {
            mode,
            ..self.clone()
        }
    }

    pub fn update_global(&self, global: Value) -> Self {
        Self {
            global,
            ..self.clone()
        }
    }

    pub fn update_debug(&self, debug: bool) -> Self {
        Self {
            debug,
            ..self.clone()
        }
    }

    pub fn update_arguments(&self, arguments: Vec<Value>) -> Self {
        Self {
            arguments: arguments.into(),
            ..self.clone()
        }
    }

    /// Derives a context with one side-table entry set. The parent's table
    /// is left untouched.
    pub fn with_flag(&self, key: impl Into<String>, value: Value) -> Self {
        let mut table = (*self.side_table).clone();
        table.insert(key.into(), value);
        Self {
            side_table: Arc::new(table),
            ..self.clone()
        }
    }

    pub fn flag(&self, key: &str) -> Option<&Value> {
        self.side_table.get(key)
    }

    pub fn flag_enabled(&self, key: &str) -> bool {
        matches!(self.side_table.get(key), Some(Value::Boolean(true)))
    }

    pub fn current_function(&self) -> Option<&Arc<FunctionValue>> {
        self.frame.as_ref().map(|f| &f.function)
    }

    /// Visible call stack, innermost first.
    pub fn call_stack(&self) -> Vec<Arc<FunctionValue>> {
        let mut out = Vec::with_capacity(self.depth());
        let mut cur = self.frame.as_ref();
        while let Some(frame) = cur {
            out.push(frame.function.clone());
            cur = frame.parent.as_ref();
        }
        out
    }

    pub fn depth(&self) -> usize {
        self.frame.as_ref().map_or(0, |f| f.depth)
    }

    /// Pushes a call frame by deriving a child context.
    pub(crate) fn enter(&self, function: Arc<FunctionValue>) -> Self {
        let depth = self.depth() + 1;
        if self.debug {
            debug!(target: "pact::invoke", function = function.name(), depth, "call frame pushed");
        } else {
            trace!(target: "pact::invoke", function = function.name(), depth, "call frame pushed");
        }
        Self {
            frame: Some(Arc::new(CallFrame {
                function,
                parent: self.frame.clone(),
                depth,
            })),
            ..self.clone()
        }
    }

    /// Runs a compiled entry point with this context installed as the
    /// ambient context for the duration of the call.
    pub fn run(&self, entry: &ScriptEntry) -> Result<Value> {
        crate::boundary::enter(self, || entry(self))
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}
