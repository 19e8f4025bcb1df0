//! Runtime configuration.

use pact_core::ContextMode;
use serde::{Deserialize, Serialize};

/// Options a host passes when building a root [`Context`](crate::Context).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub mode: ContextMode,
    pub debug: bool,
    /// Initial capacity of each intern table.
    pub intern_capacity: usize,
    /// Minimum item count before a bulk operation forks onto the rayon pool.
    pub parallel_threshold: usize,
    /// Seeds the `omit_void_yields` side-table flag.
    pub omit_void_yields: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            mode: ContextMode::Checked,
            debug: false,
            intern_capacity: 256,
            parallel_threshold: 2,
            omit_void_yields: false,
        }
    }
}
