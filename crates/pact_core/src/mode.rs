use serde::{Deserialize, Serialize};

/// Governs whether unsupported operations and arithmetic overflow fault
/// (`Checked`) or degrade to a Void result (`Unchecked`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ContextMode {
    #[default]
    Checked,
    Unchecked,
}

impl ContextMode {
    #[inline]
    pub fn is_checked(self) -> bool {
        matches!(self, ContextMode::Checked)
    }
}
