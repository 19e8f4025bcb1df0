//! The four-valued relationship between two contracts.

use serde::{Deserialize, Serialize};

/// How a contract relates to another one, read from the left contract's
/// point of view: `A.relationship(B) == Superset` means every value of `B`
/// is also a value of `A`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Relationship {
    None,
    Subset,
    Superset,
    TheSame,
}

impl Relationship {
    pub fn inverse(self) -> Self {
        match self {
            Relationship::Subset => Relationship::Superset,
            Relationship::Superset => Relationship::Subset,
            other => other,
        }
    }

    /// A value of the other contract may be stored where this one is required.
    #[inline]
    pub fn is_assignable(self) -> bool {
        matches!(self, Relationship::Superset | Relationship::TheSame)
    }

    /// Builds a relationship from the two inclusion tests.
    #[inline]
    pub fn from_inclusion(includes_other: bool, included_by_other: bool) -> Self {
        match (includes_other, included_by_other) {
            (true, true) => Relationship::TheSame,
            (true, false) => Relationship::Superset,
            (false, true) => Relationship::Subset,
            (false, false) => Relationship::None,
        }
    }
}
