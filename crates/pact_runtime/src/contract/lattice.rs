//! Relationship computation over the contract lattice.

use super::Contract;
use pact_core::Relationship;
use pact_core::Relationship::{None as N, Subset as B, Superset as P, TheSame as S};

/// Builtins in table order.
pub const BUILTIN_CONTRACTS: [Contract; 8] = [
    Contract::Void,
    Contract::Super,
    Contract::Boolean,
    Contract::Integer,
    Contract::Real,
    Contract::String,
    Contract::Dimensional,
    Contract::Meta,
];

/// Fixed builtin lookup, rows answer for `self`, columns are `other`.
/// Void is the bottom, Super the top, Boolean ⊂ Integer ⊂ Real.
const BUILTIN_TABLE: [[Relationship; 8]; 8] = [
    //  Void Super Bool Int Real Str Dim Meta
    [S, B, B, B, B, B, B, B], // Void
    [P, S, P, P, P, P, P, P], // Super
    [P, B, S, B, B, N, N, N], // Boolean
    [P, B, P, S, B, N, N, N], // Integer
    [P, B, P, P, S, N, N, N], // Real
    [P, B, N, N, N, S, N, N], // String
    [P, B, N, N, N, N, S, N], // Dimensional
    [P, B, N, N, N, N, N, S], // Meta
];

impl Contract {
    fn builtin_index(&self) -> Option<usize> {
        Some(match self {
            Contract::Void => 0,
            Contract::Super => 1,
            Contract::Boolean => 2,
            Contract::Integer => 3,
            Contract::Real => 4,
            Contract::String => 5,
            Contract::Dimensional => 6,
            Contract::Meta => 7,
            _ => return None,
        })
    }

    /// How `self` relates to `other`, from `self`'s point of view.
    pub fn relationship(&self, other: &Contract) -> Relationship {
        if let (Some(a), Some(b)) = (self.builtin_index(), other.builtin_index()) {
            return BUILTIN_TABLE[a][b];
        }
        if !self.is_compound() && other.is_compound() {
            return other.relationship(self).inverse();
        }
        Relationship::from_inclusion(includes(self, other), includes(other, self))
    }

    /// A value of `other` may be stored where `self` is required.
    #[inline]
    pub fn accepts(&self, other: &Contract) -> bool {
        self.relationship(other).is_assignable()
    }

    /// Least upper bound used for inference: keeps whichever side already
    /// includes the other, otherwise forms a union with no operand that
    /// another operand already covers.
    pub fn widen(&self, other: &Contract) -> Contract {
        if includes(self, other) {
            self.clone()
        } else if includes(other, self) {
            other.clone()
        } else {
            match Contract::union([self.clone(), other.clone()]) {
                Contract::Union(ops) => Contract::union(prune(&ops)),
                single => single,
            }
        }
    }
}

/// Drops operands included by a sibling. Of two mutually inclusive
/// operands the first is kept.
fn prune(ops: &[Contract]) -> Vec<Contract> {
    let mut kept: Vec<Contract> = Vec::with_capacity(ops.len());
    for (i, c) in ops.iter().enumerate() {
        let covered = ops.iter().enumerate().any(|(j, o)| {
            j != i && includes(o, c) && (!includes(c, o) || j < i)
        });
        if !covered {
            kept.push(c.clone());
        }
    }
    kept
}

/// Every value of `b` is a value of `a`.
pub(crate) fn includes(a: &Contract, b: &Contract) -> bool {
    if let (Some(i), Some(j)) = (a.builtin_index(), b.builtin_index()) {
        return BUILTIN_TABLE[i][j].is_assignable();
    }
    match (a, b) {
        (_, Contract::Void) | (Contract::Super, _) => true,
        (_, Contract::Union(ops)) => ops.iter().all(|o| includes(a, o)),
        (Contract::Union(ops), _) => ops.iter().any(|o| includes(o, b)),
        (Contract::Intersection(ops), _) => ops.iter().all(|o| includes(o, b)),
        (_, Contract::Intersection(ops)) => ops.iter().any(|o| includes(a, o)),
        (Contract::Complement(inner), Contract::Complement(other)) => includes(other, inner),
        (Contract::Complement(inner), _) => disjoint(inner, b),
        (_, Contract::Complement(_)) => false,
        (Contract::Void, _) | (_, Contract::Super) => false,
        (Contract::Dimensional, Contract::Array(_)) => true,
        (Contract::Array(x), Contract::Array(y)) => {
            x.rank == y.rank && includes(&x.element, &y.element)
        }
        (Contract::Function(x), Contract::Function(y)) => {
            // Parameters are contravariant, the return covariant.
            x.arity() == y.arity()
                && x
                    .parameters
                    .iter()
                    .zip(y.parameters.iter())
                    .all(|(px, py)| includes(&py.contract, &px.contract))
                && includes(&x.returns, &y.returns)
        }
        (Contract::Composite(x), Contract::Composite(y)) => x
            .slots
            .iter()
            .all(|(name, cx)| y.slots.get(name).is_some_and(|cy| includes(cx, cy))),
        _ => false,
    }
}

fn disjoint(a: &Contract, b: &Contract) -> bool {
    !includes(a, b) && !includes(b, a)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::Parameter;

    #[test]
    fn builtin_table_is_inverse_consistent() {
        for a in BUILTIN_CONTRACTS.iter() {
            for b in BUILTIN_CONTRACTS.iter() {
                assert_eq!(
                    a.relationship(b),
                    b.relationship(a).inverse(),
                    "{a} vs {b}"
                );
            }
        }
    }

    #[test]
    fn documented_builtin_rows() {
        assert_eq!(Contract::Boolean.relationship(&Contract::Boolean), Relationship::TheSame);
        assert_eq!(Contract::Boolean.relationship(&Contract::Super), Relationship::Subset);
        assert_eq!(Contract::Boolean.relationship(&Contract::Integer), Relationship::Subset);
        assert_eq!(Contract::Boolean.relationship(&Contract::Void), Relationship::Superset);
        assert_eq!(Contract::Integer.relationship(&Contract::Boolean), Relationship::Superset);
        assert_eq!(Contract::Integer.relationship(&Contract::Real), Relationship::Subset);
        assert_eq!(Contract::String.relationship(&Contract::Void), Relationship::Superset);
        assert_eq!(Contract::String.relationship(&Contract::Integer), Relationship::None);
    }

    #[test]
    fn arrays_are_covariant_and_rank_sensitive() {
        let ints = Contract::array(Contract::Integer, 1);
        let reals = Contract::array(Contract::Real, 1);
        let grid = Contract::array(Contract::Integer, 2);
        assert_eq!(reals.relationship(&ints), Relationship::Superset);
        assert_eq!(ints.relationship(&grid), Relationship::None);
        assert_eq!(Contract::Dimensional.relationship(&grid), Relationship::Superset);
        assert_eq!(grid.relationship(&Contract::Dimensional), Relationship::Subset);
    }

    #[test]
    fn functions_are_contravariant_in_parameters() {
        let takes_real = Contract::function(
            vec![Parameter::new("x", Contract::Real)],
            Contract::Integer,
        );
        let takes_int = Contract::function(
            vec![Parameter::new("x", Contract::Integer)],
            Contract::Integer,
        );
        // A function accepting any Real can stand in for one accepting Integers.
        assert_eq!(takes_int.relationship(&takes_real), Relationship::Superset);
        assert_eq!(takes_real.relationship(&takes_int), Relationship::Subset);
    }

    #[test]
    fn composites_use_width_subtyping() {
        let narrow = Contract::composite([("x", Contract::Integer)]);
        let wide = Contract::composite([("x", Contract::Integer), ("y", Contract::String)]);
        assert_eq!(narrow.relationship(&wide), Relationship::Superset);
        assert_eq!(wide.relationship(&narrow), Relationship::Subset);
    }

    #[test]
    fn compound_contracts_answer_by_inversion() {
        let u = Contract::union([Contract::Integer, Contract::String]);
        assert_eq!(u.relationship(&Contract::String), Relationship::Superset);
        assert_eq!(Contract::String.relationship(&u), Relationship::Subset);
        assert_eq!(Contract::Super.relationship(&u), Relationship::Superset);

        let not_string = Contract::complement(Contract::String);
        assert!(not_string.accepts(&Contract::Integer));
        assert!(!not_string.accepts(&Contract::String));
        assert_eq!(
            Contract::Integer.relationship(&not_string),
            not_string.relationship(&Contract::Integer).inverse()
        );

        let both = Contract::intersection([Contract::Real, Contract::Integer]);
        assert!(both.accepts(&Contract::Boolean));
        assert!(!both.accepts(&Contract::String));
    }

    #[test]
    fn widen_prefers_the_including_side() {
        assert_eq!(Contract::Integer.widen(&Contract::Boolean), Contract::Integer);
        assert_eq!(Contract::Boolean.widen(&Contract::Real), Contract::Real);
        assert_eq!(Contract::Void.widen(&Contract::String), Contract::String);
        assert_eq!(
            Contract::Integer.widen(&Contract::String),
            Contract::union([Contract::Integer, Contract::String])
        );
    }

    #[test]
    fn widen_is_order_independent_up_to_equality() {
        let a = Contract::Boolean
            .widen(&Contract::String)
            .widen(&Contract::Integer);
        let b = Contract::Integer
            .widen(&Contract::Boolean)
            .widen(&Contract::String);
        assert_eq!(a, b);
        assert_eq!(a, Contract::union([Contract::String, Contract::Integer]));
    }
}
