//! Required slots of two merged modules.
//!
//! A slot is *settled* in a module if the module declares it but doesn't require it.
//! A settled slot is never required again after a merge, whichever side settled it.
//! What happens to the slots both sides still require depends on how the declared slots relate:
//!
//! - [`Meet::NullIntersection`]: the declared slots are disjoint, or neither side's required slots
//!   are declared by the other side. Required slots of both sides stay required.
//! - [`Meet::Inclusion`]: the declared slots of one side are declared by the other side too.
//!   Required slots of both sides stay required.
//! - [`Meet::PartialOverlap`]: otherwise. A slot required by both sides is absorbed,
//!   it's no longer required but can still be bound when the module is made.
//!
//! Every rule is symmetric, so the merge is commutative, and merging a module with itself is an inclusion
//! that requires the same slots.

use alloc::collections::BTreeSet;

use crate::token::TokenSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Meet {
    NullIntersection,
    Inclusion,
    PartialOverlap,
}

impl Meet {
    #[inline]
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Meet::NullIntersection => "null intersection",
            Meet::Inclusion => "inclusion",
            Meet::PartialOverlap => "partial overlap",
        }
    }
}

pub type Required = BTreeSet<&'static str>;

#[must_use]
pub fn classify(first: (&TokenSet, &Required), second: (&TokenSet, &Required)) -> Meet {
    let (first_tokens, first_required) = first;
    let (second_tokens, second_required) = second;

    let first_names = first_tokens.names();
    let second_names = second_tokens.names();

    if first_names.is_disjoint(&second_names)
        || (!first_required.is_subset(&second_names) && !second_required.is_subset(&first_names))
    {
        Meet::NullIntersection
    } else if first_names.is_subset(&second_names) || second_names.is_subset(&first_names) {
        Meet::Inclusion
    } else {
        Meet::PartialOverlap
    }
}

/// Computes the slots still required after merging two modules, and which rule applied
#[must_use]
pub fn meet(first: (&TokenSet, &Required), second: (&TokenSet, &Required)) -> (Meet, Required) {
    let kind = classify(first, second);

    let (first_tokens, first_required) = first;
    let (second_tokens, second_required) = second;

    let settled: Required = settled(first_tokens, first_required)
        .chain(settled(second_tokens, second_required))
        .collect();

    let union = first_required | second_required;
    let required = match kind {
        Meet::NullIntersection | Meet::Inclusion => &union - &settled,
        Meet::PartialOverlap => &(&union - &(first_required & second_required)) - &settled,
    };

    (kind, required)
}

fn settled<'a>(tokens: &'a TokenSet, required: &'a Required) -> impl Iterator<Item = &'static str> + 'a {
    tokens.keys().filter(|name| !required.contains(name))
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::{meet, Meet, Required};
    use crate::token::{Token, TokenSet};

    fn required(names: &[&'static str]) -> Required {
        names.iter().copied().collect()
    }

    fn tokens(slots: &[(&'static str, Token<u8>)]) -> TokenSet {
        slots.iter().map(|(name, token)| (*name, token.erase())).collect()
    }

    #[test]
    fn test_null_intersection() {
        let a = Token::<u8>::new("a");
        let b = Token::<u8>::new("b");

        let first = tokens(&[("a", a)]);
        let second = tokens(&[("b", b)]);

        let (kind, result) = meet((&first, &required(&["a"])), (&second, &required(&["b"])));
        assert_eq!(kind, Meet::NullIntersection);
        assert_eq!(result, required(&["a", "b"]));
    }

    #[test]
    fn test_null_intersection_with_shared_slot() {
        let a = Token::<u8>::new("a");
        let b = Token::<u8>::new("b");
        let c = Token::<u8>::new("c");

        let first = tokens(&[("a", a), ("b", b)]);
        let second = tokens(&[("b", b), ("c", c)]);

        let (kind, result) = meet((&first, &required(&["a", "b"])), (&second, &required(&["b", "c"])));
        assert_eq!(kind, Meet::NullIntersection);
        assert_eq!(result, required(&["a", "b", "c"]));

        // `b` is settled by the second module
        let (kind, result) = meet((&first, &required(&["a", "b"])), (&second, &required(&["c"])));
        assert_eq!(kind, Meet::NullIntersection);
        assert_eq!(result, required(&["a", "c"]));
    }

    #[test]
    fn test_inclusion() {
        let a = Token::<u8>::new("a");
        let b = Token::<u8>::new("b");

        let inner = tokens(&[("a", a)]);
        let outer = tokens(&[("a", a), ("b", b)]);

        let (kind, result) = meet((&inner, &required(&[])), (&outer, &required(&["a", "b"])));
        assert_eq!(kind, Meet::Inclusion);
        assert_eq!(result, required(&["b"]));

        let (kind, result) = meet((&outer, &required(&["a", "b"])), (&inner, &required(&[])));
        assert_eq!(kind, Meet::Inclusion);
        assert_eq!(result, required(&["b"]));

        let (kind, result) = meet((&inner, &required(&["a"])), (&outer, &required(&["b"])));
        assert_eq!(kind, Meet::Inclusion);
        assert_eq!(result, required(&["b"]));
    }

    #[test]
    fn test_partial_overlap() {
        let a = Token::<u8>::new("a");
        let b = Token::<u8>::new("b");
        let c = Token::<u8>::new("c");

        let first = tokens(&[("a", a), ("b", b)]);
        let second = tokens(&[("b", b), ("c", c)]);

        let (kind, result) = meet((&first, &required(&["b"])), (&second, &required(&["b"])));
        assert_eq!(kind, Meet::PartialOverlap);
        assert!(result.is_empty());

        let (kind, result) = meet((&first, &required(&["b"])), (&second, &required(&["c"])));
        assert_eq!(kind, Meet::PartialOverlap);
        assert_eq!(result, required(&["c"]));
    }

    #[test]
    fn test_idempotent() {
        let a = Token::<u8>::new("a");
        let b = Token::<u8>::new("b");
        let slots = tokens(&[("a", a), ("b", b)]);

        for names in [&[][..], &["a"][..], &["a", "b"][..]] {
            let (kind, result) = meet((&slots, &required(names)), (&slots, &required(names)));
            assert_eq!(kind, Meet::Inclusion);
            assert_eq!(result, required(names));
        }
    }
}
