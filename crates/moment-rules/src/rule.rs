// Copyright (C) 2019-2026 Moment Algebra Contributors.
// This file is part of the Moment Algebra library.

// The Moment Algebra library is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

// The Moment Algebra library is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU General Public License for more details.

// You should have received a copy of the GNU General Public License
// along with the Moment Algebra library. If not, see <https://www.gnu.org/licenses/>.

use std::fmt;

use moment_errors::{BadHint, InvalidRule};
use moment_sequence::{HashedSequence, OperatorId, SequenceStorage, Sign, ShortlexHasher};

use crate::precontext::Precontext;

/// An oriented rewrite rule `LHS -> sign * RHS`, where `LHS` and `RHS` are
/// raw operator strings and `LHS` is never below `RHS` in shortlex order
/// (a rule always reduces or preserves length-then-lexicographic rank).
///
/// The rule's own sign always lives on the left-hand side is folded into
/// the right-hand side at construction, so `LHS` itself is unsigned.
#[derive(Debug, Clone)]
pub struct OperatorRule {
    lhs: HashedSequence,
    rhs: HashedSequence,
    is_trivial: bool,
    map_to_zero: bool,
    delta: isize,
}

impl OperatorRule {
    /// Builds a rule asserting `lhs == rhs` (up to `rhs`'s sign), folding
    /// any sign on `lhs` into `rhs` so the stored left-hand side is always
    /// unsigned. Returns an error if `rhs` would rank above `lhs` in
    /// shortlex order, since a rule must be a reduction.
    pub fn new(lhs: HashedSequence, rhs: HashedSequence) -> Result<Self, InvalidRule> {
        let (lhs, rhs) = if lhs.sign() != Sign::Positive && !lhs.is_zero() {
            let carried = rhs.with_sign_multiplied(lhs.sign());
            (lhs.with_sign_multiplied(lhs.sign().conjugate()), carried)
        } else {
            (lhs, rhs)
        };

        if lhs.hash() < rhs.hash() {
            return Err(InvalidRule::new(
                "the right-hand side must not exceed the left-hand side in shortlex order",
            ));
        }

        let is_trivial = lhs.hash() == rhs.hash() && rhs.sign() == Sign::Positive && !rhs.is_zero();
        let map_to_zero = rhs.is_zero();
        let delta = rhs.len() as isize - lhs.len() as isize;

        Ok(Self { lhs, rhs, is_trivial, map_to_zero, delta })
    }

    #[must_use]
    pub fn lhs(&self) -> &HashedSequence {
        &self.lhs
    }

    #[must_use]
    pub fn rhs(&self) -> &HashedSequence {
        &self.rhs
    }

    /// The length change a successful match induces.
    #[must_use]
    pub fn delta(&self) -> isize {
        self.delta
    }

    /// True for the degenerate rule `A -> A`.
    #[must_use]
    pub fn is_trivial(&self) -> bool {
        self.is_trivial
    }

    /// True if the rule asserts its left-hand side is equal to zero.
    #[must_use]
    pub fn implies_zero(&self) -> bool {
        self.map_to_zero
    }

    /// The sign carried by the right-hand side.
    #[must_use]
    pub fn rule_sign(&self) -> Sign {
        self.rhs.sign()
    }

    /// Index of the first occurrence of this rule's left-hand side as a
    /// contiguous substring of `haystack`.
    #[must_use]
    pub fn matches_anywhere(&self, haystack: &[OperatorId]) -> Option<usize> {
        ShortlexHasher::find_substring(haystack, self.lhs.raw())
    }

    /// Applies this rule to `input` at the match beginning at `hint`,
    /// splicing in the right-hand side. `hint` must point at a real
    /// occurrence of the left-hand side in `input`, as returned by
    /// [`Self::matches_anywhere`].
    pub fn apply_match_with_hint(
        &self,
        input: &[OperatorId],
        hint: usize,
    ) -> Result<SequenceStorage, BadHint> {
        if self.map_to_zero {
            return Ok(SequenceStorage::new());
        }

        let new_size = input.len() as isize + self.delta;
        if new_size < 0 {
            return Err(BadHint);
        }
        if new_size == 0 {
            return Ok(SequenceStorage::new());
        }

        let lhs_len = self.lhs.len();
        if hint.checked_add(lhs_len).map(|end| end > input.len()).unwrap_or(true) {
            return Err(BadHint);
        }

        let mut output = SequenceStorage::with_capacity(new_size as usize);
        output.extend_from_slice(&input[..hint]);
        output.extend_from_slice(self.rhs.raw());
        output.extend_from_slice(&input[hint + lhs_len..]);

        if output.len() as isize != new_size {
            return Err(BadHint);
        }
        Ok(output)
    }

    /// True if this rule's left-hand and right-hand sides are each
    /// contiguous substrings of `other`'s corresponding sides, occupying
    /// matching positions, so that `other` is a consequence of `self`.
    #[must_use]
    pub fn implies(&self, other: &OperatorRule) -> bool {
        let Some(lhs_begin) = self.matches_anywhere(other.lhs.raw()) else {
            return false;
        };
        let Some(rhs_begin) = self.matches_anywhere(other.rhs.raw()) else {
            return false;
        };

        if other.lhs.raw()[..lhs_begin] != other.rhs.raw()[..rhs_begin] {
            return false;
        }

        let lhs_suffix = &other.lhs.raw()[lhs_begin + self.lhs.len()..];
        let rhs_suffix = &other.rhs.raw()[rhs_begin + self.rhs.len()..];
        lhs_suffix == rhs_suffix
    }

    /// Combines the overlapping left-hand sides of `self` and `other` (the
    /// suffix of `self`'s left-hand side that is also a prefix of
    /// `other`'s), applies both rules to the joined string, and returns the
    /// resulting critical pair as a new rule, or `None` if the two rules'
    /// left-hand sides don't overlap.
    #[must_use]
    pub fn combine(&self, other: &OperatorRule, pc: &Precontext) -> Option<OperatorRule> {
        let overlap = ShortlexHasher::suffix_prefix_overlap(self.lhs.raw(), other.lhs.raw());
        if overlap == 0 {
            return None;
        }

        let mut joined = SequenceStorage::with_capacity(self.lhs.len() + other.lhs.len() - overlap);
        joined.extend_from_slice(&self.lhs.raw()[..self.lhs.len() - overlap]);
        joined.extend_from_slice(other.lhs.raw());

        let raw_via_this = self.apply_match_with_hint(&joined, 0).ok()?;
        let hash_this = if self.map_to_zero { 0 } else { pc.hash(&raw_via_this) };

        let raw_via_other = other
            .apply_match_with_hint(&joined, joined.len() - other.lhs.len())
            .ok()?;
        let hash_other = if other.map_to_zero { 0 } else { pc.hash(&raw_via_other) };

        let implies_zero = hash_this == 0 || hash_other == 0;

        // Hash `0` is the zero sentinel (see the hasher's offset scheme), so
        // a side that reduced to zero is rebuilt as the sentinel directly
        // rather than from its (meaningless) raw bytes.
        let build = |raw: SequenceStorage, hash: u64| -> HashedSequence {
            if hash == 0 {
                return HashedSequence::zero();
            }
            HashedSequence::new(raw, Sign::Positive, pc.hasher())
        };

        if hash_this < hash_other {
            let lhs = build(raw_via_other, hash_other);
            let rhs_sign = if implies_zero {
                Sign::Positive
            } else {
                self.rule_sign() * other.rule_sign().conjugate()
            };
            let rhs = build(raw_via_this, hash_this).with_sign_multiplied(rhs_sign);
            OperatorRule::new(lhs, rhs).ok()
        } else {
            let lhs = build(raw_via_this, hash_this);
            let rhs_sign = if implies_zero {
                Sign::Positive
            } else {
                other.rule_sign() * self.rule_sign().conjugate()
            };
            let rhs = build(raw_via_other, hash_other).with_sign_multiplied(rhs_sign);
            OperatorRule::new(lhs, rhs).ok()
        }
    }

    /// Forms a rule by conjugating both sides of the equality.
    #[must_use]
    pub fn conjugate(&self, pc: &Precontext) -> OperatorRule {
        let lhs = pc.conjugate(&self.lhs);
        let rhs = pc.conjugate(&self.rhs);
        if lhs.hash() < rhs.hash() {
            OperatorRule::new(rhs, lhs).expect("conjugating a valid rule yields a valid rule")
        } else {
            OperatorRule::new(lhs, rhs).expect("conjugating a valid rule yields a valid rule")
        }
    }
}

impl fmt::Display for OperatorRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.lhs, self.rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pc() -> Precontext {
        Precontext::new(3, true)
    }

    fn seq(raw: &[OperatorId], pc: &Precontext) -> HashedSequence {
        HashedSequence::new(raw.to_vec(), Sign::Positive, pc.hasher())
    }

    #[test]
    fn construction_rejects_non_reductions() {
        let pc = pc();
        let short = seq(&[0], &pc);
        let long = seq(&[0, 1, 2], &pc);
        assert!(OperatorRule::new(short, long).is_err());
    }

    #[test]
    fn construction_folds_lhs_sign_into_rhs() {
        let pc = pc();
        let lhs = seq(&[0, 1], &pc).negated();
        let rhs = seq(&[0], &pc);
        let rule = OperatorRule::new(lhs, rhs).unwrap();
        assert_eq!(rule.lhs().sign(), Sign::Positive);
        assert_eq!(rule.rhs().sign(), Sign::Negative);
    }

    #[test]
    fn apply_match_with_hint_splices_replacement() {
        let pc = pc();
        let rule = OperatorRule::new(seq(&[0, 1], &pc), seq(&[2], &pc)).unwrap();
        let input = [2u16, 0, 1, 2];
        let hint = rule.matches_anywhere(&input).unwrap();
        assert_eq!(hint, 1);
        let out = rule.apply_match_with_hint(&input, hint).unwrap();
        assert_eq!(&out[..], &[2, 2, 2]);
    }

    #[test]
    fn combine_produces_critical_pair_from_overlap() {
        let pc = pc();
        // 0,1 -> (empty); 1,2 -> (empty). Overlap on "1" gives 0,1,2 reduces
        // two ways to the empty string and to 0's image of 2 alone.
        let rule_a = OperatorRule::new(seq(&[0, 1], &pc), HashedSequence::identity()).unwrap();
        let rule_b = OperatorRule::new(seq(&[1, 2], &pc), HashedSequence::identity()).unwrap();
        let combined = rule_a.combine(&rule_b, &pc);
        assert!(combined.is_some());
    }

    #[test]
    fn combine_with_no_overlap_returns_none() {
        let pc = pc();
        let rule_a = OperatorRule::new(seq(&[0, 1], &pc), HashedSequence::identity()).unwrap();
        let rule_b = OperatorRule::new(seq(&[2, 2], &pc), HashedSequence::identity()).unwrap();
        assert!(rule_a.combine(&rule_b, &pc).is_none());
    }

    #[test]
    fn zero_implying_rule_reports_implies_zero() {
        let pc = pc();
        let rule = OperatorRule::new(seq(&[0], &pc), HashedSequence::zero()).unwrap();
        assert!(rule.implies_zero());
        assert_eq!(rule.apply_match_with_hint(&[0, 1], 0).unwrap().len(), 0);
    }
}
