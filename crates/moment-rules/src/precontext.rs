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

use moment_sequence::{HashedSequence, OperatorId, SequenceStorage, ShortlexHasher};

/// The small amount of alphabet-wide machinery a rulebook needs to combine
/// and conjugate rules: how many raw operators there are, whether the
/// alphabet is self-adjoint (every generator is its own conjugate), and the
/// shortlex hasher those operators are ordered by.
///
/// A non-self-adjoint alphabet of `n` declared generators is represented
/// internally as `2n` raw operators: the first `n` are the generators as
/// given, the second `n` their formal adjoints, so conjugation is a fixed
/// relabelling rather than a separate algebraic structure.
#[derive(Debug, Clone, Copy)]
pub struct Precontext {
    raw_operator_count: OperatorId,
    self_adjoint: bool,
    hasher: ShortlexHasher,
    conjugate_offset: OperatorId,
}

impl Precontext {
    /// Builds a precontext for `op_count` declared generators. When
    /// `self_adjoint` is false the alphabet is doubled to make room for
    /// each generator's adjoint.
    #[must_use]
    pub fn new(op_count: OperatorId, self_adjoint: bool) -> Self {
        let raw_operator_count = if self_adjoint { op_count } else { op_count * 2 };
        Self {
            raw_operator_count,
            self_adjoint,
            hasher: ShortlexHasher::new(raw_operator_count as usize),
            conjugate_offset: op_count,
        }
    }

    #[must_use]
    pub fn raw_operator_count(&self) -> OperatorId {
        self.raw_operator_count
    }

    #[must_use]
    pub fn is_self_adjoint(&self) -> bool {
        self.self_adjoint
    }

    #[must_use]
    pub fn hasher(&self) -> &ShortlexHasher {
        &self.hasher
    }

    #[must_use]
    pub fn hash(&self, raw: &[OperatorId]) -> u64 {
        self.hasher.hash(raw)
    }

    /// Conjugates a raw operator string: reversed, and with each operator
    /// swapped for its adjoint unless the alphabet is self-adjoint.
    #[must_use]
    pub fn conjugate_raw(&self, raw: &[OperatorId]) -> SequenceStorage {
        if self.self_adjoint {
            return raw.iter().rev().copied().collect();
        }
        raw.iter()
            .rev()
            .map(|&op| (op + self.conjugate_offset) % self.raw_operator_count)
            .collect()
    }

    /// Conjugates a hashed sequence, preserving sign and the zero sentinel.
    #[must_use]
    pub fn conjugate(&self, seq: &HashedSequence) -> HashedSequence {
        if seq.is_zero() {
            return HashedSequence::zero();
        }
        let conjugated_sign = seq.sign().conjugate();
        HashedSequence::new(self.conjugate_raw(seq.raw()), conjugated_sign, &self.hasher)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use moment_sequence::Sign;

    #[test]
    fn self_adjoint_conjugate_just_reverses() {
        let pc = Precontext::new(3, true);
        let seq = HashedSequence::new(vec![0u16, 1, 2], Sign::Positive, pc.hasher());
        let conj = pc.conjugate(&seq);
        assert_eq!(conj.raw(), &[2, 1, 0]);
    }

    #[test]
    fn non_self_adjoint_conjugate_reverses_and_offsets() {
        let pc = Precontext::new(2, false);
        // raw alphabet is now {0,1,2,3}, with 2 == 0*, 3 == 1*
        let seq = HashedSequence::new(vec![0u16, 1], Sign::Positive, pc.hasher());
        let conj = pc.conjugate(&seq);
        assert_eq!(conj.raw(), &[3, 2]);
    }

    #[test]
    fn conjugate_preserves_zero_sentinel() {
        let pc = Precontext::new(2, true);
        assert!(pc.conjugate(&HashedSequence::zero()).is_zero());
    }
}
