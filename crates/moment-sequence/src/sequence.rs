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

use smallvec::SmallVec;

use crate::hasher::ShortlexHasher;
use crate::sign::Sign;

/// An operator identifier: a small nonnegative integer in a fixed alphabet.
pub type OperatorId = u16;

/// Inline-capacity storage for the raw operator identifiers of a sequence.
/// Most rewrite rules in practice involve short strings; four inline slots
/// avoids a heap allocation for the common case without giving up longer
/// sequences.
pub type SequenceStorage = SmallVec<[OperatorId; 4]>;

/// An ordered finite sequence of operator identifiers, tagged with a cached
/// shortlex hash, a sign, and a zero flag.
///
/// Two sequences compare equal iff their `(zero, raw, sign)` triples agree.
/// The zero sentinel always has hash `0` and an empty `raw`.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct HashedSequence {
    raw: SequenceStorage,
    hash: u64,
    sign: Sign,
    zero: bool,
}

impl HashedSequence {
    /// Builds a hashed sequence from a raw operator string and a sign, using
    /// `hasher` to compute the shortlex hash.
    #[must_use]
    pub fn new(raw: impl Into<SequenceStorage>, sign: Sign, hasher: &ShortlexHasher) -> Self {
        let raw = raw.into();
        let hash = hasher.hash(&raw);
        Self { raw, hash, sign, zero: false }
    }

    /// The absorbing zero element: empty raw sequence, hash `0`.
    #[must_use]
    pub fn zero() -> Self {
        Self { raw: SequenceStorage::new(), hash: 0, sign: Sign::Positive, zero: true }
    }

    /// The multiplicative identity: the empty sequence with sign `+1`.
    /// Its hash is always `1` (the offset of length zero), regardless of
    /// alphabet size, distinguishing it from the zero sentinel's hash `0`.
    #[must_use]
    pub fn identity() -> Self {
        Self { raw: SequenceStorage::new(), hash: 1, sign: Sign::Positive, zero: false }
    }

    #[must_use]
    pub fn raw(&self) -> &[OperatorId] {
        &self.raw
    }

    #[must_use]
    pub fn hash(&self) -> u64 {
        self.hash
    }

    #[must_use]
    pub fn sign(&self) -> Sign {
        self.sign
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.zero
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.raw.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Returns a copy of this sequence with its sign multiplied by `factor`.
    /// The zero sentinel is sign-invariant: multiplying it returns zero unchanged.
    #[must_use]
    pub fn with_sign_multiplied(&self, factor: Sign) -> Self {
        if self.zero {
            return self.clone();
        }
        Self { sign: self.sign * factor, ..self.clone() }
    }

    /// Negates the sequence's sign (equivalent to multiplying by `-1`).
    #[must_use]
    pub fn negated(&self) -> Self {
        self.with_sign_multiplied(Sign::Negative)
    }

    /// Index of the first occurrence of `needle.raw()` as a contiguous
    /// substring of this sequence's raw string, if any.
    #[must_use]
    pub fn matches_anywhere(&self, needle: &[OperatorId]) -> Option<usize> {
        ShortlexHasher::find_substring(&self.raw, needle)
    }

    /// Concatenates the raw strings of `self` and `other`, re-hashing with
    /// `hasher` and multiplying the signs. Zero is absorbing.
    #[must_use]
    pub fn concat(&self, other: &HashedSequence, hasher: &ShortlexHasher) -> Self {
        if self.zero || other.zero {
            return HashedSequence::zero();
        }
        let raw: SequenceStorage = ShortlexHasher::concat(&self.raw, &other.raw).into();
        Self::new(raw, self.sign * other.sign, hasher)
    }
}

impl PartialEq for HashedSequence {
    fn eq(&self, other: &Self) -> bool {
        if self.zero || other.zero {
            return self.zero == other.zero;
        }
        self.raw == other.raw && self.sign == other.sign
    }
}

impl Eq for HashedSequence {}

impl fmt::Display for HashedSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.zero {
            return write!(f, "0");
        }
        if self.sign != Sign::Positive {
            write!(f, "{}*", self.sign)?;
        }
        if self.raw.is_empty() {
            return write!(f, "I");
        }
        for (i, op) in self.raw.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{op}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hasher() -> ShortlexHasher {
        ShortlexHasher::new(3)
    }

    #[test]
    fn zero_has_hash_zero_and_is_a_sentinel() {
        let z = HashedSequence::zero();
        assert_eq!(z.hash(), 0);
        assert!(z.is_zero());
        assert_eq!(z, HashedSequence::zero());
        assert_ne!(z, HashedSequence::identity());
    }

    #[test]
    fn equality_compares_zero_raw_and_sign_triples() {
        let h = hasher();
        let a = HashedSequence::new(vec![0u16, 1], Sign::Positive, &h);
        let b = HashedSequence::new(vec![0u16, 1], Sign::Positive, &h);
        let c = HashedSequence::new(vec![0u16, 1], Sign::Negative, &h);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn concat_multiplies_signs_and_is_absorbed_by_zero() {
        let h = hasher();
        let a = HashedSequence::new(vec![0u16], Sign::ImaginaryPositive, &h);
        let b = HashedSequence::new(vec![1u16], Sign::ImaginaryPositive, &h);
        let joined = a.concat(&b, &h);
        assert_eq!(joined.raw(), &[0, 1]);
        assert_eq!(joined.sign(), Sign::Negative);

        let zeroed = a.concat(&HashedSequence::zero(), &h);
        assert!(zeroed.is_zero());
    }
}
