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

use moment_rules::{OperatorRulebook, Precontext};
use moment_sequence::{HashedSequence, OperatorId, Sign};

/// What the rest of the crate needs from a scenario's operator algebra:
/// how big the alphabet is, how to reduce a raw word to its canonical
/// representative, how to conjugate a word, and how to enumerate the
/// canonical words of a given length. A caller's own context (hosted by a
/// matrix system, out of scope here) can implement this trait directly
/// instead of using [`PlainContext`].
pub trait Context {
    /// The number of raw operators in the alphabet.
    fn size(&self) -> usize;

    /// Reduces a raw word to its canonical form: commutativity sorting (if
    /// the context is commutative) followed by rulebook reduction.
    fn canonicalize(&self, raw: &[OperatorId]) -> HashedSequence;

    /// Conjugates a hashed sequence under this context's conjugation rule.
    fn conjugate(&self, seq: &HashedSequence) -> HashedSequence;

    /// Every canonical word of exactly `word_length` raw operators, in
    /// ascending shortlex order.
    fn operator_sequence_generator(&self, word_length: usize) -> Vec<HashedSequence>;
}

/// A minimal, in-memory [`Context`] over a completed rulebook, with no
/// extra structure (no parties, no measurements). Exists so the crate is
/// testable on its own, the way a bare symbol table can be exercised
/// without a running compiler session.
#[derive(Debug, Clone)]
pub struct PlainContext {
    precontext: Precontext,
    rulebook: OperatorRulebook,
    commutative: bool,
}

impl PlainContext {
    #[must_use]
    pub fn new(precontext: Precontext, rulebook: OperatorRulebook, commutative: bool) -> Self {
        Self { precontext, rulebook, commutative }
    }

    #[must_use]
    pub fn rulebook(&self) -> &OperatorRulebook {
        &self.rulebook
    }
}

impl Context for PlainContext {
    fn size(&self) -> usize {
        self.precontext.raw_operator_count() as usize
    }

    fn canonicalize(&self, raw: &[OperatorId]) -> HashedSequence {
        let mut sorted = raw.to_vec();
        if self.commutative {
            sorted.sort_unstable();
        }
        let seq = HashedSequence::new(sorted, Sign::Positive, self.precontext.hasher());
        self.rulebook.reduce_sequence(&seq)
    }

    fn conjugate(&self, seq: &HashedSequence) -> HashedSequence {
        self.precontext.conjugate(seq)
    }

    fn operator_sequence_generator(&self, word_length: usize) -> Vec<HashedSequence> {
        let alphabet = self.precontext.raw_operator_count();
        if alphabet == 0 {
            return if word_length == 0 { vec![HashedSequence::identity()] } else { Vec::new() };
        }

        let mut words = Vec::new();
        let mut counter = vec![0 as OperatorId; word_length];
        loop {
            let canonical = self.canonicalize(&counter);
            if !canonical.is_zero() && canonical.raw() == counter.as_slice() {
                words.push(canonical);
            }

            // Odometer increment over base `alphabet`.
            let mut pos = word_length;
            loop {
                if pos == 0 {
                    return finish(words);
                }
                pos -= 1;
                counter[pos] += 1;
                if counter[pos] < alphabet {
                    break;
                }
                counter[pos] = 0;
            }
        }

        fn finish(mut words: Vec<HashedSequence>) -> Vec<HashedSequence> {
            words.sort_by_key(HashedSequence::hash);
            words.dedup_by_key(|w| w.hash());
            words
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use moment_rules::ConjugationMode;

    fn plain_context() -> PlainContext {
        let pc = Precontext::new(2, true);
        let mut book = OperatorRulebook::new(pc, ConjugationMode::SelfAdjoint);
        book.add_rule(
            moment_rules::OperatorRule::new(
                HashedSequence::new(vec![0u16, 0], Sign::Positive, pc.hasher()),
                HashedSequence::identity(),
            )
            .unwrap(),
        );
        PlainContext::new(pc, book, false)
    }

    #[test]
    fn canonicalize_applies_rulebook_reduction() {
        let ctx = plain_context();
        let reduced = ctx.canonicalize(&[0, 0, 1]);
        assert_eq!(reduced.raw(), &[1]);
    }

    #[test]
    fn operator_sequence_generator_returns_unique_canonical_words() {
        let ctx = plain_context();
        let words = ctx.operator_sequence_generator(2);
        let mut hashes: Vec<u64> = words.iter().map(HashedSequence::hash).collect();
        hashes.sort_unstable();
        let mut dedup = hashes.clone();
        dedup.dedup();
        assert_eq!(hashes, dedup);
    }
}
