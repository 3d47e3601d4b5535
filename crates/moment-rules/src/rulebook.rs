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

use std::sync::atomic::{AtomicBool, Ordering};

use indexmap::IndexMap;
use moment_sequence::{HashedSequence, OperatorId, Sign};
use tracing::{debug, info, instrument, trace, warn};

use crate::precontext::Precontext;
use crate::rule::OperatorRule;

/// How an alphabet's operators relate to their own adjoints, which governs
/// which extra rules a rulebook seeds itself with before completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConjugationMode {
    /// Every generator is Hermitian: `a* = a`. No normal-operator rules are
    /// needed, but the rulebook still closes itself under conjugation.
    SelfAdjoint,
    /// Operators and their adjoints are distinct, declared as a single
    /// contiguous block of size `n` followed by its `n` adjoints.
    Bunched,
    /// Operators and their adjoints are distinct, declared interleaved
    /// (`a_0, a_0^*, a_1, a_1^*, ...`). Distinguished from `Bunched` only
    /// at the call site that builds [`Precontext`]; the rulebook itself
    /// treats both the same way once the precontext's offset is fixed.
    Interleaved,
}

impl ConjugationMode {
    #[must_use]
    pub fn is_self_adjoint(self) -> bool {
        matches!(self, ConjugationMode::SelfAdjoint)
    }
}

/// A Knuth-Bendix rewriting system over noncommutative monomials: a set of
/// oriented rules, keyed by left-hand-side hash, closed (or completed
/// towards closure) under critical-pair combination.
#[derive(Debug, Clone)]
pub struct OperatorRulebook {
    precontext: Precontext,
    conjugation_mode: ConjugationMode,
    rules: IndexMap<u64, OperatorRule>,
}

impl OperatorRulebook {
    #[must_use]
    pub fn new(precontext: Precontext, conjugation_mode: ConjugationMode) -> Self {
        Self { precontext, conjugation_mode, rules: IndexMap::new() }
    }

    #[must_use]
    pub fn precontext(&self) -> &Precontext {
        &self.precontext
    }

    #[must_use]
    pub fn conjugation_mode(&self) -> ConjugationMode {
        self.conjugation_mode
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn rules(&self) -> impl Iterator<Item = &OperatorRule> {
        self.rules.values()
    }

    /// Inserts `rule` into the book, or folds it into a pre-existing rule
    /// that shares the same left-hand-side hash, possibly cascading into
    /// further rule additions. Returns the number of rules actually added.
    ///
    /// Mirrors the majorization policy of the source rewriting engine: if a
    /// rule `C -> A` already exists and a new rule asserts `C -> B`, the
    /// rule with the larger right-hand-side hash is re-expressed in terms
    /// of the other (`B -> A` or `A -> B`), so the book always keeps the
    /// single most-reduced right-hand side for any given left-hand side.
    #[instrument(skip(self, rule), fields(lhs = %rule.lhs(), rhs = %rule.rhs()))]
    pub fn add_rule(&mut self, rule: OperatorRule) -> usize {
        if rule.is_trivial() {
            return 0;
        }

        let lhs_hash = rule.lhs().hash();
        let Some(existing) = self.rules.get(&lhs_hash) else {
            trace!("introducing new rule");
            self.rules.insert(lhs_hash, rule);
            return 1;
        };

        if existing.rhs() == rule.rhs() {
            return 0;
        }

        if existing.rhs().hash() == rule.rhs().hash() {
            // Same magnitude, opposing sign on at least one side: both
            // sides are now implied to be zero.
            let existing_rhs = existing.rhs().clone();
            let rule_rhs = rule.rhs().clone();
            debug!("conflicting signs on equal-hash right-hand sides: both sides vanish");
            self.rules.remove(&lhs_hash);
            self.rules.insert(
                lhs_hash,
                OperatorRule::new(rule.lhs().clone(), HashedSequence::zero())
                    .expect("zero right-hand side is always a valid reduction"),
            );
            let mut added = 1;
            if let Ok(rhs_to_zero) = OperatorRule::new(existing_rhs, HashedSequence::zero()) {
                added += self.add_rule(rhs_to_zero);
            }
            if let Ok(rhs_to_zero) = OperatorRule::new(rule_rhs, HashedSequence::zero()) {
                added += self.add_rule(rhs_to_zero);
            }
            return added;
        }

        // Work in terms of the two sides' *bare* (unsigned) raw content: the
        // equation `A_raw * sign_existing = B_raw * sign_rule` lets either
        // side be re-expressed in terms of the other.
        let bare = |s: &HashedSequence| HashedSequence::new(s.raw().to_vec(), Sign::Positive, self.precontext.hasher());
        let a_raw = bare(existing.rhs());
        let b_raw = bare(rule.rhs());
        let sign_existing = existing.rhs().sign();
        let sign_rule = rule.rhs().sign();

        if existing.rhs().hash() < rule.rhs().hash() {
            // New rule's right-hand side outranks the existing one: fold
            // the new rule into `B -> A` instead of replacing `C -> A`.
            let b_to_a = OperatorRule::new(b_raw, a_raw.with_sign_multiplied(sign_existing * sign_rule.conjugate()));
            match b_to_a {
                Ok(b_to_a) => self.add_rule(b_to_a),
                Err(_) => 0,
            }
        } else {
            debug!("replacing rule with a more reduced right-hand side");
            self.rules.remove(&lhs_hash);
            self.rules.insert(lhs_hash, rule.clone());
            let b_to_a = OperatorRule::new(a_raw, b_raw.with_sign_multiplied(sign_rule * sign_existing.conjugate()));
            let mut added = 1;
            if let Ok(b_to_a) = b_to_a {
                added += self.add_rule(b_to_a);
            }
            added
        }
    }

    pub fn add_rules(&mut self, rules: impl IntoIterator<Item = OperatorRule>) -> usize {
        rules.into_iter().map(|r| self.add_rule(r)).sum()
    }

    /// Fully reduces a raw operator sequence by repeatedly applying the
    /// leftmost matching rule, restarting the scan from the first rule
    /// after every rewrite, until no rule matches.
    #[must_use]
    pub fn reduce_sequence(&self, input: &HashedSequence) -> HashedSequence {
        if input.is_zero() {
            return HashedSequence::zero();
        }

        let mut sign = input.sign();
        let mut raw: Vec<OperatorId> = input.raw().to_vec();

        'outer: loop {
            for rule in self.rules.values() {
                if let Some(hint) = rule.matches_anywhere(&raw) {
                    if rule.implies_zero() {
                        return HashedSequence::zero();
                    }
                    sign = sign * rule.rule_sign();
                    raw = rule
                        .apply_match_with_hint(&raw, hint)
                        .expect("hint returned by matches_anywhere is always valid")
                        .into_vec();
                    continue 'outer;
                }
            }
            break;
        }

        HashedSequence::new(raw, sign, self.precontext.hasher())
    }

    /// Fully reduces both sides of a rule and re-derives its orientation,
    /// collapsing to an implies-zero rule if both sides become equal under
    /// an effective sign of `-1`.
    #[must_use]
    pub fn reduce_rule(&self, input: &OperatorRule) -> OperatorRule {
        let lhs = self.reduce_sequence(input.lhs());
        let rhs = self.reduce_sequence(input.rhs()).with_sign_multiplied(input.rule_sign());

        if lhs.hash() == rhs.hash() && lhs.sign() != rhs.sign() {
            return OperatorRule::new(lhs, HashedSequence::zero())
                .expect("zero right-hand side is always a valid reduction");
        }

        if lhs.hash() >= rhs.hash() {
            OperatorRule::new(lhs, rhs).expect("reduction never increases shortlex rank")
        } else {
            let sign = lhs.sign() * rhs.sign().conjugate();
            OperatorRule::new(rhs, lhs.with_sign_multiplied(sign))
                .expect("reduction never increases shortlex rank")
        }
    }

    /// Re-reduces every rule in the book against the rest of the book,
    /// dropping any that become trivial. Returns the number changed or
    /// removed.
    pub fn reduce_ruleset(&mut self) -> usize {
        let mut number_reduced = 0;
        let mut pending: Vec<OperatorRule> = self.rules.drain(..).map(|(_, r)| r).collect();

        while let Some(isolated) = pending.pop() {
            let reduced = self.reduce_rule(&isolated);

            if reduced.is_trivial() {
                number_reduced += 1;
                continue;
            }

            if isolated.lhs().hash() != reduced.lhs().hash() || isolated.rhs().hash() != reduced.rhs().hash() {
                number_reduced += 1;
            }

            let hash = reduced.lhs().hash();
            self.rules.insert(hash, reduced);
        }
        number_reduced
    }

    /// One Knuth-Bendix iteration: reduce the ruleset, then search for a
    /// non-trivial critical pair between any two rules and add it. Returns
    /// `true` if a new rule was found (the caller should call again).
    #[instrument(skip(self))]
    pub fn try_new_combination(&mut self) -> bool {
        self.reduce_ruleset();

        let snapshot: Vec<OperatorRule> = self.rules.values().cloned().collect();
        for a in &snapshot {
            for b in &snapshot {
                if std::ptr::eq(a, b) {
                    continue;
                }
                let Some(combined) = a.combine(b, &self.precontext) else {
                    continue;
                };
                let reduced = self.reduce_rule(&combined);
                if reduced.is_trivial() {
                    continue;
                }
                info!(rule = %reduced, "new critical pair added");
                let hash = reduced.lhs().hash();
                self.rules.insert(hash, reduced);
                self.reduce_ruleset();
                return true;
            }
        }
        false
    }

    /// True if no two rules in the book combine into a non-trivial rule:
    /// the rewriting system is confluent.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        let snapshot: Vec<&OperatorRule> = self.rules.values().collect();
        for (i, a) in snapshot.iter().enumerate() {
            for (j, b) in snapshot.iter().enumerate() {
                if i == j {
                    continue;
                }
                let Some(combined) = a.combine(b, &self.precontext) else {
                    continue;
                };
                if !self.reduce_rule(&combined).is_trivial() {
                    return false;
                }
            }
        }
        true
    }

    fn try_conjugation(&mut self, rule: &OperatorRule) -> bool {
        let conjugated = rule.conjugate(&self.precontext);
        let reduced = self.reduce_rule(&conjugated);
        if reduced.is_trivial() {
            return false;
        }
        debug!(rule = %reduced, "new conjugate rule added");
        let hash = reduced.lhs().hash();
        self.rules.insert(hash, reduced);
        self.reduce_ruleset();
        true
    }

    /// Seeds the book with the conjugate of every current rule, repeating
    /// until no new rule is introduced. When `mock` is set, returns as soon
    /// as a single new rule is found without actually inserting anything
    /// beyond it, for cheaply testing whether the book is conjugation-closed.
    fn conjugate_ruleset(&mut self, mock: bool) -> usize {
        let mut added = 0;
        loop {
            let snapshot: Vec<OperatorRule> = self.rules.values().cloned().collect();
            let mut found = false;
            for rule in &snapshot {
                if self.try_conjugation(rule) {
                    found = true;
                    added += 1;
                    if mock {
                        return 1;
                    }
                    break;
                }
            }
            if !found {
                return added;
            }
        }
    }

    /// Runs Knuth-Bendix completion for up to `max_iterations` rounds,
    /// first closing the book under conjugation if its alphabet is
    /// self-adjoint. Checked periodically against `cancel` so a long run
    /// can be aborted cooperatively. Returns `true` if the book reached a
    /// confluent state.
    #[instrument(skip(self, cancel))]
    pub fn complete(&mut self, max_iterations: usize, cancel: Option<&AtomicBool>) -> bool {
        let mock_mode = max_iterations == 0;
        let mut iteration = 0usize;

        if self.conjugation_mode.is_self_adjoint() {
            let new_rules = self.conjugate_ruleset(mock_mode);
            if mock_mode && new_rules > 0 {
                return false;
            }
            iteration += new_rules;
        }

        while iteration < max_iterations {
            if let Some(flag) = cancel {
                if flag.load(Ordering::Relaxed) {
                    warn!(iteration, "completion cancelled");
                    return self.is_complete();
                }
            }
            if !self.try_new_combination() {
                info!(iteration, "completion converged");
                return true;
            }
            iteration += 1;
        }

        let complete = self.is_complete();
        if complete {
            info!(iteration, "maximum iterations reached, ruleset is nonetheless complete");
        } else {
            warn!(iteration, "maximum iterations reached without reaching completion");
        }
        complete
    }

    /// The commutation rules `[b, a] = 0` (as `b,a -> a,b`) for every pair
    /// of distinct operators in a fully commutative alphabet of `op_count`
    /// generators.
    #[must_use]
    pub fn commutator_rules(pc: &Precontext) -> Vec<OperatorRule> {
        let n = pc.raw_operator_count();
        if n < 2 {
            return Vec::new();
        }
        let mut out = Vec::with_capacity((n as usize * (n as usize - 1)) / 2);
        for b in (1..n).rev() {
            for a in (0..b).rev() {
                let lhs = HashedSequence::new(vec![b, a], Sign::Positive, pc.hasher());
                let rhs = HashedSequence::new(vec![a, b], Sign::Positive, pc.hasher());
                if let Ok(rule) = OperatorRule::new(lhs, rhs) {
                    out.push(rule);
                }
            }
        }
        out
    }

    /// The normality rules `a* a = a a*` for every declared generator of a
    /// non-self-adjoint alphabet, letting completion discover the
    /// consequences of each generator commuting with its own adjoint.
    #[must_use]
    pub fn normal_operator_rules(pc: &Precontext) -> Vec<OperatorRule> {
        if pc.is_self_adjoint() || pc.raw_operator_count() == 0 {
            return Vec::new();
        }
        let raw_operator_count = pc.raw_operator_count() / 2;
        let mut out = Vec::with_capacity(raw_operator_count as usize);
        for a in 0..raw_operator_count {
            let a_star = a + raw_operator_count;
            let lhs = HashedSequence::new(vec![a_star, a], Sign::Positive, pc.hasher());
            let rhs = HashedSequence::new(vec![a, a_star], Sign::Positive, pc.hasher());
            if let Ok(rule) = OperatorRule::new(lhs, rhs) {
                out.push(rule);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seq(raw: &[OperatorId], pc: &Precontext) -> HashedSequence {
        HashedSequence::new(raw.to_vec(), Sign::Positive, pc.hasher())
    }

    // Seed scenario S1: combining two rules with an overlapping left-hand
    // side introduces the critical pair as a new rule.
    #[test]
    fn s1_rule_combine_introduces_critical_pair() {
        let pc = Precontext::new(3, true);
        let mut book = OperatorRulebook::new(pc, ConjugationMode::SelfAdjoint);
        book.add_rule(OperatorRule::new(seq(&[0, 1], &pc), HashedSequence::identity()).unwrap());
        book.add_rule(OperatorRule::new(seq(&[1, 2], &pc), HashedSequence::identity()).unwrap());
        assert_eq!(book.len(), 2);
        let progressed = book.try_new_combination();
        assert!(progressed);
        assert!(book.len() >= 2);
    }

    // Seed scenario S1, literal: alphabet {0,1}, rules {0,1->0} and
    // {1,0->1}. Completion derives {0,0->0} and {1,1->1}, and reducing
    // (0,0,1) collapses all the way down to (0).
    #[test]
    fn s1_literal_completion_derives_idempotence_rules() {
        let pc = Precontext::new(2, true);
        let mut book = OperatorRulebook::new(pc, ConjugationMode::SelfAdjoint);
        book.add_rule(OperatorRule::new(seq(&[0, 1], &pc), seq(&[0], &pc)).unwrap());
        book.add_rule(OperatorRule::new(seq(&[1, 0], &pc), seq(&[1], &pc)).unwrap());

        assert!(book.complete(1000, None));

        let has_rule = |lhs: &[OperatorId], rhs: &[OperatorId]| {
            book.rules().any(|r| r.lhs().raw() == lhs && r.rhs().raw() == rhs && !r.implies_zero())
        };
        assert!(has_rule(&[0, 0], &[0]), "expected a derived rule {{0,0 -> 0}}");
        assert!(has_rule(&[1, 1], &[1]), "expected a derived rule {{1,1 -> 1}}");

        let reduced = book.reduce_sequence(&seq(&[0, 0, 1], &pc));
        assert_eq!(reduced.raw(), &[0]);
    }

    // Seed scenario S2: adding two rules with the same left-hand side and
    // opposing signs on equal-hash right-hand sides propagates a zero.
    #[test]
    fn s2_conflicting_signs_propagate_zero() {
        let pc = Precontext::new(2, true);
        let mut book = OperatorRulebook::new(pc, ConjugationMode::SelfAdjoint);
        let rhs = seq(&[1], &pc);
        book.add_rule(OperatorRule::new(seq(&[0, 0], &pc), rhs.clone()).unwrap());
        book.add_rule(OperatorRule::new(seq(&[0, 0], &pc), rhs.negated()).unwrap());

        let reduced = book.reduce_sequence(&seq(&[0, 0], &pc));
        assert!(reduced.is_zero());
    }

    // Seed scenario S3: conjugating a rule over a non-self-adjoint alphabet
    // lifts it to the adjoint operators.
    #[test]
    fn s3_conjugation_lifts_rule_to_adjoints() {
        let pc = Precontext::new(2, false);
        let rule = OperatorRule::new(seq(&[0, 1], &pc), HashedSequence::identity()).unwrap();
        let conj = rule.conjugate(&pc);
        // conjugate of (0,1) is (1*,0*) = (3,2) reversed-and-offset
        assert_eq!(conj.lhs().raw(), &[3, 2]);
    }

    #[test]
    fn commutator_rules_cover_every_pair() {
        let pc = Precontext::new(3, true);
        let rules = OperatorRulebook::commutator_rules(&pc);
        assert_eq!(rules.len(), 3);
    }

    #[test]
    fn normal_operator_rules_empty_for_self_adjoint_alphabet() {
        let pc = Precontext::new(3, true);
        assert!(OperatorRulebook::normal_operator_rules(&pc).is_empty());
    }

    #[test]
    fn complete_converges_on_a_simple_system() {
        let pc = Precontext::new(2, true);
        let mut book = OperatorRulebook::new(pc, ConjugationMode::SelfAdjoint);
        book.add_rule(OperatorRule::new(seq(&[0, 0], &pc), HashedSequence::identity()).unwrap());
        book.add_rule(OperatorRule::new(seq(&[1, 1], &pc), HashedSequence::identity()).unwrap());
        let ok = book.complete(1000, None);
        assert!(ok);
        assert!(book.is_complete());
    }
}
