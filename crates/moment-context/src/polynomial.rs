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

//! A generic polynomial over some term key `K` (a Collins-Gisin offset, a
//! symbol id, whatever the caller's layer addresses terms by), plus the
//! factory that builds one from an unmerged list of terms.

/// A single `coefficient * key` term. `K` is left abstract so the same
/// polynomial shape serves both pre-symbol-resolution terms (keyed by a
/// tensor offset) and post-resolution terms (keyed by a symbol id).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Term<K> {
    pub key: K,
    pub coefficient: f64,
}

impl<K> Term<K> {
    #[must_use]
    pub fn new(key: K, coefficient: f64) -> Self {
        Self { key, coefficient }
    }
}

/// A sum of terms, sorted by key with duplicates merged and
/// near-zero coefficients elided. Built exclusively through a
/// [`PolynomialFactory`], never directly: the invariant that terms are
/// sorted, merged, and tolerance-filtered is the factory's job to enforce.
#[derive(Debug, Clone, PartialEq)]
pub struct Polynomial<K> {
    terms: Vec<Term<K>>,
}

impl<K> Polynomial<K> {
    pub(crate) fn from_sorted_terms(terms: Vec<Term<K>>) -> Self {
        Self { terms }
    }

    #[must_use]
    pub fn terms(&self) -> &[Term<K>] {
        &self.terms
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.terms.is_empty()
    }
}

/// Builds [`Polynomial`]s from an unsorted, possibly-duplicate-keyed list
/// of terms, applying a zero-coefficient tolerance so that numerically
/// cancelled terms don't linger as zero-weighted entries.
pub trait PolynomialFactory<K: Ord + Copy> {
    fn build(&self, terms: Vec<Term<K>>) -> Polynomial<K>;

    /// Coefficients with absolute value at or below this are elided.
    fn zero_tolerance(&self) -> f64;
}

/// The reference [`PolynomialFactory`]: sorts by key, merges equal keys by
/// summing coefficients, then drops any term within `zero_tolerance` of
/// zero (Open Question resolution: magnitude-based, not exact equality,
/// since accumulated floating-point sums rarely land on exactly `0.0`).
#[derive(Debug, Clone, Copy)]
pub struct DefaultPolynomialFactory {
    zero_tolerance: f64,
}

impl DefaultPolynomialFactory {
    #[must_use]
    pub fn new(zero_tolerance: f64) -> Self {
        Self { zero_tolerance }
    }
}

impl Default for DefaultPolynomialFactory {
    fn default() -> Self {
        Self::new(1e-12)
    }
}

impl<K: Ord + Copy> PolynomialFactory<K> for DefaultPolynomialFactory {
    fn build(&self, mut terms: Vec<Term<K>>) -> Polynomial<K> {
        terms.sort_by_key(|t| t.key);

        let mut merged: Vec<Term<K>> = Vec::with_capacity(terms.len());
        for term in terms {
            match merged.last_mut() {
                Some(last) if last.key == term.key => last.coefficient += term.coefficient,
                _ => merged.push(term),
            }
        }
        merged.retain(|t| t.coefficient.abs() > self.zero_tolerance);
        Polynomial::from_sorted_terms(merged)
    }

    fn zero_tolerance(&self) -> f64 {
        self.zero_tolerance
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_merges_duplicate_keys_and_sorts() {
        let factory = DefaultPolynomialFactory::default();
        let poly = factory.build(vec![Term::new(2, 1.0), Term::new(1, 3.0), Term::new(2, -0.5)]);
        assert_eq!(poly.terms(), &[Term::new(1, 3.0), Term::new(2, 0.5)]);
    }

    #[test]
    fn build_elides_terms_within_zero_tolerance() {
        let factory = DefaultPolynomialFactory::new(1e-6);
        let poly = factory.build(vec![Term::new(1, 1.0), Term::new(1, -1.0 + 1e-9)]);
        assert!(poly.is_zero());
    }

    #[test]
    fn zero_tolerance_is_reported_back() {
        let factory = DefaultPolynomialFactory::new(0.25);
        assert_eq!(<DefaultPolynomialFactory as PolynomialFactory<i64>>::zero_tolerance(&factory), 0.25);
    }
}
