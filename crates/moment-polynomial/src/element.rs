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

use moment_collins_gisin::CollinsGisinTensor;
use moment_context::{Context, Polynomial, PolynomialFactory, SymbolTable, Term};
use moment_errors::BadPTError;
use tracing::debug;

/// One element of a polynomial tensor: a polynomial over Collins-Gisin
/// offsets, and, once every offset it references has a known symbol, the
/// same polynomial re-expressed over symbol ids.
#[derive(Debug, Clone, PartialEq)]
pub struct PolynomialElement {
    pub cg_polynomial: Polynomial<usize>,
    pub symbol_polynomial: Option<Polynomial<i64>>,
    pub has_symbols: bool,
}

impl PolynomialElement {
    #[must_use]
    pub fn new(cg_polynomial: Polynomial<usize>) -> Self {
        Self { cg_polynomial, symbol_polynomial: None, has_symbols: false }
    }

    /// Tries to resolve every Collins-Gisin offset this element references
    /// into a symbol, building `symbol_polynomial` if all of them are
    /// known. Idempotent: a no-op once `has_symbols` is already set.
    pub fn attempt_symbol_resolution<'a, C: Context, S: SymbolTable, F: PolynomialFactory<i64>>(
        &mut self,
        cg: &CollinsGisinTensor<'a, C, S>,
        factory: &F,
    ) -> bool {
        if self.has_symbols {
            return true;
        }

        let mut terms = Vec::with_capacity(self.cg_polynomial.len());
        for term in self.cg_polynomial.terms() {
            match cg.symbol_at_offset(term.key) {
                Some(symbol_id) => terms.push(Term::new(symbol_id, term.coefficient)),
                None => return false,
            }
        }

        self.symbol_polynomial = Some(factory.build(terms));
        self.has_symbols = true;
        true
    }
}

/// Retries symbol resolution for every element still missing one.
/// Monotonic: elements that already resolved are left untouched, and
/// `missing` only ever shrinks.
pub fn fill_missing_polynomials<'a, C: Context, S: SymbolTable, F: PolynomialFactory<i64>>(
    elements: &mut [PolynomialElement],
    cg: &CollinsGisinTensor<'a, C, S>,
    factory: &F,
) -> usize {
    let resolved = elements
        .iter_mut()
        .filter(|e| !e.has_symbols)
        .map(|e| e.attempt_symbol_resolution(cg, factory))
        .filter(|resolved| *resolved)
        .count();
    debug!(resolved, "polynomial element symbol resolution pass");
    resolved
}

/// Builds `element.symbol_polynomial - value` (or, with a `condition`
/// element, `element.symbol_polynomial - value * condition.symbol_polynomial`)
/// for each element/value pair. Fails if any element's symbols aren't
/// resolved yet.
pub fn explicit_value_rules<F: PolynomialFactory<i64>>(
    elements: &[PolynomialElement],
    values: &[f64],
    condition: Option<&PolynomialElement>,
    factory: &F,
) -> Result<Vec<Polynomial<i64>>, BadPTError> {
    let missing = elements.iter().filter(|e| !e.has_symbols).count();
    if missing > 0 {
        return Err(BadPTError::MissingSymbols(missing));
    }
    let condition_poly = match condition {
        Some(c) if c.has_symbols => Some(c.symbol_polynomial.as_ref().unwrap()),
        Some(_) => return Err(BadPTError::MissingSymbols(1)),
        None => None,
    };

    Ok(elements
        .iter()
        .zip(values.iter())
        .map(|(elem, &value)| {
            let mut terms: Vec<Term<i64>> = elem.symbol_polynomial.as_ref().unwrap().terms().to_vec();
            match condition_poly {
                Some(cond) => {
                    terms.extend(cond.terms().iter().map(|t| Term::new(t.key, -value * t.coefficient)));
                }
                // -1 never collides with a real (1-based) symbol id; stands for the constant term.
                None => terms.push(Term::new(-1, -value)),
            }
            factory.build(terms)
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use moment_context::{DefaultPolynomialFactory, MapSymbolTable, PlainContext};
    use moment_rules::{ConjugationMode, OperatorRulebook, Precontext};

    fn fixture() -> (PlainContext, MapSymbolTable) {
        let pc = Precontext::new(2, true);
        let book = OperatorRulebook::new(pc, ConjugationMode::SelfAdjoint);
        (PlainContext::new(pc, book, false), MapSymbolTable::new())
    }

    #[test]
    fn resolution_fails_while_any_offset_is_missing_and_succeeds_once_filled() {
        let (ctx, mut table) = fixture();
        let parties = vec![vec![vec![0u16]], vec![vec![1u16]]];
        let cg = CollinsGisinTensor::new(&ctx, &table, parties);
        let factory = DefaultPolynomialFactory::default();

        let mut elem = PolynomialElement::new(
            factory.build(vec![Term::new(0usize, 1.0), Term::new(1, -1.0)]),
        );
        assert!(!elem.attempt_symbol_resolution(&cg, &factory));
        assert!(!elem.has_symbols);

        // Re-seed with symbols registered, rebuild the tensor.
        let id_seq = cg.sequence(&[0, 0]).unwrap();
        let other_seq = cg.sequence(&[1, 0]).unwrap();
        table.insert(&id_seq, true);
        table.insert(&other_seq, true);
        let cg = CollinsGisinTensor::new(&ctx, &table, vec![vec![vec![0u16]], vec![vec![1u16]]]);

        assert!(elem.attempt_symbol_resolution(&cg, &factory));
        assert!(elem.has_symbols);
    }
}
