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
use moment_context::{Context, PolynomialFactory, SymbolTable};
use parking_lot::RwLock;
use tracing::{debug, instrument};

use crate::element::{fill_missing_polynomials, PolynomialElement};

/// Owns the element grid of a probability or full-correlator tensor that
/// may not have been built yet, refreshing it under the same
/// release-read/acquire-write/release-write/re-acquire-read discipline as
/// [`moment_collins_gisin::CollinsGisinMaintainer`]: absent grids are built
/// on first refresh, fully-resolved ones short-circuit, and partially
/// resolved ones retry symbol resolution.
pub struct PolynomialGridMaintainer {
    elements: RwLock<Option<Vec<PolynomialElement>>>,
}

impl PolynomialGridMaintainer {
    #[must_use]
    pub fn new() -> Self {
        Self { elements: RwLock::new(None) }
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.elements.read().as_ref().is_some_and(|es| es.iter().all(|e| e.has_symbols))
    }

    /// `build` produces the initial, CG-offset-only element grid (e.g. by
    /// walking a [`crate::ProbabilityTensor`] or [`crate::FullCorrelatorTensor`]
    /// over every index); it only runs once, the first time the grid is
    /// found absent.
    #[instrument(skip(self, build, cg, factory))]
    pub fn refresh<C: Context, S: SymbolTable, F: PolynomialFactory<i64>>(
        &self,
        build: impl FnOnce() -> Vec<PolynomialElement>,
        cg: &CollinsGisinTensor<'_, C, S>,
        factory: &F,
    ) -> bool {
        let read = self.elements.read();
        match read.as_ref() {
            Some(es) if es.iter().all(|e| e.has_symbols) => true,
            Some(_) => {
                drop(read);
                let mut write = self.elements.write();
                let result = match write.as_mut() {
                    Some(es) => {
                        fill_missing_polynomials(es, cg, factory);
                        es.iter().all(|e| e.has_symbols)
                    }
                    None => false,
                };
                drop(write);
                debug!(result, "refreshed a partially resolved polynomial grid");
                let _reacquired = self.elements.read();
                result
            }
            None => {
                drop(read);
                let mut write = self.elements.write();
                if write.is_none() {
                    let mut es = build();
                    fill_missing_polynomials(&mut es, cg, factory);
                    let complete = es.iter().all(|e| e.has_symbols);
                    *write = Some(es);
                    drop(write);
                    debug!(complete, "built polynomial grid on first refresh");
                    let _reacquired = self.elements.read();
                    return complete;
                }
                let complete = write.as_ref().is_some_and(|es| es.iter().all(|e| e.has_symbols));
                drop(write);
                let _reacquired = self.elements.read();
                complete
            }
        }
    }

    /// Runs `f` against the owned grid under the read lock, if it has been
    /// built. Callers that need it to exist first should call [`Self::refresh`].
    pub fn with_elements<R>(&self, f: impl FnOnce(Option<&[PolynomialElement]>) -> R) -> R {
        f(self.elements.read().as_deref())
    }
}

impl Default for PolynomialGridMaintainer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use moment_collins_gisin::CollinsGisinTensor;
    use moment_context::{DefaultPolynomialFactory, MapSymbolTable, PlainContext, Term};
    use moment_rules::{ConjugationMode, OperatorRulebook, Precontext};

    fn fixture() -> (PlainContext, MapSymbolTable) {
        let pc = Precontext::new(2, true);
        let book = OperatorRulebook::new(pc, ConjugationMode::SelfAdjoint);
        (PlainContext::new(pc, book, false), MapSymbolTable::new())
    }

    #[test]
    fn refresh_builds_once_and_then_only_fills_gaps() {
        let (ctx, mut table) = fixture();
        let parties = vec![vec![vec![0u16]], vec![vec![1u16]]];
        let cg = CollinsGisinTensor::new(&ctx, &table, parties.clone());
        let factory = DefaultPolynomialFactory::default();
        let maintainer = PolynomialGridMaintainer::new();

        let build = || vec![PolynomialElement::new(factory.build(vec![Term::new(0usize, 1.0), Term::new(1, -1.0)]))];
        assert!(!maintainer.refresh(build, &cg, &factory));
        assert!(maintainer.with_elements(|es| es.is_some()));
        assert!(!maintainer.is_complete());

        let id_seq = cg.sequence(&[0, 0]).unwrap();
        let other_seq = cg.sequence(&[1, 0]).unwrap();
        table.insert(&id_seq, true);
        table.insert(&other_seq, true);
        let cg = CollinsGisinTensor::new(&ctx, &table, parties);

        // Second refresh must not rebuild the grid, only fill the gap.
        assert!(maintainer.refresh(|| panic!("grid builder must not run twice"), &cg, &factory));
        assert!(maintainer.is_complete());
    }
}
