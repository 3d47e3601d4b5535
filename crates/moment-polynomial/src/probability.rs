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
use moment_context::{Context, PolynomialFactory, SymbolTable, Term};
use moment_errors::BadPTError;
use moment_tensor::{IndexOrder, TensorKernel};

use crate::element::PolynomialElement;

/// A measurement's outcome count and whether every outcome (including what
/// would otherwise be the suppressed "last" one) is already stored
/// explicitly in the Collins-Gisin tensor beneath this one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeasurementSpec {
    pub outcome_count: usize,
    pub fully_explicit: bool,
}

/// How one probability-tensor coordinate along a party's axis maps back to
/// the Collins-Gisin tensor beneath it.
#[derive(Debug, Clone, Copy)]
enum Coordinate {
    /// No operator contributed by this party (outcome index `0`).
    Identity,
    /// Maps directly to one Collins-Gisin local coordinate.
    Explicit(usize),
    /// The suppressed outcome of a measurement: expands to `1 - sum` over
    /// the measurement's `cg_length` explicit local coordinates, starting
    /// at `cg_offset`.
    Implicit { cg_offset: usize, cg_length: usize },
}

/// Expands a Collins-Gisin tensor's measurement axes to include the
/// outcome each measurement leaves implicit, resolving every coordinate
/// into a polynomial over Collins-Gisin offsets via inclusion-exclusion.
pub struct ProbabilityTensor<'a, 'ctx, C, S> {
    cg: &'a CollinsGisinTensor<'ctx, C, S>,
    kernel: TensorKernel,
    layout: Vec<Vec<Coordinate>>,
}

impl<'a, 'ctx, C: Context, S: SymbolTable> ProbabilityTensor<'a, 'ctx, C, S> {
    /// `parties[p]` lists party `p`'s measurements, in the same order they
    /// were given to the underlying [`CollinsGisinTensor`]'s construction,
    /// enumerated globally the same way (party-major, then measurement
    /// order within party) so each spec lines up with its
    /// [`CollinsGisinTensor::measurement_span`].
    pub fn new(cg: &'a CollinsGisinTensor<'ctx, C, S>, parties: Vec<Vec<MeasurementSpec>>) -> Self {
        let mut layout = Vec::with_capacity(parties.len());
        let mut global_mmt_id = 0usize;

        for measurements in parties {
            let mut coords = vec![Coordinate::Identity];
            for spec in measurements {
                let span = cg.measurement_span(global_mmt_id).expect("probability tensor measurement out of sync with Collins-Gisin tensor");
                global_mmt_id += 1;
                for o in 0..spec.outcome_count {
                    let coord = if !spec.fully_explicit && o == spec.outcome_count - 1 {
                        Coordinate::Implicit { cg_offset: span.offset, cg_length: span.length }
                    } else {
                        Coordinate::Explicit(span.offset + o)
                    };
                    coords.push(coord);
                }
            }
            layout.push(coords);
        }

        let dims: Vec<usize> = layout.iter().map(Vec::len).collect();
        let kernel = TensorKernel::new(dims, IndexOrder::LastIndexMajor);
        Self { cg, kernel, layout }
    }

    #[must_use]
    pub fn kernel(&self) -> &TensorKernel {
        &self.kernel
    }

    #[must_use]
    pub fn party_count(&self) -> usize {
        self.layout.len()
    }

    /// Builds the Collins-Gisin-offset polynomial for one probability-tensor
    /// index via inclusion-exclusion over its implicit coordinates.
    pub fn element_at<F: PolynomialFactory<usize>>(&self, index: &[usize], factory: &F) -> Result<PolynomialElement, BadPTError> {
        self.kernel.validate_index(index)?;

        let coords: Vec<&Coordinate> = index.iter().enumerate().map(|(p, &idx)| &self.layout[p][idx]).collect();
        let implicit_positions: Vec<usize> = coords
            .iter()
            .enumerate()
            .filter(|(_, c)| matches!(c, Coordinate::Implicit { .. }))
            .map(|(p, _)| p)
            .collect();

        let mut terms = Vec::new();
        let subset_count = 1u32 << implicit_positions.len();
        for mask in 0..subset_count {
            let mut base = vec![0usize; self.party_count()];
            let mut free = Vec::new();
            for (p, coord) in coords.iter().enumerate() {
                match coord {
                    Coordinate::Identity => {}
                    Coordinate::Explicit(i) => base[p] = *i,
                    Coordinate::Implicit { cg_offset, cg_length } => {
                        let bit = implicit_positions.iter().position(|&x| x == p).unwrap();
                        if (mask >> bit) & 1 == 1 {
                            free.push((p, *cg_offset, *cg_length));
                        }
                    }
                }
            }
            let sign = if free.len() % 2 == 0 { 1.0 } else { -1.0 };
            expand_free_box(&free, &mut base, self.cg.kernel(), &mut terms, sign);
        }

        Ok(PolynomialElement::new(factory.build(terms)))
    }
}

fn expand_free_box(
    free: &[(usize, usize, usize)],
    base: &mut [usize],
    cg_kernel: &TensorKernel,
    terms: &mut Vec<Term<usize>>,
    sign: f64,
) {
    let Some((&(party, cg_offset, cg_length), rest)) = free.split_first() else {
        terms.push(Term::new(cg_kernel.index_to_offset_no_checks(base), sign));
        return;
    };
    for o in 0..cg_length {
        base[party] = cg_offset + o;
        expand_free_box(rest, base, cg_kernel, terms, sign);
    }
    base[party] = 0;
}

#[cfg(test)]
mod tests {
    use super::*;
    use moment_context::{DefaultPolynomialFactory, MapSymbolTable, PlainContext};
    use moment_rules::{ConjugationMode, OperatorRulebook, Precontext};

    fn binary_two_party_fixture() -> (PlainContext, MapSymbolTable) {
        let pc = Precontext::new(2, true);
        let book = OperatorRulebook::new(pc, ConjugationMode::SelfAdjoint);
        (PlainContext::new(pc, book, false), MapSymbolTable::new())
    }

    #[test]
    fn identity_element_is_the_constant_one() {
        let (ctx, table) = binary_two_party_fixture();
        let parties = vec![vec![vec![0u16]], vec![vec![1u16]]];
        let cg = CollinsGisinTensor::new(&ctx, &table, parties);
        let pt = ProbabilityTensor::new(&cg, vec![vec![MeasurementSpec { outcome_count: 2, fully_explicit: false }]; 2]);
        let factory = DefaultPolynomialFactory::default();

        let elem = pt.element_at(&[0, 0], &factory).unwrap();
        assert_eq!(elem.cg_polynomial.len(), 1);
        assert_eq!(elem.cg_polynomial.terms()[0].coefficient, 1.0);
    }

    #[test]
    fn fully_implicit_outcome_expands_to_four_terms() {
        let (ctx, table) = binary_two_party_fixture();
        let parties = vec![vec![vec![0u16]], vec![vec![1u16]]];
        let cg = CollinsGisinTensor::new(&ctx, &table, parties);
        let pt = ProbabilityTensor::new(&cg, vec![vec![MeasurementSpec { outcome_count: 2, fully_explicit: false }]; 2]);
        let factory = DefaultPolynomialFactory::default();

        // Both parties at their (implicit) second outcome: 1 - P(a0) - P(b0) + P(a0,b0).
        let elem = pt.element_at(&[2, 2], &factory).unwrap();
        assert_eq!(elem.cg_polynomial.len(), 4);
        let total: f64 = elem.cg_polynomial.terms().iter().map(|t| t.coefficient).sum();
        assert_eq!(total, 0.0);
    }
}
