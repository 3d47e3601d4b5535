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
use moment_errors::BadFCError;
use moment_tensor::{IndexOrder, TensorKernel};

use crate::element::PolynomialElement;

/// A tensor of expectation-value polynomials for binary measurements: index
/// coordinate `0` on a party's axis means "not measured", any other value
/// selects one of that party's binary settings. The number of involved
/// parties `k` is the count of nonzero coordinates.
///
/// Every element, regardless of `k`, is built from the single identity
/// `Σ_{L⊆involved} (-1)^{k-|L|} 2^{|L|} m_L`, with `m_∅` the Collins-Gisin
/// offset of the all-identity index. This is the one formula the k=0, k=1,
/// and k=2 cases in the worked examples all satisfy; it replaces a set of
/// special-cased constructors that the reference implementation kept
/// separate for historical reasons.
pub struct FullCorrelatorTensor<'a, 'ctx, C, S> {
    cg: &'a CollinsGisinTensor<'ctx, C, S>,
    kernel: TensorKernel,
    /// `layout[party][setting]` for `setting > 0`: the Collins-Gisin local
    /// coordinate of that setting's "+1" outcome.
    layout: Vec<Vec<usize>>,
}

impl<'a, 'ctx, C: Context, S: SymbolTable> FullCorrelatorTensor<'a, 'ctx, C, S> {
    /// `outcome_counts[p]` lists the outcome count of each of party `p`'s
    /// binary settings, in the same global enumeration order used to build
    /// `cg`. Every entry must be `2`.
    pub fn new(cg: &'a CollinsGisinTensor<'ctx, C, S>, outcome_counts: Vec<Vec<usize>>) -> Result<Self, BadFCError> {
        let mut layout = Vec::with_capacity(outcome_counts.len());
        let mut global_mmt_id = 0usize;

        for (party, settings) in outcome_counts.into_iter().enumerate() {
            let mut coords = vec![0usize];
            for outcomes in settings {
                if outcomes != 2 {
                    return Err(BadFCError::NotBinary { party, outcomes });
                }
                let span = cg.measurement_span(global_mmt_id).expect("full correlator tensor out of sync with Collins-Gisin tensor");
                global_mmt_id += 1;
                coords.push(span.offset);
            }
            layout.push(coords);
        }

        let dims: Vec<usize> = layout.iter().map(Vec::len).collect();
        let kernel = TensorKernel::new(dims, IndexOrder::LastIndexMajor);
        Ok(Self { cg, kernel, layout })
    }

    #[must_use]
    pub fn kernel(&self) -> &TensorKernel {
        &self.kernel
    }

    #[must_use]
    pub fn party_count(&self) -> usize {
        self.layout.len()
    }

    pub fn element_at<F: PolynomialFactory<usize>>(&self, index: &[usize], factory: &F) -> Result<PolynomialElement, BadFCError> {
        self.kernel.validate_index(index)?;

        let involved: Vec<(usize, usize)> =
            index.iter().enumerate().filter(|&(_, &v)| v > 0).map(|(p, &v)| (p, self.layout[p][v])).collect();
        let k = involved.len();

        let mut terms = Vec::with_capacity(1 << k);
        for mask in 0u32..(1u32 << k) {
            let l = mask.count_ones() as usize;
            let sign = if (k - l) % 2 == 0 { 1.0 } else { -1.0 };
            let coefficient = sign * 2f64.powi(l as i32);

            let mut base = vec![0usize; self.party_count()];
            for (bit, &(party, cg_offset)) in involved.iter().enumerate() {
                if (mask >> bit) & 1 == 1 {
                    base[party] = cg_offset;
                }
            }
            let offset = self.cg.kernel().index_to_offset_no_checks(&base);
            terms.push(Term::new(offset, coefficient));
        }

        Ok(PolynomialElement::new(factory.build(terms)))
    }
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
    fn zero_parties_involved_yields_the_identity_element() {
        let (ctx, table) = fixture();
        let cg = CollinsGisinTensor::new(&ctx, &table, vec![vec![vec![0u16]], vec![vec![1u16]]]);
        let fc = FullCorrelatorTensor::new(&cg, vec![vec![2], vec![2]]).unwrap();
        let factory = DefaultPolynomialFactory::default();

        let elem = fc.element_at(&[0, 0], &factory).unwrap();
        assert_eq!(elem.cg_polynomial.len(), 1);
        assert_eq!(elem.cg_polynomial.terms()[0].coefficient, 1.0);
    }

    #[test]
    fn two_parties_involved_matches_the_worked_example() {
        let (ctx, table) = fixture();
        let cg = CollinsGisinTensor::new(&ctx, &table, vec![vec![vec![0u16]], vec![vec![1u16]]]);
        let fc = FullCorrelatorTensor::new(&cg, vec![vec![2], vec![2]]).unwrap();
        let factory = DefaultPolynomialFactory::default();

        let elem = fc.element_at(&[1, 1], &factory).unwrap();
        let mut coeffs: Vec<f64> = elem.cg_polynomial.terms().iter().map(|t| t.coefficient).collect();
        coeffs.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_eq!(coeffs, vec![-2.0, -2.0, 1.0, 4.0]);
    }

    #[test]
    fn non_binary_measurement_is_rejected() {
        let (ctx, table) = fixture();
        let cg = CollinsGisinTensor::new(&ctx, &table, vec![vec![vec![0u16]], vec![vec![1u16]]]);
        assert!(matches!(
            FullCorrelatorTensor::new(&cg, vec![vec![3], vec![2]]),
            Err(BadFCError::NotBinary { party: 0, outcomes: 3 })
        ));
    }
}
