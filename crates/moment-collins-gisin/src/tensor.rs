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

use std::collections::BTreeSet;

use moment_context::{Context, SymbolTable};
use moment_errors::BadCGError;
use moment_sequence::OperatorId;
use moment_tensor::{IndexOrder, MultiDimensionalOffsetIndexIterator, TensorKernel};
use parking_lot::RwLock;
use tracing::{debug, instrument};

use crate::entry::{CollinsGisinEntry, GlobalMeasurementIndex};

/// The mutable part of a [`CollinsGisinTensor`]: the materialized entries
/// and the set of offsets still awaiting a symbol. Guarded by a single
/// reader-writer lock so the two never drift out of sync under concurrent
/// access.
struct CgState {
    entries: Vec<CollinsGisinEntry>,
    missing: BTreeSet<usize>,
}

/// An indexing scheme over measurement-outcome operator sequences: one
/// dimension per party, the zeroth coordinate of each standing for "no
/// operator contributed by this party" (the implicit identity outcome).
pub struct CollinsGisinTensor<'a, C, S> {
    context: &'a C,
    symbol_table: &'a S,
    kernel: TensorKernel,
    /// `dimension_op_ids[party][idx]` for `idx > 0`; index `0` is a
    /// placeholder never read during sequence construction.
    dimension_op_ids: Vec<Vec<OperatorId>>,
    gm_index: Vec<GlobalMeasurementIndex>,
    state: RwLock<CgState>,
}

impl<'a, C: Context, S: SymbolTable> CollinsGisinTensor<'a, C, S> {
    /// Builds a tensor from, for each party, the list of its measurements'
    /// non-implicit outcome operator ids (one inner `Vec` per measurement).
    /// Dimension `d`'s length is `1 + sum(outcome_count - 1)` over that
    /// party's measurements; the global measurement index table is built by
    /// enumerating parties then measurements in the order given.
    #[instrument(skip(context, symbol_table, parties))]
    pub fn new(context: &'a C, symbol_table: &'a S, parties: Vec<Vec<Vec<OperatorId>>>) -> Self {
        let mut dimension_op_ids = Vec::with_capacity(parties.len());
        let mut gm_index = Vec::new();

        for (party, measurements) in parties.into_iter().enumerate() {
            let mut ids = vec![0 as OperatorId];
            for outcomes in measurements {
                let offset = ids.len();
                let length = outcomes.len();
                ids.extend(outcomes);
                gm_index.push(GlobalMeasurementIndex { party, offset, length });
            }
            dimension_op_ids.push(ids);
        }

        let dims: Vec<usize> = dimension_op_ids.iter().map(Vec::len).collect();
        let kernel = TensorKernel::new(dims, IndexOrder::LastIndexMajor);

        let mut tensor = Self {
            context,
            symbol_table,
            kernel,
            dimension_op_ids,
            gm_index,
            state: RwLock::new(CgState { entries: Vec::new(), missing: BTreeSet::new() }),
        };
        tensor.do_initial_symbol_search();
        tensor
    }

    #[must_use]
    pub fn kernel(&self) -> &TensorKernel {
        &self.kernel
    }

    #[must_use]
    pub fn measurement_count(&self) -> usize {
        self.gm_index.len()
    }

    /// The `(party, offset, length)` triple for a global measurement id, if
    /// it exists. The polynomial tensor family uses this to align its own,
    /// wider per-measurement spans with the narrower ones stored here.
    #[must_use]
    pub fn measurement_span(&self, mmt_id: usize) -> Option<GlobalMeasurementIndex> {
        self.gm_index.get(mmt_id).copied()
    }

    #[must_use]
    pub fn party_count(&self) -> usize {
        self.dimension_op_ids.len()
    }

    fn build_entry(&self, index: &[usize]) -> CollinsGisinEntry {
        let mut raw: Vec<OperatorId> = Vec::new();
        for (party, &idx) in index.iter().enumerate() {
            if idx > 0 {
                raw.push(self.dimension_op_ids[party][idx]);
            }
        }
        let sequence = self.context.canonicalize(&raw);
        let mut entry = CollinsGisinEntry::new(sequence);
        if let Some(lookup) = self.symbol_table.where_(&entry.sequence) {
            entry.symbol_id = lookup.id;
            entry.real_index = lookup.basis_key.0;
            entry.is_alias = lookup.is_aliased;
        }
        entry
    }

    /// Materializes every entry and records which offsets have no symbol
    /// yet.
    fn do_initial_symbol_search(&mut self) {
        let mut entries = Vec::with_capacity(self.kernel.element_count());
        let mut missing = BTreeSet::new();
        for offset in 0..self.kernel.element_count() {
            let index = self.kernel.offset_to_index_no_checks(offset);
            let entry = self.build_entry(&index);
            if !entry.has_symbol() {
                missing.insert(offset);
            }
            entries.push(entry);
        }
        debug!(missing = missing.len(), total = entries.len(), "initial Collins-Gisin symbol search");
        self.state = RwLock::new(CgState { entries, missing });
    }

    /// Retries the symbol table for every still-missing offset. Returns
    /// whether every entry is now resolved.
    #[instrument(skip(self))]
    pub fn fill_missing_symbols(&self) -> bool {
        {
            let state = self.state.read();
            if state.missing.is_empty() {
                return true;
            }
        }

        let mut state = self.state.write();
        let pending: Vec<usize> = state.missing.iter().copied().collect();
        for offset in pending {
            let sequence = state.entries[offset].sequence.clone();
            if let Some(lookup) = self.symbol_table.where_(&sequence) {
                let entry = &mut state.entries[offset];
                entry.symbol_id = lookup.id;
                entry.real_index = lookup.basis_key.0;
                entry.is_alias = lookup.is_aliased;
                state.missing.remove(&offset);
            }
        }
        state.missing.is_empty()
    }

    #[must_use]
    pub fn has_all_symbols(&self) -> bool {
        self.state.read().missing.is_empty()
    }

    #[must_use]
    pub fn missing_count(&self) -> usize {
        self.state.read().missing.len()
    }

    /// Fails with every still-unresolved entry's operator sequence, batched
    /// into a single diagnostic, if any offset still lacks a symbol.
    /// Callers that need the whole tensor resolved before reading from it
    /// should call [`Self::fill_missing_symbols`] first.
    pub fn require_all_symbols(&self) -> Result<(), BadCGError> {
        let state = self.state.read();
        if state.missing.is_empty() {
            return Ok(());
        }
        let offending = state.missing.iter().map(|&offset| state.entries[offset].sequence.to_string()).collect();
        Err(BadCGError::MissingSymbols(offending))
    }

    /// The symbol id cached at a linear offset, if resolved. Used by the
    /// polynomial tensor family, which addresses Collins-Gisin entries by
    /// offset rather than by multi-dimensional index.
    #[must_use]
    pub fn symbol_at_offset(&self, offset: usize) -> Option<i64> {
        let state = self.state.read();
        let entry = state.entries.get(offset)?;
        entry.has_symbol().then_some(entry.symbol_id)
    }

    pub fn sequence(&self, index: &[usize]) -> Result<moment_sequence::HashedSequence, BadCGError> {
        self.kernel.validate_index(index)?;
        let offset = self.kernel.index_to_offset_no_checks(index);
        Ok(self.state.read().entries[offset].sequence.clone())
    }

    pub fn symbol(&self, index: &[usize]) -> Result<i64, BadCGError> {
        self.kernel.validate_index(index)?;
        let offset = self.kernel.index_to_offset_no_checks(index);
        let state = self.state.read();
        let entry = &state.entries[offset];
        if entry.has_symbol() {
            Ok(entry.symbol_id)
        } else {
            Err(BadCGError::MissingIndex { offset, sequence: entry.sequence.to_string() })
        }
    }

    pub fn real_index(&self, index: &[usize]) -> Result<i64, BadCGError> {
        self.kernel.validate_index(index)?;
        let offset = self.kernel.index_to_offset_no_checks(index);
        let state = self.state.read();
        let entry = &state.entries[offset];
        if entry.has_symbol() {
            Ok(entry.real_index)
        } else {
            Err(BadCGError::MissingIndex { offset, sequence: entry.sequence.to_string() })
        }
    }

    /// Splices the dimensions named by `mmt_ids` (each collapsed to one
    /// slot if its matching entry in `fixed_outcomes` is non-negative),
    /// leaving every other party's dimension at full extent.
    pub fn measurement_to_range(
        &self,
        mmt_ids: &[usize],
        fixed_outcomes: Option<&[i64]>,
    ) -> Result<CgRange<'_, 'a, C, S>, BadCGError> {
        let dims = self.kernel.dimensions();
        let mut min = vec![0usize; dims.len()];
        let mut max = dims.to_vec();
        let mut seen_parties = BTreeSet::new();

        for (i, &mmt_id) in mmt_ids.iter().enumerate() {
            let gmi = *self.gm_index.get(mmt_id).ok_or(BadCGError::BadMeasurementIndex(mmt_id))?;
            if !seen_parties.insert(gmi.party) {
                return Err(BadCGError::DuplicateParty(gmi.party));
            }
            let fixed = fixed_outcomes.and_then(|f| f.get(i)).copied().unwrap_or(-1);
            if fixed >= 0 {
                let start = gmi.offset + fixed as usize;
                min[gmi.party] = start;
                max[gmi.party] = start + 1;
            } else {
                min[gmi.party] = gmi.offset;
                max[gmi.party] = gmi.offset + gmi.length;
            }
        }

        self.kernel.validate_range(&min, &max)?;
        Ok(CgRange { tensor: self, min, max })
    }
}

/// A sub-box of a [`CollinsGisinTensor`], holding the read lock for its
/// lifetime so the entries it yields stay consistent across iteration.
pub struct CgRange<'a, 'ctx, C, S> {
    tensor: &'a CollinsGisinTensor<'ctx, C, S>,
    min: Vec<usize>,
    max: Vec<usize>,
}

impl<'a, 'ctx, C: Context, S: SymbolTable> CgRange<'a, 'ctx, C, S> {
    #[must_use]
    pub fn dimensions(&self) -> Vec<usize> {
        self.min.iter().zip(self.max.iter()).map(|(a, b)| b - a).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.dimensions().iter().product()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Offsets (into the tensor's own offset space) of every entry in this
    /// range, in last-index-major order.
    #[must_use]
    pub fn offsets(&self) -> Vec<usize> {
        let mut mdoii = MultiDimensionalOffsetIndexIterator::new(self.min.clone(), self.max.clone());
        let mut offsets = Vec::with_capacity(self.len());
        while !mdoii.is_done() {
            offsets.push(self.tensor.kernel.index_to_offset_no_checks(mdoii.index()));
            mdoii.advance();
        }
        offsets
    }

    /// Clones the entries in this range out from under the tensor's lock.
    #[must_use]
    pub fn entries(&self) -> Vec<CollinsGisinEntry> {
        let state = self.tensor.state.read();
        self.offsets().into_iter().map(|off| state.entries[off].clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use moment_context::{MapSymbolTable, PlainContext};
    use moment_rules::{ConjugationMode, OperatorRulebook, Precontext};

    fn context() -> PlainContext {
        let pc = Precontext::new(4, true);
        let book = OperatorRulebook::new(pc, ConjugationMode::SelfAdjoint);
        PlainContext::new(pc, book, false)
    }

    fn two_binary_parties<'a>(ctx: &'a PlainContext, table: &'a MapSymbolTable) -> CollinsGisinTensor<'a, PlainContext, MapSymbolTable> {
        // Party 0 uses raw ops {0}, party 1 uses raw ops {1}, one binary
        // measurement each (one explicit outcome, the second is implicit).
        let parties = vec![vec![vec![0u16]], vec![vec![1u16]]];
        CollinsGisinTensor::new(ctx, table, parties)
    }

    #[test]
    fn dimensions_account_for_the_implicit_outcome() {
        let ctx = context();
        let table = MapSymbolTable::new();
        let cg = two_binary_parties(&ctx, &table);
        assert_eq!(cg.kernel().dimensions(), &[2, 2]);
        assert_eq!(cg.measurement_count(), 2);
        assert_eq!(cg.party_count(), 2);
    }

    #[test]
    fn initial_search_reports_every_entry_missing_against_an_empty_table() {
        let ctx = context();
        let table = MapSymbolTable::new();
        let cg = two_binary_parties(&ctx, &table);
        assert!(!cg.has_all_symbols());
        assert_eq!(cg.missing_count(), cg.kernel().element_count());
    }

    #[test]
    fn measurement_to_range_fixes_one_party_and_leaves_the_other_full() {
        let ctx = context();
        let table = MapSymbolTable::new();
        // Party 0's single measurement has three explicit outcomes (raw ops
        // {0,1,2}), so its span has width 3: wide enough that "fixed to one
        // outcome" and "left at full extent" are visibly different widths.
        let parties = vec![vec![vec![0u16, 1u16, 2u16]], vec![vec![3u16]]];
        let cg = CollinsGisinTensor::new(&ctx, &table, parties);

        let range = cg.measurement_to_range(&[0], None).unwrap();
        assert_eq!(range.dimensions(), vec![3, 2]);

        let fixed = cg.measurement_to_range(&[0], Some(&[1])).unwrap();
        assert_eq!(fixed.dimensions(), vec![1, 2]);
    }

    #[test]
    fn require_all_symbols_batches_every_missing_sequence() {
        let ctx = context();
        let table = MapSymbolTable::new();
        let cg = two_binary_parties(&ctx, &table);
        match cg.require_all_symbols() {
            Err(BadCGError::MissingSymbols(offending)) => {
                assert_eq!(offending.len(), cg.kernel().element_count());
            }
            other => panic!("expected BadCGError::MissingSymbols, got {other:?}"),
        }
    }

    #[test]
    fn measurement_to_range_rejects_duplicate_party() {
        let ctx = Precontext::new(2, true);
        let book = OperatorRulebook::new(ctx, ConjugationMode::SelfAdjoint);
        let plain = PlainContext::new(ctx, book, false);
        let table = MapSymbolTable::new();
        let parties = vec![vec![vec![0u16], vec![1u16]]];
        let cg = CollinsGisinTensor::new(&plain, &table, parties);
        assert!(matches!(cg.measurement_to_range(&[0, 1], None), Err(BadCGError::DuplicateParty(0))));
    }
}
