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

use moment_context::{Context, SymbolTable};
use moment_sequence::OperatorId;
use parking_lot::RwLock;
use tracing::{debug, instrument};

use crate::tensor::CollinsGisinTensor;

/// Owns a [`CollinsGisinTensor`] that may not exist yet, and refreshes it
/// under the release-read/acquire-write/release-write/re-acquire-read
/// discipline: absent tensors are created on first refresh, complete ones
/// short-circuit without ever taking the write lock, and incomplete ones
/// retry symbol resolution.
pub struct CollinsGisinMaintainer<'a, C, S> {
    context: &'a C,
    symbol_table: &'a S,
    parties: Vec<Vec<Vec<OperatorId>>>,
    tensor: RwLock<Option<CollinsGisinTensor<'a, C, S>>>,
}

impl<'a, C: Context, S: SymbolTable> CollinsGisinMaintainer<'a, C, S> {
    #[must_use]
    pub fn new(context: &'a C, symbol_table: &'a S, parties: Vec<Vec<Vec<OperatorId>>>) -> Self {
        Self { context, symbol_table, parties, tensor: RwLock::new(None) }
    }

    /// True once the owned tensor exists and every entry has a symbol.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.tensor.read().as_ref().is_some_and(CollinsGisinTensor::has_all_symbols)
    }

    /// Runs one step of the refresh protocol, returning whether the tensor
    /// is complete afterward. Never blocks longer than one lock upgrade: a
    /// caller that gets `false` back should call again if it still needs
    /// the tensor complete.
    #[instrument(skip(self))]
    pub fn refresh(&self) -> bool {
        let read = self.tensor.read();
        match read.as_ref() {
            Some(tensor) if tensor.has_all_symbols() => true,
            Some(_) => {
                drop(read);
                let mut write = self.tensor.write();
                let result = write.as_ref().is_some_and(CollinsGisinTensor::fill_missing_symbols);
                drop(write);
                debug!(result, "refreshed an incomplete Collins-Gisin tensor");
                let _reacquired = self.tensor.read();
                result
            }
            None => {
                drop(read);
                let mut write = self.tensor.write();
                if write.is_none() {
                    let tensor = CollinsGisinTensor::new(self.context, self.symbol_table, self.parties.clone());
                    let complete = tensor.has_all_symbols();
                    *write = Some(tensor);
                    drop(write);
                    debug!(complete, "created Collins-Gisin tensor on first refresh");
                    let _reacquired = self.tensor.read();
                    return complete;
                }
                // Another thread created it between our read and write acquisitions.
                let complete = write.as_ref().is_some_and(CollinsGisinTensor::has_all_symbols);
                drop(write);
                let _reacquired = self.tensor.read();
                complete
            }
        }
    }

    /// Runs `f` against the owned tensor under the read lock, if it has
    /// been created. Callers that need it to exist first should call
    /// [`Self::refresh`].
    pub fn with_tensor<R>(&self, f: impl FnOnce(Option<&CollinsGisinTensor<'a, C, S>>) -> R) -> R {
        f(self.tensor.read().as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use moment_context::{MapSymbolTable, PlainContext};
    use moment_rules::{ConjugationMode, OperatorRulebook, Precontext};

    fn fixture() -> (PlainContext, MapSymbolTable) {
        let pc = Precontext::new(2, true);
        let book = OperatorRulebook::new(pc, ConjugationMode::SelfAdjoint);
        (PlainContext::new(pc, book, false), MapSymbolTable::new())
    }

    #[test]
    fn refresh_creates_the_tensor_on_first_call() {
        let (ctx, table) = fixture();
        let maintainer = CollinsGisinMaintainer::new(&ctx, &table, vec![vec![vec![0u16]], vec![vec![1u16]]]);

        assert!(maintainer.with_tensor(|t| t.is_none()));
        let complete = maintainer.refresh();
        assert!(maintainer.with_tensor(|t| t.is_some()));
        // Empty symbol table: tensor exists but isn't complete yet.
        assert!(!complete);
    }

    #[test]
    fn refresh_short_circuits_once_complete() {
        let (ctx, mut table) = fixture();
        let id_seq = ctx.canonicalize(&[]);
        let other_seq = ctx.canonicalize(&[1]);
        table.insert(&id_seq, true);
        table.insert(&other_seq, true);

        let maintainer = CollinsGisinMaintainer::new(&ctx, &table, vec![vec![vec![0u16]], vec![vec![1u16]]]);
        assert!(maintainer.refresh());
        assert!(maintainer.is_complete());

        // A second refresh must not need the write lock to report the same answer.
        assert!(maintainer.refresh());
    }
}
