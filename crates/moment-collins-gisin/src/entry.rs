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

use moment_sequence::HashedSequence;

/// A single coordinate of a [`crate::CollinsGisinTensor`]: the canonical
/// operator sequence it names, and (once resolved) the symbol identifying
/// it. `symbol_id` and `real_index` are `-1` until a symbol table lookup
/// succeeds.
#[derive(Debug, Clone, PartialEq)]
pub struct CollinsGisinEntry {
    pub sequence: HashedSequence,
    pub symbol_id: i64,
    pub real_index: i64,
    pub is_alias: bool,
}

impl CollinsGisinEntry {
    #[must_use]
    pub fn new(sequence: HashedSequence) -> Self {
        Self { sequence, symbol_id: -1, real_index: -1, is_alias: false }
    }

    #[must_use]
    pub fn has_symbol(&self) -> bool {
        self.symbol_id >= 0
    }
}

/// Maps a linear (global) measurement id to where it sits within the
/// tensor: which party dimension it belongs to, and its `(offset, length)`
/// span of non-implicit outcomes within that dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlobalMeasurementIndex {
    pub party: usize,
    pub offset: usize,
    pub length: usize,
}
