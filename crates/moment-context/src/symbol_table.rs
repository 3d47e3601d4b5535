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

use indexmap::IndexMap;
use moment_sequence::{HashedSequence, Sign};

/// What a symbol table reports about a canonical sequence it already knows
/// about: the symbol id it was assigned, the `(real, imaginary)` pair of
/// basis indices it occupies, whether this entry is an alias for another
/// sequence's symbol (rather than the sequence that first defined it), and
/// whether the symbol is self-conjugate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SymbolLookup {
    pub id: i64,
    pub basis_key: (i64, i64),
    pub is_aliased: bool,
    pub is_hermitian: bool,
}

/// A table from canonical operator sequences to the symbols that represent
/// them. Monotonic: once a sequence is looked up successfully its id never
/// changes, and `size()` never decreases.
pub trait SymbolTable {
    /// The number of distinct symbols registered so far.
    fn size(&self) -> usize;

    /// Looks up the symbol for a canonical sequence, if one has been
    /// registered. Renamed from the reference implementation's `where`,
    /// which is a reserved word in Rust.
    fn where_(&self, sequence: &HashedSequence) -> Option<SymbolLookup>;
}

/// A flat, in-memory [`SymbolTable`] keyed directly by `(hash, sign)` pairs,
/// with no canonicalization of its own: callers are expected to hand it
/// already-canonical sequences, the way a bare symbol table is populated
/// directly in tests rather than through a running compiler session.
#[derive(Debug, Clone, Default)]
pub struct MapSymbolTable {
    entries: IndexMap<(u64, Sign), SymbolLookup>,
    next_id: i64,
}

impl MapSymbolTable {
    #[must_use]
    pub fn new() -> Self {
        Self { entries: IndexMap::new(), next_id: 1 }
    }

    /// Registers `sequence` as a brand-new symbol, or returns the id it
    /// already has. `is_hermitian` governs whether the assigned basis key
    /// has a real part only (`(id, 0)`) or a real and imaginary part
    /// (`(id, id)`).
    pub fn insert(&mut self, sequence: &HashedSequence, is_hermitian: bool) -> i64 {
        let key = (sequence.hash(), sequence.sign());
        if let Some(existing) = self.entries.get(&key) {
            return existing.id;
        }
        let id = self.next_id;
        self.next_id += 1;
        let basis_key = if is_hermitian { (id, 0) } else { (id, id) };
        self.entries.insert(key, SymbolLookup { id, basis_key, is_aliased: false, is_hermitian });
        id
    }

    /// Registers `sequence` as an alias of `target`'s existing symbol.
    /// Returns `None` if `target` has not been registered yet.
    pub fn alias(&mut self, sequence: &HashedSequence, target: &HashedSequence) -> Option<i64> {
        let target_lookup = *self.entries.get(&(target.hash(), target.sign()))?;
        let alias_key = (sequence.hash(), sequence.sign());
        let aliased = SymbolLookup { is_aliased: true, ..target_lookup };
        self.entries.insert(alias_key, aliased);
        Some(target_lookup.id)
    }
}

impl SymbolTable for MapSymbolTable {
    fn size(&self) -> usize {
        (self.next_id - 1).max(0) as usize
    }

    fn where_(&self, sequence: &HashedSequence) -> Option<SymbolLookup> {
        self.entries.get(&(sequence.hash(), sequence.sign())).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use moment_sequence::ShortlexHasher;

    #[test]
    fn insert_is_idempotent_and_size_is_monotonic() {
        let hasher = ShortlexHasher::new(2);
        let seq = HashedSequence::new(vec![0u16, 1], Sign::Positive, &hasher);
        let mut table = MapSymbolTable::new();

        let id_first = table.insert(&seq, true);
        assert_eq!(table.size(), 1);
        let id_second = table.insert(&seq, true);
        assert_eq!(id_first, id_second);
        assert_eq!(table.size(), 1);

        let other = HashedSequence::new(vec![1u16, 0], Sign::Positive, &hasher);
        table.insert(&other, true);
        assert_eq!(table.size(), 2);
    }

    #[test]
    fn alias_resolves_to_the_target_symbol() {
        let hasher = ShortlexHasher::new(2);
        let seq = HashedSequence::new(vec![0u16], Sign::Positive, &hasher);
        let conj = HashedSequence::new(vec![0u16], Sign::Negative, &hasher);
        let mut table = MapSymbolTable::new();
        let id = table.insert(&seq, false);

        let aliased_id = table.alias(&conj, &seq).unwrap();
        assert_eq!(aliased_id, id);
        assert!(table.where_(&conj).unwrap().is_aliased);
        assert!(!table.where_(&seq).unwrap().is_aliased);
    }

    #[test]
    fn where_returns_none_for_unregistered_sequence() {
        let hasher = ShortlexHasher::new(2);
        let table = MapSymbolTable::new();
        let seq = HashedSequence::new(vec![0u16], Sign::Positive, &hasher);
        assert!(table.where_(&seq).is_none());
    }
}
