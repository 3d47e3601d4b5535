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

//! Term rewriting and auto-storage tensor algebra for noncommutative
//! polynomial optimization.
//!
//! This crate is a facade over the workspace's layered implementation:
//! operator sequences and their shortlex order (`moment-sequence`),
//! Knuth-Bendix completion over them (`moment-rules`), a generic
//! auto-storage tensor kernel (`moment-tensor`), the scenario-side traits
//! that plug an operator algebra into it (`moment-context`), and the two
//! concrete tensor layers built on top: Collins-Gisin indexing
//! (`moment-collins-gisin`) and probability/full-correlator polynomials
//! (`moment-polynomial`). Depend on the sub-crates directly if you only
//! need one layer; this crate exists for callers who want the whole stack
//! under one name.

pub use moment_collins_gisin::{CgRange, CollinsGisinEntry, CollinsGisinMaintainer, CollinsGisinTensor, GlobalMeasurementIndex};
pub use moment_context::{Context, DefaultPolynomialFactory, MapSymbolTable, PlainContext, Polynomial, PolynomialFactory, SymbolLookup, SymbolTable, Term};
pub use moment_errors::{BadCGError, BadFCError, BadHint, BadPTError, BadTensor, BadTensorIndex, InvalidRule};
pub use moment_polynomial::{explicit_value_rules, fill_missing_polynomials, FullCorrelatorTensor, MeasurementSpec, PolynomialElement, PolynomialGridMaintainer, ProbabilityTensor};
pub use moment_rules::{ConjugationMode, OperatorRule, OperatorRulebook, Precontext};
pub use moment_sequence::{HashedSequence, OperatorId, SequenceStorage, ShortlexHasher, Sign};
pub use moment_tensor::{AutoStorageTensor, ElementView, IndexOrder, MultiDimensionalOffsetIndexIterator, StorageHint, StorageMode, TensorIter, TensorKernel, TensorRange, TensorRangeIter};
