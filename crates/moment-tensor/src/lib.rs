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

//! A tensor indexing kernel and an auto-storage tensor that transparently
//! dispatches between materialized and lazily-computed element storage.

mod auto_storage;
mod kernel;
mod offset_iter;

pub use auto_storage::{AutoStorageTensor, ElementView, StorageHint, StorageMode, TensorIter, TensorRange, TensorRangeIter};
pub use kernel::{IndexOrder, TensorKernel};
pub use offset_iter::MultiDimensionalOffsetIndexIterator;
