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

//! The Collins-Gisin tensor: an indexing scheme whose coordinates name
//! measurement-outcome operator sequences, with lazily-resolved symbol ids
//! cached behind a reader-writer lock.

mod entry;
mod maintainer;
mod tensor;

pub use entry::{CollinsGisinEntry, GlobalMeasurementIndex};
pub use maintainer::CollinsGisinMaintainer;
pub use tensor::{CgRange, CollinsGisinTensor};
