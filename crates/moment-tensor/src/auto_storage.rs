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

use std::ops::Deref;

use moment_errors::BadTensor;

use crate::kernel::{IndexOrder, TensorKernel};
use crate::offset_iter::MultiDimensionalOffsetIndexIterator;

/// A caller's preference for how an [`AutoStorageTensor`] should store its
/// elements. `Automatic` defers to the element count against a threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageHint {
    Virtual,
    Explicit,
    Automatic,
}

/// The storage mode an [`AutoStorageTensor`] actually settled on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageMode {
    Virtual,
    Explicit,
}

fn resolve_storage_mode(hint: StorageHint, element_count: usize, threshold: usize) -> StorageMode {
    match hint {
        StorageHint::Explicit => StorageMode::Explicit,
        StorageHint::Virtual => StorageMode::Virtual,
        StorageHint::Automatic => {
            if element_count > threshold {
                StorageMode::Virtual
            } else {
                StorageMode::Explicit
            }
        }
    }
}

/// A view onto a single tensor element: either borrowed from explicit
/// storage, or owned because it was just materialized on demand.
#[derive(Debug, Clone)]
pub enum ElementView<'a, T> {
    Borrowed(&'a T),
    Owned(T),
}

impl<T> Deref for ElementView<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        match self {
            ElementView::Borrowed(r) => r,
            ElementView::Owned(v) => v,
        }
    }
}

/// A tensor whose elements are either materialized once at construction
/// (`Explicit`) or computed lazily on every access (`Virtual`), with the
/// choice made automatically from the element count unless the caller
/// overrides it.
///
/// `make` is called to produce any element not already in explicit
/// storage: at construction time for every element if `Explicit`, or on
/// each access if `Virtual`.
pub struct AutoStorageTensor<T> {
    kernel: TensorKernel,
    mode: StorageMode,
    data: Option<Vec<T>>,
    make: Box<dyn Fn(&[usize]) -> T + Send + Sync>,
}

impl<T> AutoStorageTensor<T> {
    pub fn new(
        dimensions: Vec<usize>,
        hint: StorageHint,
        threshold: usize,
        make: impl Fn(&[usize]) -> T + Send + Sync + 'static,
    ) -> Self {
        let kernel = TensorKernel::new(dimensions, IndexOrder::LastIndexMajor);
        let mode = resolve_storage_mode(hint, kernel.element_count(), threshold);
        let make: Box<dyn Fn(&[usize]) -> T + Send + Sync> = Box::new(make);
        let data = if mode == StorageMode::Explicit {
            Some((0..kernel.element_count()).map(|off| make(&kernel.offset_to_index_no_checks(off))).collect())
        } else {
            None
        };
        Self { kernel, mode, data, make }
    }

    #[must_use]
    pub fn kernel(&self) -> &TensorKernel {
        &self.kernel
    }

    #[must_use]
    pub fn storage_mode(&self) -> StorageMode {
        self.mode
    }

    /// The explicitly materialized backing store, if any.
    pub fn data(&self) -> Result<&[T], BadTensor> {
        self.data.as_deref().ok_or(BadTensor::NoDataStored)
    }

    pub fn at(&self, index: &[usize]) -> Result<ElementView<'_, T>, BadTensor> {
        self.kernel.validate_index(index)?;
        Ok(self.at_no_checks(index))
    }

    pub fn at_offset(&self, offset: usize) -> Result<ElementView<'_, T>, BadTensor> {
        self.kernel.validate_offset(offset)?;
        match &self.data {
            Some(data) => Ok(ElementView::Borrowed(&data[offset])),
            None => {
                let index = self.kernel.offset_to_index_no_checks(offset);
                Ok(ElementView::Owned((self.make)(&index)))
            }
        }
    }

    fn at_no_checks(&self, index: &[usize]) -> ElementView<'_, T> {
        match &self.data {
            Some(data) => {
                let offset = self.kernel.index_to_offset_no_checks(index);
                ElementView::Borrowed(&data[offset])
            }
            None => ElementView::Owned((self.make)(index)),
        }
    }

    /// Constructs a range over the half-open box `[min, max)`.
    pub fn splice(&self, min: Vec<usize>, max: Vec<usize>) -> Result<TensorRange<'_, T>, BadTensor> {
        self.kernel.validate_range(&min, &max)?;
        Ok(TensorRange::new(self, min, max))
    }

    pub fn iter(&self) -> TensorIter<'_, T> {
        let max = self.kernel.dimensions().to_vec();
        let min = vec![0usize; max.len()];
        TensorIter { tensor: self, mdoii: MultiDimensionalOffsetIndexIterator::new(min, max) }
    }
}

/// A sub-box of an [`AutoStorageTensor`], iterated in last-index-major
/// order. Not `Send`/`Sync`: a concurrent consumer must clone the bounds
/// and build its own range.
pub struct TensorRange<'a, T> {
    tensor: &'a AutoStorageTensor<T>,
    min: Vec<usize>,
    max: Vec<usize>,
}

impl<'a, T> TensorRange<'a, T> {
    fn new(tensor: &'a AutoStorageTensor<T>, min: Vec<usize>, max: Vec<usize>) -> Self {
        Self { tensor, min, max }
    }

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

    #[must_use]
    pub fn iter(&self) -> TensorRangeIter<'a, T> {
        TensorRangeIter {
            tensor: self.tensor,
            mdoii: MultiDimensionalOffsetIndexIterator::new(self.min.clone(), self.max.clone()),
        }
    }
}

/// Iterator over an entire [`AutoStorageTensor`] in last-index-major order.
pub struct TensorIter<'a, T> {
    tensor: &'a AutoStorageTensor<T>,
    mdoii: MultiDimensionalOffsetIndexIterator,
}

impl<'a, T> Iterator for TensorIter<'a, T> {
    type Item = ElementView<'a, T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.mdoii.is_done() {
            return None;
        }
        let view = self.tensor.at_no_checks(self.mdoii.index());
        self.mdoii.advance();
        Some(view)
    }
}

/// Iterator over a [`TensorRange`], carrying the current global offset
/// alongside the multi-dimensional index.
pub struct TensorRangeIter<'a, T> {
    tensor: &'a AutoStorageTensor<T>,
    mdoii: MultiDimensionalOffsetIndexIterator,
}

impl<'a, T> TensorRangeIter<'a, T> {
    #[must_use]
    pub fn index(&self) -> &[usize] {
        self.mdoii.index()
    }

    #[must_use]
    pub fn block_offset(&self) -> usize {
        self.mdoii.global_offset()
    }

    #[must_use]
    pub fn tensor_offset(&self) -> usize {
        self.tensor.kernel.index_to_offset_no_checks(self.mdoii.index())
    }
}

impl<'a, T> Iterator for TensorRangeIter<'a, T> {
    type Item = ElementView<'a, T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.mdoii.is_done() {
            return None;
        }
        let view = self.tensor.at_no_checks(self.mdoii.index());
        self.mdoii.advance();
        Some(view)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_tensor(dims: Vec<usize>, hint: StorageHint, threshold: usize) -> AutoStorageTensor<usize> {
        AutoStorageTensor::new(dims, hint, threshold, |idx| idx.iter().sum())
    }

    #[test]
    fn automatic_mode_picks_explicit_below_threshold() {
        let t = make_tensor(vec![2, 2], StorageHint::Automatic, 100);
        assert_eq!(t.storage_mode(), StorageMode::Explicit);
        assert!(t.data().is_ok());
    }

    #[test]
    fn automatic_mode_picks_virtual_above_threshold() {
        let t = make_tensor(vec![10, 10], StorageHint::Automatic, 4);
        assert_eq!(t.storage_mode(), StorageMode::Virtual);
        assert!(matches!(t.data(), Err(BadTensor::NoDataStored)));
    }

    #[test]
    fn at_agrees_between_explicit_and_virtual_modes() {
        let explicit = make_tensor(vec![3, 3], StorageHint::Explicit, 100);
        let virt = make_tensor(vec![3, 3], StorageHint::Virtual, 100);
        for x in 0..3 {
            for y in 0..3 {
                let idx = [x, y];
                assert_eq!(*explicit.at(&idx).unwrap(), *virt.at(&idx).unwrap());
            }
        }
    }

    // Testable property: tensor round-trip between index and offset.
    #[test]
    fn splice_visits_the_expected_number_of_elements() {
        let t = make_tensor(vec![4, 5], StorageHint::Explicit, 100);
        let range = t.splice(vec![1, 1], vec![3, 4]).unwrap();
        assert_eq!(range.len(), 2 * 3);
        assert_eq!(range.iter().count(), 6);
    }

    #[test]
    fn full_iteration_visits_every_offset_once() {
        let t = make_tensor(vec![2, 3], StorageHint::Explicit, 100);
        let offsets: Vec<usize> = (0..t.kernel().element_count())
            .map(|off| t.kernel().index_to_offset_no_checks(&t.kernel().offset_to_index_no_checks(off)))
            .collect();
        let mut sorted = offsets.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), offsets.len());
        assert_eq!(t.iter().count(), t.kernel().element_count());
    }
}
