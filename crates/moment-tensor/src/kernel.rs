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

use moment_errors::BadTensorIndex;

/// Which axis varies fastest as the linear offset increases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexOrder {
    /// Dimension `0` varies fastest; stride `0` is always `1`.
    LastIndexMajor,
    /// The final dimension varies fastest; its stride is always `1`.
    FirstIndexMajor,
}

/// The pure indexing arithmetic of a rectangular tensor: dimensions,
/// strides, and the index/offset conversions and bounds checks every
/// concrete tensor needs, independent of what the tensor actually stores.
#[derive(Debug, Clone)]
pub struct TensorKernel {
    dimensions: Vec<usize>,
    strides: Vec<usize>,
    order: IndexOrder,
    element_count: usize,
}

impl TensorKernel {
    #[must_use]
    pub fn new(dimensions: Vec<usize>, order: IndexOrder) -> Self {
        let strides = Self::compute_strides(&dimensions, order);
        let element_count = if dimensions.is_empty() {
            0
        } else {
            dimensions.iter().product()
        };
        Self { dimensions, strides, order, element_count }
    }

    fn compute_strides(dimensions: &[usize], order: IndexOrder) -> Vec<usize> {
        let mut strides = vec![1usize; dimensions.len()];
        match order {
            IndexOrder::LastIndexMajor => {
                let mut running = 1usize;
                for (stride, &dim) in strides.iter_mut().zip(dimensions.iter()) {
                    *stride = running;
                    running *= dim;
                }
            }
            IndexOrder::FirstIndexMajor => {
                let mut running = 1usize;
                for (stride, &dim) in strides.iter_mut().zip(dimensions.iter()).rev() {
                    *stride = running;
                    running *= dim;
                }
            }
        }
        strides
    }

    #[must_use]
    pub fn dimensions(&self) -> &[usize] {
        &self.dimensions
    }

    #[must_use]
    pub fn strides(&self) -> &[usize] {
        &self.strides
    }

    #[must_use]
    pub fn order(&self) -> IndexOrder {
        self.order
    }

    #[must_use]
    pub fn dimension_count(&self) -> usize {
        self.dimensions.len()
    }

    #[must_use]
    pub fn element_count(&self) -> usize {
        self.element_count
    }

    /// Converts a (already validated) index into its linear offset.
    #[must_use]
    pub fn index_to_offset_no_checks(&self, index: &[usize]) -> usize {
        index.iter().zip(self.strides.iter()).map(|(i, s)| i * s).sum()
    }

    pub fn index_to_offset(&self, index: &[usize]) -> Result<usize, BadTensorIndex> {
        self.validate_index(index)?;
        Ok(self.index_to_offset_no_checks(index))
    }

    /// Converts a (already validated) linear offset back into an index.
    #[must_use]
    pub fn offset_to_index_no_checks(&self, offset: usize) -> Vec<usize> {
        let mut output = vec![0usize; self.dimensions.len()];
        match self.order {
            IndexOrder::LastIndexMajor => {
                let mut remaining = offset;
                for (out, &dim) in output.iter_mut().zip(self.dimensions.iter()) {
                    *out = remaining % dim;
                    remaining /= dim;
                }
            }
            IndexOrder::FirstIndexMajor => {
                let mut remaining = offset;
                for (out, &stride) in output.iter_mut().zip(self.strides.iter()) {
                    *out = remaining / stride;
                    remaining %= stride;
                }
            }
        }
        output
    }

    pub fn offset_to_index(&self, offset: usize) -> Result<Vec<usize>, BadTensorIndex> {
        self.validate_offset(offset)?;
        Ok(self.offset_to_index_no_checks(offset))
    }

    pub fn validate_index(&self, index: &[usize]) -> Result<(), BadTensorIndex> {
        if index.len() != self.dimensions.len() {
            return Err(BadTensorIndex::BadDimensionCount { expected: self.dimensions.len(), actual: index.len() });
        }
        for (d, (&idx, &dim)) in index.iter().zip(self.dimensions.iter()).enumerate() {
            if idx >= dim {
                return Err(BadTensorIndex::IndexOutOfRange { dim: d, index: idx, bound: dim });
            }
        }
        Ok(())
    }

    /// Like [`Self::validate_index`], but allows a coordinate to equal its
    /// dimension (a past-the-end index, as used for slice upper bounds).
    pub fn validate_index_inclusive(&self, index: &[usize]) -> Result<(), BadTensorIndex> {
        if index.len() != self.dimensions.len() {
            return Err(BadTensorIndex::BadDimensionCount { expected: self.dimensions.len(), actual: index.len() });
        }
        for (d, (&idx, &dim)) in index.iter().zip(self.dimensions.iter()).enumerate() {
            if idx > dim {
                return Err(BadTensorIndex::IndexOutOfRange { dim: d, index: idx, bound: dim });
            }
        }
        Ok(())
    }

    pub fn validate_offset(&self, offset: usize) -> Result<(), BadTensorIndex> {
        if offset >= self.element_count {
            return Err(BadTensorIndex::OffsetOutOfRange { offset, bound: self.element_count });
        }
        Ok(())
    }

    /// Checks that `min` is a valid index, `max` a valid inclusive index,
    /// and `min <= max` componentwise.
    pub fn validate_range(&self, min: &[usize], max: &[usize]) -> Result<(), BadTensorIndex> {
        self.validate_index(min)?;
        self.validate_index_inclusive(max)?;
        for d in 0..self.dimensions.len() {
            if min[d] > max[d] {
                return Err(BadTensorIndex::WrongOrder);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_index_major_strides_put_stride_one_first() {
        let k = TensorKernel::new(vec![2, 3, 4], IndexOrder::LastIndexMajor);
        assert_eq!(k.strides(), &[1, 2, 6]);
        assert_eq!(k.element_count(), 24);
    }

    #[test]
    fn first_index_major_strides_put_stride_one_last() {
        let k = TensorKernel::new(vec![2, 3, 4], IndexOrder::FirstIndexMajor);
        assert_eq!(k.strides(), &[12, 4, 1]);
    }

    #[test]
    fn index_offset_round_trip() {
        let k = TensorKernel::new(vec![2, 3, 4], IndexOrder::LastIndexMajor);
        for off in 0..k.element_count() {
            let idx = k.offset_to_index_no_checks(off);
            assert_eq!(k.index_to_offset_no_checks(&idx), off);
        }
    }

    #[test]
    fn validate_index_rejects_wrong_dimension_count() {
        let k = TensorKernel::new(vec![2, 3], IndexOrder::LastIndexMajor);
        assert!(matches!(
            k.validate_index(&[0, 0, 0]),
            Err(BadTensorIndex::BadDimensionCount { expected: 2, actual: 3 })
        ));
    }

    #[test]
    fn validate_index_inclusive_allows_past_the_end() {
        let k = TensorKernel::new(vec![2, 3], IndexOrder::LastIndexMajor);
        assert!(k.validate_index_inclusive(&[2, 3]).is_ok());
        assert!(k.validate_index(&[2, 3]).is_err());
    }

    #[test]
    fn validate_range_rejects_inverted_bounds() {
        let k = TensorKernel::new(vec![4, 4], IndexOrder::LastIndexMajor);
        assert!(matches!(k.validate_range(&[2, 0], &[1, 4]), Err(BadTensorIndex::WrongOrder)));
    }
}
