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

//! Typed error taxonomy shared by the rewriting engine and the tensor layer.
//!
//! Every error here is a leaf or a thin wrapper: no variant reaches back
//! across crate boundaries for formatting, so this crate has no dependency
//! on `moment-rules`, `moment-tensor`, or anything built on top of them.

/// Raised when a rewrite rule is constructed in violation of its orientation
/// invariant (left-hand side not nonzero, or left-hand side not the larger
/// of the two sides under shortlex order).
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid rewrite rule: {reason}")]
pub struct InvalidRule {
    pub reason: String,
}

impl InvalidRule {
    pub fn new(reason: impl Into<String>) -> Self {
        Self { reason: reason.into() }
    }
}

/// Raised only when `apply_match_with_hint` is misused internally: the hint
/// does not point at an occurrence of the rule's left-hand side, or applying
/// the rule there would leave a negative remaining length.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[error("hint does not point at a valid left-hand-side occurrence")]
pub struct BadHint;

/// Variants of a malformed tensor index or offset.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum BadTensorIndex {
    #[error("index has {actual} coordinates, expected {expected}")]
    BadDimensionCount { expected: usize, actual: usize },

    #[error("coordinate {index} at dimension {dim} is out of range (bound {bound})")]
    IndexOutOfRange { dim: usize, index: usize, bound: usize },

    #[error("offset {offset} is out of range (bound {bound})")]
    OffsetOutOfRange { offset: usize, bound: usize },

    #[error("index order does not match the tensor's declared index order")]
    WrongOrder,
}

/// Errors raised by the auto-storage tensor itself (as opposed to its index
/// arithmetic, which raises [`BadTensorIndex`]).
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum BadTensor {
    #[error("tensor has no materialized data (storage mode is Virtual)")]
    NoDataStored,

    #[error(transparent)]
    Index(#[from] BadTensorIndex),
}

/// Errors raised by the Collins–Gisin tensor.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum BadCGError {
    #[error("not all symbol IDs for the CG tensor could be found: missing entries for {0:?}")]
    MissingSymbols(Vec<String>),

    #[error(
        "the object at offset {offset}, corresponding to operator sequence \"{sequence}\", does not yet exist in the symbol table"
    )]
    MissingIndex { offset: usize, sequence: String },

    #[error("measurement index {0} is out of bounds")]
    BadMeasurementIndex(usize),

    #[error("two measurements from the same party ({0}) cannot appear in one query")]
    DuplicateParty(usize),

    #[error(transparent)]
    Index(#[from] BadTensorIndex),
}

/// Errors raised by the polynomial tensor family.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum BadPTError {
    #[error("not all symbols for the polynomial tensor could be resolved: {0} offsets still missing")]
    MissingSymbols(usize),

    #[error(transparent)]
    Index(#[from] BadTensorIndex),

    #[error(transparent)]
    CollinsGisin(#[from] BadCGError),
}

/// Errors specific to the full-correlator tensor (binary measurements only).
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum BadFCError {
    #[error("full correlator tensor requires binary measurements, party {party} has {outcomes} outcomes")]
    NotBinary { party: usize, outcomes: usize },

    #[error(transparent)]
    Index(#[from] BadTensorIndex),

    #[error(transparent)]
    CollinsGisin(#[from] BadCGError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bad_tensor_wraps_index_error() {
        let inner = BadTensorIndex::OffsetOutOfRange { offset: 9, bound: 4 };
        let outer: BadTensor = inner.clone().into();
        assert!(matches!(outer, BadTensor::Index(ref i) if *i == inner));
    }

    #[test]
    fn cg_error_wraps_index_error() {
        let inner = BadTensorIndex::WrongOrder;
        let outer: BadCGError = inner.clone().into();
        assert!(matches!(outer, BadCGError::Index(ref i) if *i == inner));
    }
}
