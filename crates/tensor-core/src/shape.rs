// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Tensor shape descriptors and dimension utilities.

use crate::{ElementType, TensorError};
use std::fmt;

/// Describes the dimensions of a stored tensor.
///
/// In memory dimensions are `usize`; on disk each dimension is a 4-byte
/// signed integer. [`Shape::from_wire`] and [`Shape::to_wire`] convert
/// between the two and reject values that cannot be represented.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Shape {
    dims: Vec<usize>,
}

impl Shape {
    /// Creates a new shape from the given dimensions.
    ///
    /// # Examples
    /// ```
    /// use tensor_core::Shape;
    /// let s = Shape::new(vec![2, 3, 4]);
    /// assert_eq!(s.rank(), 3);
    /// assert_eq!(s.num_elements(), 24);
    /// ```
    pub fn new(dims: Vec<usize>) -> Self {
        Self { dims }
    }

    /// Creates a scalar shape (rank 0).
    pub fn scalar() -> Self {
        Self { dims: vec![] }
    }

    /// Creates a 1-D shape.
    pub fn vector(len: usize) -> Self {
        Self { dims: vec![len] }
    }

    /// Creates a 2-D shape (matrix).
    pub fn matrix(rows: usize, cols: usize) -> Self {
        Self {
            dims: vec![rows, cols],
        }
    }

    /// Builds a shape from its on-disk representation.
    pub fn from_wire(dims: &[i32]) -> Result<Self, TensorError> {
        let dims = dims
            .iter()
            .enumerate()
            .map(|(index, &value)| {
                usize::try_from(value).map_err(|_| TensorError::NegativeDimension { index, value })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { dims })
    }

    /// Converts this shape into its on-disk representation.
    pub fn to_wire(&self) -> Result<Vec<i32>, TensorError> {
        self.dims
            .iter()
            .enumerate()
            .map(|(index, &value)| {
                i32::try_from(value).map_err(|_| TensorError::DimensionOverflow { index, value })
            })
            .collect()
    }

    /// Returns the number of dimensions (rank).
    pub fn rank(&self) -> usize {
        self.dims.len()
    }

    /// Returns the total number of elements.
    ///
    /// For a scalar shape (rank 0), returns 1. Saturates at `usize::MAX`;
    /// use [`Shape::checked_num_elements`] when overflow must be detected.
    pub fn num_elements(&self) -> usize {
        self.dims.iter().fold(1usize, |acc, &d| acc.saturating_mul(d))
    }

    /// Returns the total number of elements, failing instead of overflowing.
    pub fn checked_num_elements(&self) -> Result<usize, TensorError> {
        self.dims
            .iter()
            .try_fold(1usize, |acc, &d| acc.checked_mul(d))
            .ok_or_else(|| TensorError::ElementCountOverflow {
                dims: self.dims.clone(),
            })
    }

    /// Returns the dimensions as a slice.
    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    /// Returns the size of a specific dimension, or `None` if out of bounds.
    pub fn dim(&self, index: usize) -> Option<usize> {
        self.dims.get(index).copied()
    }

    /// Computes the memory footprint in bytes for a given [`ElementType`].
    ///
    /// Saturates at `usize::MAX`.
    pub fn size_bytes(&self, element_type: ElementType) -> usize {
        self.num_elements().saturating_mul(element_type.size_bytes())
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, d) in self.dims.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{d}")?;
        }
        write!(f, "]")
    }
}

/// Convenience: `Shape::from(vec![2, 3])`.
impl From<Vec<usize>> for Shape {
    fn from(dims: Vec<usize>) -> Self {
        Self::new(dims)
    }
}

/// Convenience: `Shape::from(&[2, 3][..])`.
impl From<&[usize]> for Shape {
    fn from(dims: &[usize]) -> Self {
        Self::new(dims.to_vec())
    }
}
