// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for shape conversion.

/// Errors that can occur when converting shapes to or from their on-disk form.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TensorError {
    /// A stored dimension was negative.
    #[error("dimension {index} is negative ({value})")]
    NegativeDimension { index: usize, value: i32 },

    /// A dimension does not fit in the 32-bit on-disk representation.
    #[error("dimension {index} ({value}) does not fit in a 32-bit signed integer")]
    DimensionOverflow { index: usize, value: usize },

    /// The product of the dimensions does not fit in `usize`.
    #[error("element count of {dims:?} overflows")]
    ElementCountOverflow { dims: Vec<usize> },
}
