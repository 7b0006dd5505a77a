// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Type-directed post-processing of quantized items.
//!
//! Loading a quantized item is a two-step decision:
//!
//! 1. [`TransformTable::resolve`] maps `(element type, name)` to a
//!    [`Dispatch`]. The table is plain data, so the embedding special case
//!    can be tested without building a container.
//! 2. The reader applies the dispatch through a [`QuantTransform`]
//!    implementation, which owns the actual numeric kernels.
//!
//! [`ReferenceTransforms`] is a portable scalar implementation good enough
//! for tooling and tests. Production backends plug in their own kernels.

use crate::{ContainerError, Item};
use tensor_core::QuantWidth;

/// Substring that marks quantized embedding matrices.
pub const DEFAULT_EMBEDDING_PATTERN: &str = "Wemb";

/// Kernels invoked for quantized items during load.
pub trait QuantTransform: Send + Sync {
    /// Dequantizes an embedding matrix into `float32`.
    ///
    /// On entry `item` has already been retyped to `Float32` and its bytes
    /// resized to `num_elements * 4`. `data` is the stored quantized payload.
    fn dequantize_embedding(
        &self,
        width: QuantWidth,
        item: &mut Item<'_>,
        data: &[u8],
    ) -> Result<(), ContainerError>;

    /// Repacks a quantized matrix into the layout the backend multiplies with.
    ///
    /// On entry `item` keeps its quantized type and its bytes are sized to
    /// `data.len()`.
    fn prepare_and_transpose(
        &self,
        width: QuantWidth,
        item: &mut Item<'_>,
        data: &[u8],
    ) -> Result<(), ContainerError>;
}

/// How a rule matches item names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameMatch {
    /// Matches names containing the substring.
    Contains(String),
    /// Matches every name.
    Any,
}

impl NameMatch {
    fn matches(&self, name: &str) -> bool {
        match self {
            NameMatch::Contains(pattern) => name.contains(pattern.as_str()),
            NameMatch::Any => true,
        }
    }
}

/// What to do with a quantized item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    DequantizeEmbedding,
    Repack,
}

/// One entry of a [`TransformTable`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformRule {
    pub width: QuantWidth,
    pub name: NameMatch,
    pub action: Action,
}

/// The resolved treatment for one item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// Retype to `float32` and dequantize.
    DequantizeEmbedding(QuantWidth),
    /// Keep the quantized type and repack.
    Repack(QuantWidth),
    /// Copy (or borrow) the bytes unchanged.
    Passthrough,
}

/// Ordered rules mapping `(width, name)` to an [`Action`]. First match wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformTable {
    rules: Vec<TransformRule>,
}

impl TransformTable {
    /// Creates a table from explicit rules.
    pub fn new(rules: Vec<TransformRule>) -> Self {
        Self { rules }
    }

    /// The standard table: for each width, names containing `pattern` are
    /// dequantized and everything else is repacked.
    pub fn with_embedding_pattern(pattern: impl Into<String>) -> Self {
        let pattern = pattern.into();
        let mut rules = Vec::with_capacity(4);
        for width in [QuantWidth::Bits8, QuantWidth::Bits16] {
            rules.push(TransformRule {
                width,
                name: NameMatch::Contains(pattern.clone()),
                action: Action::DequantizeEmbedding,
            });
            rules.push(TransformRule {
                width,
                name: NameMatch::Any,
                action: Action::Repack,
            });
        }
        Self { rules }
    }

    /// Returns the rules in evaluation order.
    pub fn rules(&self) -> &[TransformRule] {
        &self.rules
    }

    /// Resolves the treatment for an item of the given type and name.
    ///
    /// Non-quantized types always pass through. A quantized type that no
    /// rule covers also passes through.
    pub fn resolve(&self, element_type: tensor_core::ElementType, name: &str) -> Dispatch {
        let Some(width) = element_type.quantization() else {
            return Dispatch::Passthrough;
        };
        self.rules
            .iter()
            .find(|r| r.width == width && r.name.matches(name))
            .map_or(Dispatch::Passthrough, |r| match r.action {
                Action::DequantizeEmbedding => Dispatch::DequantizeEmbedding(width),
                Action::Repack => Dispatch::Repack(width),
            })
    }
}

impl Default for TransformTable {
    fn default() -> Self {
        Self::with_embedding_pattern(DEFAULT_EMBEDDING_PATTERN)
    }
}

/// Portable scalar kernels.
///
/// Quantized payloads hold `num_elements` little-endian signed integers of
/// the quantization width followed by one little-endian `f32` quantization
/// multiplier. Dequantization computes `value / multiplier`. Repacking is a
/// verbatim copy: the stored layout is already the one these kernels use.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReferenceTransforms;

impl ReferenceTransforms {
    fn read_value(width: QuantWidth, bytes: &[u8]) -> f32 {
        match width {
            QuantWidth::Bits8 => f32::from(bytes[0] as i8),
            QuantWidth::Bits16 => f32::from(i16::from_le_bytes([bytes[0], bytes[1]])),
        }
    }
}

impl QuantTransform for ReferenceTransforms {
    fn dequantize_embedding(
        &self,
        width: QuantWidth,
        item: &mut Item<'_>,
        data: &[u8],
    ) -> Result<(), ContainerError> {
        let elements = item.num_elements();
        let Some(values_len) = elements
            .checked_mul(width.size_bytes())
            .filter(|&n| n <= usize::MAX - 4)
        else {
            return Err(ContainerError::Transform {
                name: item.name.clone(),
                detail: format!("{width} embedding of {} is too large", item.shape),
            });
        };
        if data.len() < values_len + 4 {
            return Err(ContainerError::Transform {
                name: item.name.clone(),
                detail: format!(
                    "{width} embedding payload has {} bytes, need {} for {elements} values and a multiplier",
                    data.len(),
                    values_len + 4
                ),
            });
        }

        let mut raw = [0u8; 4];
        raw.copy_from_slice(&data[values_len..values_len + 4]);
        let multiplier = f32::from_le_bytes(raw);
        if multiplier == 0.0 || !multiplier.is_finite() {
            return Err(ContainerError::Transform {
                name: item.name.clone(),
                detail: format!("invalid quantization multiplier {multiplier}"),
            });
        }

        let name = item.name.clone();
        let out = item.bytes_mut();
        if out.len() != elements * 4 {
            return Err(ContainerError::Transform {
                name,
                detail: format!("output buffer has {} bytes, expected {}", out.len(), elements * 4),
            });
        }
        for (dst, src) in out
            .chunks_exact_mut(4)
            .zip(data[..values_len].chunks_exact(width.size_bytes()))
        {
            let value = Self::read_value(width, src) / multiplier;
            dst.copy_from_slice(&value.to_le_bytes());
        }
        Ok(())
    }

    fn prepare_and_transpose(
        &self,
        _width: QuantWidth,
        item: &mut Item<'_>,
        data: &[u8],
    ) -> Result<(), ContainerError> {
        let name = item.name.clone();
        let out = item.bytes_mut();
        if out.len() != data.len() {
            return Err(ContainerError::Transform {
                name,
                detail: format!("output buffer has {} bytes, payload has {}", out.len(), data.len()),
            });
        }
        out.copy_from_slice(data);
        Ok(())
    }
}
