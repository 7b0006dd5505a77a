// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Element type tags as stored in model containers.
//!
//! Every tag is a 64-bit integer built from a *type class* bitfield plus the
//! element size in bytes in the low byte:
//!
//! ```text
//!   bits 0..8    element size in bytes
//!   0x00100      signed integer
//!   0x00200      unsigned integer
//!   0x00400      floating point
//!   0x00800      packed (backend-specific layout)
//!   0x01000      AVX2 layout
//!   0x02000      AVX-512 layout
//!   0x04000      intgemm quantized
//!   0x08000      SSE2 layout
//!   0x10000      SSSE3 layout
//!   0x20000      VNNI layout
//! ```

use std::fmt;

const SIZE_MASK: u64 = 0x000FF;

const SIGNED: u64 = 0x00100;
const UNSIGNED: u64 = 0x00200;
const FLOAT: u64 = 0x00400;
const PACKED: u64 = 0x00800;
const AVX2: u64 = 0x01000;
const AVX512: u64 = 0x02000;
const INTGEMM: u64 = 0x04000;
const SSE2: u64 = 0x08000;
const SSSE3: u64 = 0x10000;
const VNNI: u64 = 0x20000;

/// The element kind of an item stored in a model container.
///
/// Tags that this crate does not know about are preserved verbatim in
/// [`ElementType::Other`] so that a container can be loaded and written back
/// without losing information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ElementType {
    Int8,
    Int16,
    Int32,
    Int64,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    /// 16-bit IEEE 754 floating point.
    Float16,
    /// 32-bit IEEE 754 floating point.
    Float32,
    /// 64-bit IEEE 754 floating point.
    Float64,
    /// 16-bit packed GEMM layout.
    Packed16,
    Packed8Avx2,
    Packed8Avx512,
    /// 8-bit intgemm-quantized, ISA-independent.
    Intgemm8,
    Intgemm8Ssse3,
    Intgemm8Avx2,
    Intgemm8Avx512,
    Intgemm8Avx512Vnni,
    /// 16-bit intgemm-quantized, ISA-independent.
    Intgemm16,
    Intgemm16Sse2,
    Intgemm16Avx2,
    Intgemm16Avx512,
    /// A tag not recognised by this crate.
    Other(u64),
}

/// Width of an intgemm-quantized element type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum QuantWidth {
    Bits8,
    Bits16,
}

impl QuantWidth {
    /// Size of one quantized element in bytes.
    pub fn size_bytes(self) -> usize {
        match self {
            QuantWidth::Bits8 => 1,
            QuantWidth::Bits16 => 2,
        }
    }
}

impl fmt::Display for QuantWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuantWidth::Bits8 => write!(f, "8-bit"),
            QuantWidth::Bits16 => write!(f, "16-bit"),
        }
    }
}

impl ElementType {
    /// Every named variant, in tag order within each class.
    pub const KNOWN: [ElementType; 23] = [
        ElementType::Int8,
        ElementType::Int16,
        ElementType::Int32,
        ElementType::Int64,
        ElementType::Uint8,
        ElementType::Uint16,
        ElementType::Uint32,
        ElementType::Uint64,
        ElementType::Float16,
        ElementType::Float32,
        ElementType::Float64,
        ElementType::Packed16,
        ElementType::Packed8Avx2,
        ElementType::Packed8Avx512,
        ElementType::Intgemm8,
        ElementType::Intgemm8Ssse3,
        ElementType::Intgemm8Avx2,
        ElementType::Intgemm8Avx512,
        ElementType::Intgemm8Avx512Vnni,
        ElementType::Intgemm16,
        ElementType::Intgemm16Sse2,
        ElementType::Intgemm16Avx2,
        ElementType::Intgemm16Avx512,
    ];

    /// Returns the on-disk tag for this type.
    pub fn tag(self) -> u64 {
        match self {
            ElementType::Int8 => SIGNED | 1,
            ElementType::Int16 => SIGNED | 2,
            ElementType::Int32 => SIGNED | 4,
            ElementType::Int64 => SIGNED | 8,
            ElementType::Uint8 => UNSIGNED | 1,
            ElementType::Uint16 => UNSIGNED | 2,
            ElementType::Uint32 => UNSIGNED | 4,
            ElementType::Uint64 => UNSIGNED | 8,
            ElementType::Float16 => FLOAT | 2,
            ElementType::Float32 => FLOAT | 4,
            ElementType::Float64 => FLOAT | 8,
            ElementType::Packed16 => PACKED | 2,
            ElementType::Packed8Avx2 => PACKED | AVX2 | 1,
            ElementType::Packed8Avx512 => PACKED | AVX512 | 1,
            ElementType::Intgemm8 => SIGNED | INTGEMM | 1,
            ElementType::Intgemm8Ssse3 => SIGNED | INTGEMM | SSSE3 | 1,
            ElementType::Intgemm8Avx2 => SIGNED | INTGEMM | AVX2 | 1,
            ElementType::Intgemm8Avx512 => SIGNED | INTGEMM | AVX512 | 1,
            ElementType::Intgemm8Avx512Vnni => SIGNED | INTGEMM | AVX512 | VNNI | 1,
            ElementType::Intgemm16 => SIGNED | INTGEMM | 2,
            ElementType::Intgemm16Sse2 => SIGNED | INTGEMM | SSE2 | 2,
            ElementType::Intgemm16Avx2 => SIGNED | INTGEMM | AVX2 | 2,
            ElementType::Intgemm16Avx512 => SIGNED | INTGEMM | AVX512 | 2,
            ElementType::Other(tag) => tag,
        }
    }

    /// Decodes an on-disk tag. Never fails: unknown tags become [`ElementType::Other`].
    ///
    /// # Examples
    /// ```
    /// use tensor_core::ElementType;
    /// assert_eq!(ElementType::from_tag(0x404), ElementType::Float32);
    /// assert_eq!(ElementType::from_tag(0xdead), ElementType::Other(0xdead));
    /// ```
    pub fn from_tag(tag: u64) -> Self {
        Self::KNOWN
            .iter()
            .copied()
            .find(|t| t.tag() == tag)
            .unwrap_or(ElementType::Other(tag))
    }

    /// Returns the size of a single element in bytes, as encoded in the tag.
    pub fn size_bytes(self) -> usize {
        (self.tag() & SIZE_MASK) as usize
    }

    /// Returns the quantization width if this is an intgemm type.
    ///
    /// ISA-specific layout bits are ignored, so `Intgemm8Avx2` and
    /// `Intgemm8` both report [`QuantWidth::Bits8`].
    pub fn quantization(self) -> Option<QuantWidth> {
        let tag = self.tag();
        if tag & INTGEMM == 0 {
            return None;
        }
        match tag & SIZE_MASK {
            1 => Some(QuantWidth::Bits8),
            2 => Some(QuantWidth::Bits16),
            _ => None,
        }
    }

    /// Returns `true` for intgemm-quantized types of any width.
    pub fn is_quantized(self) -> bool {
        self.quantization().is_some()
    }

    /// Returns `true` for IEEE floating point types.
    pub fn is_float(self) -> bool {
        self.tag() & FLOAT != 0
    }

    /// Returns a human-readable label for this type.
    pub fn as_str(self) -> &'static str {
        match self {
            ElementType::Int8 => "int8",
            ElementType::Int16 => "int16",
            ElementType::Int32 => "int32",
            ElementType::Int64 => "int64",
            ElementType::Uint8 => "uint8",
            ElementType::Uint16 => "uint16",
            ElementType::Uint32 => "uint32",
            ElementType::Uint64 => "uint64",
            ElementType::Float16 => "float16",
            ElementType::Float32 => "float32",
            ElementType::Float64 => "float64",
            ElementType::Packed16 => "packed16",
            ElementType::Packed8Avx2 => "packed8avx2",
            ElementType::Packed8Avx512 => "packed8avx512",
            ElementType::Intgemm8 => "intgemm8",
            ElementType::Intgemm8Ssse3 => "intgemm8ssse3",
            ElementType::Intgemm8Avx2 => "intgemm8avx2",
            ElementType::Intgemm8Avx512 => "intgemm8avx512",
            ElementType::Intgemm8Avx512Vnni => "intgemm8avx512vnni",
            ElementType::Intgemm16 => "intgemm16",
            ElementType::Intgemm16Sse2 => "intgemm16sse2",
            ElementType::Intgemm16Avx2 => "intgemm16avx2",
            ElementType::Intgemm16Avx512 => "intgemm16avx512",
            ElementType::Other(_) => "other",
        }
    }
}

/// Plain `float32`, the type items take when nothing else is known.
impl Default for ElementType {
    fn default() -> Self {
        ElementType::Float32
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementType::Other(tag) => write!(f, "other({tag:#x})"),
            known => f.write_str(known.as_str()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tags_are_unique() {
        let mut tags: Vec<u64> = ElementType::KNOWN.iter().map(|t| t.tag()).collect();
        tags.sort_unstable();
        tags.dedup();
        assert_eq!(tags.len(), ElementType::KNOWN.len());
    }

    #[test]
    fn test_from_tag_inverts_tag() {
        for t in ElementType::KNOWN {
            assert_eq!(ElementType::from_tag(t.tag()), t);
        }
    }

    #[test]
    fn test_unknown_tag_preserved() {
        let t = ElementType::from_tag(0x7777);
        assert_eq!(t, ElementType::Other(0x7777));
        assert_eq!(t.tag(), 0x7777);
        assert!(!t.is_quantized());
    }

    #[test]
    fn test_size_bytes() {
        assert_eq!(ElementType::Float32.size_bytes(), 4);
        assert_eq!(ElementType::Float16.size_bytes(), 2);
        assert_eq!(ElementType::Int64.size_bytes(), 8);
        assert_eq!(ElementType::Intgemm8Avx512Vnni.size_bytes(), 1);
        assert_eq!(ElementType::Intgemm16Avx2.size_bytes(), 2);
    }

    #[test]
    fn test_quantization_ignores_isa_bits() {
        assert_eq!(ElementType::Intgemm8.quantization(), Some(QuantWidth::Bits8));
        assert_eq!(ElementType::Intgemm8Avx2.quantization(), Some(QuantWidth::Bits8));
        assert_eq!(ElementType::Intgemm8Avx512Vnni.quantization(), Some(QuantWidth::Bits8));
        assert_eq!(ElementType::Intgemm16.quantization(), Some(QuantWidth::Bits16));
        assert_eq!(ElementType::Intgemm16Sse2.quantization(), Some(QuantWidth::Bits16));
    }

    #[test]
    fn test_plain_types_not_quantized() {
        for t in [
            ElementType::Int8,
            ElementType::Int16,
            ElementType::Float32,
            ElementType::Packed16,
            ElementType::Packed8Avx2,
        ] {
            assert!(!t.is_quantized(), "{t} should not be quantized");
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(ElementType::Float32.to_string(), "float32");
        assert_eq!(ElementType::Other(0x10).to_string(), "other(0x10)");
    }
}
