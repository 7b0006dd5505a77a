// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # tensor-core
//!
//! Element type tags and shape descriptors shared by the model-container
//! reader, writer and tooling.
//!
//! This crate provides:
//! - [`ElementType`]: the element kinds a container can hold, with their
//!   on-disk integer tags.
//! - [`QuantWidth`]: the width of an intgemm-quantized element type.
//! - [`Shape`]: dimension lists with element counting and conversion to
//!   and from the 32-bit on-disk form.

mod dtype;
mod error;
mod shape;

pub use dtype::{ElementType, QuantWidth};
pub use error::TensorError;
pub use shape::Shape;
