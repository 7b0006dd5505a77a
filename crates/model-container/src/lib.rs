// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # model-container
//!
//! A versioned, 256-byte aligned binary container for the named, typed and
//! shaped tensors that make up a trained model.
//!
//! # Key Components
//!
//! - [`Item`]: one named tensor. Its bytes are either owned or borrowed
//!   from the buffer it was loaded from ([`ItemData`]).
//! - [`ContainerReader`]: parses a container, applies the quantization
//!   dispatch and fills an item list. Loads are all-or-nothing.
//! - [`ContainerWriter`]: writes an item list, padding the data section to a
//!   [`DATA_ALIGNMENT`] boundary.
//! - [`TransformTable`] and [`QuantTransform`]: decide which quantized items
//!   are dequantized or repacked at load time, and how.
//! - [`MappedContainer`]: a memory-mapped container whose items borrow from
//!   the map.
//! - [`ContainerConfig`]: loader settings read from TOML.
//!
//! # Data Flow
//!
//! ```text
//! bytes ──► version / count ──► headers ──► names ──► shapes
//!                                                       │
//!           items ◄── dispatch ◄── data ◄── offset + padding
//! ```
//!
//! # Example
//! ```
//! use model_container::{find_item, load_items, ContainerWriter, Item};
//! use tensor_core::{ElementType, Shape};
//!
//! let items = vec![
//!     Item::owned("W", ElementType::Float32, Shape::matrix(2, 3), vec![0u8; 24]),
//!     Item::owned("b", ElementType::Float32, Shape::vector(3), vec![0u8; 12]),
//! ];
//! let mut buf = Vec::new();
//! ContainerWriter::new().write_to(&mut buf, &items).unwrap();
//!
//! let mut loaded = Vec::new();
//! load_items(&buf, &mut loaded, true).unwrap();
//! assert_eq!(find_item(&loaded, "b").unwrap().shape, Shape::vector(3));
//! ```

mod config;
pub mod convert;
pub mod cursor;
mod error;
pub mod header;
mod item;
pub mod lookup;
mod mapped;
mod reader;
pub mod transform;
pub mod writer;

pub use config::ContainerConfig;
pub use error::ContainerError;
pub use item::{Item, ItemData};
pub use lookup::{find_item, get_item, get_item_from_file};
pub use mapped::MappedContainer;
pub use reader::{ContainerReader, LoadReport};
pub use transform::{QuantTransform, ReferenceTransforms, TransformTable};
pub use writer::ContainerWriter;

use std::path::Path;

/// Format version written to and expected from every container.
pub const BINARY_FILE_VERSION: u64 = 1;

/// Alignment of the data section, in bytes.
pub const DATA_ALIGNMENT: u64 = 256;

/// Loads `buf` into `items` with the default reader.
///
/// See [`ContainerReader::load_items`].
pub fn load_items<'a>(
    buf: &'a [u8],
    items: &mut Vec<Item<'a>>,
    mapped: bool,
) -> Result<LoadReport, ContainerError> {
    ContainerReader::new().load_items(buf, items, mapped)
}

/// Loads the file at `path` into `items` with the default reader.
pub fn load_items_from_file(
    path: &Path,
    items: &mut Vec<Item<'static>>,
) -> Result<LoadReport, ContainerError> {
    ContainerReader::new().load_items_from_file(path, items)
}

/// Writes `items` to `path` and returns the number of bytes written.
pub fn save_items(path: &Path, items: &[Item<'_>]) -> Result<u64, ContainerError> {
    ContainerWriter::new().save_items(path, items)
}
