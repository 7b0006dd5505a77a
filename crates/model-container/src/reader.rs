// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Container loading.
//!
//! [`ContainerReader`] walks a container front to back with a
//! [`ByteCursor`]:
//!
//! 1. version gate and item count;
//! 2. the header table;
//! 3. names, then shapes;
//! 4. the explicit alignment offset and its padding;
//! 5. item data, post-processed according to the [`TransformTable`].
//!
//! Items are assembled in a scratch list and only handed to the caller once
//! every step has succeeded, so a failed load leaves the destination as it
//! was.

use crate::cursor::ByteCursor;
use crate::header::{Header, HeaderTable};
use crate::transform::{Dispatch, QuantTransform, ReferenceTransforms, TransformTable};
use crate::{ContainerError, Item, ItemData, BINARY_FILE_VERSION};
use std::path::Path;
use tensor_core::{ElementType, Shape};

/// Summary of one load call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct LoadReport {
    /// Number of items in the container.
    pub items: usize,
    /// Bytes of the buffer consumed by the load.
    pub bytes_consumed: u64,
    /// `true` when the destination already held every item and nothing was read.
    pub skipped: bool,
}

/// Result of decoding a buffer, before items are committed.
enum Decoded<'a> {
    AlreadyLoaded { count: usize, consumed: u64 },
    Loaded { items: Vec<Item<'a>>, consumed: u64 },
}

/// Loads items from container buffers and files.
///
/// The reader holds no per-load state and can be shared between threads.
///
/// # Example
/// ```
/// use model_container::{ContainerReader, ContainerWriter, Item};
/// use tensor_core::{ElementType, Shape};
///
/// let items = vec![Item::owned("W", ElementType::Float32, Shape::matrix(2, 3), vec![0u8; 24])];
/// let mut buf = Vec::new();
/// ContainerWriter::new().write_to(&mut buf, &items).unwrap();
///
/// let mut loaded = Vec::new();
/// let report = ContainerReader::new().load_items(&buf, &mut loaded, false).unwrap();
/// assert_eq!(report.items, 1);
/// assert_eq!(loaded, items);
/// ```
pub struct ContainerReader {
    table: TransformTable,
    transforms: Box<dyn QuantTransform>,
    warn_on_duplicates: bool,
}

impl ContainerReader {
    /// Creates a reader with the default transform table and the
    /// [`ReferenceTransforms`] kernels.
    pub fn new() -> Self {
        Self {
            table: TransformTable::default(),
            transforms: Box::new(ReferenceTransforms),
            warn_on_duplicates: true,
        }
    }

    /// Replaces the transform table.
    pub fn with_table(mut self, table: TransformTable) -> Self {
        self.table = table;
        self
    }

    /// Replaces the quantization kernels.
    pub fn with_transforms(mut self, transforms: impl QuantTransform + 'static) -> Self {
        self.transforms = Box::new(transforms);
        self
    }

    /// Enables or disables the duplicate-name warning.
    pub fn with_duplicate_warning(mut self, enabled: bool) -> Self {
        self.warn_on_duplicates = enabled;
        self
    }

    /// Returns the transform table in use.
    pub fn table(&self) -> &TransformTable {
        &self.table
    }

    /// Loads every item in `buf` into `items`.
    ///
    /// When `mapped` is `true`, non-quantized items borrow their bytes from
    /// `buf` instead of copying them. Quantized items are always owned since
    /// their bytes are rewritten by a transform.
    ///
    /// If `items` already holds exactly as many items as the container
    /// declares, the call returns without reading further and leaves
    /// `items` untouched. Otherwise `items` is replaced on success and left
    /// unchanged on failure.
    pub fn load_items<'a>(
        &self,
        buf: &'a [u8],
        items: &mut Vec<Item<'a>>,
        mapped: bool,
    ) -> Result<LoadReport, ContainerError> {
        match self.decode(buf, mapped, items.len())? {
            Decoded::AlreadyLoaded { count, consumed } => Ok(LoadReport {
                items: count,
                bytes_consumed: consumed,
                skipped: true,
            }),
            Decoded::Loaded {
                items: loaded,
                consumed,
            } => {
                let count = loaded.len();
                *items = loaded;
                Ok(LoadReport {
                    items: count,
                    bytes_consumed: consumed,
                    skipped: false,
                })
            }
        }
    }

    /// Reads the whole file at `path` and loads it without mapping.
    pub fn load_items_from_file(
        &self,
        path: &Path,
        items: &mut Vec<Item<'static>>,
    ) -> Result<LoadReport, ContainerError> {
        let buf = std::fs::read(path).map_err(|e| ContainerError::io(path, e))?;
        tracing::info!("loading model from file: {}", path.display());

        match self.decode(&buf, false, items.len())? {
            Decoded::AlreadyLoaded { count, consumed } => Ok(LoadReport {
                items: count,
                bytes_consumed: consumed,
                skipped: true,
            }),
            Decoded::Loaded {
                items: loaded,
                consumed,
            } => {
                let count = loaded.len();
                // Nothing borrows from `buf` when mapped is false, so this
                // only changes the lifetime.
                *items = loaded.into_iter().map(Item::into_owned).collect();
                Ok(LoadReport {
                    items: count,
                    bytes_consumed: consumed,
                    skipped: false,
                })
            }
        }
    }

    fn decode<'a>(
        &self,
        buf: &'a [u8],
        mapped: bool,
        existing: usize,
    ) -> Result<Decoded<'a>, ContainerError> {
        let mut cursor = ByteCursor::new(buf);

        let version = cursor.read_u64("format version")?;
        if version != BINARY_FILE_VERSION {
            return Err(ContainerError::VersionMismatch {
                found: version,
                expected: BINARY_FILE_VERSION,
            });
        }

        let count = cursor.read_u64("item count")?;
        if usize::try_from(count).map_or(false, |c| c == existing) {
            tracing::debug!("{count} items already loaded, skipping");
            return Ok(Decoded::AlreadyLoaded {
                count: existing,
                consumed: cursor.position() as u64,
            });
        }

        let headers = HeaderTable::read(&mut cursor, count)?;

        let mut names = Vec::with_capacity(headers.len());
        for (index, header) in headers.iter().enumerate() {
            let raw = cursor.take_bytes(header.name_len, "item name")?;
            names.push(decode_name(index, raw)?);
        }

        let mut shapes = Vec::with_capacity(headers.len());
        for (header, name) in headers.iter().zip(&names) {
            let dims = cursor.take::<i32>(header.shape_len, "item shape")?;
            let shape = Shape::from_wire(&dims).map_err(|source| ContainerError::InvalidShape {
                name: name.clone(),
                source,
            })?;
            shapes.push(shape);
        }

        let offset = cursor.read_u64("alignment offset")?;
        let padding = cursor.take_bytes(offset, "alignment padding")?;
        if padding.iter().any(|&b| b != 0) {
            tracing::warn!("alignment padding contains non-zero bytes");
        }
        tracing::debug!("data section starts at byte {}", cursor.position());

        let mut items = Vec::with_capacity(headers.len());
        for ((header, name), shape) in headers.iter().zip(names).zip(shapes) {
            let data = cursor.take_bytes(header.data_len, "item data")?;
            items.push(self.build_item(header, name, shape, data, mapped)?);
        }

        if self.warn_on_duplicates {
            warn_duplicates(&items);
        }

        let consumed = cursor.position() as u64;
        tracing::info!("[memory] model data loaded in: {consumed} bytes");
        Ok(Decoded::Loaded { items, consumed })
    }

    fn build_item<'a>(
        &self,
        header: &Header,
        name: String,
        shape: Shape,
        data: &'a [u8],
        mapped: bool,
    ) -> Result<Item<'a>, ContainerError> {
        let element_type = ElementType::from_tag(header.type_tag);
        let dispatch = self.table.resolve(element_type, &name);
        tracing::debug!(
            "item '{name}': {element_type} {shape}, {} bytes, {dispatch:?}",
            data.len()
        );

        let mut item = Item {
            name,
            element_type,
            shape,
            data: ItemData::default(),
        };

        match dispatch {
            Dispatch::DequantizeEmbedding(width) => {
                let elements = checked_elements(&item)?;
                if elements.saturating_mul(width.size_bytes()) > data.len() {
                    return Err(ContainerError::Transform {
                        name: item.name,
                        detail: format!(
                            "{width} payload of {} bytes cannot hold {elements} elements",
                            data.len()
                        ),
                    });
                }
                item.element_type = ElementType::Float32;
                item.data = ItemData::Owned(vec![0u8; elements * 4]);
                self.transforms.dequantize_embedding(width, &mut item, data)?;
            }
            Dispatch::Repack(width) => {
                item.data = ItemData::Owned(vec![0u8; data.len()]);
                self.transforms.prepare_and_transpose(width, &mut item, data)?;
            }
            Dispatch::Passthrough => {
                item.data = if mapped {
                    ItemData::Borrowed(data)
                } else {
                    ItemData::Owned(data.to_vec())
                };
            }
        }

        Ok(item)
    }
}

impl Default for ContainerReader {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ContainerReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContainerReader")
            .field("table", &self.table)
            .field("warn_on_duplicates", &self.warn_on_duplicates)
            .finish()
    }
}

/// Decodes a stored name: bytes up to the first NUL, UTF-8.
fn decode_name(index: usize, raw: &[u8]) -> Result<String, ContainerError> {
    let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
    std::str::from_utf8(&raw[..end])
        .map(str::to_owned)
        .map_err(|e| ContainerError::InvalidName {
            index,
            detail: e.to_string(),
        })
}

fn checked_elements(item: &Item<'_>) -> Result<usize, ContainerError> {
    item.shape
        .checked_num_elements()
        .and_then(|n| {
            n.checked_mul(4)
                .map(|_| n)
                .ok_or(tensor_core::TensorError::ElementCountOverflow {
                    dims: item.shape.dims().to_vec(),
                })
        })
        .map_err(|source| ContainerError::InvalidShape {
            name: item.name.clone(),
            source,
        })
}

fn warn_duplicates(items: &[Item<'_>]) {
    let mut seen = std::collections::HashSet::with_capacity(items.len());
    for item in items {
        if !seen.insert(item.name.as_str()) {
            tracing::warn!("duplicate item name '{}': lookups return the first", item.name);
        }
    }
}
