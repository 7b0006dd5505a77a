// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Memory-mapped containers.
//!
//! [`MappedContainer`] maps a container file once and hands out items that
//! borrow from the map. Non-quantized data is never copied; the borrow
//! checker keeps every such item from outliving the map.

use crate::{lookup, ContainerError, ContainerReader, Item, LoadReport};
use std::path::{Path, PathBuf};

/// A container file mapped into memory.
pub struct MappedContainer {
    path: PathBuf,
    mmap: memmap2::Mmap,
}

impl MappedContainer {
    /// Opens and maps the container at `path`.
    pub fn open(path: &Path) -> Result<Self, ContainerError> {
        let file = std::fs::File::open(path).map_err(|e| ContainerError::io(path, e))?;
        // SAFETY: the map is read-only. Callers must not truncate or rewrite
        // the file while it is mapped.
        let mmap = unsafe { memmap2::Mmap::map(&file) }.map_err(|e| ContainerError::io(path, e))?;
        tracing::info!(
            "mmap'd {} ({:.2} MB)",
            path.display(),
            mmap.len() as f64 / (1024.0 * 1024.0),
        );
        Ok(Self {
            path: path.to_path_buf(),
            mmap,
        })
    }

    /// Path the container was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The mapped bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.mmap
    }

    /// Size of the mapped file in bytes.
    pub fn len(&self) -> usize {
        self.mmap.len()
    }

    /// Returns `true` for an empty file.
    pub fn is_empty(&self) -> bool {
        self.mmap.is_empty()
    }

    /// Loads all items, borrowing non-quantized data from the map.
    pub fn load<'m>(
        &'m self,
        reader: &ContainerReader,
        items: &mut Vec<Item<'m>>,
    ) -> Result<LoadReport, ContainerError> {
        reader.load_items(&self.mmap, items, true)
    }

    /// Returns the item named `name`, or [`Item::empty`].
    pub fn get_item(&self, reader: &ContainerReader, name: &str) -> Result<Item<'_>, ContainerError> {
        lookup::get_item(reader, &self.mmap, name)
    }
}

impl std::fmt::Debug for MappedContainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MappedContainer")
            .field("path", &self.path)
            .field("len", &self.mmap.len())
            .finish()
    }
}
