// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Lookup of single items by name.
//!
//! A missing name is not an error: the lookups return [`Item::empty`].
//! Duplicate names are legal in a container and the first match wins.

use crate::{ContainerError, ContainerReader, Item};
use std::path::Path;

/// Returns the first item named `name`, if any.
pub fn find_item<'i, 'a>(items: &'i [Item<'a>], name: &str) -> Option<&'i Item<'a>> {
    items.iter().find(|item| item.name == name)
}

/// Loads `buf` and returns the item named `name`, or [`Item::empty`].
///
/// Non-quantized items are returned as borrowed views into `buf`.
pub fn get_item<'a>(
    reader: &ContainerReader,
    buf: &'a [u8],
    name: &str,
) -> Result<Item<'a>, ContainerError> {
    let mut items = Vec::new();
    reader.load_items(buf, &mut items, true)?;
    Ok(take_first(items, name))
}

/// Loads the file at `path` and returns the item named `name`, or [`Item::empty`].
pub fn get_item_from_file(
    reader: &ContainerReader,
    path: &Path,
    name: &str,
) -> Result<Item<'static>, ContainerError> {
    let mut items = Vec::new();
    reader.load_items_from_file(path, &mut items)?;
    Ok(take_first(items, name))
}

fn take_first<'a>(items: Vec<Item<'a>>, name: &str) -> Item<'a> {
    match items.into_iter().find(|item| item.name == name) {
        Some(item) => item,
        None => {
            tracing::debug!("item '{name}' not found");
            Item::empty()
        }
    }
}
