// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Named tensor records.
//!
//! An [`Item`] either owns its bytes or borrows them from the buffer it was
//! loaded from. The borrow is expressed in the type (`Item<'a>`), so the
//! compiler rejects any use of a mapped item after its source buffer is gone.

use std::fmt;
use tensor_core::{ElementType, Shape};

/// Storage behind an [`Item`].
#[derive(Clone, PartialEq, Eq)]
pub enum ItemData<'a> {
    /// A private, resizable copy.
    Owned(Vec<u8>),
    /// A zero-copy view into externally owned memory.
    Borrowed(&'a [u8]),
}

impl<'a> ItemData<'a> {
    /// Returns the bytes regardless of ownership.
    pub fn as_slice(&self) -> &[u8] {
        match self {
            ItemData::Owned(v) => v,
            ItemData::Borrowed(s) => s,
        }
    }

    /// Returns `true` for a borrowed view.
    pub fn is_borrowed(&self) -> bool {
        matches!(self, ItemData::Borrowed(_))
    }

    /// Copies borrowed bytes into an owned buffer.
    pub fn into_owned(self) -> ItemData<'static> {
        match self {
            ItemData::Owned(v) => ItemData::Owned(v),
            ItemData::Borrowed(s) => ItemData::Owned(s.to_vec()),
        }
    }
}

impl Default for ItemData<'_> {
    fn default() -> Self {
        ItemData::Owned(Vec::new())
    }
}

impl fmt::Debug for ItemData<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = if self.is_borrowed() { "Borrowed" } else { "Owned" };
        write!(f, "{kind}({} bytes)", self.as_slice().len())
    }
}

/// One named, typed, shaped tensor record.
///
/// Equality compares name, type, shape and bytes; whether the bytes are
/// owned or borrowed does not matter.
#[derive(Debug, Clone, Default)]
pub struct Item<'a> {
    pub name: String,
    pub element_type: ElementType,
    pub shape: Shape,
    pub data: ItemData<'a>,
}

impl Item<'static> {
    /// Creates an item that owns its bytes.
    pub fn owned(
        name: impl Into<String>,
        element_type: ElementType,
        shape: Shape,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            name: name.into(),
            element_type,
            shape,
            data: ItemData::Owned(bytes),
        }
    }
}

impl<'a> Item<'a> {
    /// Creates an item whose bytes alias `bytes`.
    pub fn borrowed(
        name: impl Into<String>,
        element_type: ElementType,
        shape: Shape,
        bytes: &'a [u8],
    ) -> Self {
        Self {
            name: name.into(),
            element_type,
            shape,
            data: ItemData::Borrowed(bytes),
        }
    }

    /// The sentinel returned by lookups that find nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns `true` for the lookup sentinel.
    pub fn is_empty(&self) -> bool {
        self.name.is_empty() && self.shape.rank() == 0 && self.bytes().is_empty()
    }

    /// Returns `true` when the bytes alias external storage.
    pub fn is_mapped(&self) -> bool {
        self.data.is_borrowed()
    }

    /// Returns the raw element bytes.
    pub fn bytes(&self) -> &[u8] {
        self.data.as_slice()
    }

    /// Returns the owned byte buffer, copying borrowed bytes first.
    pub fn bytes_mut(&mut self) -> &mut Vec<u8> {
        if let ItemData::Borrowed(s) = self.data {
            self.data = ItemData::Owned(s.to_vec());
        }
        match &mut self.data {
            ItemData::Owned(v) => v,
            ItemData::Borrowed(_) => unreachable!("borrowed data was just copied"),
        }
    }

    /// Number of elements described by the shape.
    pub fn num_elements(&self) -> usize {
        self.shape.num_elements()
    }

    /// Detaches the item from its source buffer.
    pub fn into_owned(self) -> Item<'static> {
        Item {
            name: self.name,
            element_type: self.element_type,
            shape: self.shape,
            data: self.data.into_owned(),
        }
    }
}

impl PartialEq for Item<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.element_type == other.element_type
            && self.shape == other.shape
            && self.bytes() == other.bytes()
    }
}

impl Eq for Item<'_> {}
