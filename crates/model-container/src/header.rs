// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Fixed-size per-item metadata records.

use crate::cursor::{ByteCursor, Record};
use crate::{ContainerError, Item};

/// On-disk metadata for one item: four little-endian `u64`s.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    /// Name length in bytes, including the trailing NUL.
    pub name_len: u64,
    /// Raw element type tag.
    pub type_tag: u64,
    /// Number of shape dimensions.
    pub shape_len: u64,
    /// Stored data length in bytes.
    pub data_len: u64,
}

impl Header {
    /// Builds the header that describes `item` as it currently sits in memory.
    pub fn for_item(item: &Item<'_>) -> Self {
        Self {
            name_len: item.name.len() as u64 + 1,
            type_tag: item.element_type.tag(),
            shape_len: item.shape.rank() as u64,
            data_len: item.bytes().len() as u64,
        }
    }

    /// Encodes this header into its 32-byte on-disk form.
    pub fn encode(&self) -> [u8; Self::SIZE] {
        let mut out = [0u8; Self::SIZE];
        out[0..8].copy_from_slice(&self.name_len.to_le_bytes());
        out[8..16].copy_from_slice(&self.type_tag.to_le_bytes());
        out[16..24].copy_from_slice(&self.shape_len.to_le_bytes());
        out[24..32].copy_from_slice(&self.data_len.to_le_bytes());
        out
    }
}

impl Record for Header {
    const SIZE: usize = 32;

    fn decode(bytes: &[u8]) -> Self {
        Self {
            name_len: u64::decode(&bytes[0..8]),
            type_tag: u64::decode(&bytes[8..16]),
            shape_len: u64::decode(&bytes[16..24]),
            data_len: u64::decode(&bytes[24..32]),
        }
    }
}

/// The contiguous header array that follows the version and item count.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderTable {
    headers: Vec<Header>,
}

impl HeaderTable {
    /// Reads `count` headers as one contiguous array.
    pub fn read(cursor: &mut ByteCursor<'_>, count: u64) -> Result<Self, ContainerError> {
        let headers = cursor.take::<Header>(count, "header table")?;
        Ok(Self { headers })
    }

    /// Builds one header per item, in order.
    pub fn from_items(items: &[Item<'_>]) -> Self {
        Self {
            headers: items.iter().map(Header::for_item).collect(),
        }
    }

    /// Number of headers.
    pub fn len(&self) -> usize {
        self.headers.len()
    }

    /// Returns `true` when the table holds no headers.
    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    /// Iterates over the headers in item order.
    pub fn iter(&self) -> std::slice::Iter<'_, Header> {
        self.headers.iter()
    }

    /// Encoded size of the whole table in bytes.
    pub fn size_bytes(&self) -> u64 {
        (self.headers.len() * Header::SIZE) as u64
    }
}

impl<'t> IntoIterator for &'t HeaderTable {
    type Item = &'t Header;
    type IntoIter = std::slice::Iter<'t, Header>;

    fn into_iter(self) -> Self::IntoIter {
        self.headers.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tensor_core::{ElementType, Shape};

    #[test]
    fn test_encode_decode() {
        let h = Header {
            name_len: 5,
            type_tag: ElementType::Float32.tag(),
            shape_len: 2,
            data_len: 24,
        };
        let bytes = h.encode();
        assert_eq!(Header::decode(&bytes), h);
    }

    #[test]
    fn test_for_item_counts_terminator() {
        let item = Item::owned("W", ElementType::Float32, Shape::matrix(2, 3), vec![0u8; 24]);
        let h = Header::for_item(&item);
        assert_eq!(h.name_len, 2);
        assert_eq!(h.shape_len, 2);
        assert_eq!(h.data_len, 24);
        assert_eq!(h.type_tag, 0x404);
    }

    #[test]
    fn test_read_table() {
        let items = vec![
            Item::owned("a", ElementType::Float32, Shape::vector(1), vec![0u8; 4]),
            Item::owned("bb", ElementType::Int8, Shape::vector(3), vec![1u8; 3]),
        ];
        let table = HeaderTable::from_items(&items);
        let mut buf = Vec::new();
        for h in &table {
            buf.extend_from_slice(&h.encode());
        }

        let mut cursor = ByteCursor::new(&buf);
        let read = HeaderTable::read(&mut cursor, 2).unwrap();
        assert_eq!(read, table);
        assert_eq!(read.size_bytes(), 64);
    }

    #[test]
    fn test_read_table_truncated() {
        let buf = [0u8; 40];
        let mut cursor = ByteCursor::new(&buf);
        assert!(matches!(
            HeaderTable::read(&mut cursor, 2),
            Err(ContainerError::TruncatedInput { .. })
        ));
    }
}
