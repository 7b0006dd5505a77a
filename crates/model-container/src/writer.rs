// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Container serialisation.
//!
//! Layout written by [`ContainerWriter`]:
//!
//! ```text
//! u64 version
//! u64 item count
//! count × header { u64 name_len, u64 type, u64 shape_len, u64 data_len }
//! count × name   (name_len bytes, NUL-terminated)
//! count × shape  (shape_len × i32)
//! u64 offset
//! offset × 0u8   padding up to the next 256-byte boundary
//! count × data   (data_len bytes each)
//! ```
//!
//! Item bytes are written exactly as they sit in memory. Readers only trust
//! the explicit offset, so containers from writers that did not align the
//! data section still load.

use crate::header::HeaderTable;
use crate::{ContainerError, Item, BINARY_FILE_VERSION, DATA_ALIGNMENT};
use std::io::{BufWriter, Write};
use std::path::Path;

/// Number of zero bytes written after the offset field when the metadata
/// ends at `pos`.
///
/// The data section then starts at the first multiple of
/// [`DATA_ALIGNMENT`] strictly after `pos + 8`.
///
/// # Example
/// ```
/// use model_container::writer::alignment_padding;
/// assert_eq!(alignment_padding(100), 148);
/// assert_eq!(alignment_padding(248), 256);
/// ```
pub fn alignment_padding(pos: u64) -> u64 {
    let next = ((pos + 8) / DATA_ALIGNMENT + 1) * DATA_ALIGNMENT;
    next - pos - 8
}

/// Writes item lists as containers.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContainerWriter;

impl ContainerWriter {
    pub fn new() -> Self {
        Self
    }

    /// Serialises `items` into `out` and returns the number of bytes written.
    pub fn write_to<W: Write>(&self, out: &mut W, items: &[Item<'_>]) -> Result<u64, ContainerError> {
        let shapes = validate(items)?;
        let mut sink = CountingWriter { inner: out, pos: 0 };
        emit(&mut sink, items, &shapes).map_err(|e| ContainerError::io("<stream>", e))?;
        Ok(sink.pos)
    }

    /// Writes `items` to the file at `path`, replacing it.
    ///
    /// Names and shapes are validated before the file is created, so an
    /// item that cannot be encoded never clobbers an existing container.
    pub fn save_items(&self, path: &Path, items: &[Item<'_>]) -> Result<u64, ContainerError> {
        let shapes = validate(items)?;
        let file = std::fs::File::create(path).map_err(|e| ContainerError::io(path, e))?;
        let mut out = BufWriter::new(file);
        let mut sink = CountingWriter {
            inner: &mut out,
            pos: 0,
        };
        emit(&mut sink, items, &shapes).map_err(|e| ContainerError::io(path, e))?;
        let written = sink.pos;
        out.flush().map_err(|e| ContainerError::io(path, e))?;

        tracing::info!(
            "saved {} items to {} ({written} bytes)",
            items.len(),
            path.display()
        );
        Ok(written)
    }
}

/// Checks that every item can be encoded and returns the on-disk shapes.
///
/// Names are stored NUL-terminated, so a name with an interior NUL would
/// come back truncated.
fn validate(items: &[Item<'_>]) -> Result<Vec<Vec<i32>>, ContainerError> {
    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            if let Some(at) = item.name.find('\0') {
                return Err(ContainerError::InvalidName {
                    index,
                    detail: format!("'{}' contains a NUL byte at {at}", item.name.escape_debug()),
                });
            }
            item.shape.to_wire().map_err(|source| ContainerError::InvalidShape {
                name: item.name.clone(),
                source,
            })
        })
        .collect()
}

fn emit<W: Write>(
    out: &mut CountingWriter<'_, W>,
    items: &[Item<'_>],
    shapes: &[Vec<i32>],
) -> std::io::Result<()> {
    out.write_all(&BINARY_FILE_VERSION.to_le_bytes())?;

    let headers = HeaderTable::from_items(items);
    out.write_all(&(headers.len() as u64).to_le_bytes())?;
    for header in &headers {
        out.write_all(&header.encode())?;
    }

    for item in items {
        out.write_all(item.name.as_bytes())?;
        out.write_all(&[0u8])?;
    }

    for dims in shapes {
        for d in dims {
            out.write_all(&d.to_le_bytes())?;
        }
    }

    let offset = alignment_padding(out.pos);
    out.write_all(&offset.to_le_bytes())?;
    out.write_all(&vec![0u8; offset as usize])?;
    debug_assert_eq!(out.pos % DATA_ALIGNMENT, 0);

    for item in items {
        out.write_all(item.bytes())?;
    }
    Ok(())
}

/// Tracks how many bytes went through a writer.
struct CountingWriter<'w, W: Write> {
    inner: &'w mut W,
    pos: u64,
}

impl<W: Write> Write for CountingWriter<'_, W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.pos += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tensor_core::{ElementType, Shape};

    #[test]
    fn test_alignment_padding() {
        for pos in [0u64, 1, 100, 247, 248, 249, 255, 256, 1000] {
            let pad = alignment_padding(pos);
            assert_eq!((pos + 8 + pad) % DATA_ALIGNMENT, 0, "pos {pos}");
            assert!(pad < DATA_ALIGNMENT + 1);
        }
    }

    #[test]
    fn test_exact_boundary_still_pads_full_block() {
        // pos + 8 already aligned: the formula moves to the next boundary.
        assert_eq!(alignment_padding(248), 256);
    }

    #[test]
    fn test_single_item_layout() {
        let item = Item::owned("W", ElementType::Float32, Shape::matrix(2, 3), vec![0u8; 24]);
        let mut buf = Vec::new();
        let written = ContainerWriter::new().write_to(&mut buf, &[item]).unwrap();
        assert_eq!(written, buf.len() as u64);

        // 8 + 8 + 32 + 2 ("W\0") + 8 (shape) = 58; + 8 offset = 66 → data at 256.
        let pos = 8 + 8 + 32 + 2 + 8;
        let offset = u64::from_le_bytes(buf[pos..pos + 8].try_into().unwrap());
        assert_eq!(offset, 256 - 66);
        assert!(buf[pos + 8..256].iter().all(|&b| b == 0));
        assert_eq!(buf.len(), 256 + 24);
    }

    #[test]
    fn test_header_fields() {
        let item = Item::owned("abc", ElementType::Int16, Shape::vector(2), vec![1, 2, 3, 4]);
        let mut buf = Vec::new();
        ContainerWriter::new().write_to(&mut buf, &[item]).unwrap();

        let word = |i: usize| u64::from_le_bytes(buf[i * 8..i * 8 + 8].try_into().unwrap());
        assert_eq!(word(0), BINARY_FILE_VERSION);
        assert_eq!(word(1), 1);
        assert_eq!(word(2), 4);
        assert_eq!(word(3), ElementType::Int16.tag());
        assert_eq!(word(4), 1);
        assert_eq!(word(5), 4);
        assert_eq!(&buf[48..52], b"abc\0");
    }

    #[test]
    fn test_empty_container() {
        let mut buf = Vec::new();
        ContainerWriter::new().write_to(&mut buf, &[]).unwrap();
        assert_eq!(buf.len(), 256);
        assert_eq!(&buf[8..16], &0u64.to_le_bytes());
    }

    #[test]
    fn test_oversized_dimension_rejected() {
        let item = Item::owned("big", ElementType::Uint8, Shape::vector(1 << 40), vec![]);
        let mut buf = Vec::new();
        let err = ContainerWriter::new().write_to(&mut buf, &[item]).unwrap_err();
        assert!(matches!(err, ContainerError::InvalidShape { .. }));
        assert!(buf.is_empty());
    }

    #[test]
    fn test_name_with_nul_rejected() {
        let items = vec![
            Item::owned("a", ElementType::Uint8, Shape::vector(1), vec![1]),
            Item::owned("a\0b", ElementType::Uint8, Shape::vector(1), vec![7]),
        ];
        let mut buf = Vec::new();
        let err = ContainerWriter::new().write_to(&mut buf, &items).unwrap_err();
        assert!(matches!(err, ContainerError::InvalidName { index: 1, .. }));
        assert!(buf.is_empty());
    }

    #[test]
    fn test_invalid_name_keeps_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.bin");
        let writer = ContainerWriter::new();
        let good = [Item::owned("ok", ElementType::Uint8, Shape::vector(1), vec![1])];
        let written = writer.save_items(&path, &good).unwrap();

        let bad = [Item::owned("x\0", ElementType::Uint8, Shape::vector(1), vec![2])];
        assert!(writer.save_items(&path, &bad).is_err());
        assert_eq!(std::fs::metadata(&path).unwrap().len(), written);
    }

    #[test]
    fn test_save_to_missing_directory() {
        let err = ContainerWriter::new()
            .save_items(Path::new("/nonexistent/dir/model.bin"), &[])
            .unwrap_err();
        assert!(matches!(err, ContainerError::Io { .. }));
    }
}
