// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Bounds-checked sequential reads over a byte buffer.
//!
//! [`ByteCursor`] walks a borrowed `&[u8]` front to back. Every read checks
//! the remaining length first and fails with
//! [`ContainerError::TruncatedInput`] instead of running off the end, so a
//! corrupt or cut-off container can never cause an out-of-bounds access.

use crate::ContainerError;

/// A fixed-size record that can be decoded from little-endian bytes.
pub trait Record: Sized {
    /// Encoded size in bytes.
    const SIZE: usize;

    /// Decodes one record from exactly `Self::SIZE` bytes.
    fn decode(bytes: &[u8]) -> Self;
}

impl Record for u64 {
    const SIZE: usize = 8;

    fn decode(bytes: &[u8]) -> Self {
        let mut raw = [0u8; 8];
        raw.copy_from_slice(bytes);
        u64::from_le_bytes(raw)
    }
}

impl Record for i32 {
    const SIZE: usize = 4;

    fn decode(bytes: &[u8]) -> Self {
        let mut raw = [0u8; 4];
        raw.copy_from_slice(bytes);
        i32::from_le_bytes(raw)
    }
}

/// A read-only cursor over a byte buffer.
///
/// # Example
/// ```
/// use model_container::cursor::ByteCursor;
///
/// let buf = [1u8, 0, 0, 0, 0, 0, 0, 0, 0xff];
/// let mut cursor = ByteCursor::new(&buf);
/// assert_eq!(cursor.read_u64("value").unwrap(), 1);
/// assert_eq!(cursor.remaining(), 1);
/// assert!(cursor.read_u64("value").is_err());
/// ```
#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> ByteCursor<'a> {
    /// Creates a cursor positioned at the start of `buf`.
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Current offset from the start of the buffer.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Number of bytes left to read.
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Returns the next `len` bytes as a borrowed slice and advances past them.
    ///
    /// The slice borrows from the underlying buffer, not from the cursor.
    pub fn take_bytes(&mut self, len: u64, context: &'static str) -> Result<&'a [u8], ContainerError> {
        let remaining = self.remaining();
        let len = usize::try_from(len)
            .ok()
            .filter(|&n| n <= remaining)
            .ok_or(ContainerError::TruncatedInput {
                context,
                needed: len,
                remaining: remaining as u64,
            })?;
        let bytes = &self.buf[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    /// Decodes `count` contiguous records of type `T`.
    pub fn take<T: Record>(&mut self, count: u64, context: &'static str) -> Result<Vec<T>, ContainerError> {
        let needed = count
            .checked_mul(T::SIZE as u64)
            .ok_or(ContainerError::TruncatedInput {
                context,
                needed: u64::MAX,
                remaining: self.remaining() as u64,
            })?;
        let bytes = self.take_bytes(needed, context)?;
        Ok(bytes.chunks_exact(T::SIZE).map(T::decode).collect())
    }

    /// Reads a single little-endian `u64`.
    pub fn read_u64(&mut self, context: &'static str) -> Result<u64, ContainerError> {
        let bytes = self.take_bytes(u64::SIZE as u64, context)?;
        Ok(u64::decode(bytes))
    }

    /// Advances past `len` bytes without inspecting them.
    pub fn skip(&mut self, len: u64, context: &'static str) -> Result<(), ContainerError> {
        self.take_bytes(len, context).map(|_| ())
    }
}
