// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for reading and writing model containers.

use std::path::PathBuf;

/// Errors that can occur when loading, saving or converting a container.
///
/// Every variant is fatal for the call that produced it: a failed load
/// never leaves partially populated items behind.
#[derive(Debug, thiserror::Error)]
pub enum ContainerError {
    /// The container was written with a different format version.
    #[error("binary file versions do not match: {found} (file) != {expected} (expected)")]
    VersionMismatch { found: u64, expected: u64 },

    /// A file could not be opened, read or written.
    #[error("I/O error on '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The buffer ends before the layout declared by its headers.
    #[error("truncated input while reading {context}: needed {needed} bytes, {remaining} remaining")]
    TruncatedInput {
        context: &'static str,
        needed: u64,
        remaining: u64,
    },

    /// An item name is not valid UTF-8 or contains a NUL byte.
    #[error("invalid name for item {index}: {detail}")]
    InvalidName { index: usize, detail: String },

    /// An item shape cannot be represented on disk or in memory.
    #[error("invalid shape for item '{name}': {source}")]
    InvalidShape {
        name: String,
        #[source]
        source: tensor_core::TensorError,
    },

    /// A quantization transform rejected an item.
    #[error("transform failed for item '{name}': {detail}")]
    Transform { name: String, detail: String },

    /// A SafeTensors file could not be converted.
    #[error("SafeTensors conversion failed: {0}")]
    SafeTensors(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl ContainerError {
    /// Wraps an I/O error together with the path it occurred on.
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ContainerError::Io {
            path: path.into(),
            source,
        }
    }
}
