// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Subcommand implementations and shared setup.

pub mod extract;
pub mod import;
pub mod inspect;
pub mod repack;

use anyhow::Context;
use model_container::ContainerConfig;
use std::path::Path;
use tracing_subscriber::EnvFilter;

/// Installs the global `tracing` subscriber.
///
/// `-v` raises the default level from `warn` to `info`, `debug` and
/// `trace`. `RUST_LOG` takes precedence when set.
pub fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Reads the loader configuration, or returns the defaults.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<ContainerConfig> {
    match path {
        Some(path) => ContainerConfig::from_file(path)
            .with_context(|| format!("failed to load config '{}'", path.display())),
        None => Ok(ContainerConfig::default()),
    }
}

/// Formats a byte count for humans.
pub fn human_bytes(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    let b = bytes as f64;
    if b < KB {
        format!("{bytes} B")
    } else if b < KB * KB {
        format!("{:.1} KB", b / KB)
    } else if b < KB * KB * KB {
        format!("{:.2} MB", b / (KB * KB))
    } else {
        format!("{:.2} GB", b / (KB * KB * KB))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_human_bytes() {
        assert_eq!(human_bytes(12), "12 B");
        assert_eq!(human_bytes(2048), "2.0 KB");
        assert_eq!(human_bytes(3 * 1024 * 1024), "3.00 MB");
    }

    #[test]
    fn test_default_config_without_path() {
        assert_eq!(load_config(None).unwrap(), ContainerConfig::default());
    }

    #[test]
    fn test_config_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mcx.toml");
        std::fs::write(&path, "mapped = true\n").unwrap();
        assert!(load_config(Some(&path)).unwrap().mapped);
    }
}
